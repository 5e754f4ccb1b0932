//! TXT 抽取 - 直通，仅做编码与换行归一

use std::path::Path;

use super::ExtractError;

pub(super) fn extract(path: &Path) -> Result<String, ExtractError> {
    let bytes =
        std::fs::read(path).map_err(|e| ExtractError::UnreadableSource(e.to_string()))?;
    Ok(decode(&bytes))
}

/// BOM 嗅探 + UTF-8 宽容解码
pub(super) fn decode(bytes: &[u8]) -> String {
    let (encoding, skip) = encoding_rs::Encoding::for_bom(bytes)
        .unwrap_or((encoding_rs::UTF_8, 0));
    let (text, _, _) = encoding.decode(&bytes[skip..]);
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_normalizes_line_endings() {
        let mut file = tempfile::NamedTempFile::with_suffix(".txt").unwrap();
        file.write_all(b"First line.\r\nSecond line.\r").unwrap();

        let text = extract(file.path()).unwrap();
        assert_eq!(text, "First line.\nSecond line.\n");
    }

    #[test]
    fn test_decodes_utf16_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "Fox.".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(decode(&bytes), "Fox.");
    }
}
