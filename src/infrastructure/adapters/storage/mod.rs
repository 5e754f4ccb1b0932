//! 媒体文件存储适配器

pub mod file_storage;

pub use file_storage::FileMediaStorage;
