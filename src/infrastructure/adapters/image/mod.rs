//! 图像生成适配器

pub mod http_image_client;

pub use http_image_client::{HttpImageClient, HttpImageClientConfig};
