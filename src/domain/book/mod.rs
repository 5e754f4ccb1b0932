//! Book Context
//!
//! 故事书聚合根及其实体 / 值对象

mod aggregate;
mod entities;
mod errors;
mod value_objects;

pub use aggregate::Book;
pub use entities::{MediaPatch, Paragraph};
pub use errors::BookError;
pub use value_objects::{BookId, BookMetadata, BookSource, ImageStyle};
