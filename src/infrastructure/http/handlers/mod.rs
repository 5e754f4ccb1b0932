//! HTTP Handlers

mod book;
mod generate;
mod history;
mod ping;

pub use book::{create_book, delete_book, get_book, upload_book};
pub use generate::{generate_batch, regenerate_audio, regenerate_image};
pub use history::get_history;
pub use ping::ping;
