//! Sled 持久化

mod book_store;

pub use book_store::SledBookStore;
