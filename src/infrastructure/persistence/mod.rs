//! 持久化实现

pub mod sled_store;
pub mod sqlite;
