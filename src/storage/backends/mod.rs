//! Storage backend implementations

pub mod file;
pub mod memory;
#[cfg(feature = "redis")]
pub mod redis;

pub use file::FileBackend;
pub use memory::MemoryBackend;
#[cfg(feature = "redis")]
pub use redis::RedisBackend;
