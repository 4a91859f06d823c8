pub mod in_memory;
pub mod notifications;
pub mod payments;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
