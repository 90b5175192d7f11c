// Declare modules within the adapters directory
pub mod in_memory_cache;
pub mod in_memory_directory;
pub mod in_memory_feed;
pub mod in_memory_gateway;
pub mod in_memory_snapshots;
pub mod tab_store;
