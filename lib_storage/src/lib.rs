// Declare the modules to re-export
#[cfg(feature = "configs")]
pub mod configs;
#[cfg(feature = "connections")]
pub mod connections;

// Re-export everything
#[cfg(feature = "configs")]
pub use configs::config_store::*;
#[cfg(feature = "connections")]
pub use connections::cache_redis::*;
#[cfg(feature = "connections")]
pub use connections::db_mongo::*;
