//! # Redis Cache-Store Client
//!
//! Provides an asynchronous wrapper for Redis key-value operations with
//! expiry. Connection failures at construction are logged for the operator
//! rather than raised; all buffering and eviction is the store's own.

use log::error;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use thiserror::Error;

/// Custom error types for cache-store operations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache store connection is not established")]
    NotConnected,
    #[error("Cache command failed: {0}")]
    CommandError(String),
}

/// A handler for Redis cache interactions.
///
/// Like the document-store client, one instance is constructed at startup
/// and shared by reference; the connection manager multiplexes requests.
pub struct CacheClient {
    conn: Option<ConnectionManager>,
}

impl CacheClient {
    /// Opens the connection to the redis server at `url`.
    ///
    /// Never fails: any driver error is written to the log and leaves the
    /// client unconnected, with [`CacheClient::is_alive`] reporting `false`.
    pub async fn connect(url: &str) -> Self {
        let conn = match Client::open(url) {
            Ok(client) => match client.get_connection_manager().await {
                Ok(conn) => Some(conn),
                Err(e) => {
                    error!("FAILURE: Cache store '{}' unreachable: {}", url, e);
                    None
                }
            },
            Err(e) => {
                error!("Configuration error for cache store '{}': {}", url, e);
                None
            }
        };
        Self { conn }
    }

    /// Whether the connection was established at construction.
    pub fn is_alive(&self) -> bool {
        self.conn.is_some()
    }

    /// The manager is a cheap clone over a shared multiplexed connection.
    fn manager(&self) -> Result<ConnectionManager, CacheError> {
        self.conn.clone().ok_or(CacheError::NotConnected)
    }

    /// Returns the value stored for `key`, or `None` if unset or expired.
    pub async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.manager()?;
        conn.get(key)
            .await
            .map_err(|e: redis::RedisError| CacheError::CommandError(e.to_string()))
    }

    /// Stores `value` under `key`, expiring after `ttl_seconds` seconds.
    ///
    /// An existing value is overwritten and its expiry reset.
    pub async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), CacheError> {
        let mut conn = self.manager()?;
        conn.set_ex(key, value, ttl_seconds)
            .await
            .map_err(|e: redis::RedisError| CacheError::CommandError(e.to_string()))
    }

    /// Removes `key` if present. An absent key is not an error.
    pub async fn del(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.manager()?;
        conn.del(key)
            .await
            .map_err(|e: redis::RedisError| CacheError::CommandError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::config_store::DEFAULT_CACHE_URL;
    use std::time::Duration;

    #[tokio::test]
    async fn operations_without_a_connection_report_not_connected() {
        let client = CacheClient { conn: None };
        assert!(!client.is_alive());
        assert!(matches!(client.get("k").await, Err(CacheError::NotConnected)));
        assert!(matches!(client.set("k", "v", 10).await, Err(CacheError::NotConnected)));
        assert!(matches!(client.del("k").await, Err(CacheError::NotConnected)));
    }

    #[tokio::test]
    #[ignore = "requires a local redis-server on 127.0.0.1:6379"]
    async fn set_get_del_roundtrip() {
        let client = CacheClient::connect(DEFAULT_CACHE_URL).await;
        assert!(client.is_alive());

        client.set("lib_storage_test_k", "v", 10).await.unwrap();
        assert_eq!(client.get("lib_storage_test_k").await.unwrap().as_deref(), Some("v"));

        client.del("lib_storage_test_k").await.unwrap();
        assert_eq!(client.get("lib_storage_test_k").await.unwrap(), None);

        // Deleting an absent key is still Ok.
        client.del("lib_storage_test_k").await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a local redis-server on 127.0.0.1:6379"]
    async fn values_expire_after_their_ttl() {
        let client = CacheClient::connect(DEFAULT_CACHE_URL).await;
        client.set("lib_storage_test_ttl", "v", 1).await.unwrap();
        assert!(client.get("lib_storage_test_ttl").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(client.get("lib_storage_test_ttl").await.unwrap(), None);
    }
}
