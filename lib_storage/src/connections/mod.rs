//! # Connections Module
//!
//! This module handles persistent connections to external services
//! including databases and caching layers.

/// Module for MongoDB document-store access and identifier coercion.
pub mod db_mongo;

/// Module for Redis cache operations and connection handling.
pub mod cache_redis;
