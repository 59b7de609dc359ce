//! # Configs Module
//!
//! Environment-resolved configuration for the external stores used by
//! the files_manager services.

/// Module for document-store and cache-store connection settings.
pub mod config_store;
