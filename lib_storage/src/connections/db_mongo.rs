//! # MongoDB Document-Store Client
//!
//! Provides an asynchronous wrapper around the MongoDB driver for the
//! `users` and `files` collections. Each method is a thin delegation to
//! the driver; the only local logic is the coercion of textual identifier
//! filters into native `ObjectId` values before a query is issued.

use log::warn;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Bson, Document};
use mongodb::results::InsertOneResult;
use mongodb::{Client, Collection, Database};
use thiserror::Error;

use crate::configs::config_store::DbConfig;

/// Collection holding user documents.
const USERS_COLLECTION: &str = "users";
/// Collection holding file documents.
const FILES_COLLECTION: &str = "files";

/// Identifier-like fields coerced on `users` lookups.
const USER_ID_FIELDS: &[&str] = &["_id"];
/// Identifier-like fields coerced on `files` lookups.
const FILE_ID_FIELDS: &[&str] = &["_id", "userId", "parentId"];

/// Sentinel parent value meaning "stored at the root". It is queried as
/// the literal string, never coerced into an `ObjectId`.
pub const ROOT_PARENT_ID: &str = "0";

/// Custom error types for document-store operations.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Failed to connect to document store: {0}")]
    ConnectionError(String),
    #[error("Query execution failed: {0}")]
    QueryError(String),
    #[error("Malformed object id '{0}': {1}")]
    MalformedId(String, String),
}

/// A wrapper around the MongoDB client and the selected database.
///
/// One instance is constructed at startup and shared by reference across
/// callers; the driver multiplexes concurrent requests internally.
pub struct DbClient {
    client: Client,
    database: Database,
    alive: bool,
}

impl DbClient {
    /// Opens the client for the given settings and probes the server once.
    ///
    /// A malformed connection string is an error. An unreachable server is
    /// not: the client is returned with [`DbClient::is_alive`] reporting
    /// `false`, and later operations surface the driver failure. No retry
    /// is performed by this layer.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        let client = Client::with_uri_str(config.uri())
            .await
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        let database = client.database(&config.database);
        // The driver connects lazily, so liveness is derived from one ping.
        let alive = match database.run_command(doc! { "ping": 1 }, None).await {
            Ok(_) => true,
            Err(e) => {
                warn!("Document store at {} is unreachable: {}", config.uri(), e);
                false
            }
        };
        Ok(Self { client, database, alive })
    }

    /// The MongoDB client uses Arc internally, so cloning the handle is cheap.
    pub fn client(&self) -> Client {
        self.client.clone()
    }

    /// Whether the construction-time probe of the server succeeded.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    fn users(&self) -> Collection<Document> {
        self.database.collection(USERS_COLLECTION)
    }

    fn files(&self) -> Collection<Document> {
        self.database.collection(FILES_COLLECTION)
    }

    /// Returns the current number of documents in the `users` collection.
    pub async fn count_users(&self) -> Result<u64, DbError> {
        self.users()
            .count_documents(doc! {}, None)
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))
    }

    /// Returns the current number of documents in the `files` collection.
    pub async fn count_files(&self) -> Result<u64, DbError> {
        self.files()
            .count_documents(doc! {}, None)
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))
    }

    /// Returns the first user document with the given email, if any.
    pub async fn user_exists(&self, email: &str) -> Result<Option<Document>, DbError> {
        self.users()
            .find_one(doc! { "email": email }, None)
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))
    }

    /// Inserts a new user document and returns the driver insertion result,
    /// which carries the newly assigned identifier.
    ///
    /// No uniqueness check is performed at this layer.
    pub async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<InsertOneResult, DbError> {
        self.users()
            .insert_one(doc! { "email": email, "passwordHash": password_hash }, None)
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))
    }

    /// Returns the first user document matching the filter, coercing a
    /// textual `_id` into an `ObjectId` before querying.
    pub async fn find_user(&self, mut filters: Document) -> Result<Option<Document>, DbError> {
        coerce_id_fields(&mut filters, USER_ID_FIELDS, false)?;
        self.users()
            .find_one(filters, None)
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))
    }

    /// Returns the first file document matching the filter.
    ///
    /// Textual `_id`, `userId` and `parentId` values are coerced into
    /// `ObjectId`s first, except the [`ROOT_PARENT_ID`] sentinel which is
    /// matched literally.
    pub async fn find_file(&self, mut filters: Document) -> Result<Option<Document>, DbError> {
        coerce_id_fields(&mut filters, FILE_ID_FIELDS, true)?;
        self.files()
            .find_one(filters, None)
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))
    }
}

/// Rewrites the listed filter fields from text into `ObjectId` values.
///
/// Fields that are absent, or present with a non-string value, are left
/// untouched. With `skip_root` set, the `"0"` sentinel is left as-is.
fn coerce_id_fields(
    filters: &mut Document,
    fields: &[&str],
    skip_root: bool,
) -> Result<(), DbError> {
    for field in fields {
        let text = match filters.get(*field).and_then(Bson::as_str) {
            Some(text) => text.to_owned(),
            None => continue,
        };
        if skip_root && text == ROOT_PARENT_ID {
            continue;
        }
        let oid = ObjectId::parse_str(&text)
            .map_err(|e| DbError::MalformedId(text.clone(), e.to_string()))?;
        filters.insert(*field, Bson::ObjectId(oid));
    }
    Ok(())
}
