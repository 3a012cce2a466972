use async_trait::async_trait;
use thiserror::Error;

use crate::models::event::{NewEvent, StoredEvent};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Event store API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

// ============================================
// TRAIT DEFINITION - with Send + Sync bounds
// ============================================
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn bucket_exists(&self, bucket_id: &str) -> Result<bool, StoreError>;

    /// Create the bucket unless it is already present.
    async fn create_bucket_if_absent(&self, bucket_id: &str, kind: &str)
        -> Result<(), StoreError>;

    /// Every event currently stored in the bucket.
    async fn list_events(&self, bucket_id: &str) -> Result<Vec<StoredEvent>, StoreError>;

    /// Submit a batch in one call. Atomicity is whatever the backend provides.
    async fn insert_events(&self, bucket_id: &str, events: Vec<NewEvent>)
        -> Result<(), StoreError>;
}
