use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Map, Value};

use crate::models::event::{NewEvent, StoredEvent};
use crate::storage::event_store::{EventStore, StoreError};

/// ActivityWatch server client using the REST API v0
pub struct ActivityWatchClient {
    base_url: String,
    client: Client,
    client_name: String,
    hostname: String,
}

impl ActivityWatchClient {
    pub fn new(base_url: String, client_name: String, hostname: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
            client_name,
            hostname,
        }
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Bucket id for this client/host pair
    pub fn bucket_id(&self) -> String {
        format!("{}_{}", self.client_name, self.hostname)
    }

    fn buckets_url(&self) -> String {
        format!("{}/api/0/buckets/", self.base_url)
    }

    fn bucket_url(&self, bucket_id: &str) -> String {
        format!("{}/api/0/buckets/{}", self.base_url, bucket_id)
    }

    fn events_url(&self, bucket_id: &str) -> String {
        format!("{}/api/0/buckets/{}/events", self.base_url, bucket_id)
    }

    /// Health check against `/api/0/info`
    pub async fn ping(&self) -> Result<(), StoreError> {
        let url = format!("{}/api/0/info", self.base_url);
        self.client.get(&url).send().await?.error_for_status()?;
        Ok(())
    }

    /// All buckets known to the server, keyed by id
    pub async fn get_buckets(&self) -> Result<Map<String, Value>, StoreError> {
        let response = self.client.get(self.buckets_url()).send().await?;

        match response.status() {
            StatusCode::OK => {
                let buckets: Value = response.json().await?;
                match buckets {
                    Value::Object(map) => Ok(map),
                    other => Err(StoreError::InvalidResponse(format!(
                        "expected bucket map, got {}",
                        other
                    ))),
                }
            }
            status => {
                let message = response.text().await?;
                Err(StoreError::Api {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    async fn create_bucket(&self, bucket_id: &str, kind: &str) -> Result<(), StoreError> {
        let body = json!({
            "client": self.client_name,
            "type": kind,
            "hostname": self.hostname,
        });

        let response = self
            .client
            .post(self.bucket_url(bucket_id))
            .json(&body)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED => {
                tracing::info!("Created bucket {} of type {}", bucket_id, kind);
                Ok(())
            }
            // Already exists
            StatusCode::NOT_MODIFIED => {
                tracing::debug!("Bucket {} already exists", bucket_id);
                Ok(())
            }
            status => {
                let message = response.text().await?;
                Err(StoreError::Api {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}

#[async_trait]
impl EventStore for ActivityWatchClient {
    async fn bucket_exists(&self, bucket_id: &str) -> Result<bool, StoreError> {
        Ok(self.get_buckets().await?.contains_key(bucket_id))
    }

    async fn create_bucket_if_absent(
        &self,
        bucket_id: &str,
        kind: &str,
    ) -> Result<(), StoreError> {
        if self.bucket_exists(bucket_id).await? {
            tracing::debug!("Bucket {} already exists", bucket_id);
            return Ok(());
        }
        self.create_bucket(bucket_id, kind).await
    }

    async fn list_events(&self, bucket_id: &str) -> Result<Vec<StoredEvent>, StoreError> {
        let response = self
            .client
            .get(self.events_url(bucket_id))
            .query(&[("limit", "-1")])
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let events: Vec<StoredEvent> = response.json().await?;
                tracing::debug!("Fetched {} events from {}", events.len(), bucket_id);
                Ok(events)
            }
            status => {
                let message = response.text().await?;
                Err(StoreError::Api {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    async fn insert_events(
        &self,
        bucket_id: &str,
        events: Vec<NewEvent>,
    ) -> Result<(), StoreError> {
        let count = events.len();
        let response = self
            .client
            .post(self.events_url(bucket_id))
            .json(&events)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED => {
                tracing::debug!("Inserted {} events into {}", count, bucket_id);
                Ok(())
            }
            status => {
                let message = response.text().await?;
                Err(StoreError::Api {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}
