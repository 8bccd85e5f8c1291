//! # Database API Client
//!
//! HTTP client for the annotation database: reads unprocessed records from a
//! retrieval queue and writes recognizer transcriptions back in bulk.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Url};
use tracing::{debug, info};

use crate::clients::http::{build_client, decode_json, endpoint, expect_ok, parse_base_url, reject, send};
use crate::config::BridgeConfig;
use crate::error::{Result, SyncError, Upstream};
use crate::sync::traits::{CommitAck, RecordStore};
use crate::sync::types::{Record, Transcription};

/// HTTP client for the database API
pub struct DatabaseClient {
    client: Client,
    base_url: Url,
    queue: String,
}

impl std::fmt::Debug for DatabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseClient")
            .field("base_url", &self.base_url.as_str())
            .field("queue", &self.queue)
            .finish()
    }
}

impl DatabaseClient {
    pub fn new(config: &BridgeConfig) -> Result<Self> {
        let base_url = parse_base_url(Upstream::Database, &config.database.base_url)?;

        let mut headers = HeaderMap::new();
        if !config.database.shared_secret.is_empty() {
            let mut value = HeaderValue::from_str(&config.database.shared_secret).map_err(|e| {
                SyncError::configuration(format!("Invalid CLUSTER_INTERNAL_PASSWORD: {e}"))
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = build_client(Upstream::Database, config.web.http_timeout(), headers)?;

        info!(
            base_url = %base_url,
            queue = %config.database.queue,
            "Created DatabaseClient"
        );

        Ok(Self {
            client,
            base_url,
            queue: config.database.queue.clone(),
        })
    }

    fn retrieve_url(&self, page_size: usize) -> Url {
        endpoint(
            &self.base_url,
            &["db", "retrieve", &self.queue, &page_size.to_string()],
        )
    }

    fn update_url(&self, annotator_id: &str) -> Url {
        endpoint(&self.base_url, &["db", "update", "value", annotator_id])
    }
}

#[async_trait]
impl RecordStore for DatabaseClient {
    async fn fetch_unprocessed(&self, page_size: usize) -> Result<Vec<Record>> {
        let url = self.retrieve_url(page_size);
        debug!(url = %url, "Retrieving records from database");

        let response = send(
            Upstream::Database,
            "GET",
            &url,
            self.client.get(url.clone()),
        )
        .await?;
        let response = expect_ok(Upstream::Database, response).await?;

        decode_json(Upstream::Database, response).await
    }

    async fn commit_transcriptions(
        &self,
        annotator_id: &str,
        transcriptions: &[Transcription],
    ) -> Result<CommitAck> {
        let url = self.update_url(annotator_id);
        debug!(url = %url, records = transcriptions.len(), "Updating records in database");

        let response = send(
            Upstream::Database,
            "PUT",
            &url,
            self.client.put(url.clone()).json(transcriptions),
        )
        .await?;

        let status = response.status();
        if status.is_success() {
            Ok(CommitAck::new(status.as_u16()))
        } else {
            Err(reject(Upstream::Database, response).await)
        }
    }
}
