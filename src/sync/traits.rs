//! # Collaborator Traits
//!
//! Seams between the sync pipeline and the two upstream services. The HTTP
//! implementations live in [`crate::clients`]; tests plug in in-memory fakes.

use async_trait::async_trait;

use crate::error::Result;
use crate::sync::types::{RecognitionRequest, RecognitionResult, Record, Transcription};

/// Status the database is documented to answer a successful bulk update with
pub const EXPECTED_COMMIT_STATUS: u16 = 204;

/// Acknowledgement of a successful bulk update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitAck {
    /// HTTP status (or equivalent) the store answered with; always 2xx
    pub status: u16,
}

impl CommitAck {
    pub fn new(status: u16) -> Self {
        Self { status }
    }

    /// Whether the store answered with the documented status
    pub fn is_expected(&self) -> bool {
        self.status == EXPECTED_COMMIT_STATUS
    }
}

impl Default for CommitAck {
    fn default() -> Self {
        Self::new(EXPECTED_COMMIT_STATUS)
    }
}

/// The database holding records awaiting recognition
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Read up to `page_size` unprocessed records.
    ///
    /// Fewer than `page_size` records means the source is exhausted. Must not
    /// modify the store.
    async fn fetch_unprocessed(&self, page_size: usize) -> Result<Vec<Record>>;

    /// Write transcriptions as a single bulk update under `annotator_id`.
    ///
    /// Any 2xx answer is a success; anything else is `UpstreamRejected`.
    async fn commit_transcriptions(
        &self,
        annotator_id: &str,
        transcriptions: &[Transcription],
    ) -> Result<CommitAck>;
}

/// The line-recognition engine
#[async_trait]
pub trait Recognizer: Send + Sync {
    async fn recognize(&self, request: &RecognitionRequest) -> Result<RecognitionResult>;
}
