use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::Result;
use crate::sync::traits::{CommitAck, RecordStore, EXPECTED_COMMIT_STATUS};
use crate::sync::types::RecognitionResult;

/// Writes transcriptions back under the recognizer's annotator identity
#[derive(Clone)]
pub struct ResultCommitter {
    store: Arc<dyn RecordStore>,
    annotator_id: String,
}

impl std::fmt::Debug for ResultCommitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCommitter")
            .field("annotator_id", &self.annotator_id)
            .finish()
    }
}

impl ResultCommitter {
    pub fn new(store: Arc<dyn RecordStore>, annotator_id: impl Into<String>) -> Self {
        Self {
            store,
            annotator_id: annotator_id.into(),
        }
    }

    pub fn annotator_id(&self) -> &str {
        &self.annotator_id
    }

    /// Commit every pair in one bulk update
    pub async fn commit(&self, result: &RecognitionResult) -> Result<CommitAck> {
        let ack = self
            .store
            .commit_transcriptions(&self.annotator_id, &result.transcriptions)
            .await?;

        if !ack.is_expected() {
            warn!(
                status = ack.status,
                expected = EXPECTED_COMMIT_STATUS,
                "⚠️ COMMIT: minor status discrepancy from database"
            );
        }

        debug!(
            annotator_id = %self.annotator_id,
            records = result.len(),
            status = ack.status,
            "💾 COMMIT: transcriptions written"
        );

        Ok(ack)
    }
}
