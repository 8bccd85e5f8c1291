use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{Result, SyncError, Upstream};
use crate::sync::traits::RecordStore;
use crate::sync::types::Batch;

/// Pulls bounded pages of unprocessed records from the store
#[derive(Clone)]
pub struct BatchFetcher {
    store: Arc<dyn RecordStore>,
    page_size: usize,
}

impl std::fmt::Debug for BatchFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchFetcher")
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl BatchFetcher {
    pub fn new(store: Arc<dyn RecordStore>, page_size: usize) -> Result<Self> {
        if page_size == 0 {
            return Err(SyncError::configuration("page size must be at least 1"));
        }
        Ok(Self { store, page_size })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Fetch the next page.
    ///
    /// A store answering with more than `page_size` records breaks the paging
    /// contract and is reported as a malformed response.
    pub async fn fetch(&self) -> Result<Batch> {
        let records = self.store.fetch_unprocessed(self.page_size).await?;

        if records.len() > self.page_size {
            warn!(
                requested = self.page_size,
                received = records.len(),
                "⚠️ FETCH: database returned more records than requested"
            );
            return Err(SyncError::malformed(
                Upstream::Database,
                format!(
                    "requested at most {} records, received {}",
                    self.page_size,
                    records.len()
                ),
            ));
        }

        debug!(
            requested = self.page_size,
            received = records.len(),
            "📥 FETCH: page received"
        );

        Ok(Batch::new(records, self.page_size))
    }
}
