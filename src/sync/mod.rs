//! # Bounded-Batch Synchronization
//!
//! The pipeline that drains the database's recognizer queue:
//!
//! - [`fetcher`] pulls pages of at most `page_size` unprocessed records
//! - [`transformer`] maps them to `(id, url)` pairs the recognizer accepts
//! - [`forwarder`] obtains transcriptions and flags omitted identifiers
//! - [`committer`] writes transcriptions back under the recognizer's identity
//! - [`driver`] loops over the four until the source is drained or a step fails

pub mod committer;
pub mod driver;
pub mod fetcher;
pub mod forwarder;
pub mod state;
pub mod traits;
pub mod transformer;
pub mod types;

pub use committer::ResultCommitter;
pub use driver::{SyncDriver, SyncOutcome, SyncReport, SyncRun};
pub use fetcher::BatchFetcher;
pub use forwarder::{Forwarded, RecognitionForwarder};
pub use state::SyncState;
pub use traits::{CommitAck, RecordStore, Recognizer, EXPECTED_COMMIT_STATUS};
pub use transformer::BatchTransformer;
pub use types::{
    Batch, RecognitionItem, RecognitionRequest, RecognitionResult, Record, RecordId, Transcription,
};
