//! In-memory collaborators standing in for the database and the recognizer

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use recognizer_bridge::auth::OpenGate;
use recognizer_bridge::error::{Result, SyncError, Upstream};
use recognizer_bridge::sync::{
    CommitAck, RecognitionRequest, RecognitionResult, Recognizer, Record, RecordStore, SyncDriver,
    Transcription,
};

use super::test_config;

/// One accepted commit, as the store saw it
#[derive(Debug, Clone)]
pub struct CommitCall {
    pub annotator_id: String,
    pub transcriptions: Vec<Transcription>,
}

/// Store whose unprocessed flag is cleared by a successful commit
#[derive(Debug, Default)]
pub struct FakeStore {
    pending: Mutex<Vec<Record>>,
    fetches: Mutex<u32>,
    commits: Mutex<Vec<CommitCall>>,
    commit_attempts: Mutex<u32>,
    fail_fetch_on: Mutex<Option<u32>>,
    fail_commit_on: Mutex<Option<u32>>,
    commit_status: Mutex<Option<u16>>,
}

impl FakeStore {
    pub fn with_records(ids: &[&str]) -> Self {
        let store = Self::default();
        *store.pending.lock().unwrap() = ids
            .iter()
            .map(|id| Record::new(*id, format!("/lines/{id}.png")))
            .collect();
        store
    }

    pub fn numbered(count: usize) -> Self {
        let ids: Vec<String> = (0..count).map(|n| format!("img-{n:04}")).collect();
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        Self::with_records(&refs)
    }

    /// Answer the n-th fetch (1-based) with a 500
    pub fn fail_fetch_on(self, n: u32) -> Self {
        *self.fail_fetch_on.lock().unwrap() = Some(n);
        self
    }

    /// Answer the n-th commit attempt (1-based) with a 500
    pub fn fail_commit_on(self, n: u32) -> Self {
        *self.fail_commit_on.lock().unwrap() = Some(n);
        self
    }

    /// Acknowledge commits with this status instead of 204
    pub fn commit_status(self, status: u16) -> Self {
        *self.commit_status.lock().unwrap() = Some(status);
        self
    }

    pub fn clear_failures(&self) {
        *self.fail_fetch_on.lock().unwrap() = None;
        *self.fail_commit_on.lock().unwrap() = None;
    }

    pub fn pending_ids(&self) -> Vec<String> {
        self.pending
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.id.to_string())
            .collect()
    }

    pub fn fetches(&self) -> u32 {
        *self.fetches.lock().unwrap()
    }

    pub fn commits(&self) -> Vec<CommitCall> {
        self.commits.lock().unwrap().clone()
    }

    pub fn committed_ids(&self) -> Vec<String> {
        self.commits()
            .iter()
            .flat_map(|c| c.transcriptions.iter().map(|t| t.id.to_string()))
            .collect()
    }
}

#[async_trait]
impl RecordStore for FakeStore {
    async fn fetch_unprocessed(&self, page_size: usize) -> Result<Vec<Record>> {
        let fetch = {
            let mut fetches = self.fetches.lock().unwrap();
            *fetches += 1;
            *fetches
        };
        if *self.fail_fetch_on.lock().unwrap() == Some(fetch) {
            return Err(SyncError::rejected(Upstream::Database, 500, "boom"));
        }

        let pending = self.pending.lock().unwrap();
        Ok(pending.iter().take(page_size).cloned().collect())
    }

    async fn commit_transcriptions(
        &self,
        annotator_id: &str,
        transcriptions: &[Transcription],
    ) -> Result<CommitAck> {
        let attempt = {
            let mut attempts = self.commit_attempts.lock().unwrap();
            *attempts += 1;
            *attempts
        };
        if *self.fail_commit_on.lock().unwrap() == Some(attempt) {
            return Err(SyncError::rejected(Upstream::Database, 500, "write failed"));
        }

        let written: HashSet<_> = transcriptions.iter().map(|t| t.id.clone()).collect();
        self.pending
            .lock()
            .unwrap()
            .retain(|r| !written.contains(&r.id));
        self.commits.lock().unwrap().push(CommitCall {
            annotator_id: annotator_id.to_string(),
            transcriptions: transcriptions.to_vec(),
        });

        let status = self.commit_status.lock().unwrap().unwrap_or(204);
        Ok(CommitAck::new(status))
    }
}

/// Recognizer transcribing every image as `text:<id>`, optionally omitting some
#[derive(Debug, Default)]
pub struct FakeRecognizer {
    omit: HashSet<String>,
    requests: Mutex<Vec<RecognitionRequest>>,
    fail: bool,
}

impl FakeRecognizer {
    pub fn omitting(ids: &[&str]) -> Self {
        Self {
            omit: ids.iter().map(|id| id.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn unreachable() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<RecognitionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Recognizer for FakeRecognizer {
    async fn recognize(&self, request: &RecognitionRequest) -> Result<RecognitionResult> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(SyncError::unavailable(
                Upstream::Recognizer,
                "connection refused",
            ));
        }

        Ok(RecognitionResult {
            transcriptions: request
                .items
                .iter()
                .filter(|item| !self.omit.contains(item.id.as_str()))
                .map(|item| Transcription::new(item.id.clone(), format!("text:{}", item.id)))
                .collect(),
        })
    }
}

/// Driver over the fakes with an open gate
pub fn open_driver(
    store: Arc<FakeStore>,
    recognizer: Arc<FakeRecognizer>,
    page_size: usize,
) -> SyncDriver {
    SyncDriver::from_config(
        &test_config(page_size),
        store,
        recognizer,
        Arc::new(OpenGate),
    )
    .unwrap()
}
