//! # Sync Driver
//!
//! Composes the four leaves into the batch loop:
//!
//! ```text
//! Idle -> Authorizing -> Fetching -> Transforming -> Forwarding -> Committing
//!                           ^                                          |
//!                           +------------- full page -----------------+
//!                                                                      |
//!                      Fetching (empty page) / Committing (short page) -> Drained
//!                                         any error from a non-terminal state -> Aborted
//! ```
//!
//! A full page means more records may remain, so the loop fetches again; a
//! short or empty page ends the run. When the number of records is an exact
//! multiple of the page size this costs one extra, empty fetch.
//!
//! Batches already committed stay committed when a later step fails. The
//! database's own unprocessed flag drives selection, so re-triggering resumes
//! where the failed run stopped.
//!
//! A page made only of records already fetched earlier in the same run means
//! nothing moved since then (the recognizer keeps omitting them, or the
//! database did not clear them). The run then ends as drained with a
//! [`SyncWarning::Stalled`] instead of refetching, so every turn must bring at
//! least one new record and a run is bounded by the size of the queue.
//!
//! Runs are not coordinated with each other: callers must not start a second
//! run while one is in flight, or both will fetch from the same pool.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::auth::{AuthorizationGate, Credentials, Grant};
use crate::config::BridgeConfig;
use crate::error::{Result, SyncError, SyncWarning};
use crate::logging::log_sync_operation;
use crate::sync::committer::ResultCommitter;
use crate::sync::fetcher::BatchFetcher;
use crate::sync::forwarder::RecognitionForwarder;
use crate::sync::state::SyncState;
use crate::sync::traits::{RecordStore, Recognizer, EXPECTED_COMMIT_STATUS};
use crate::sync::transformer::BatchTransformer;
use crate::sync::types::RecordId;

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
    Drained,
    Aborted { error: SyncError },
}

impl SyncOutcome {
    pub fn is_drained(&self) -> bool {
        matches!(self, Self::Drained)
    }

    pub fn error(&self) -> Option<&SyncError> {
        match self {
            Self::Drained => None,
            Self::Aborted { error } => Some(error),
        }
    }
}

/// In-flight state of one run
#[derive(Debug)]
pub struct SyncRun {
    run_id: Uuid,
    state: SyncState,
    grant: Option<Grant>,
    iterations: u32,
    batches_committed: u32,
    records_fetched: usize,
    records_committed: usize,
    warnings: Vec<SyncWarning>,
    /// Every identifier fetched so far
    seen: HashSet<RecordId>,
    started_at: DateTime<Utc>,
}

impl SyncRun {
    fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            state: SyncState::Idle,
            grant: None,
            iterations: 0,
            batches_committed: 0,
            records_fetched: 0,
            records_committed: 0,
            warnings: Vec::new(),
            seen: HashSet::new(),
            started_at: Utc::now(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn grant(&self) -> Option<&Grant> {
        self.grant.as_ref()
    }

    fn transition(&mut self, next: SyncState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            error!(
                run_id = %self.run_id,
                from = %self.state,
                to = %next,
                "Illegal sync state transition"
            );
            return Err(SyncError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        debug!(
            run_id = %self.run_id,
            from = %self.state,
            to = %next,
            iteration = self.iterations,
            "Sync state transition"
        );
        self.state = next;
        Ok(())
    }
}

/// Final account of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub run_id: Uuid,
    pub final_state: SyncState,
    #[serde(flatten)]
    pub outcome: SyncOutcome,
    /// Number of fetches issued
    pub iterations: u32,
    pub batches_committed: u32,
    pub records_fetched: usize,
    pub records_committed: usize,
    pub warnings: Vec<SyncWarning>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SyncReport {
    pub fn is_drained(&self) -> bool {
        self.outcome.is_drained()
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

/// Runs the fetch, transform, forward, commit loop
pub struct SyncDriver {
    gate: Arc<dyn AuthorizationGate>,
    fetcher: BatchFetcher,
    transformer: BatchTransformer,
    forwarder: RecognitionForwarder,
    committer: ResultCommitter,
}

impl std::fmt::Debug for SyncDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncDriver")
            .field("fetcher", &self.fetcher)
            .field("transformer", &self.transformer)
            .field("committer", &self.committer)
            .finish_non_exhaustive()
    }
}

impl SyncDriver {
    pub fn new(
        gate: Arc<dyn AuthorizationGate>,
        fetcher: BatchFetcher,
        transformer: BatchTransformer,
        forwarder: RecognitionForwarder,
        committer: ResultCommitter,
    ) -> Self {
        Self {
            gate,
            fetcher,
            transformer,
            forwarder,
            committer,
        }
    }

    /// Wire a driver from configuration and collaborators
    pub fn from_config(
        config: &BridgeConfig,
        store: Arc<dyn RecordStore>,
        recognizer: Arc<dyn Recognizer>,
        gate: Arc<dyn AuthorizationGate>,
    ) -> Result<Self> {
        let fetcher = BatchFetcher::new(store.clone(), config.sync.page_size)?;
        let transformer = BatchTransformer::new(config.file_server_url.clone());
        let forwarder = RecognitionForwarder::new(recognizer);
        let committer = ResultCommitter::new(store, config.sync.annotator_id.clone());

        Ok(Self::new(gate, fetcher, transformer, forwarder, committer))
    }

    pub fn page_size(&self) -> usize {
        self.fetcher.page_size()
    }

    /// Evaluate the gate once and return a run ready to execute.
    ///
    /// A denied run is logged as aborted and its error returned; no data is
    /// fetched.
    pub async fn prepare(&self, credentials: &Credentials) -> Result<SyncRun> {
        let mut run = SyncRun::new();

        match self.authorize(&mut run, credentials).await {
            Ok(()) => Ok(run),
            Err(error) => {
                self.finish(run, Err(error.clone()));
                Err(error)
            }
        }
    }

    /// A run for trigger sources that do not require authorization
    pub fn prepare_unguarded(&self) -> SyncRun {
        let run = SyncRun::new();
        debug!(run_id = %run.run_id, "Sync run prepared without authorization");
        run
    }

    /// Drive a prepared run to a terminal state
    pub async fn execute(&self, mut run: SyncRun) -> SyncReport {
        log_sync_operation(
            "run_started",
            &run.run_id,
            run.state,
            run.iterations,
            "started",
            Some(&format!("page_size={}", self.fetcher.page_size())),
        );

        let result = self.drive(&mut run).await;
        self.finish(run, result)
    }

    /// Authorize and execute in one call
    pub async fn run(&self, credentials: &Credentials) -> SyncReport {
        let mut run = SyncRun::new();
        if let Err(error) = self.authorize(&mut run, credentials).await {
            return self.finish(run, Err(error));
        }
        self.execute(run).await
    }

    async fn authorize(&self, run: &mut SyncRun, credentials: &Credentials) -> Result<()> {
        run.transition(SyncState::Authorizing)?;

        let grant = self.gate.authorize(credentials).await.map_err(|e| {
            warn!(
                run_id = %run.run_id,
                credentials = credentials.kind(),
                error = %e,
                "🚫 SYNC: run denied"
            );
            e
        })?;

        info!(
            run_id = %run.run_id,
            principal = %grant.principal,
            role = %grant.role,
            "Sync run authorized"
        );
        run.grant = Some(grant);
        Ok(())
    }

    async fn drive(&self, run: &mut SyncRun) -> Result<()> {
        loop {
            run.transition(SyncState::Fetching)?;
            run.iterations += 1;
            info!(run_id = %run.run_id, iteration = run.iterations, "🔄 SYNC: turn started");

            let batch = self.fetcher.fetch().await?;
            run.records_fetched += batch.len();

            if batch.is_empty() {
                info!(
                    run_id = %run.run_id,
                    iteration = run.iterations,
                    "No more images to send to recognizer"
                );
                return run.transition(SyncState::Drained);
            }

            let mut fresh = 0;
            for record in batch.records() {
                if run.seen.insert(record.id.clone()) {
                    fresh += 1;
                }
            }
            if fresh == 0 {
                let unprocessed: Vec<RecordId> =
                    batch.records().iter().map(|r| r.id.clone()).collect();
                warn!(
                    run_id = %run.run_id,
                    iteration = run.iterations,
                    unprocessed = unprocessed.len(),
                    "⚠️ SYNC: page holds only records already sent this run, stopping"
                );
                run.warnings.push(SyncWarning::Stalled {
                    iteration: run.iterations,
                    unprocessed,
                });
                return run.transition(SyncState::Drained);
            }

            run.transition(SyncState::Transforming)?;
            let request = self.transformer.transform(&batch);

            run.transition(SyncState::Forwarding)?;
            let forwarded = self.forwarder.forward(&request).await?;
            if forwarded.is_partial() {
                run.warnings.push(SyncWarning::PartialResult {
                    iteration: run.iterations,
                    missing: forwarded.missing.clone(),
                });
            }

            run.transition(SyncState::Committing)?;
            if forwarded.result.is_empty() {
                warn!(
                    run_id = %run.run_id,
                    iteration = run.iterations,
                    "Recognizer returned no transcriptions, nothing to commit"
                );
            } else {
                let ack = self.committer.commit(&forwarded.result).await?;
                if !ack.is_expected() {
                    run.warnings.push(SyncWarning::CommitStatusDiscrepancy {
                        iteration: run.iterations,
                        status: ack.status,
                        expected: EXPECTED_COMMIT_STATUS,
                    });
                }
                run.batches_committed += 1;
                run.records_committed += forwarded.result.len();
            }

            log_sync_operation(
                "batch_committed",
                &run.run_id,
                run.state,
                run.iterations,
                "ok",
                Some(&format!(
                    "fetched={} committed={}",
                    batch.len(),
                    forwarded.result.len()
                )),
            );

            if !batch.is_full() {
                return run.transition(SyncState::Drained);
            }
        }
    }

    fn finish(&self, mut run: SyncRun, result: Result<()>) -> SyncReport {
        let outcome = match result {
            Ok(()) => SyncOutcome::Drained,
            Err(error) => {
                if run.state.can_transition_to(SyncState::Aborted) {
                    run.state = SyncState::Aborted;
                }
                SyncOutcome::Aborted { error }
            }
        };

        let report = SyncReport {
            run_id: run.run_id,
            final_state: run.state,
            outcome,
            iterations: run.iterations,
            batches_committed: run.batches_committed,
            records_fetched: run.records_fetched,
            records_committed: run.records_committed,
            warnings: run.warnings,
            started_at: run.started_at,
            finished_at: Utc::now(),
        };

        match report.outcome.error() {
            None => info!(
                run_id = %report.run_id,
                iterations = report.iterations,
                records_committed = report.records_committed,
                warnings = report.warnings.len(),
                duration_ms = report.duration_ms(),
                "✅ SYNC: run drained"
            ),
            Some(error) => error!(
                run_id = %report.run_id,
                error_kind = error.kind(),
                error = %error,
                retryable = error.is_retryable(),
                iterations = report.iterations,
                records_committed = report.records_committed,
                "❌ SYNC: run aborted"
            ),
        }

        report
    }
}
