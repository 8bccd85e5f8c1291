use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::Result;
use crate::sync::traits::Recognizer;
use crate::sync::types::{RecognitionRequest, RecognitionResult, RecordId};

/// Recognizer answer, with the identifiers it left out
#[derive(Debug, Clone, PartialEq)]
pub struct Forwarded {
    pub result: RecognitionResult,
    /// Requested identifiers absent from `result`, in request order
    pub missing: Vec<RecordId>,
    /// Identifiers in `result` that were never requested
    pub unexpected: Vec<RecordId>,
}

impl Forwarded {
    pub fn is_partial(&self) -> bool {
        !self.missing.is_empty()
    }
}

/// Sends recognition requests and checks the answer against the request
#[derive(Clone)]
pub struct RecognitionForwarder {
    recognizer: Arc<dyn Recognizer>,
}

impl std::fmt::Debug for RecognitionForwarder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecognitionForwarder").finish_non_exhaustive()
    }
}

impl RecognitionForwarder {
    pub fn new(recognizer: Arc<dyn Recognizer>) -> Self {
        Self { recognizer }
    }

    /// Forward a request. Omitted identifiers are reported, never filled in.
    pub async fn forward(&self, request: &RecognitionRequest) -> Result<Forwarded> {
        let result = self.recognizer.recognize(request).await?;

        let returned = result.ids();
        let missing: Vec<RecordId> = request
            .ids()
            .filter(|id| !returned.contains(id))
            .cloned()
            .collect();

        let requested: HashSet<&RecordId> = request.ids().collect();
        let unexpected: Vec<RecordId> = result
            .transcriptions
            .iter()
            .map(|t| &t.id)
            .filter(|id| !requested.contains(id))
            .cloned()
            .collect();

        if !missing.is_empty() {
            warn!(
                requested = request.len(),
                returned = result.len(),
                missing = missing.len(),
                "⚠️ FORWARD: recognizer omitted identifiers"
            );
        }
        if !unexpected.is_empty() {
            warn!(
                unexpected = ?unexpected,
                "⚠️ FORWARD: recognizer returned identifiers that were not requested"
            );
        }

        debug!(
            requested = request.len(),
            returned = result.len(),
            "🔎 FORWARD: transcriptions received"
        );

        Ok(Forwarded {
            result,
            missing,
            unexpected,
        })
    }
}
