use serde::{Deserialize, Serialize};
use std::fmt;

/// States of a single sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    /// Run created, nothing evaluated yet
    Idle,
    /// Evaluating the authorization gate (once per run)
    Authorizing,
    /// Requesting the next page of unprocessed records
    Fetching,
    /// Mapping the fetched page into a recognition request
    Transforming,
    /// Waiting for the recognizer
    Forwarding,
    /// Writing transcriptions back to the database
    Committing,
    /// Source exhausted, run succeeded
    Drained,
    /// Run stopped on an error
    Aborted,
}

impl SyncState {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Drained | Self::Aborted)
    }

    /// Check if the run is moving data in this state
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::Fetching | Self::Transforming | Self::Forwarding | Self::Committing
        )
    }

    /// Guard for the run's state machine.
    ///
    /// Any non-terminal state may abort. `Idle` may skip authorization when the
    /// trigger source does not require it.
    pub fn can_transition_to(&self, next: SyncState) -> bool {
        use SyncState::*;

        if next == Aborted {
            return !self.is_terminal();
        }

        matches!(
            (self, next),
            (Idle, Authorizing)
                | (Idle, Fetching)
                | (Authorizing, Fetching)
                | (Fetching, Transforming)
                | (Fetching, Drained)
                | (Transforming, Forwarding)
                | (Forwarding, Committing)
                | (Committing, Fetching)
                | (Committing, Drained)
        )
    }
}

impl Default for SyncState {
    fn default() -> Self {
        Self::Idle
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Authorizing => write!(f, "authorizing"),
            Self::Fetching => write!(f, "fetching"),
            Self::Transforming => write!(f, "transforming"),
            Self::Forwarding => write!(f, "forwarding"),
            Self::Committing => write!(f, "committing"),
            Self::Drained => write!(f, "drained"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

impl std::str::FromStr for SyncState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(Self::Idle),
            "authorizing" => Ok(Self::Authorizing),
            "fetching" => Ok(Self::Fetching),
            "transforming" => Ok(Self::Transforming),
            "forwarding" => Ok(Self::Forwarding),
            "committing" => Ok(Self::Committing),
            "drained" => Ok(Self::Drained),
            "aborted" => Ok(Self::Aborted),
            _ => Err(format!("Invalid sync state: {s}")),
        }
    }
}
