//! # Run State
//!
//! Lifecycle of a single crawl run and the values it finishes with.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a run currently is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Init,
    FetchingIndex,
    ExtractingLinks,
    /// Detail units spawned; `outstanding` counts those not yet resolved
    FetchingDetails { outstanding: usize },
    Done,
    /// Index fetch failed; nothing was exported
    Halted,
}

impl RunState {
    /// `Done` and `Halted` are terminal
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Halted)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => f.write_str("Init"),
            Self::FetchingIndex => f.write_str("FetchingIndex"),
            Self::ExtractingLinks => f.write_str("ExtractingLinks"),
            Self::FetchingDetails { outstanding } => write!(f, "FetchingDetails({outstanding} outstanding)"),
            Self::Done => f.write_str("Done"),
            Self::Halted => f.write_str("Halted"),
        }
    }
}

/// Totals for a run that reached `Done`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    /// Detail URLs scheduled after resolution and de-duplication
    pub links_found: usize,
    /// Rows in the final artifact
    pub records_exported: usize,
    /// Entries written to the failure log
    pub failures: usize,
    /// `None` when the final export failed
    pub artifact: Option<PathBuf>,
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(RunSummary),
    Halted { run_id: Uuid, reason: String },
}

impl RunOutcome {
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub const fn run_id(&self) -> Uuid {
        match self {
            Self::Completed(summary) => summary.run_id,
            Self::Halted { run_id, .. } => *run_id,
        }
    }
}
