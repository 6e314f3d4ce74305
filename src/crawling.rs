//! # Crawling
//!
//! Run lifecycle and the orchestrator that drives it.
//! - Explicit module declarations (no mod.rs)
//! - Collaborators injected through traits so runs are testable offline

pub mod orchestrator;
pub mod state;

pub use orchestrator::{CrawlOrchestrator, OrchestratorConfig};
pub use state::{RunOutcome, RunState, RunSummary};
