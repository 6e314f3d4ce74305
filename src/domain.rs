//! Domain module - records and the per-run state that owns them
//!
//! Modern Rust module organization (Rust 2018+ style):
//! - Each module is its own file in the domain/ directory
//! - Public exports are defined here for convenience

pub mod accumulator;
pub mod clock;
pub mod record;

pub use accumulator::RunAccumulator;
pub use clock::{FixedClock, RunClock, SystemClock};
pub use record::{EXPORT_COLUMNS, Record, format_time_of_day};
