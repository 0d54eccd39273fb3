//! Run events - what a background run reports to its control surface

mod run_event;

pub use run_event::{FatalReason, Notice, NoticeKind, Progress, RunEnd, RunEvent, RunOutcome};
