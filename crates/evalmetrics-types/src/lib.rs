pub mod event;
pub mod report;
mod util;

pub use event::*;
pub use report::*;
pub use util::count_value;

/// Literal text that precedes every embedded telemetry block in an eval log.
pub const JSON_MARKER: &str = "Full JSON:";

/// Value of the `event` field that marks a telemetry block as an eval run.
pub const EVAL_METRICS_EVENT: &str = "EVAL_METRICS";
