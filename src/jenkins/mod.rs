pub mod client;
pub mod coverage;
pub mod helpers;
pub mod types;

pub use client::JenkinsClient;
pub use coverage::{CoverageOutcome, FileCoverage};
pub use types::{BuildSteps, JobStatus, NodeState, PendingInputAction};
