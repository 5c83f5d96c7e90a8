mod core;
mod coverage;
mod jobs;
mod pipeline;


pub use self::core::JenkinsClient;
pub use jobs::{start_job_form, BRANCH_PARAMETER};
