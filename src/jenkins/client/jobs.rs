use log::info;

use super::core::{not_found_or_wrap, JenkinsClient};
use crate::error::{JenkinsError, Result};
use crate::jenkins::helpers::{
    build_job_build_path, build_job_path, create_form_headers, sanitize_input,
};
use crate::jenkins::types::{GitBranchList, JobStatus};

/// Parameter read by the pipeline to pick the branch to build.
pub const BRANCH_PARAMETER: &str = "BRANCH_TO_BUILD";

const GIT_PARAMETER_DESCRIPTOR: &str =
    "net.uaznia.lukanus.hudson.plugins.gitparameter.GitParameterDefinition";

/// Form fields for `buildWithParameters`. The branch is sanitized first.
pub fn start_job_form(branch: &str) -> [(&'static str, String); 2] {
    [
        (BRANCH_PARAMETER, sanitize_input(branch)),
        ("delay", "0sec".to_string()),
    ]
}

impl JenkinsClient {
    /// Fetch the job summary for `app` on `branch`.
    ///
    /// # Errors
    ///
    /// `NotFound` when Jenkins answers 404, a wrapped request error otherwise.
    pub async fn get_job_status(&self, app: &str, branch: &str) -> Result<JobStatus> {
        Self::ensure_app(app)?;
        Self::ensure_branch(branch)?;

        let url = self.jenkins_url(&format!("{}/api/json", build_job_path(app, branch)));

        self.get_json(&url).await.map_err(|e| {
            not_found_or_wrap(
                e,
                "Job",
                "get job status",
                format!("app: {app}, branch: {branch}"),
                &url,
            )
        })
    }

    /// Trigger a parameterized build of `branch`.
    pub async fn start_job(&self, app: &str, branch: &str) -> Result<String> {
        Self::ensure_app(app)?;

        let form = start_job_form(branch);
        let clean_branch = form[0].1.as_str();
        if clean_branch.is_empty() {
            return Err(JenkinsError::InvalidArgument(
                "branch must not be empty".to_string(),
            ));
        }
        Self::ensure_branch(clean_branch)?;

        let url = self.jenkins_url(&format!(
            "{}/buildWithParameters",
            build_job_path(app, clean_branch)
        ));

        let request = self
            .client
            .post(&url)
            .headers(create_form_headers(&self.config)?)
            .form(&form[..]);

        self.post(request, &url).await.map_err(|e| {
            e.with_context(format!(
                "Failed to start job for app: {app}, branch: {clean_branch}"
            ))
        })?;

        info!("Started {app} on branch {clean_branch}");
        Ok(format!(
            "Job started successfully for app {app} on branch {clean_branch}"
        ))
    }

    /// Abort a running build.
    pub async fn stop_job(&self, app: &str, build_number: u64, branch: &str) -> Result<String> {
        Self::ensure_app(app)?;
        Self::ensure_branch(branch)?;

        let url = self.jenkins_url(&format!(
            "{}/stop",
            build_job_build_path(app, build_number, branch)
        ));

        self.post(self.client.post(&url), &url).await.map_err(|e| {
            e.with_context(format!(
                "Failed to stop job for app: {app}, build: {build_number}, branch: {branch}"
            ))
        })?;

        info!("Stopped {app} #{build_number} on branch {branch}");
        Ok(format!(
            "Job stopped successfully for app {app}, build {build_number}, branch {branch}"
        ))
    }

    /// List branch choices offered by the job's Git parameter.
    ///
    /// This is a job-level lookup: no branch segment in the URL.
    pub async fn get_git_branches(&self, app: &str) -> Result<Vec<String>> {
        Self::ensure_app(app)?;

        let url = self.jenkins_url(&format!(
            "/job/{app}/descriptorByName/{GIT_PARAMETER_DESCRIPTOR}/fillValueItems?param={BRANCH_PARAMETER}"
        ));

        let list: GitBranchList = self
            .get_json(&url)
            .await
            .map_err(|e| e.with_context(format!("Failed to get Git branches for app: {app}")))?;

        Ok(list.values.into_iter().map(|branch| branch.name).collect())
    }
}
