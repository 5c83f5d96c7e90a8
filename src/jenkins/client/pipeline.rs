use log::{info, warn};
use url::Url;

use super::core::{not_found_or_wrap, JenkinsClient};
use crate::error::{JenkinsError, Result};
use crate::jenkins::helpers::{build_job_build_path, validate_app_name};
use crate::jenkins::types::{BuildSteps, NodeState, NodeStatus, PendingInputAction};

impl JenkinsClient {
    /// Stage tree of a pipeline run.
    pub async fn get_job_steps_status(
        &self,
        app: &str,
        build_number: u64,
        branch: &str,
    ) -> Result<BuildSteps> {
        Self::ensure_app(app)?;
        Self::ensure_branch(branch)?;

        let url = self.jenkins_url(&format!(
            "{}/wfapi/describe",
            build_job_build_path(app, build_number, branch)
        ));

        self.get_json(&url).await.map_err(|e| {
            not_found_or_wrap(
                e,
                "Build steps",
                "get job steps",
                format!("app: {app}, build: {build_number}, branch: {branch}"),
                &url,
            )
        })
    }

    /// Status of one flow node.
    ///
    /// A node paused on an `input` step resolves to the build's pending
    /// input action instead of its raw status.
    pub async fn get_node_status(
        &self,
        app: &str,
        build_number: u64,
        node_id: &str,
        branch: &str,
    ) -> Result<NodeState> {
        Self::ensure_app(app)?;
        Self::ensure_branch(branch)?;
        if !validate_app_name(node_id) {
            return Err(JenkinsError::InvalidArgument(format!(
                "invalid node id '{node_id}'"
            )));
        }

        let url = self.jenkins_url(&format!(
            "{}/execution/node/{node_id}/wfapi/describe",
            build_job_build_path(app, build_number, branch)
        ));

        let node: NodeStatus = self.get_json(&url).await.map_err(|e| {
            e.with_context(format!(
                "Failed to get node status for app: {app}, build: {build_number}, node: {node_id}, branch: {branch}"
            ))
        })?;

        if node.is_pending_input() {
            info!("Node {node_id} of {app} #{build_number} is waiting for input");
            let action = self
                .get_pending_input_actions(app, build_number, branch)
                .await?;
            return Ok(NodeState::PendingInput(action));
        }

        Ok(NodeState::Normal(node))
    }

    /// Next input step the build is waiting on.
    pub async fn get_pending_input_actions(
        &self,
        app: &str,
        build_number: u64,
        branch: &str,
    ) -> Result<PendingInputAction> {
        Self::ensure_app(app)?;
        Self::ensure_branch(branch)?;

        let url = self.jenkins_url(&format!(
            "{}/wfapi/nextPendingInputAction",
            build_job_build_path(app, build_number, branch)
        ));

        self.get_json(&url).await.map_err(|e| {
            e.with_context(format!(
                "Failed to get pending input actions for app: {app}, build: {build_number}, branch: {branch}"
            ))
        })
    }

    /// Approve or abort an input step by posting to its proceed/abort URL.
    ///
    /// Jenkins hands these out server-relative (`/jenkins/job/...`); those
    /// are resolved against the configured base URL.
    pub async fn submit_input_action(&self, decision_url: &str) -> Result<String> {
        let url = self.decision_url(decision_url)?;

        self.post(self.client.post(&url), &url).await.map_err(|e| {
            e.with_context(format!(
                "Failed to submit input action to URL: {decision_url}"
            ))
        })?;

        info!("Submitted input action {url}");
        Ok("Action submitted successfully".to_string())
    }

    fn decision_url(&self, decision_url: &str) -> Result<String> {
        let decision_url = decision_url.trim();
        if decision_url.is_empty() {
            return Err(JenkinsError::InvalidArgument(
                "decision URL must not be empty".to_string(),
            ));
        }

        match Url::parse(decision_url) {
            Ok(absolute) if absolute.has_host() => {
                if absolute.host_str() != self.config.url.host_str() {
                    warn!(
                        "Decision URL host {:?} differs from {}; credentials are sent there",
                        absolute.host_str(),
                        self.config.base_url()
                    );
                }
                Ok(absolute.to_string())
            }
            _ => Ok(format!(
                "{}/{}",
                self.config.base_url(),
                decision_url.trim_start_matches('/')
            )),
        }
    }
}
