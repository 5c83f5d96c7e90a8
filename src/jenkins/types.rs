use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Node status that makes Jenkins wait for a human decision.
pub const PAUSED_PENDING_INPUT: &str = "PAUSED_PENDING_INPUT";

/// Summary of a job from `GET {job}/api/json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub buildable: bool,
    /// Ball color (`blue`, `red`, `blue_anime`, ...)
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub next_build_number: u64,
    #[serde(default)]
    pub builds: Vec<Build>,
    #[serde(default)]
    pub last_build: Option<Build>,
    #[serde(default)]
    pub last_completed_build: Option<Build>,
    #[serde(default)]
    pub last_failed_build: Option<Build>,
    #[serde(default)]
    pub last_stable_build: Option<Build>,
    #[serde(default)]
    pub last_successful_build: Option<Build>,
    #[serde(default)]
    pub last_unstable_build: Option<Build>,
    #[serde(default)]
    pub last_unsuccessful_build: Option<Build>,
}

/// One execution of a job. The job API only fills `number` and `url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    pub number: u64,
    pub url: String,
    #[serde(default)]
    pub building: Option<bool>,
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub estimated_duration: Option<u64>,
    /// Absent while the build is running
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Pipeline run description from `wfapi/describe`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSteps {
    pub id: String,
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub start_time_millis: i64,
    #[serde(default)]
    pub duration_millis: u64,
    #[serde(default)]
    pub stages: Vec<Stage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub id: String,
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub start_time_millis: i64,
    #[serde(default)]
    pub duration_millis: u64,
    #[serde(default)]
    pub stage_flow_nodes: Vec<StageFlowNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageFlowNode {
    pub id: String,
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub start_time_millis: i64,
    #[serde(default)]
    pub duration_millis: u64,
}

/// A single execution node from `execution/node/{id}/wfapi/describe`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStatus {
    pub id: String,
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub start_time_millis: i64,
    #[serde(default)]
    pub duration_millis: u64,
    #[serde(default)]
    pub parameter_description: Option<String>,
    #[serde(default, rename = "type")]
    pub node_type: Option<String>,
}

impl NodeStatus {
    pub fn is_pending_input(&self) -> bool {
        self.status == PAUSED_PENDING_INPUT
    }
}

/// Human approval gate from `wfapi/nextPendingInputAction`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingInputAction {
    pub id: String,
    pub proceed_url: String,
    pub abort_url: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub inputs: Option<Vec<InputParameter>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputParameter {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default_parameter_value: Option<DefaultParameterValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultParameterValue {
    pub name: String,
    #[serde(default)]
    pub value: Value,
}

/// What a node lookup resolved to.
///
/// A node paused on an `input` step is reported through its pending action
/// rather than its raw status.
#[derive(Debug, Clone)]
pub enum NodeState {
    Normal(NodeStatus),
    PendingInput(PendingInputAction),
}

/// Response of the Git Parameter plugin's `fillValueItems` endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct GitBranchList {
    #[serde(default)]
    pub values: Vec<GitBranch>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GitBranch {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_status_with_reference_builds() {
        let job: JobStatus = serde_json::from_str(
            r#"{
                "_class": "org.jenkinsci.plugins.workflow.job.WorkflowJob",
                "name": "main",
                "displayName": "main",
                "url": "https://ci/jenkins/job/web/job/main/",
                "buildable": true,
                "color": "blue",
                "nextBuildNumber": 13,
                "builds": [{"number": 12, "url": "https://ci/jenkins/job/web/job/main/12/"}],
                "lastBuild": {"number": 12, "url": "https://ci/jenkins/job/web/job/main/12/"},
                "lastFailedBuild": null
            }"#,
        )
        .unwrap();

        assert_eq!(job.next_build_number, 13);
        assert_eq!(job.last_build.as_ref().map(|b| b.number), Some(12));
        assert!(job.last_failed_build.is_none());
        assert!(job.last_build.unwrap().result.is_none());
    }

    #[test]
    fn test_node_status_type_field() {
        let node: NodeStatus = serde_json::from_str(
            r#"{"id":"21","name":"Approve","status":"PAUSED_PENDING_INPUT",
                "startTimeMillis":1,"durationMillis":2,"type":"INPUT"}"#,
        )
        .unwrap();

        assert!(node.is_pending_input());
        assert_eq!(node.node_type.as_deref(), Some("INPUT"));
    }

    #[test]
    fn test_build_steps_without_flow_nodes() {
        let steps: BuildSteps = serde_json::from_str(
            r##"{"id":"7","name":"#7","status":"IN_PROGRESS","startTimeMillis":10,
                "durationMillis":20,"stages":[{"id":"6","name":"Build","status":"SUCCESS",
                "startTimeMillis":10,"durationMillis":5}]}"##,
        )
        .unwrap();

        assert_eq!(steps.stages.len(), 1);
        assert!(steps.stages[0].stage_flow_nodes.is_empty());
    }
}
