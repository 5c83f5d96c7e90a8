use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use super::render;
use crate::error::JenkinsError;
use crate::jenkins::helpers::DEFAULT_BRANCH;
use crate::jenkins::JenkinsClient;

/// The Jenkins operations served to the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    GetJobStatus,
    StartJob,
    StopJob,
    GetBuildSteps,
    GetNodeStatus,
    GetPendingActions,
    SubmitInputAction,
    GetCoverageReport,
    GetCoverageLines,
    GetCoveragePaths,
    GetGitBranches,
}

pub const TOOLS: [Tool; 11] = [
    Tool::GetJobStatus,
    Tool::StartJob,
    Tool::StopJob,
    Tool::GetBuildSteps,
    Tool::GetNodeStatus,
    Tool::GetPendingActions,
    Tool::SubmitInputAction,
    Tool::GetCoverageReport,
    Tool::GetCoverageLines,
    Tool::GetCoveragePaths,
    Tool::GetGitBranches,
];

impl Tool {
    pub fn name(self) -> &'static str {
        match self {
            Self::GetJobStatus => "jenkins_get_job_status",
            Self::StartJob => "jenkins_start_job",
            Self::StopJob => "jenkins_stop_job",
            Self::GetBuildSteps => "jenkins_get_build_steps",
            Self::GetNodeStatus => "jenkins_get_node_status",
            Self::GetPendingActions => "jenkins_get_pending_actions",
            Self::SubmitInputAction => "jenkins_submit_input_action",
            Self::GetCoverageReport => "jenkins_get_coverage_report",
            Self::GetCoverageLines => "jenkins_get_coverage_lines",
            Self::GetCoveragePaths => "jenkins_get_coverage_paths",
            Self::GetGitBranches => "jenkins_get_git_branches",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        TOOLS.into_iter().find(|tool| tool.name() == name)
    }

    fn description(self) -> &'static str {
        match self {
            Self::GetJobStatus => "Get the status of a Jenkins job",
            Self::StartJob => "Start a Jenkins job for a specific Git branch",
            Self::StopJob => "Stop a running Jenkins build",
            Self::GetBuildSteps => "Get the stage/step status of a specific build",
            Self::GetNodeStatus => "Get the status of a specific node of a build",
            Self::GetPendingActions => "Get the pending input actions of a build",
            Self::SubmitInputAction => "Submit an input action to Jenkins (approve/abort)",
            Self::GetCoverageReport => "Get the code coverage report of a build",
            Self::GetCoverageLines => "Get the coverage details of a specific file",
            Self::GetCoveragePaths => "List every file path with coverage data",
            Self::GetGitBranches => "List the Git branches available to a job",
        }
    }

    fn input_schema(self) -> Value {
        let app = json!({"type": "string", "description": "Application (job) name"});
        let branch = json!({"type": "string", "description": "Git branch (default: main)"});
        let build_number = json!({"type": "integer", "minimum": 0, "description": "Build number"});

        let (properties, required) = match self {
            Self::GetJobStatus => (json!({"app": app, "branch": branch}), vec!["app"]),
            Self::StartJob => (
                json!({"app": app, "branch": {"type": "string", "description": "Git branch to build"}}),
                vec!["app", "branch"],
            ),
            Self::StopJob | Self::GetBuildSteps | Self::GetPendingActions | Self::GetCoveragePaths => (
                json!({"app": app, "buildNumber": build_number, "branch": branch}),
                vec!["app", "buildNumber"],
            ),
            Self::GetNodeStatus => (
                json!({
                    "app": app,
                    "buildNumber": build_number,
                    "nodeId": {"type": "string", "description": "Flow node id"},
                    "branch": branch
                }),
                vec!["app", "buildNumber", "nodeId"],
            ),
            Self::SubmitInputAction => (
                json!({"decisionUrl": {
                    "type": "string",
                    "description": "Decision URL (proceedUrl or abortUrl)"
                }}),
                vec!["decisionUrl"],
            ),
            Self::GetCoverageReport => (
                json!({
                    "app": app,
                    "buildNumber": build_number,
                    "packageName": {"type": "string", "description": "Only files whose path contains this package"},
                    "className": {"type": "string", "description": "Only files whose path contains this class"},
                    "branch": branch
                }),
                vec!["app", "buildNumber"],
            ),
            Self::GetCoverageLines => (
                json!({
                    "app": app,
                    "buildNumber": build_number,
                    "path": {"type": "string", "description": "File path (substring match)"},
                    "branch": branch
                }),
                vec!["app", "buildNumber", "path"],
            ),
            Self::GetGitBranches => (json!({"app": app}), vec!["app"]),
        };

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false
        })
    }

    pub fn definition(self) -> Value {
        json!({
            "name": self.name(),
            "description": self.description(),
            "inputSchema": self.input_schema()
        })
    }
}

pub fn tool_definitions() -> Vec<Value> {
    TOOLS.into_iter().map(Tool::definition).collect()
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct JobArgs {
    app: String,
    #[serde(default = "default_branch")]
    branch: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct StartJobArgs {
    app: String,
    branch: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct BuildArgs {
    app: String,
    build_number: u64,
    #[serde(default = "default_branch")]
    branch: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct NodeArgs {
    app: String,
    build_number: u64,
    node_id: String,
    #[serde(default = "default_branch")]
    branch: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct DecisionArgs {
    decision_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct CoverageArgs {
    app: String,
    build_number: u64,
    #[serde(default)]
    package_name: Option<String>,
    #[serde(default)]
    class_name: Option<String>,
    #[serde(default = "default_branch")]
    branch: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct CoverageLinesArgs {
    app: String,
    build_number: u64,
    path: String,
    #[serde(default = "default_branch")]
    branch: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct BranchesArgs {
    app: String,
}

#[derive(Error, Debug)]
enum ToolError {
    #[error("Invalid arguments: {0}")]
    Arguments(#[from] serde_json::Error),

    #[error(transparent)]
    Jenkins(#[from] JenkinsError),
}

fn parse<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    Ok(serde_json::from_value(args)?)
}

/// Text payload of a `tools/call` result.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutput {
    fn success(text: String) -> Self {
        Self {
            text,
            is_error: false,
        }
    }

    fn error(message: impl std::fmt::Display) -> Self {
        Self {
            text: format!("❌ **Error:** {message}"),
            is_error: true,
        }
    }

    pub fn to_result(&self) -> Value {
        json!({
            "content": [{ "type": "text", "text": self.text }],
            "isError": self.is_error
        })
    }
}

/// Run one tool. Failures come back as error output, never as a fault.
pub async fn call_tool(client: &JenkinsClient, name: &str, args: Value) -> ToolOutput {
    let Some(tool) = Tool::from_name(name) else {
        warn!("Unknown tool requested: {name}");
        return ToolOutput::error(format!("Unknown tool: {name}"));
    };

    info!("Calling {}", tool.name());
    match run(client, tool, args).await {
        Ok(text) => ToolOutput::success(text),
        Err(err) => {
            match &err {
                ToolError::Jenkins(e) => match e.status() {
                    Some(status) => warn!("{} failed with HTTP {status}: {err}", tool.name()),
                    None => warn!("{} failed: {err}", tool.name()),
                },
                ToolError::Arguments(_) => warn!("{} rejected: {err}", tool.name()),
            }
            ToolOutput::error(err)
        }
    }
}

async fn run(client: &JenkinsClient, tool: Tool, args: Value) -> Result<String, ToolError> {
    let text = match tool {
        Tool::GetJobStatus => {
            let args: JobArgs = parse(args)?;
            let status = client.get_job_status(&args.app, &args.branch).await?;
            render::job_status(&status)
        }
        Tool::StartJob => {
            let args: StartJobArgs = parse(args)?;
            let message = client.start_job(&args.app, &args.branch).await?;
            format!("🚀 **{message}**")
        }
        Tool::StopJob => {
            let args: BuildArgs = parse(args)?;
            let message = client
                .stop_job(&args.app, args.build_number, &args.branch)
                .await?;
            format!("🛑 **{message}**")
        }
        Tool::GetBuildSteps => {
            let args: BuildArgs = parse(args)?;
            let steps = client
                .get_job_steps_status(&args.app, args.build_number, &args.branch)
                .await?;
            render::build_steps(&args.app, args.build_number, &steps)
        }
        Tool::GetNodeStatus => {
            let args: NodeArgs = parse(args)?;
            let state = client
                .get_node_status(&args.app, args.build_number, &args.node_id, &args.branch)
                .await?;
            render::node_state(&args.node_id, &state)
        }
        Tool::GetPendingActions => {
            let args: BuildArgs = parse(args)?;
            let action = client
                .get_pending_input_actions(&args.app, args.build_number, &args.branch)
                .await?;
            render::pending_actions(args.build_number, &action)
        }
        Tool::SubmitInputAction => {
            let args: DecisionArgs = parse(args)?;
            let message = client.submit_input_action(&args.decision_url).await?;
            format!("✅ **{message}**")
        }
        Tool::GetCoverageReport => {
            let args: CoverageArgs = parse(args)?;
            let outcome = client
                .get_coverage_report(
                    &args.app,
                    args.build_number,
                    args.package_name.as_deref(),
                    args.class_name.as_deref(),
                    &args.branch,
                )
                .await?;
            render::coverage(args.build_number, &outcome)
        }
        Tool::GetCoverageLines => {
            let args: CoverageLinesArgs = parse(args)?;
            let file = client
                .get_coverage_report_lines(&args.app, args.build_number, &args.path, &args.branch)
                .await?;
            render::file_coverage(&args.path, &file)
        }
        Tool::GetCoveragePaths => {
            let args: BuildArgs = parse(args)?;
            let paths = client
                .get_coverage_report_paths(&args.app, args.build_number, &args.branch)
                .await?;
            render::coverage_paths(args.build_number, &paths)
        }
        Tool::GetGitBranches => {
            let args: BranchesArgs = parse(args)?;
            let branches = client.get_git_branches(&args.app).await?;
            render::git_branches(&args.app, &branches)
        }
    };

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_tool_has_a_unique_name() {
        let names: Vec<&str> = TOOLS.iter().map(|tool| tool.name()).collect();
        let mut deduped = names.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(deduped.len(), 11);

        for name in names {
            assert_eq!(Tool::from_name(name).map(Tool::name), Some(name));
        }
        assert_eq!(Tool::from_name("jenkins_delete_job"), None);
    }

    #[test]
    fn test_schemas_list_required_fields() {
        let definition = Tool::GetNodeStatus.definition();
        assert_eq!(definition["name"], "jenkins_get_node_status");
        assert_eq!(
            definition["inputSchema"]["required"],
            json!(["app", "buildNumber", "nodeId"])
        );

        let coverage = Tool::GetCoverageReport.definition();
        assert!(coverage["inputSchema"]["properties"]["packageName"].is_object());
    }

    #[test]
    fn test_branch_defaults_to_main() {
        let args: BuildArgs = parse(json!({"app": "web", "buildNumber": 4})).unwrap();
        assert_eq!(args.branch, "main");
        assert_eq!(args.build_number, 4);
    }

    #[test]
    fn test_argument_errors() {
        let err = parse::<BuildArgs>(json!({"app": "web"})).unwrap_err();
        assert!(err.to_string().contains("buildNumber"));

        let err = parse::<BuildArgs>(json!({"app": "web", "buildNumber": -1})).unwrap_err();
        assert!(matches!(err, ToolError::Arguments(_)));

        assert!(parse::<JobArgs>(json!({"app": "web", "area": "x"})).is_err());
    }

    #[test]
    fn test_error_output_shape() {
        let output = ToolOutput::error("boom");
        let result = output.to_result();
        assert_eq!(result["isError"], true);
        assert_eq!(result["content"][0]["type"], "text");
        assert_eq!(result["content"][0]["text"], "❌ **Error:** boom");
    }
}
