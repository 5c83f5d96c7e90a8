//! Markdown text returned to the assistant for each tool.

use crate::jenkins::coverage::CoverageMetric;
use crate::jenkins::helpers::{format_duration, format_timestamp};
use crate::jenkins::{
    BuildSteps, CoverageOutcome, FileCoverage, JobStatus, NodeState, PendingInputAction,
};

const MAX_LISTED_PATHS: usize = 20;
const MAX_LISTED_BRANCHES: usize = 15;

pub fn job_status(status: &JobStatus) -> String {
    let name = status.display_name.as_deref().unwrap_or(&status.name);
    let mut text = format!(
        "🔧 **Job Status: {name}**\n\n\
         **URL:** {}\n\
         **Status:** {}\n\
         **Buildable:** {}\n\
         **Next build:** #{}\n\n",
        status.url,
        status.color.as_deref().unwrap_or("unknown"),
        if status.buildable { "✅" } else { "❌" },
        status.next_build_number,
    );

    match &status.last_build {
        Some(build) => text.push_str(&format!(
            "**Last build:** #{}\n\
             **Result:** {}\n\
             **Duration:** {}\n\
             **Timestamp:** {}",
            build.number,
            build.result.as_deref().unwrap_or("In progress"),
            format_duration(build.duration.unwrap_or(0)),
            format_timestamp(build.timestamp.unwrap_or(0)),
        )),
        None => text.push_str("No previous builds"),
    }

    text
}

pub fn build_steps(app: &str, build_number: u64, steps: &BuildSteps) -> String {
    let stages = steps
        .stages
        .iter()
        .map(|stage| {
            format!(
                "- **{}** ({}) - {}",
                stage.name,
                stage.status,
                format_duration(stage.duration_millis)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "📋 **Build #{build_number} Steps - {app}**\n\n\
         **ID:** {}\n\
         **Name:** {}\n\
         **Status:** {}\n\
         **Duration:** {}\n\
         **Started:** {}\n\n\
         **Stages ({}):**\n{stages}",
        steps.id,
        steps.name,
        steps.status,
        format_duration(steps.duration_millis),
        format_timestamp(steps.start_time_millis),
        steps.stages.len(),
    )
}

pub fn node_state(node_id: &str, state: &NodeState) -> String {
    match state {
        NodeState::PendingInput(action) => {
            let mut text = format!(
                "⏸️ **Node Waiting For Input - {node_id}**\n\n\
                 **ID:** {}\n\
                 **Proceed URL:** {}\n\
                 **Abort URL:** {}",
                action.id, action.proceed_url, action.abort_url
            );
            if let Some(message) = &action.message {
                text.push_str(&format!("\n**Message:** {message}"));
            }
            text
        }
        NodeState::Normal(node) => {
            let mut text = format!(
                "🔍 **Node Status: {node_id}**\n\n\
                 **Name:** {}\n\
                 **Status:** {}\n\
                 **Duration:** {}\n\
                 **Started:** {}",
                node.name,
                node.status,
                format_duration(node.duration_millis),
                format_timestamp(node.start_time_millis),
            );
            if let Some(description) = &node.parameter_description {
                text.push_str(&format!("\n**Parameters:** {description}"));
            }
            text
        }
    }
}

pub fn pending_actions(build_number: u64, action: &PendingInputAction) -> String {
    let mut text = format!(
        "⏳ **Pending Actions - Build #{build_number}**\n\n\
         **ID:** {}\n\
         **Proceed URL:** {}\n\
         **Abort URL:** {}\n",
        action.id, action.proceed_url, action.abort_url
    );

    if let Some(message) = &action.message {
        text.push_str(&format!("**Message:** {message}\n"));
    }

    if let Some(inputs) = &action.inputs {
        text.push_str("\n**Required inputs:**\n");
        let lines = inputs
            .iter()
            .map(|input| {
                let description = input.description.as_deref().unwrap_or("No description");
                match &input.default_parameter_value {
                    Some(default) => {
                        format!("- {}: {description} (default: {})", input.name, default.value)
                    }
                    None => format!("- {}: {description}", input.name),
                }
            })
            .collect::<Vec<_>>();
        text.push_str(&lines.join("\n"));
    }

    text
}

fn metric_line(label: &str, metric: &CoverageMetric) -> String {
    format!(
        "**{label}:** {:.2}% ({}/{})",
        metric.percentage, metric.covered, metric.total
    )
}

fn summary_line(label: &str, total: usize, uncovered: usize, percentage: f64) -> String {
    let covered = total.saturating_sub(uncovered);
    if total == 0 {
        format!("**{label}:** 0% ({covered}/{total})")
    } else {
        format!("**{label}:** {percentage:.2}% ({covered}/{total})")
    }
}

pub fn coverage(build_number: u64, outcome: &CoverageOutcome) -> String {
    match outcome {
        CoverageOutcome::Jacoco(report) => {
            let mut text = format!("📊 **Coverage Report - Build #{build_number}**\n\n");
            if !report.processed {
                text.push_str(&format!(
                    "⚠️ A JaCoCo execution file was found ({} bytes) but it is not decoded; \
                     the figures below are placeholders, not measured coverage.\n\n",
                    report.exec_size_bytes
                ));
            }
            text.push_str(
                &[
                    metric_line("Instructions", &report.instruction_coverage),
                    metric_line("Branches", &report.branch_coverage),
                    metric_line("Lines", &report.line_coverage),
                ]
                .join("\n"),
            );
            text
        }
        CoverageOutcome::Istanbul(summary) => format!(
            "📊 **Coverage Summary - Build #{build_number}**\n\n{}\n{}\n{}",
            summary_line(
                "Statements",
                summary.statements,
                summary.uncovered_statements,
                summary.statement_percentage()
            ),
            summary_line(
                "Functions",
                summary.functions,
                summary.uncovered_functions,
                summary.function_percentage()
            ),
            summary_line(
                "Branches",
                summary.branches,
                summary.uncovered_branches,
                summary.branch_percentage()
            ),
        ),
    }
}

pub fn file_coverage(path: &str, file: &FileCoverage) -> String {
    format!(
        "📄 **File Coverage: {path}**\n\n\
         **Statements:** {}\n\
         **Functions:** {}\n\
         **Branches:** {}\n\n\
         **Covered statements:** {}/{}\n\
         **Covered functions:** {}/{}\n\
         **Covered branch paths:** {}/{}",
        file.statement_map.len(),
        file.fn_map.len(),
        file.branch_map.len(),
        file.covered_statements(),
        file.s.len(),
        file.covered_functions(),
        file.f.len(),
        file.covered_branch_paths(),
        file.branch_paths(),
    )
}

fn numbered_list(items: &[String], limit: usize, noun: &str) -> String {
    let mut text = items
        .iter()
        .take(limit)
        .enumerate()
        .map(|(index, item)| format!("{}. {item}", index + 1))
        .collect::<Vec<_>>()
        .join("\n");

    if items.len() > limit {
        text.push_str(&format!("\n\n... and {} more {noun}", items.len() - limit));
    }
    text
}

pub fn coverage_paths(build_number: u64, paths: &[String]) -> String {
    format!(
        "📂 **Coverage Paths - Build #{build_number}**\n\n**Total files:** {}\n\n{}",
        paths.len(),
        numbered_list(paths, MAX_LISTED_PATHS, "files")
    )
}

pub fn git_branches(app: &str, branches: &[String]) -> String {
    format!(
        "🌿 **Available Git Branches - {app}**\n\n**Total branches:** {}\n\n{}",
        branches.len(),
        numbered_list(branches, MAX_LISTED_BRANCHES, "branches")
    )
}
