use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{Cursor, Read};

use crate::error::{JenkinsError, RequestError};

/// Istanbul JSON report inside the coverage archive.
pub const ISTANBUL_REPORT: &str = "coverage-final.json";

/// Per-file instrumentation maps, keyed by file path, in report order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoverageReportFront {
    pub files: IndexMap<String, FileCoverage>,
}

/// One file's Istanbul record. A hit count of zero marks an uncovered site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileCoverage {
    pub path: String,
    #[serde(default)]
    pub statement_map: IndexMap<String, Value>,
    #[serde(default)]
    pub fn_map: IndexMap<String, Value>,
    #[serde(default)]
    pub branch_map: IndexMap<String, Value>,
    #[serde(default)]
    pub s: IndexMap<String, u64>,
    #[serde(default)]
    pub f: IndexMap<String, u64>,
    #[serde(default)]
    pub b: IndexMap<String, Vec<u64>>,
}

impl FileCoverage {
    pub fn covered_statements(&self) -> usize {
        self.s.values().filter(|&&hits| hits > 0).count()
    }

    pub fn covered_functions(&self) -> usize {
        self.f.values().filter(|&&hits| hits > 0).count()
    }

    pub fn covered_branch_paths(&self) -> usize {
        self.b.values().flatten().filter(|&&hits| hits > 0).count()
    }

    pub fn branch_paths(&self) -> usize {
        self.b.values().map(Vec::len).sum()
    }
}

/// Totals summed over the files selected by a [`CoverageFilter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageSummary {
    pub statements: usize,
    pub functions: usize,
    pub branches: usize,
    pub uncovered_statements: usize,
    pub uncovered_functions: usize,
    pub uncovered_branches: usize,
}

/// Percentage of covered items, or 0 when there is nothing to cover.
///
/// Branch totals count `branchMap` entries while uncovered branches count
/// flattened paths, so `uncovered` can exceed `total`. The covered count
/// saturates at 0 in that case and the percentage reads 0.
pub fn covered_percentage(total: usize, uncovered: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let ratio = total.saturating_sub(uncovered) as f64 / total as f64;
    ratio * 100.0
}

impl CoverageSummary {
    pub fn statement_percentage(&self) -> f64 {
        covered_percentage(self.statements, self.uncovered_statements)
    }

    pub fn function_percentage(&self) -> f64 {
        covered_percentage(self.functions, self.uncovered_functions)
    }

    pub fn branch_percentage(&self) -> f64 {
        covered_percentage(self.branches, self.uncovered_branches)
    }

    fn add(&mut self, file: &FileCoverage) {
        self.statements += file.statement_map.len();
        self.functions += file.fn_map.len();
        self.branches += file.branch_map.len();

        self.uncovered_statements += file.s.values().filter(|&&hits| hits == 0).count();
        self.uncovered_functions += file.f.values().filter(|&&hits| hits == 0).count();
        self.uncovered_branches += file.b.values().flatten().filter(|&&hits| hits == 0).count();
    }
}

/// Path-substring selection for summaries. Empty filter selects every file.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoverageFilter<'a> {
    pub package_name: Option<&'a str>,
    pub class_name: Option<&'a str>,
}

impl CoverageFilter<'_> {
    pub fn matches(&self, path: &str) -> bool {
        self.package_name.map_or(true, |pkg| path.contains(pkg))
            && self.class_name.map_or(true, |class| path.contains(class))
    }
}

impl CoverageReportFront {
    pub fn summarize(&self, filter: CoverageFilter<'_>) -> CoverageSummary {
        self.files
            .values()
            .filter(|file| filter.matches(&file.path))
            .fold(CoverageSummary::default(), |mut summary, file| {
                summary.add(file);
                summary
            })
    }

    /// First file whose path contains `path`.
    pub fn find_file(&self, path: &str) -> Result<&FileCoverage, JenkinsError> {
        self.files
            .values()
            .find(|file| file.path.contains(path))
            .ok_or_else(|| JenkinsError::FileNotFound(path.to_string()))
    }

    pub fn paths(&self) -> Vec<String> {
        self.files.values().map(|file| file.path.clone()).collect()
    }

    /// Decode the Istanbul report out of a zipped HTML publisher archive.
    pub fn from_archive(bytes: &[u8]) -> Result<Self, RequestError> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            if !entry.is_file() || !entry.name().ends_with(ISTANBUL_REPORT) {
                continue;
            }

            let mut contents = Vec::new();
            entry.read_to_end(&mut contents)?;
            let files: IndexMap<String, FileCoverage> = serde_json::from_slice(&contents)?;
            return Ok(Self { files });
        }

        Err(RequestError::MissingEntry(ISTANBUL_REPORT))
    }
}

/// Coverage counters for one JaCoCo dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageMetric {
    pub covered: u64,
    pub missed: u64,
    pub percentage: f64,
    pub total: u64,
}

/// Summary of a binary `jacoco.exec` report.
///
/// Execution data is not decoded: the metrics stay zero and `processed` is
/// false so callers can tell the difference from a real zero-coverage run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    pub instruction_coverage: CoverageMetric,
    pub branch_coverage: CoverageMetric,
    pub line_coverage: CoverageMetric,
    pub processed: bool,
    pub exec_size_bytes: usize,
}

impl CoverageReport {
    pub fn unprocessed(exec: &[u8]) -> Self {
        Self {
            exec_size_bytes: exec.len(),
            ..Self::default()
        }
    }
}

/// Where a coverage report was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverageSource {
    /// `jacoco/jacoco.exec`
    JacocoExec,
    /// Istanbul HTML publisher archive
    IstanbulArchive,
}

/// Attempt order for coverage lookups.
pub const COVERAGE_ATTEMPTS: [CoverageSource; 2] =
    [CoverageSource::JacocoExec, CoverageSource::IstanbulArchive];

impl CoverageSource {
    pub fn suffix(self) -> &'static str {
        match self {
            Self::JacocoExec => "jacoco/jacoco.exec",
            Self::IstanbulArchive => {
                "Coverage_20Unit_20Test_20Report/*zip*/Coverage_20Unit_20Test_20Report.zip"
            }
        }
    }
}

/// Result of [`crate::jenkins::JenkinsClient::get_coverage_report`].
#[derive(Debug, Clone, PartialEq)]
pub enum CoverageOutcome {
    Jacoco(CoverageReport),
    Istanbul(CoverageSummary),
}
