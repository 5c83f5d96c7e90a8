use log::{debug, warn};

use super::core::JenkinsClient;
use crate::error::{RequestError, Result};
use crate::jenkins::coverage::{
    CoverageFilter, CoverageOutcome, CoverageReport, CoverageReportFront, CoverageSource,
    FileCoverage, COVERAGE_ATTEMPTS, ISTANBUL_REPORT,
};
use crate::jenkins::helpers::build_job_build_path;

impl JenkinsClient {
    /// Coverage for a build, trying each source in [`COVERAGE_ATTEMPTS`] order.
    ///
    /// The JaCoCo execution file wins when present. Otherwise the Istanbul archive is
    /// summarized over the files matching `package_name` and `class_name`.
    /// When every source fails, the last failure is reported.
    pub async fn get_coverage_report(
        &self,
        app: &str,
        build_number: u64,
        package_name: Option<&str>,
        class_name: Option<&str>,
        branch: &str,
    ) -> Result<CoverageOutcome> {
        Self::ensure_app(app)?;
        Self::ensure_branch(branch)?;

        let filter = CoverageFilter {
            package_name,
            class_name,
        };
        let build_path = build_job_build_path(app, build_number, branch);
        let mut last_error = RequestError::MissingEntry(ISTANBUL_REPORT);

        for source in COVERAGE_ATTEMPTS {
            let url = self.jenkins_url(&format!("{build_path}/{}", source.suffix()));
            match self.fetch_coverage(source, &url, filter).await {
                Ok(outcome) => return Ok(outcome),
                Err(err) => {
                    debug!("{source:?} coverage unavailable at {url}: {err}");
                    last_error = err;
                }
            }
        }

        Err(last_error.with_context(format!(
            "Failed to get coverage report for app: {app}, build: {build_number}, branch: {branch}"
        )))
    }

    async fn fetch_coverage(
        &self,
        source: CoverageSource,
        url: &str,
        filter: CoverageFilter<'_>,
    ) -> std::result::Result<CoverageOutcome, RequestError> {
        let bytes = self.get_bytes(url).await?;

        match source {
            CoverageSource::JacocoExec => {
                warn!(
                    "Found jacoco.exec ({} bytes) at {url}; execution data is not decoded",
                    bytes.len()
                );
                Ok(CoverageOutcome::Jacoco(CoverageReport::unprocessed(&bytes)))
            }
            CoverageSource::IstanbulArchive => {
                let report = CoverageReportFront::from_archive(&bytes)?;
                Ok(CoverageOutcome::Istanbul(report.summarize(filter)))
            }
        }
    }

    /// Istanbul record of the first file whose path contains `path`.
    ///
    /// # Errors
    ///
    /// `FileNotFound` when no path matches; wrapped request errors when the
    /// archive cannot be fetched or read.
    pub async fn get_coverage_report_lines(
        &self,
        app: &str,
        build_number: u64,
        path: &str,
        branch: &str,
    ) -> Result<FileCoverage> {
        Self::ensure_app(app)?;
        Self::ensure_branch(branch)?;

        let report = self
            .fetch_istanbul_report(app, build_number, branch)
            .await
            .map_err(|e| {
                e.with_context(format!(
                    "Failed to get coverage lines for app: {app}, build: {build_number}, path: {path}, branch: {branch}"
                ))
            })?;

        report.find_file(path).cloned()
    }

    /// Every file path in the Istanbul report, in report order.
    pub async fn get_coverage_report_paths(
        &self,
        app: &str,
        build_number: u64,
        branch: &str,
    ) -> Result<Vec<String>> {
        Self::ensure_app(app)?;
        Self::ensure_branch(branch)?;

        let report = self
            .fetch_istanbul_report(app, build_number, branch)
            .await
            .map_err(|e| {
                e.with_context(format!(
                    "Failed to get coverage paths for app: {app}, build: {build_number}, branch: {branch}"
                ))
            })?;

        Ok(report.paths())
    }

    async fn fetch_istanbul_report(
        &self,
        app: &str,
        build_number: u64,
        branch: &str,
    ) -> std::result::Result<CoverageReportFront, RequestError> {
        let url = self.jenkins_url(&format!(
            "{}/{}",
            build_job_build_path(app, build_number, branch),
            CoverageSource::IstanbulArchive.suffix()
        ));
        let bytes = self.get_bytes(&url).await?;
        CoverageReportFront::from_archive(&bytes)
    }
}
