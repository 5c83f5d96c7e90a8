use thiserror::Error;

#[derive(Error, Debug)]
pub enum JenkinsError {
    #[error(
        "Invalid app name '{0}'. Only alphanumeric characters, hyphens and underscores are allowed."
    )]
    InvalidAppName(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{resource} not found for {context} (url: {url})")]
    NotFound {
        resource: &'static str,
        context: String,
        url: String,
    },

    #[error("{context}: {source}")]
    Request {
        context: String,
        #[source]
        source: RequestError,
    },

    #[error("File not found for path: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl JenkinsError {
    /// HTTP status of the failed call, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::Request {
                source: RequestError::Status { status, .. },
                ..
            } => Some(*status),
            _ => None,
        }
    }
}

/// Why a single outbound call failed.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid coverage archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Coverage archive has no {0} entry")]
    MissingEntry(&'static str),
}

impl RequestError {
    pub fn with_context(self, context: impl Into<String>) -> JenkinsError {
        JenkinsError::Request {
            context: context.into(),
            source: self,
        }
    }
}

pub type Result<T> = std::result::Result<T, JenkinsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_exposed_for_http_failures() {
        let err = RequestError::Status {
            status: 503,
            body: "maintenance".to_string(),
        }
        .with_context("Failed to get job status for app: web");

        assert_eq!(err.status(), Some(503));
        assert_eq!(
            err.to_string(),
            "Failed to get job status for app: web: HTTP 503: maintenance"
        );
    }

    #[test]
    fn test_not_found_reports_404() {
        let err = JenkinsError::NotFound {
            resource: "Job",
            context: "app: web, branch: main".to_string(),
            url: "/jenkins/job/web/job/main/api/json".to_string(),
        };

        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("app: web, branch: main"));
    }

    #[test]
    fn test_data_errors_have_no_status() {
        assert_eq!(JenkinsError::FileNotFound("a.ts".into()).status(), None);
        assert_eq!(JenkinsError::InvalidAppName("a b".into()).status(), None);
    }
}
