use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::DateTime;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use std::sync::LazyLock;

use crate::config::JenkinsConfig;
use crate::error::{JenkinsError, Result};

pub const DEFAULT_BRANCH: &str = "main";

static APP_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+$").expect("app name pattern is a valid regex")
});

/// Job path for a multibranch pipeline: `/job/{app}/job/{branch}`.
pub fn build_job_path(app: &str, branch: &str) -> String {
    format!("/job/{app}/job/{branch}")
}

/// Path of one numbered build of a job: `/job/{app}/job/{branch}/{build_number}`.
pub fn build_job_build_path(app: &str, build_number: u64, branch: &str) -> String {
    format!("{}/{build_number}", build_job_path(app, branch))
}

/// Allow-list check applied to every app name before it reaches a URL.
pub fn validate_app_name(app: &str) -> bool {
    APP_NAME.is_match(app)
}

/// Strips `<`, `>`, `'`, `"` and `&`, then trims whitespace.
///
/// Trimming last keeps the result stable: stripping can expose edge spaces.
pub fn sanitize_input(input: &str) -> String {
    let stripped: String = input
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '\'' | '"' | '&'))
        .collect();
    stripped.trim().to_string()
}

/// Branch names become a path segment under the app, so they must not be able
/// to leave it: no dot segments (plain or `%2e`-encoded), no leading `/`, and
/// no `?`, `#`, `\`, whitespace or control characters.
pub fn validate_branch_name(branch: &str) -> bool {
    !branch.is_empty()
        && !branch.starts_with('/')
        && !branch
            .chars()
            .any(|c| matches!(c, '?' | '#' | '\\') || c.is_whitespace() || c.is_control())
        && !branch.split('/').any(is_dot_segment)
}

fn is_dot_segment(segment: &str) -> bool {
    let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
    !decoded.is_empty() && decoded.chars().all(|c| c == '.')
}

/// Renders a millisecond duration as `1h 2m 3s`, `2m 3s` or `3s`.
///
/// Zero means the server did not report a duration and renders as `N/A`.
pub fn format_duration(milliseconds: u64) -> String {
    if milliseconds == 0 {
        return "N/A".to_string();
    }

    let seconds = milliseconds / 1000;
    let minutes = seconds / 60;
    let hours = minutes / 60;

    if hours > 0 {
        format!("{hours}h {}m {}s", minutes % 60, seconds % 60)
    } else if minutes > 0 {
        format!("{minutes}m {}s", seconds % 60)
    } else {
        format!("{seconds}s")
    }
}

/// Renders an epoch-millisecond timestamp in UTC, or `N/A` when unset.
pub fn format_timestamp(timestamp: i64) -> String {
    if timestamp == 0 {
        return "N/A".to_string();
    }

    DateTime::from_timestamp_millis(timestamp)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

fn basic_credentials(config: &JenkinsConfig) -> Result<HeaderValue> {
    let encoded = STANDARD.encode(format!("{}:{}", config.username, config.password));
    let mut value = HeaderValue::from_str(&format!("Basic {encoded}"))
        .map_err(|e| JenkinsError::Config(format!("Invalid credentials header: {e}")))?;
    value.set_sensitive(true);
    Ok(value)
}

/// Default headers for JSON calls, carrying HTTP Basic credentials.
pub fn create_auth_headers(config: &JenkinsConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, basic_credentials(config)?);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Ok(headers)
}

/// Headers for form-encoded POSTs such as `buildWithParameters`.
pub fn create_form_headers(config: &JenkinsConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, basic_credentials(config)?);
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/x-www-form-urlencoded"),
    );
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigOverrides, FileConfig};

    fn config() -> JenkinsConfig {
        JenkinsConfig::resolve(
            ConfigOverrides {
                url: Some("https://ci.example.com".to_string()),
                username: Some("user".to_string()),
                password: Some("pass".to_string()),
                ..ConfigOverrides::default()
            },
            FileConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_job_paths() {
        assert_eq!(build_job_path("web", "main"), "/job/web/job/main");
        assert_eq!(
            build_job_build_path("web", 42, "release"),
            "/job/web/job/release/42"
        );
    }

    #[test]
    fn test_validate_app_name_accepts_allowed_characters() {
        for name in ["my-app", "myapp123", "my_app", "MyApp", "A", "_-_"] {
            assert!(validate_app_name(name), "{name} should be valid");
        }
    }

    #[test]
    fn test_validate_app_name_rejects_everything_else() {
        for name in [
            "", "my app", "my@app", "my.app", "../etc", "app/job", "app\n", "ñandu",
        ] {
            assert!(!validate_app_name(name), "{name:?} should be invalid");
        }
    }

    #[test]
    fn test_sanitize_input_strips_markup_characters() {
        assert_eq!(sanitize_input("  feature/<b>x</b>  "), "feature/bx/b");
        assert_eq!(sanitize_input("a&b'c\"d"), "abcd");
        assert_eq!(sanitize_input("release/1.2"), "release/1.2");
    }

    #[test]
    fn test_sanitize_input_trims_after_stripping() {
        assert_eq!(sanitize_input(" & x & "), "x");
        assert_eq!(sanitize_input("& main"), "main");
        assert_eq!(sanitize_input("<> feature-y <>"), "feature-y");
    }

    #[test]
    fn test_branch_names_stay_inside_the_job() {
        for branch in ["main", "release/1.2", "feature%2Fx", "v1..2", "fix-.hidden"] {
            assert!(validate_branch_name(branch), "{branch}");
        }
        for branch in [
            "",
            "../../other-app/job/main",
            "main/..",
            "./main",
            "%2e%2E/admin",
            ".%2e",
            "/main",
            "main#",
            "main?x=1",
            "a\\b",
            " main",
            "ma in",
            "main\n",
        ] {
            assert!(!validate_branch_name(branch), "{branch:?}");
        }
    }

    #[test]
    fn test_sanitize_input_is_idempotent() {
        for input in ["  <main>  ", "\"'&&'\"", " a < b ", "plain", " & x & "] {
            let once = sanitize_input(input);
            assert_eq!(sanitize_input(&once), once);
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "N/A");
        assert_eq!(format_duration(999), "0s");
        assert_eq!(format_duration(30_000), "30s");
        assert_eq!(format_duration(59_999), "59s");
        assert_eq!(format_duration(60_000), "1m 0s");
        assert_eq!(format_duration(90_000), "1m 30s");
        assert_eq!(format_duration(3_600_000), "1h 0m 0s");
        assert_eq!(format_duration(3_690_000), "1h 1m 30s");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "N/A");
        assert_eq!(format_timestamp(1_700_000_000_000), "2023-11-14 22:13:20 UTC");
    }

    #[test]
    fn test_auth_headers_use_basic_credentials() {
        let headers = create_auth_headers(&config()).unwrap();
        // base64("user:pass")
        assert_eq!(headers[AUTHORIZATION], "Basic dXNlcjpwYXNz");
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert!(headers[AUTHORIZATION].is_sensitive());
    }

    #[test]
    fn test_form_headers_use_urlencoded_content_type() {
        let headers = create_form_headers(&config()).unwrap();
        assert_eq!(headers[AUTHORIZATION], "Basic dXNlcjpwYXNz");
        assert_eq!(headers[CONTENT_TYPE], "application/x-www-form-urlencoded");
    }
}
