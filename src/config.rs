use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::error::JenkinsError;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration file structure for the Jenkins MCP server.
///
/// Files are optional; anything set on the command line or in the
/// environment wins over the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FileConfig {
    #[serde(default)]
    pub jenkins: JenkinsSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JenkinsSection {
    /// Jenkins base URL, without the `/jenkins` prefix
    pub url: Option<String>,

    pub username: Option<String>,

    /// Password or API token
    pub password: Option<String>,

    /// Accept self-signed TLS certificates
    pub accept_invalid_certs: Option<bool>,

    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./jenkins-mcp.toml
    /// 3. ./jenkins-mcp.json
    /// 4. ./jenkins-mcp.yaml
    /// 5. ./jenkins-mcp.yml
    ///
    /// Returns an empty configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let candidates = [
            "jenkins-mcp.toml",
            "jenkins-mcp.json",
            "jenkins-mcp.yaml",
            "jenkins-mcp.yml",
        ];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        Ok(Self::default())
    }

    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }
}

/// Values supplied on the command line or through environment variables.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub accept_invalid_certs: Option<bool>,
    pub timeout_secs: Option<u64>,
}

/// Validated connection settings. Built once at startup.
#[derive(Clone)]
pub struct JenkinsConfig {
    pub url: Url,
    pub username: String,
    pub password: String,
    pub accept_invalid_certs: bool,
    pub timeout: Duration,
}

impl fmt::Debug for JenkinsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JenkinsConfig")
            .field("url", &self.url.as_str())
            .field("username", &self.username)
            .field("password", &"***")
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl JenkinsConfig {
    /// Merge overrides on top of the file section and check that the three
    /// connection values are present.
    ///
    /// # Errors
    ///
    /// Returns `JenkinsError::Config` naming every missing variable, or when
    /// the URL is not absolute.
    pub fn resolve(
        overrides: ConfigOverrides,
        file: FileConfig,
    ) -> std::result::Result<Self, JenkinsError> {
        let section = file.jenkins;
        let url = non_blank(overrides.url.or(section.url));
        let username = non_blank(overrides.username.or(section.username));
        let password = non_blank(overrides.password.or(section.password));

        let (url, username, password) = match (url, username, password) {
            (Some(url), Some(username), Some(password)) => (url, username, password),
            (url, username, password) => {
                let missing: Vec<&str> = [
                    ("JENKINS_URL", url.is_none()),
                    ("JENKINS_USERNAME", username.is_none()),
                    ("JENKINS_PASSWORD", password.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();

                return Err(JenkinsError::Config(format!(
                    "Jenkins configuration missing: {}. Please set JENKINS_URL, JENKINS_USERNAME, and JENKINS_PASSWORD environment variables.",
                    missing.join(", ")
                )));
            }
        };

        let url = Url::parse(url.trim_end_matches('/'))
            .map_err(|e| JenkinsError::Config(format!("Invalid JENKINS_URL '{url}': {e}")))?;
        if url.cannot_be_a_base() {
            return Err(JenkinsError::Config(format!(
                "JENKINS_URL must be an absolute http(s) URL, got '{url}'"
            )));
        }

        Ok(Self {
            url,
            username,
            password,
            accept_invalid_certs: overrides
                .accept_invalid_certs
                .or(section.accept_invalid_certs)
                .unwrap_or(true),
            timeout: Duration::from_secs(
                overrides
                    .timeout_secs
                    .or(section.timeout_secs)
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        })
    }

    /// Base URL as a string without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.url.as_str().trim_end_matches('/')
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn full_overrides() -> ConfigOverrides {
        ConfigOverrides {
            url: Some("https://ci.example.com".to_string()),
            username: Some("deployer".to_string()),
            password: Some("s3cret".to_string()),
            ..ConfigOverrides::default()
        }
    }

    #[test]
    fn test_resolve_with_all_values() {
        let config = JenkinsConfig::resolve(full_overrides(), FileConfig::default()).unwrap();
        assert_eq!(config.base_url(), "https://ci.example.com");
        assert_eq!(config.username, "deployer");
        assert!(config.accept_invalid_certs);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_resolve_reports_each_missing_value() {
        for field in ["url", "username", "password"] {
            let mut overrides = full_overrides();
            match field {
                "url" => overrides.url = None,
                "username" => overrides.username = None,
                _ => overrides.password = Some("   ".to_string()),
            }

            let err = JenkinsConfig::resolve(overrides, FileConfig::default()).unwrap_err();
            let message = err.to_string();
            assert!(message.contains("Jenkins configuration missing"), "{message}");
            assert!(
                message.contains(&format!("JENKINS_{}", field.to_uppercase())),
                "{message}"
            );
        }
    }

    #[test]
    fn test_resolve_lists_all_missing_values() {
        let err = JenkinsConfig::resolve(ConfigOverrides::default(), FileConfig::default())
            .unwrap_err();
        assert!(err
            .to_string()
            .contains("missing: JENKINS_URL, JENKINS_USERNAME, JENKINS_PASSWORD"));
    }

    #[test]
    fn test_resolve_rejects_relative_url() {
        let mut overrides = full_overrides();
        overrides.url = Some("ci.example.com/jenkins".to_string());
        assert!(JenkinsConfig::resolve(overrides, FileConfig::default()).is_err());
    }

    #[test]
    fn test_overrides_win_over_file() {
        let file = FileConfig {
            jenkins: JenkinsSection {
                url: Some("https://file.example.com".to_string()),
                username: Some("file-user".to_string()),
                password: None,
                accept_invalid_certs: Some(false),
                timeout_secs: Some(5),
            },
        };
        let overrides = ConfigOverrides {
            url: Some("https://cli.example.com/".to_string()),
            password: Some("pw".to_string()),
            ..ConfigOverrides::default()
        };

        let config = JenkinsConfig::resolve(overrides, file).unwrap();
        assert_eq!(config.base_url(), "https://cli.example.com");
        assert_eq!(config.username, "file-user");
        assert!(!config.accept_invalid_certs);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_debug_masks_password() {
        let config = JenkinsConfig::resolve(full_overrides(), FileConfig::default()).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn test_load_toml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        let toml_content = r#"
[jenkins]
url = "https://jenkins.internal"
username = "bot"
password = "token"
accept-invalid-certs = false
timeout-secs = 10
"#;
        write!(temp_file, "{}", toml_content).unwrap();

        let config = FileConfig::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.jenkins.url.as_deref(), Some("https://jenkins.internal"));
        assert_eq!(config.jenkins.accept_invalid_certs, Some(false));
        assert_eq!(config.jenkins.timeout_secs, Some(10));
    }

    #[test]
    fn test_load_yaml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".yaml").unwrap();
        write!(temp_file, "jenkins:\n  username: yaml-user\n").unwrap();

        let config = FileConfig::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.jenkins.username.as_deref(), Some("yaml-user"));
        assert!(config.jenkins.url.is_none());
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        assert!(FileConfig::load(Some(Path::new("does-not-exist.toml"))).is_err());
    }
}
