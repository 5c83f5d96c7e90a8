use anyhow::Result;
use clap::builder::BoolishValueParser;
use clap::Parser;
use log::info;
use std::path::PathBuf;

use crate::config::{ConfigOverrides, FileConfig, JenkinsConfig};
use crate::jenkins::JenkinsClient;
use crate::mcp::{run_stdio, McpServer, TOOLS};
use crate::output;

#[derive(Parser)]
#[command(name = "jenkins-mcp")]
#[command(author, version, about = "MCP server exposing Jenkins jobs, pipelines and coverage", long_about = None)]
pub struct Cli {
    /// Configuration file (TOML, JSON or YAML)
    #[arg(short, long, env = "JENKINS_MCP_CONFIG")]
    config: Option<PathBuf>,

    /// Jenkins base URL, without the `/jenkins` suffix
    #[arg(short, long, env = "JENKINS_URL")]
    url: Option<String>,

    #[arg(short = 'U', long, env = "JENKINS_USERNAME")]
    username: Option<String>,

    /// Password or API token
    #[arg(short = 'P', long, env = "JENKINS_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Accept self-signed or otherwise invalid TLS certificates
    #[arg(long, env = "JENKINS_ACCEPT_INVALID_CERTS", value_parser = BoolishValueParser::new())]
    accept_invalid_certs: Option<bool>,

    /// Per-request timeout in seconds
    #[arg(short, long, env = "JENKINS_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            url: self.url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            accept_invalid_certs: self.accept_invalid_certs,
            timeout_secs: self.timeout_secs,
        }
    }

    pub async fn execute(&self) -> Result<()> {
        let file = FileConfig::load(self.config.as_deref())?;
        let config = JenkinsConfig::resolve(self.overrides(), file)?;

        info!("Jenkins URL: {}", config.base_url());
        info!("Jenkins username: {}", config.username);
        info!("Jenkins password: ***");
        info!(
            "Serving tools: {}",
            TOOLS.iter().map(|tool| tool.name()).collect::<Vec<_>>().join(", ")
        );

        output::print_banner(&config);

        let client = JenkinsClient::new(config)?;
        let server = McpServer::new(client);
        run_stdio(&server).await?;

        info!("Client disconnected, shutting down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_become_overrides() {
        let cli = Cli::try_parse_from([
            "jenkins-mcp",
            "--url",
            "https://ci.example.com",
            "-U",
            "bot",
            "--accept-invalid-certs",
            "no",
            "--timeout-secs",
            "5",
        ])
        .unwrap();

        let overrides = cli.overrides();
        assert_eq!(overrides.url.as_deref(), Some("https://ci.example.com"));
        assert_eq!(overrides.username.as_deref(), Some("bot"));
        assert_eq!(overrides.accept_invalid_certs, Some(false));
        assert_eq!(overrides.timeout_secs, Some(5));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
