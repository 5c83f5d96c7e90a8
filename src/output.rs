use console::{style, StyledObject};

use crate::config::JenkinsConfig;
use crate::mcp::{SERVER_NAME, SERVER_VERSION, TOOLS};

// stdout carries protocol frames, so everything here targets stderr.

fn dim(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).for_stderr().dim()
}

fn magenta_bold(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).for_stderr().magenta().bold()
}

fn bright_yellow(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).for_stderr().bright().yellow()
}

/// Prints the startup banner to stderr.
pub fn print_banner(config: &JenkinsConfig) {
    eprintln!(
        "\n{} {}\n  {} {}\n  {} {}",
        magenta_bold(format!("🔧 {SERVER_NAME}")),
        dim(SERVER_VERSION),
        dim("Jenkins:"),
        config.base_url(),
        dim("Tools:"),
        TOOLS.len(),
    );

    if config.accept_invalid_certs {
        eprintln!(
            "  {}",
            bright_yellow("⚠ TLS certificate validation is disabled")
        );
    }

    for tool in TOOLS {
        eprintln!("    {} {}", dim("•"), tool.name());
    }
    eprintln!();
}
