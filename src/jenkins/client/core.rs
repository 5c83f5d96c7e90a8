use log::{debug, warn};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::config::JenkinsConfig;
use crate::error::{JenkinsError, RequestError, Result};
use crate::jenkins::helpers::{create_auth_headers, validate_app_name, validate_branch_name};

/// Authenticated session against one Jenkins instance.
///
/// Built once at startup and shared by every tool call. All operations
/// validate their inputs before any request leaves the process.
pub struct JenkinsClient {
    pub(super) client: Client,
    pub(super) config: JenkinsConfig,
}

impl JenkinsClient {
    pub fn new(config: JenkinsConfig) -> Result<Self> {
        if config.accept_invalid_certs {
            warn!(
                "TLS certificate validation is disabled for {}",
                config.base_url()
            );
        }

        let client = Client::builder()
            .user_agent(concat!("jenkins-mcp/", env!("CARGO_PKG_VERSION")))
            .default_headers(create_auth_headers(&config)?)
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| JenkinsError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Absolute URL for a path under the `/jenkins` context root.
    pub(super) fn jenkins_url(&self, path: &str) -> String {
        format!("{}/jenkins{path}", self.config.base_url())
    }

    pub(super) fn ensure_app(app: &str) -> Result<()> {
        if validate_app_name(app) {
            Ok(())
        } else {
            Err(JenkinsError::InvalidAppName(app.to_string()))
        }
    }

    pub(super) fn ensure_branch(branch: &str) -> Result<()> {
        if validate_branch_name(branch) {
            Ok(())
        } else {
            Err(JenkinsError::InvalidArgument(format!(
                "invalid branch name '{branch}'"
            )))
        }
    }

    /// Send a request and turn any non-2xx answer into `RequestError::Status`.
    pub(super) async fn send(
        &self,
        request: RequestBuilder,
    ) -> std::result::Result<Response, RequestError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(RequestError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    pub(super) async fn get_json<T>(&self, url: &str) -> std::result::Result<T, RequestError>
    where
        T: DeserializeOwned,
    {
        debug!("GET {url}");
        let bytes = self.send(self.client.get(url)).await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub(super) async fn get_bytes(&self, url: &str) -> std::result::Result<Vec<u8>, RequestError> {
        debug!("GET {url} (binary)");
        let bytes = self.send(self.client.get(url)).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    pub(super) async fn post(
        &self,
        request: RequestBuilder,
        url: &str,
    ) -> std::result::Result<(), RequestError> {
        debug!("POST {url}");
        self.send(request).await?;
        Ok(())
    }
}

/// Map a 404 to `NotFound`, anything else to a wrapped request error.
pub(super) fn not_found_or_wrap(
    err: RequestError,
    resource: &'static str,
    action: &str,
    params: String,
    url: &str,
) -> JenkinsError {
    match err {
        RequestError::Status { status: 404, .. } => JenkinsError::NotFound {
            resource,
            context: params,
            url: url.to_string(),
        },
        other => other.with_context(format!("Failed to {action} for {params}")),
    }
}
