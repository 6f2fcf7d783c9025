//! Registry client implementation
//!
//! Talks to the anaconda.org REST API. Reads go over HTTP with retry on
//! transient failures; uploads are delegated to the `anaconda` client, which
//! owns the multi-step staging protocol.

use async_trait::async_trait;
use backoff::{future::retry, ExponentialBackoff};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{defaults, urls};
use crate::core::recipe::Artifact;
use crate::error::{PublishError, RegistryError};
use crate::registry::Registry;

/// `GET /channels/{owner}/{channel}` response
#[derive(Debug, Deserialize)]
struct ChannelListing {
    #[serde(default)]
    files: Vec<ChannelFile>,
}

#[derive(Debug, Deserialize)]
struct ChannelFile {
    basename: String,
}

/// `POST /channels/{owner}/{channel}` body
#[derive(Debug, Serialize)]
struct LinkRequest<'a> {
    package: &'a str,
    version: &'a str,
    basename: &'a str,
}

/// anaconda.org client
#[derive(Debug, Clone)]
pub struct AnacondaClient {
    /// HTTP client
    client: reqwest::Client,
    /// API base URL
    api_url: String,
    /// Publishing token, if any
    token: Option<String>,
    /// `anaconda` executable used for uploads
    anaconda: PathBuf,
    /// Retry policy for reads
    initial_retry: Duration,
    max_retry_elapsed: Duration,
}

impl AnacondaClient {
    /// Create a client for the public anaconda.org API
    pub fn new(token: Option<String>) -> Self {
        Self::with_url(urls::ANACONDA_API, token)
    }

    /// Create a client against a custom API base URL
    pub fn with_url(api_url: &str, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(60))
                .connect_timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
            anaconda: PathBuf::from(defaults::DEFAULT_ANACONDA),
            initial_retry: Duration::from_millis(500),
            max_retry_elapsed: Duration::from_secs(defaults::REGISTRY_RETRY_MAX_ELAPSED),
        }
    }

    /// Use a different `anaconda` executable for uploads
    #[must_use]
    pub fn with_anaconda(mut self, anaconda: PathBuf) -> Self {
        self.anaconda = anaconda;
        self
    }

    /// Override the read retry policy
    #[must_use]
    pub fn with_retry(mut self, initial: Duration, max_elapsed: Duration) -> Self {
        self.initial_retry = initial;
        self.max_retry_elapsed = max_elapsed;
        self
    }

    /// Get the API base URL
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.header("Authorization", format!("token {token}")),
            None => builder,
        }
    }

    fn redact(&self, message: &str) -> String {
        PublishError::redacted(message, self.token.as_deref())
    }

    /// GET with retry on transient failures; `Ok(None)` on 404
    async fn get(&self, url: &str) -> Result<Option<reqwest::Response>, RegistryError> {
        let policy = ExponentialBackoff {
            initial_interval: self.initial_retry,
            max_elapsed_time: Some(self.max_retry_elapsed),
            ..ExponentialBackoff::default()
        };

        let this = self;
        retry(policy, move || async move {
            tracing::debug!("GET {url}");
            let response = this.request(Method::GET, url).send().await.map_err(|e| {
                let err = RegistryError::Network {
                    url: url.to_string(),
                    error: e.to_string(),
                };
                if e.is_connect() || e.is_timeout() {
                    backoff::Error::transient(err)
                } else {
                    backoff::Error::permanent(err)
                }
            })?;

            let status = response.status();
            if status == StatusCode::NOT_FOUND {
                return Ok(None);
            }
            if status.is_success() {
                return Ok(Some(response));
            }

            let err = RegistryError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            };
            if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                tracing::debug!("Transient registry failure, retrying: {err}");
                Err(backoff::Error::transient(err))
            } else {
                Err(backoff::Error::permanent(err))
            }
        })
        .await
    }
}

#[async_trait]
impl Registry for AnacondaClient {
    async fn exists(&self, owner: &str, artifact: &Artifact) -> Result<bool, RegistryError> {
        let url = format!(
            "{}/dist/{owner}/{}/{}/{}",
            self.api_url, artifact.name, artifact.version, artifact.basename
        );
        Ok(self.get(&url).await?.is_some())
    }

    async fn channel_files(
        &self,
        owner: &str,
        channel: &str,
    ) -> Result<HashSet<String>, RegistryError> {
        let url = format!("{}/channels/{owner}/{channel}", self.api_url);
        let Some(response) = self.get(&url).await? else {
            return Ok(HashSet::new());
        };

        let listing: ChannelListing =
            response
                .json()
                .await
                .map_err(|e| RegistryError::InvalidResponse {
                    url: url.clone(),
                    error: e.to_string(),
                })?;
        Ok(listing.files.into_iter().map(|f| f.basename).collect())
    }

    async fn upload(
        &self,
        artifact: &Artifact,
        owner: &str,
        channels: &[String],
    ) -> Result<(), PublishError> {
        let channel_list = channels.join(",");
        let fail = |error: String| PublishError::UploadFailed {
            artifact: artifact.basename.clone(),
            channel: channel_list.clone(),
            error,
        };

        let Some(path) = artifact.path.as_ref() else {
            return Err(fail("artifact has not been built locally".to_string()));
        };

        let mut cmd = tokio::process::Command::new(&self.anaconda);
        cmd.arg("upload").arg("--user").arg(owner);
        for channel in channels {
            cmd.arg("--channel").arg(channel);
        }
        cmd.arg(path);
        if let Some(token) = &self.token {
            cmd.env(defaults::ANACONDA_TOKEN_ENV, token);
        }

        tracing::debug!("Running {} upload for {}", self.anaconda.display(), path.display());
        let output = cmd
            .output()
            .await
            .map_err(|e| fail(format!("failed to run '{}': {e}", self.anaconda.display())))?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(fail(self.redact(&format!(
                "{} exited with {}: {}",
                self.anaconda.display(),
                output.status,
                stderr.trim()
            ))))
        }
    }

    async fn link(
        &self,
        owner: &str,
        artifact: &Artifact,
        channel: &str,
    ) -> Result<(), PublishError> {
        let url = format!("{}/channels/{owner}/{channel}", self.api_url);
        let fail = |error: String| PublishError::LinkFailed {
            artifact: artifact.basename.clone(),
            channel: channel.to_string(),
            error,
        };

        let body = LinkRequest {
            package: &artifact.name,
            version: &artifact.version,
            basename: &artifact.basename,
        };
        let response = self
            .request(Method::POST, &url)
            .json(&body)
            .send()
            .await
            .map_err(|e| fail(self.redact(&e.to_string())))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(fail(self.redact(&format!("HTTP {status}: {}", text.trim()))))
        }
    }
}
