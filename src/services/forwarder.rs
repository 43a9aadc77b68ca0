//! Relays uploads to the downstream file service.
//!
//! One upload produces exactly one outbound `POST {base_url}/file/{username}`
//! with a multipart `file` field and the downstream key in `x-api-key`. No
//! retries are attempted; failures are handed to the [`ForwardPolicy`] for
//! translation.

use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::DownstreamConfig;
use crate::error::Result;
use crate::models::Upload;
use crate::policy::{DownstreamFailure, ForwardPolicy};

/// Header carrying API keys, inbound and outbound
pub const API_KEY_HEADER: &str = "x-api-key";

/// Client for the downstream file service
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    target: DownstreamConfig,
    policy: ForwardPolicy,
}

impl Forwarder {
    pub fn new(client: reqwest::Client, target: DownstreamConfig, policy: ForwardPolicy) -> Self {
        Self {
            client,
            target,
            policy,
        }
    }

    /// Policy applied to every forwarded upload
    pub fn policy(&self) -> &ForwardPolicy {
        &self.policy
    }

    /// Forward an upload and return the downstream JSON body
    ///
    /// The upload is consumed; its bytes are released once the request has
    /// been sent, whatever the outcome.
    pub async fn forward(&self, username: &str, upload: Upload) -> Result<Value> {
        let filename = upload.filename.clone();

        match self.send(username, upload).await {
            Ok(body) => {
                info!(username = %username, filename = %filename, "Upload forwarded");
                Ok(body)
            }
            Err(failure) => {
                warn!(
                    username = %username,
                    filename = %filename,
                    mode = %self.policy.error_mode,
                    failure = ?failure,
                    "Forwarding failed"
                );
                Err(self.policy.translate(failure))
            }
        }
    }

    async fn send(
        &self,
        username: &str,
        upload: Upload,
    ) -> std::result::Result<Value, DownstreamFailure> {
        let url = self.target.file_url(username).ok_or_else(|| {
            DownstreamFailure::Unexpected(format!(
                "Invalid downstream base URL: {}",
                self.target.base_url
            ))
        })?;
        let size = upload.len() as u64;

        debug!(url = %url, size, content_type = %upload.content_type, "Forwarding upload");

        let part = Part::stream_with_length(upload.content, size)
            .file_name(upload.filename)
            .mime_str(&upload.content_type)
            .map_err(|e| DownstreamFailure::Unexpected(format!("Invalid content type: {}", e)))?;

        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.target.api_key)
            .timeout(self.target.timeout())
            .multipart(Form::new().part("file", part))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DownstreamFailure::Status { status, body });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| DownstreamFailure::Unexpected(format!("Invalid downstream response: {}", e)))
    }
}
