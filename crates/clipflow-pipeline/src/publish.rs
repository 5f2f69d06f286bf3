//! Publish collaborator.
//!
//! Thin client for a reels-style upload service: authenticate, multipart
//! the clip with its caption, and always terminate the session afterwards,
//! whether or not the upload succeeded.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{PipelineError, PipelineResult};

/// Upload collaborator: artifact path + caption in, remote post out.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, path: &Path, caption: &str) -> PipelineResult<()>;
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

/// HTTP publisher with per-call session lifecycle.
pub struct ReelsPublisher {
    client: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

impl ReelsPublisher {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            username: username.into(),
            password: password.into(),
        }
    }

    async fn login(&self) -> PipelineResult<String> {
        let response = self
            .client
            .post(format!("{}/auth/login", self.base_url))
            .json(&serde_json::json!({
                "username": self.username,
                "password": self.password,
            }))
            .send()
            .await?
            .error_for_status()
            .map_err(|e| PipelineError::publish(format!("login rejected: {}", e)))?;

        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::publish(format!("malformed login response: {}", e)))?;
        Ok(body.token)
    }

    async fn upload(&self, token: &str, path: &Path, caption: &str) -> PipelineResult<()> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "clip.mp4".to_string());

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("video/mp4")?;
        let form = reqwest::multipart::Form::new()
            .part("video", part)
            .text("caption", caption.to_string());

        self.client
            .post(format!("{}/reels", self.base_url))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| PipelineError::publish(format!("upload rejected: {}", e)))?;

        info!(clip = %path.display(), "Uploaded clip");
        Ok(())
    }

    async fn logout(&self, token: &str) {
        let result = self
            .client
            .post(format!("{}/auth/logout", self.base_url))
            .bearer_auth(token)
            .send()
            .await;
        if let Err(e) = result {
            warn!(error = %e, "Logout failed; session may linger server-side");
        }
    }
}

#[async_trait]
impl Publisher for ReelsPublisher {
    async fn publish(&self, path: &Path, caption: &str) -> PipelineResult<()> {
        let token = self.login().await?;

        // Session terminates regardless of the upload outcome.
        let result = self.upload(&token, path, caption).await;
        self.logout(&token).await;
        result
    }
}
