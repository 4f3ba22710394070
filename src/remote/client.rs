//! HTTP client for the render, project and auth endpoints.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::wire::{
    CreateProjectRequest, ErrorPayload, ProjectEnvelope, RenderRequest, RenderResponse,
    TokenResponse, UpdateProjectRequest,
};
use crate::config::RemoteConfig;
use crate::error::{MontageError, Result};

/// Client for the backend. Cheap to clone; clones share the access token.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
}

impl RemoteClient {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn bearer(&self) -> Result<String> {
        self.token().await.ok_or_else(|| MontageError::Unauthenticated {
            reason: "no access token".to_string(),
        })
    }

    /// Render the props to a video and return its URL.
    pub async fn render_video(&self, request: &RenderRequest) -> Result<String> {
        debug!(composition = %request.composition_id, "Requesting render");
        let builder = self
            .http
            .post(self.url("/generatevideo/render-video"))
            .json(request);
        let response: RenderResponse = send_json(builder).await?;
        Ok(response.url)
    }

    /// Store a new project and return its id.
    pub async fn create_project(&self, request: &CreateProjectRequest) -> Result<u64> {
        let token = self.bearer().await?;
        let builder = self
            .http
            .post(self.url("/projects/save"))
            .bearer_auth(token)
            .json(request);
        let envelope: ProjectEnvelope = send_json(builder).await?;
        Ok(envelope.project.id)
    }

    /// Replace the stored props of an existing project.
    pub async fn update_project(&self, project_id: u64, request: &UpdateProjectRequest) -> Result<u64> {
        let token = self.bearer().await?;
        let builder = self
            .http
            .put(self.url(&format!("/projects/update/{}", project_id)))
            .bearer_auth(token)
            .json(request);
        let envelope: ProjectEnvelope = send_json(builder).await?;
        Ok(envelope.project.id)
    }

    /// Exchange the refresh credential for a new access token.
    ///
    /// A refused refresh means the session is over: the token is cleared
    /// and `Unauthenticated` is returned.
    pub async fn refresh_token(&self) -> Result<()> {
        let mut builder = self.http.post(self.url("/auth/refresh-token"));
        if let Some(token) = self.token().await {
            builder = builder.bearer_auth(token);
        }

        let response: TokenResponse = match send_json(builder).await {
            Ok(response) => response,
            Err(MontageError::Backend { status, message }) => {
                self.set_token(None).await;
                return Err(MontageError::Unauthenticated {
                    reason: format!("refresh refused ({}): {}", status, message),
                });
            }
            Err(e) => return Err(e),
        };

        match response.token {
            Some(token) if response.success => {
                self.set_token(Some(token)).await;
                debug!("Access token refreshed");
            }
            _ => warn!("Refresh succeeded without a new token"),
        }
        Ok(())
    }

    /// Check that the current token is still accepted.
    ///
    /// Returns false without a request when there is no token.
    pub async fn heartbeat(&self) -> Result<bool> {
        let Some(token) = self.token().await else {
            return Ok(false);
        };
        let response = self.http.get(self.url("/auth")).bearer_auth(token).send().await?;
        check_status(response).await?;
        Ok(true)
    }
}

async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T> {
    let response = check_status(builder.send().await?).await?;
    Ok(response.json::<T>().await?)
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(MontageError::Backend {
        status: status.as_u16(),
        message: ErrorPayload::message_from_body(&body),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> RemoteConfig {
        RemoteConfig {
            api_url: url.to_string(),
            ..RemoteConfig::default()
        }
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = RemoteClient::new(&config("https://api.example.com/")).unwrap();
        assert_eq!(client.url("/auth"), "https://api.example.com/auth");
    }

    #[tokio::test]
    async fn test_clones_share_token() {
        let client = RemoteClient::new(&config("http://localhost:8080")).unwrap();
        let clone = client.clone();
        client.set_token(Some("abc".to_string())).await;
        assert_eq!(clone.token().await.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_heartbeat_without_token_is_skipped() {
        let client = RemoteClient::new(&config("http://localhost:8080")).unwrap();
        assert!(!client.heartbeat().await.unwrap());
    }

    #[tokio::test]
    async fn test_project_calls_need_a_token() {
        let client = RemoteClient::new(&config("http://localhost:8080")).unwrap();
        let request = UpdateProjectRequest {
            props: crate::state::ProjectProps {
                layers: Vec::new(),
                duration: 300,
                template_id: None,
            },
            project_vid_url: String::new(),
        };
        let err = client.update_project(1, &request).await.unwrap_err();
        assert_eq!(err.error_code(), "UNAUTHENTICATED");
    }
}
