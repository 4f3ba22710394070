//! Request and response bodies exchanged with the backend.

use serde::{Deserialize, Serialize};

use crate::state::ProjectProps;

/// Output container requested from the renderer.
pub const RENDER_FORMAT: &str = "mp4";

/// `POST /generatevideo/render-video`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub input_props: ProjectProps,
    pub format: String,
    pub composition_id: String,
}

impl RenderRequest {
    pub fn mp4(input_props: ProjectProps, composition_id: impl Into<String>) -> Self {
        Self {
            input_props,
            format: RENDER_FORMAT.to_string(),
            composition_id: composition_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderResponse {
    /// Where the rendered video can be fetched
    pub url: String,
}

/// `POST /projects/save`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<u32>,
    pub props: ProjectProps,
    pub project_vid_url: String,
}

/// `PUT /projects/update/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub props: ProjectProps,
    pub project_vid_url: String,
}

/// Response to both project create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectEnvelope {
    pub project: StoredProject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredProject {
    pub id: u64,
}

/// `POST /auth/refresh-token`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub success: bool,
    #[serde(default)]
    pub token: Option<String>,
}

/// Body of a failed request, when the backend sends one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
}

impl ErrorPayload {
    /// The message to report for a failed response body.
    ///
    /// Uses the `error` field of a JSON payload, or the raw body otherwise.
    pub fn message_from_body(body: &str) -> String {
        match serde_json::from_str::<ErrorPayload>(body) {
            Ok(payload) => payload.error,
            Err(_) => body.trim().to_string(),
        }
    }
}
