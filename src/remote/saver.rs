//! Saving a project to the backend.
//!
//! A save renders the current props to a video first, then creates or
//! updates the stored project with the props and the video URL.

use tracing::info;

use super::client::RemoteClient;
use super::wire::{CreateProjectRequest, RenderRequest, UpdateProjectRequest};
use crate::error::{MontageError, Result};
use crate::state::Project;

/// Result of [`ProjectSaver::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Nothing changed since the last save; no request was made.
    AlreadySaved,
    /// A new project was stored.
    Created { project_id: u64, video_url: String },
    /// An existing project was updated.
    Updated { project_id: u64, video_url: String },
}

impl SaveOutcome {
    /// The notice shown after a save.
    pub fn message(&self) -> &'static str {
        match self {
            SaveOutcome::AlreadySaved => "Your project has already been saved",
            SaveOutcome::Created { .. } => "Project saved",
            SaveOutcome::Updated { .. } => "Project updated successfully",
        }
    }
}

pub struct ProjectSaver<'a> {
    client: &'a RemoteClient,
    composition_id: String,
}

impl<'a> ProjectSaver<'a> {
    pub fn new(client: &'a RemoteClient, composition_id: impl Into<String>) -> Self {
        Self {
            client,
            composition_id: composition_id.into(),
        }
    }

    /// Save `project`, recording the remote id, video URL and fingerprint on success.
    pub async fn save(&self, project: &mut Project) -> Result<SaveOutcome> {
        if project.remote.project_id.is_some() && !project.has_unsaved_changes()? {
            return Ok(SaveOutcome::AlreadySaved);
        }
        if project.remote.project_id.is_none() && project.title.trim().is_empty() {
            return Err(MontageError::InvalidUpdate {
                reason: "a new project needs a title".to_string(),
            });
        }

        let props = project.props();
        let render = RenderRequest::mp4(props.clone(), self.composition_id.as_str());
        let video_url = self.client.render_video(&render).await?;

        let outcome = match project.remote.project_id {
            Some(existing) => {
                let request = UpdateProjectRequest {
                    props,
                    project_vid_url: video_url.clone(),
                };
                let project_id = self.client.update_project(existing, &request).await?;
                SaveOutcome::Updated {
                    project_id,
                    video_url: video_url.clone(),
                }
            }
            None => {
                let request = CreateProjectRequest {
                    title: project.title.clone(),
                    template_id: project.template_id,
                    props,
                    project_vid_url: video_url.clone(),
                };
                let project_id = self.client.create_project(&request).await?;
                SaveOutcome::Created {
                    project_id,
                    video_url: video_url.clone(),
                }
            }
        };

        if let SaveOutcome::Created { project_id, .. } | SaveOutcome::Updated { project_id, .. } = outcome {
            project.mark_saved(project_id, video_url)?;
            info!(project_id, "Project saved");
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RemoteConfig;

    #[tokio::test]
    async fn test_unchanged_project_is_not_sent() {
        let client = RemoteClient::new(&RemoteConfig::default()).unwrap();
        let mut project = Project::new("Promo", 300, 30);
        project.mark_saved(3, "https://cdn.example.com/3.mp4").unwrap();

        let outcome = ProjectSaver::new(&client, "DynamicLayerComposition")
            .save(&mut project)
            .await
            .unwrap();
        assert_eq!(outcome, SaveOutcome::AlreadySaved);
    }

    #[tokio::test]
    async fn test_new_project_needs_title() {
        let client = RemoteClient::new(&RemoteConfig::default()).unwrap();
        let mut project = Project::new("  ", 300, 30);

        let err = ProjectSaver::new(&client, "DynamicLayerComposition")
            .save(&mut project)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_UPDATE");
    }
}
