//! Project State
//!
//! A project is the editor document: timeline settings, the layer list and
//! enough editor state to resume where the user left off. On disk a project
//! is a directory holding `project.json` and `history.json`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::EditorConfig;
use crate::editor::EditorSession;
use crate::error::{MontageError, Result};
use crate::layers::{Layer, LayerId};
use crate::state::history::{History, HistoryRecord};

/// Project directory file names.
pub const PROJECT_FILE: &str = "project.json";
pub const HISTORY_FILE: &str = "history.json";

/// Schema version written by this build.
pub const CURRENT_SCHEMA_VERSION: &str = "1.0.0";

/// Schema versions this build can read.
const SUPPORTED_SCHEMA_VERSIONS: [&str; 1] = ["1.0.0"];

fn default_schema_version() -> String {
    CURRENT_SCHEMA_VERSION.to_string()
}

/// Main project state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Schema version for compatibility checks.
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Title shown in the dashboard.
    pub title: String,

    /// Template the project was started from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<u32>,

    /// Frames per second of the composition.
    pub fps: u32,

    /// Length of the timeline in frames.
    pub duration_in_frames: u32,

    /// Layers, bottom to top.
    #[serde(default)]
    pub layers: Vec<Layer>,

    /// Timestamp when project was created.
    pub created_at: DateTime<Utc>,

    /// Timestamp of last modification.
    pub modified_at: DateTime<Utc>,

    /// Where the editor was when the project was last stored.
    #[serde(default)]
    pub editor: EditorState,

    /// Link to the copy held by the backend.
    #[serde(default)]
    pub remote: RemoteLink,
}

/// Editor state restored when a project is reopened.
///
/// Not part of [`ProjectProps`], so moving the playhead never counts as a change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorState {
    #[serde(default)]
    pub current_frame: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_layer_id: Option<LayerId>,
}

/// What the backend knows about this project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteLink {
    /// Backend project id, once saved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u64>,

    /// URL of the last rendered preview video.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,

    /// Fingerprint of the props at the last successful save.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_fingerprint: Option<String>,

    /// When the last successful save happened.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

/// The props handed to the renderer and stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectProps {
    pub layers: Vec<Layer>,
    /// Length in frames
    pub duration: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<u32>,
}

impl ProjectProps {
    /// SHA-256 of the props' JSON form, as lowercase hex.
    pub fn fingerprint(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        Ok(format!("{:x}", Sha256::digest(&bytes)))
    }
}

impl Project {
    /// A new, empty project.
    pub fn new(title: impl Into<String>, duration_in_frames: u32, fps: u32) -> Self {
        let now = Utc::now();
        Self {
            schema_version: CURRENT_SCHEMA_VERSION.to_string(),
            title: title.into(),
            template_id: None,
            fps,
            duration_in_frames,
            layers: Vec::new(),
            created_at: now,
            modified_at: now,
            editor: EditorState::default(),
            remote: RemoteLink::default(),
        }
    }

    pub fn with_template(mut self, template_id: u32) -> Self {
        self.template_id = Some(template_id);
        self
    }

    pub fn with_layers(mut self, layers: Vec<Layer>) -> Self {
        self.layers = layers;
        self
    }

    /// The props that are rendered, saved and compared.
    pub fn props(&self) -> ProjectProps {
        ProjectProps {
            layers: self.layers.clone(),
            duration: self.duration_in_frames,
            template_id: self.template_id,
        }
    }

    /// Whether the props differ from the last successful remote save.
    ///
    /// A project that was never saved always has unsaved changes.
    pub fn has_unsaved_changes(&self) -> Result<bool> {
        let current = self.props().fingerprint()?;
        Ok(self.remote.saved_fingerprint.as_deref() != Some(current.as_str()))
    }

    /// Record a successful remote save of the current props.
    pub fn mark_saved(&mut self, project_id: u64, video_url: impl Into<String>) -> Result<()> {
        self.remote.project_id = Some(project_id);
        self.remote.video_url = Some(video_url.into());
        self.remote.saved_fingerprint = Some(self.props().fingerprint()?);
        self.remote.saved_at = Some(Utc::now());
        Ok(())
    }

    /// Check that this build understands the project.
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_SCHEMA_VERSIONS.contains(&self.schema_version.as_str()) {
            return Err(MontageError::InvalidSchemaVersion {
                version: self.schema_version.clone(),
            });
        }
        for layer in &self.layers {
            layer.validate()?;
        }
        Ok(())
    }
}

/// A project directory on disk.
#[derive(Debug, Clone)]
pub struct ProjectDir {
    path: PathBuf,
}

impl ProjectDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn project_file(&self) -> PathBuf {
        self.path.join(PROJECT_FILE)
    }

    pub fn history_file(&self) -> PathBuf {
        self.path.join(HISTORY_FILE)
    }

    /// Whether the directory already holds a project.
    pub fn exists(&self) -> bool {
        self.project_file().exists()
    }

    /// Write a brand-new project with a fresh history.
    pub fn create(&self, project: &Project, max_history_size: usize) -> Result<()> {
        if self.exists() {
            return Err(MontageError::ProjectAlreadyExists {
                path: self.path.clone(),
            });
        }
        project.validate()?;

        fs::create_dir_all(&self.path).map_err(|e| MontageError::FileWriteError {
            path: self.path.clone(),
            source: e,
        })?;

        let history = History::new(project.layers.clone(), max_history_size);
        self.save(project, &history)?;

        info!("Created project '{}' at {}", project.title, self.path.display());
        Ok(())
    }

    /// Read and validate `project.json`.
    pub fn load_project(&self) -> Result<Project> {
        if !self.exists() {
            return Err(MontageError::ProjectNotFound {
                path: self.path.clone(),
            });
        }
        let project: Project = read_json(&self.project_file())?;
        project.validate()?;
        Ok(project)
    }

    /// Read `history.json`, falling back to a fresh history seeded from the
    /// project when the file is missing or no longer matches the project.
    pub fn load_history(&self, project: &Project, max_history_size: usize) -> Result<History<Vec<Layer>>> {
        let history_file = self.history_file();
        if !history_file.exists() {
            return Ok(History::new(project.layers.clone(), max_history_size));
        }

        let record: HistoryRecord<Vec<Layer>> = read_json(&history_file)?;
        let mut history = record.into_history()?;
        if history.current() != &project.layers {
            warn!(
                "History in {} does not match the project layers; starting a new history",
                history_file.display()
            );
            history.reset(project.layers.clone());
        }
        history.set_max_entries(max_history_size);
        Ok(history)
    }

    /// Write `project.json` and `history.json`.
    pub fn save(&self, project: &Project, history: &History<Vec<Layer>>) -> Result<()> {
        write_json(&self.project_file(), project)?;
        write_json(&self.history_file(), &HistoryRecord::from(history))?;
        Ok(())
    }

    /// Open the project as an editing session.
    ///
    /// The playhead and selection are restored from the stored editor state.
    pub fn open_session(&self, config: EditorConfig) -> Result<(Project, EditorSession)> {
        let project = self.load_project()?;
        let history = self.load_history(&project, config.max_history_size)?;

        let mut session = EditorSession::with_history(config, history, project.duration_in_frames);
        session.playhead_mut().seek(project.editor.current_frame);
        if let Some(id) = &project.editor.selected_layer_id {
            if session.layer(id).is_some() {
                session.select_layer(Some(id.clone()))?;
            }
        }
        Ok((project, session))
    }

    /// Copy the session back into `project` and write both files.
    pub fn store_session(&self, project: &mut Project, session: &EditorSession) -> Result<()> {
        project.layers = session.layers().to_vec();
        project.editor = EditorState {
            current_frame: session.playhead().current_frame(),
            selected_layer_id: session.selected_layer().cloned(),
        };
        project.modified_at = Utc::now();
        self.save(project, session.history())
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| MontageError::FileReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(serde_json::from_str(&content)?)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content).map_err(|e| MontageError::FileWriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayerDefaults;
    use crate::layers::LayerFactory;
    use tempfile::TempDir;

    fn project_with_text() -> Project {
        let defaults = LayerDefaults::default();
        let layer = LayerFactory::new(&defaults).text(&[], 0, 300).unwrap();
        Project::new("Promo", 300, 30).with_layers(vec![layer])
    }

    #[test]
    fn test_props_json_shape() {
        let project = project_with_text().with_template(12);
        let value = serde_json::to_value(project.props()).unwrap();
        assert_eq!(value["duration"], 300);
        assert_eq!(value["templateId"], 12);
        assert_eq!(value["layers"][0]["type"], "text");
    }

    #[test]
    fn test_unsaved_changes_ignore_editor_state() {
        let mut project = project_with_text();
        assert!(project.has_unsaved_changes().unwrap());

        project.mark_saved(7, "https://cdn.example.com/7.mp4").unwrap();
        assert!(!project.has_unsaved_changes().unwrap());

        project.editor.current_frame = 120;
        assert!(!project.has_unsaved_changes().unwrap());

        project.layers[0].common_mut().opacity = 0.3;
        assert!(project.has_unsaved_changes().unwrap());
    }

    #[test]
    fn test_saved_floats_reload_unchanged() {
        let dir = TempDir::new().unwrap();
        let store = ProjectDir::new(dir.path());
        let mut project = project_with_text();
        project.layers[0].common_mut().rotation = 1.23456789e-204;
        project.layers[0].common_mut().opacity = 0.1 + 0.2;
        project.mark_saved(3, "https://cdn.example.com/3.mp4").unwrap();
        store.create(&project, 50).unwrap();

        let reloaded = store.load_project().unwrap();
        assert_eq!(reloaded.layers, project.layers);
        assert!(!reloaded.has_unsaved_changes().unwrap());
    }

    #[test]
    fn test_create_refuses_existing_project() {
        let dir = TempDir::new().unwrap();
        let store = ProjectDir::new(dir.path().join("promo"));
        let project = project_with_text();

        store.create(&project, 50).unwrap();
        let err = store.create(&project, 50).unwrap_err();
        assert_eq!(err.error_code(), "PROJECT_ALREADY_EXISTS");
    }

    #[test]
    fn test_load_missing_project() {
        let dir = TempDir::new().unwrap();
        let err = ProjectDir::new(dir.path()).load_project().unwrap_err();
        assert_eq!(err.error_code(), "PROJECT_NOT_FOUND");
    }

    #[test]
    fn test_unknown_schema_version_is_rejected() {
        let mut project = project_with_text();
        project.schema_version = "9.0.0".to_string();
        let err = project.validate().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_SCHEMA_VERSION");
    }

    #[test]
    fn test_mismatched_history_is_replaced() {
        let dir = TempDir::new().unwrap();
        let store = ProjectDir::new(dir.path());
        let mut project = project_with_text();
        store.create(&project, 50).unwrap();

        // Edit project.json behind the history's back.
        project.layers.clear();
        write_json(&store.project_file(), &project).unwrap();

        let history = store.load_history(&project, 50).unwrap();
        assert!(history.current().is_empty());
        assert!(!history.can_undo());
    }
}
