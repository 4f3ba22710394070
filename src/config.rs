//! Editor configuration
//!
//! Every field has a default, so a config file only needs to name what it
//! changes. A few settings can also be overridden from the environment.

use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MontageError, Result};

/// Default maximum number of history snapshots to keep.
pub const DEFAULT_MAX_HISTORY_SIZE: usize = 50;

/// Default frame rate of new projects.
pub const DEFAULT_FPS: u32 = 30;

/// Default length of new projects, in frames (10 s at 30 fps).
pub const DEFAULT_TOTAL_FRAMES: u32 = 300;

/// Default number of notices kept for display.
pub const DEFAULT_NOTICE_CAPACITY: usize = 20;

/// Default backend location.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Environment variable overriding the backend location.
pub const ENV_API_URL: &str = "MONTAGE_API_URL";

/// Environment variable overriding the history cap.
pub const ENV_MAX_HISTORY: &str = "MONTAGE_MAX_HISTORY";

/// Environment variable overriding the HTTP timeout in milliseconds.
pub const ENV_HTTP_TIMEOUT_MS: &str = "MONTAGE_HTTP_TIMEOUT_MS";

/// Top-level editor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of snapshots kept in the undo history
    pub max_history_size: usize,
    /// Frame rate used for new projects
    pub fps: u32,
    /// Length of new projects in frames
    pub default_total_frames: u32,
    /// How many notices are kept before the oldest is dropped
    pub notice_capacity: usize,
    /// Defaults for newly added layers
    pub layers: LayerDefaults,
    /// Backend settings
    pub remote: RemoteConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_history_size: DEFAULT_MAX_HISTORY_SIZE,
            fps: DEFAULT_FPS,
            default_total_frames: DEFAULT_TOTAL_FRAMES,
            notice_capacity: DEFAULT_NOTICE_CAPACITY,
            layers: LayerDefaults::default(),
            remote: RemoteConfig::default(),
        }
    }
}

/// Defaults applied when a layer is added at the playhead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerDefaults {
    pub text_duration: u32,
    pub image_duration: u32,
    pub audio_duration: u32,
    pub video_duration: u32,
    /// Length of the fade-in entrance for text and video layers
    pub entrance_duration: u32,
    pub text_content: String,
    pub font_family: String,
}

impl Default for LayerDefaults {
    fn default() -> Self {
        Self {
            text_duration: 90,
            image_duration: 90,
            audio_duration: 150,
            video_duration: 150,
            entrance_duration: 30,
            text_content: "New Text".to_string(),
            font_family: "Roboto, sans-serif".to_string(),
        }
    }
}

/// Where the render / project backend lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub api_url: String,
    /// Composition rendered when saving a project
    pub composition_id: String,
    pub timeout_ms: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            composition_id: "DynamicLayerComposition".to_string(),
            timeout_ms: 300_000,
        }
    }
}

impl EditorConfig {
    /// Load settings from a JSON file, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| MontageError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: EditorConfig = serde_json::from_str(&content)?;
        config.with_env_overrides()
    }

    /// Defaults plus environment overrides.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// Apply `MONTAGE_*` environment overrides and validate the result.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(url) = env::var(ENV_API_URL) {
            self.remote.api_url = url;
        }
        if let Ok(value) = env::var(ENV_MAX_HISTORY) {
            self.max_history_size = parse_env(ENV_MAX_HISTORY, &value)?;
        }
        if let Ok(value) = env::var(ENV_HTTP_TIMEOUT_MS) {
            self.remote.timeout_ms = parse_env(ENV_HTTP_TIMEOUT_MS, &value)?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject settings the editor cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.max_history_size == 0 {
            return Err(invalid("max_history_size must be at least 1"));
        }
        if self.fps == 0 {
            return Err(invalid("fps must be at least 1"));
        }
        if self.default_total_frames == 0 {
            return Err(invalid("default_total_frames must be at least 1"));
        }
        let d = &self.layers;
        if [d.text_duration, d.image_duration, d.audio_duration, d.video_duration].contains(&0) {
            return Err(invalid("layer durations must be at least 1 frame"));
        }
        if self.remote.api_url.trim().is_empty() {
            return Err(invalid("remote.api_url must not be empty"));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| MontageError::InvalidConfig {
        reason: format!("{} has an invalid value '{}'", name, value),
    })
}

fn invalid(reason: &str) -> MontageError {
    MontageError::InvalidConfig {
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() {
        let config = EditorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_history_size, 50);
        assert_eq!(config.layers.text_duration, 90);
        assert_eq!(config.layers.video_duration, 150);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"max_history_size": 5, "layers": {{"text_duration": 60}}}}"#).unwrap();

        let config = EditorConfig::load(file.path()).unwrap();
        assert_eq!(config.max_history_size, 5);
        assert_eq!(config.layers.text_duration, 60);
        assert_eq!(config.layers.audio_duration, 150);
        assert_eq!(config.fps, DEFAULT_FPS);
    }

    #[test]
    fn test_zero_history_is_rejected() {
        let config = EditorConfig {
            max_history_size: 0,
            ..EditorConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = EditorConfig::load(Path::new("/nonexistent/montage.json")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_READ_ERROR");
    }
}
