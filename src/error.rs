//! Error handling for Montage
//!
//! Two families live in one enum: *rejections* (an edit refused before
//! anything was committed, shown to the user as a transient notice) and
//! *faults* (I/O, serialization, backend failures).

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Montage operations
pub type Result<T> = std::result::Result<T, MontageError>;

/// Main error type for Montage operations
#[derive(Error, Debug)]
pub enum MontageError {
    // Edit Rejections
    #[error("Layer not found: {id}")]
    LayerNotFound { id: String },

    #[error("Layer '{name}' is locked and cannot be {action}")]
    LayerLocked { name: String, action: &'static str },

    #[error("Background layer cannot be {action}")]
    BackgroundLayerProtected { action: &'static str },

    #[error("Split frame {frame} is outside the layer window ({start_frame}..{end_frame})")]
    SplitOutOfRange {
        frame: u32,
        start_frame: u32,
        end_frame: u32,
    },

    #[error("Cannot move layer from index {from} to {to} in a list of {len}")]
    InvalidReorder { from: usize, to: usize, len: usize },

    #[error("Invalid layer update: {reason}")]
    InvalidUpdate { reason: String },

    #[error("No room on the timeline at frame {frame} (total {total_frames} frames)")]
    NoRoomOnTimeline { frame: u32, total_frames: u32 },

    // Configuration Errors
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // Project Errors
    #[error("Project already exists: {path}")]
    ProjectAlreadyExists { path: PathBuf },

    #[error("Project not found: {path}")]
    ProjectNotFound { path: PathBuf },

    #[error("Invalid project schema version: {version}")]
    InvalidSchemaVersion { version: String },

    #[error("Invalid history: {reason}")]
    InvalidHistory { reason: String },

    #[error("Failed to read file: {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}: {source}")]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Backend Errors
    #[error("Backend request failed ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Not signed in: {reason}")]
    Unauthenticated { reason: String },

    #[cfg(feature = "remote")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MontageError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            MontageError::LayerNotFound { .. } => "LAYER_NOT_FOUND",
            MontageError::LayerLocked { .. } => "LAYER_LOCKED",
            MontageError::BackgroundLayerProtected { .. } => "BACKGROUND_LAYER_PROTECTED",
            MontageError::SplitOutOfRange { .. } => "SPLIT_OUT_OF_RANGE",
            MontageError::InvalidReorder { .. } => "INVALID_REORDER",
            MontageError::InvalidUpdate { .. } => "INVALID_UPDATE",
            MontageError::NoRoomOnTimeline { .. } => "NO_ROOM_ON_TIMELINE",
            MontageError::InvalidConfig { .. } => "INVALID_CONFIG",
            MontageError::ProjectAlreadyExists { .. } => "PROJECT_ALREADY_EXISTS",
            MontageError::ProjectNotFound { .. } => "PROJECT_NOT_FOUND",
            MontageError::InvalidSchemaVersion { .. } => "INVALID_SCHEMA_VERSION",
            MontageError::InvalidHistory { .. } => "INVALID_HISTORY",
            MontageError::FileReadError { .. } => "FILE_READ_ERROR",
            MontageError::FileWriteError { .. } => "FILE_WRITE_ERROR",
            MontageError::Backend { .. } => "BACKEND_ERROR",
            MontageError::Unauthenticated { .. } => "UNAUTHENTICATED",
            #[cfg(feature = "remote")]
            MontageError::Http(_) => "HTTP_ERROR",
            MontageError::Io(_) => "IO_ERROR",
            MontageError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// True for edits refused by a precondition check.
    ///
    /// A rejection guarantees that nothing was committed to history.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            MontageError::LayerNotFound { .. }
                | MontageError::LayerLocked { .. }
                | MontageError::BackgroundLayerProtected { .. }
                | MontageError::SplitOutOfRange { .. }
                | MontageError::InvalidReorder { .. }
                | MontageError::InvalidUpdate { .. }
                | MontageError::NoRoomOnTimeline { .. }
        )
    }

    /// Returns true if this error indicates the operation can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            MontageError::Backend { status, .. } => *status >= 500,
            #[cfg(feature = "remote")]
            MontageError::Http(_) => true,
            MontageError::FileWriteError { .. } => true,
            _ => false,
        }
    }

    /// Returns a user-friendly recovery suggestion.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            MontageError::LayerLocked { .. } => Some("Unlock the layer first."),
            MontageError::SplitOutOfRange { .. } => {
                Some("Move the playhead inside the layer before splitting.")
            }
            MontageError::NoRoomOnTimeline { .. } => {
                Some("Move the playhead back or extend the project duration.")
            }
            MontageError::ProjectNotFound { .. } => {
                Some("Create the project first with 'montage-cli new <path>'.")
            }
            MontageError::ProjectAlreadyExists { .. } => {
                Some("Choose another directory or open the existing project.")
            }
            MontageError::Unauthenticated { .. } => Some("Sign in again and retry."),
            MontageError::Backend { status, .. } if *status >= 500 => {
                Some("The backend is unavailable. Try again in a moment.")
            }
            _ => None,
        }
    }

    /// The short message shown to the user as a notice.
    pub fn user_message(&self) -> String {
        match self {
            MontageError::LayerNotFound { .. } => "Layer not found".to_string(),
            MontageError::LayerLocked { action, .. } => format!("Cannot {} locked layer", action_verb(action)),
            MontageError::BackgroundLayerProtected { action } => {
                format!("Cannot {} background layer", action_verb(action))
            }
            MontageError::SplitOutOfRange { .. } => {
                "Split point must be within layer duration".to_string()
            }
            MontageError::NoRoomOnTimeline { .. } => {
                "No room left on the timeline at the playhead".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Maps the participle used in error text back to the verb used in notices.
fn action_verb(action: &str) -> &str {
    match action {
        "deleted" => "delete",
        "split" => "split",
        "reordered" => "reorder",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = MontageError::LayerNotFound {
            id: "abc".to_string(),
        };
        assert_eq!(err.error_code(), "LAYER_NOT_FOUND");
        assert!(err.is_rejection());
    }

    #[test]
    fn test_user_messages_match_notices() {
        let err = MontageError::BackgroundLayerProtected { action: "deleted" };
        assert_eq!(err.user_message(), "Cannot delete background layer");

        let err = MontageError::LayerLocked {
            name: "Text 1".to_string(),
            action: "reordered",
        };
        assert_eq!(err.user_message(), "Cannot reorder locked layer");

        let err = MontageError::SplitOutOfRange {
            frame: 0,
            start_frame: 0,
            end_frame: 90,
        };
        assert_eq!(err.user_message(), "Split point must be within layer duration");
    }

    #[test]
    fn test_faults_are_not_rejections() {
        let err = MontageError::InvalidHistory {
            reason: "index out of range".to_string(),
        };
        assert!(!err.is_rejection());
        assert!(!err.is_retryable());

        let err = MontageError::Backend {
            status: 503,
            message: "down".to_string(),
        };
        assert!(err.is_retryable());
        assert!(err.recovery_suggestion().is_some());
    }
}
