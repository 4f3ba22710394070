//! State Management Module
//!
//! Provides the undo/redo history and the on-disk project store.

pub mod history;
pub mod project;

pub use history::{History, HistoryRecord, Snapshot};
pub use project::{
    EditorState, Project, ProjectDir, ProjectProps, RemoteLink, CURRENT_SCHEMA_VERSION,
};
