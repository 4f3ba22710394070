//! Montage - layer timeline editing core for video templates
//!
//! A project is a list of timed layers (text, image, audio, video) rendered
//! bottom to top. Every edit produces a complete new layer list that is
//! recorded in a bounded undo/redo history.
//!
//! # Architecture
//!
//! - [`layers`]: the layer data model, construction defaults and patches
//! - [`editor`]: pure list operations plus the stateful editing session
//! - [`state`]: undo/redo history and the on-disk project directory
//! - [`remote`]: backend wire types, and with the `remote` feature the
//!   render/save client and token refresh service

pub mod cli;
pub mod config;
pub mod editor;
pub mod error;
pub mod layers;
pub mod remote;
pub mod state;

pub use config::EditorConfig;
pub use editor::{EditorSession, Notice, Severity};
pub use error::{MontageError, Result};
pub use layers::{Layer, LayerId, LayerKind, LayerPatch, MediaSource};
pub use state::{History, Project, ProjectDir};
