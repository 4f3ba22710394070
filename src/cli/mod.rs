//! CLI Module
//!
//! Command-line interface for editing Montage project directories.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Montage - layer timeline editor for video templates
#[derive(Parser, Debug)]
#[command(name = "montage-cli")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Editor configuration file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Project directory to operate on
    #[arg(short, long, global = true, default_value = ".")]
    pub project: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new project directory
    #[command(name = "new")]
    New {
        /// Path for the new project
        path: PathBuf,

        /// Project title
        #[arg(short, long, default_value = "Untitled")]
        title: String,

        /// Timeline length in frames
        #[arg(long)]
        frames: Option<u32>,

        /// Frames per second
        #[arg(long)]
        fps: Option<u32>,

        /// Template the project starts from
        #[arg(long)]
        template: Option<u32>,
    },

    /// Print the project and its layers
    #[command(name = "show")]
    Show {
        /// Print the render props as JSON instead
        #[arg(long)]
        json: bool,
    },

    /// Add a text layer
    #[command(name = "add-text")]
    AddText {
        /// Frame to add the layer at (defaults to the playhead)
        #[arg(long)]
        at: Option<u32>,
    },

    /// Add an image layer
    #[command(name = "add-image")]
    AddImage {
        #[command(flatten)]
        media: MediaArgs,

        /// Add as the background image
        #[arg(long)]
        background: bool,
    },

    /// Add an audio layer
    #[command(name = "add-audio")]
    AddAudio {
        #[command(flatten)]
        media: MediaArgs,
    },

    /// Add a video layer
    #[command(name = "add-video")]
    AddVideo {
        #[command(flatten)]
        media: MediaArgs,
    },

    /// Merge a JSON object of fields into a layer
    #[command(name = "update")]
    Update {
        /// Layer id
        id: String,

        /// Fields to change, e.g. '{"opacity": 0.5}'
        patch: String,
    },

    /// Delete a layer
    #[command(name = "delete")]
    Delete {
        /// Layer id
        id: String,
    },

    /// Split a layer in two
    #[command(name = "split")]
    Split {
        /// Layer id
        id: String,

        /// Frame to split at (defaults to the playhead)
        frame: Option<u32>,
    },

    /// Move the layer at one index to another
    #[command(name = "reorder")]
    Reorder { from: usize, to: usize },

    /// Move a layer one step toward the bottom of the stack
    #[command(name = "move-up")]
    MoveUp {
        /// Layer id
        id: String,
    },

    /// Move a layer one step toward the top of the stack
    #[command(name = "move-down")]
    MoveDown {
        /// Layer id
        id: String,
    },

    /// Undo the last edit
    #[command(name = "undo")]
    Undo,

    /// Redo the last undone edit
    #[command(name = "redo")]
    Redo,

    /// Show edit history
    #[command(name = "history")]
    History,

    /// Select a layer, or clear the selection when no id is given
    #[command(name = "select")]
    Select {
        /// Layer id
        id: Option<String>,
    },

    /// Move the playhead
    #[command(name = "seek")]
    Seek { frame: u32 },

    /// Render and save the project to the backend
    #[cfg(feature = "remote")]
    #[command(name = "save")]
    Save {
        /// Composition to render
        #[arg(long)]
        composition: Option<String>,
    },
}

/// Arguments shared by the media commands.
#[derive(clap::Args, Debug)]
pub struct MediaArgs {
    /// URL or path the renderer loads the media from
    pub src: String,

    /// Original file name, used to name the layer
    #[arg(long)]
    pub name: Option<String>,

    /// Frame to add the layer at (defaults to the playhead)
    #[arg(long)]
    pub at: Option<u32>,
}
