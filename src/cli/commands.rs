//! CLI Command Implementations
//!
//! Every editing command opens the project directory as a session, runs one
//! operation, prints the resulting notices and stores the session back.

use std::path::Path;

use log::info;

use super::MediaArgs;
use crate::config::EditorConfig;
use crate::editor::EditorSession;
use crate::error::Result;
use crate::layers::{Layer, LayerId, LayerPatch, MediaSource};
use crate::state::{Project, ProjectDir};

/// Create a new project directory.
pub fn create_project(
    path: &Path,
    config: &EditorConfig,
    title: &str,
    frames: Option<u32>,
    fps: Option<u32>,
    template: Option<u32>,
) -> Result<()> {
    info!("Creating new project at: {}", path.display());

    let mut project = Project::new(
        title,
        frames.unwrap_or(config.default_total_frames),
        fps.unwrap_or(config.fps),
    );
    project.template_id = template;
    ProjectDir::new(path).create(&project, config.max_history_size)?;

    println!("Project created: {}", path.display());
    println!(
        "Timeline: {} frames at {} fps",
        project.duration_in_frames, project.fps
    );
    Ok(())
}

/// Print the project and its layers.
pub fn show(path: &Path, config: &EditorConfig, json: bool) -> Result<()> {
    let (project, session) = ProjectDir::new(path).open_session(config.clone())?;

    if json {
        let mut props = project.props();
        props.layers = session.layers().to_vec();
        println!("{}", serde_json::to_string_pretty(&props)?);
        return Ok(());
    }

    println!("Project: {}", project.title);
    if let Some(template) = project.template_id {
        println!("Template: {}", template);
    }
    println!(
        "Timeline: {} frames at {} fps | Playhead: {} ({})",
        project.duration_in_frames,
        project.fps,
        session.playhead().current_frame(),
        session.playhead().state()
    );
    match project.remote.project_id {
        Some(id) if project.has_unsaved_changes()? => println!("Remote: #{} (unsaved changes)", id),
        Some(id) => println!("Remote: #{} (saved)", id),
        None => println!("Remote: not saved"),
    }

    println!("{:-<72}", "");
    if session.layers().is_empty() {
        println!("No layers.");
    }
    for (index, layer) in session.layers().iter().enumerate() {
        let marker = if session.selected_layer() == Some(layer.id()) {
            ">>> "
        } else {
            "    "
        };
        println!(
            "{}{:>2} {:<5} {:<24} {:>5}..{:<5} {}{}",
            marker,
            index,
            layer.kind().label(),
            layer.name(),
            layer.start_frame(),
            layer.end_frame(),
            layer.id(),
            flags(layer)
        );
    }
    println!("{:-<72}", "");
    Ok(())
}

fn flags(layer: &Layer) -> String {
    let mut flags = Vec::new();
    if layer.is_background() {
        flags.push("background");
    }
    if layer.is_locked() {
        flags.push("locked");
    }
    if !layer.common().visible {
        flags.push("hidden");
    }
    if flags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", flags.join(", "))
    }
}

/// Add a text layer.
pub fn add_text(path: &Path, config: &EditorConfig, at: Option<u32>) -> Result<()> {
    edit(path, config, |session| {
        seek_if_given(session, at);
        let id = session.add_text_layer()?;
        println!("Added text layer {}", id);
        Ok(())
    })
}

/// Add an image layer, or the background image.
pub fn add_image(path: &Path, config: &EditorConfig, media: &MediaArgs, background: bool) -> Result<()> {
    edit(path, config, |session| {
        let id = if background {
            session.add_background_image(media_source(media))?
        } else {
            seek_if_given(session, media.at);
            session.add_image_layer(media_source(media))?
        };
        println!("Added image layer {}", id);
        Ok(())
    })
}

/// Add an audio layer.
pub fn add_audio(path: &Path, config: &EditorConfig, media: &MediaArgs) -> Result<()> {
    edit(path, config, |session| {
        seek_if_given(session, media.at);
        let id = session.add_audio_layer(media_source(media))?;
        println!("Added audio layer {}", id);
        Ok(())
    })
}

/// Add a video layer.
pub fn add_video(path: &Path, config: &EditorConfig, media: &MediaArgs) -> Result<()> {
    edit(path, config, |session| {
        seek_if_given(session, media.at);
        let id = session.add_video_layer(media_source(media))?;
        println!("Added video layer {}", id);
        Ok(())
    })
}

/// Merge a JSON patch into a layer.
pub fn update(path: &Path, config: &EditorConfig, id: &str, patch: &str) -> Result<()> {
    let patch = LayerPatch::from_json(patch)?;
    edit(path, config, |session| {
        session.update_layer(&LayerId::from(id), &patch)?;
        println!("Updated {} field(s)", patch.len());
        Ok(())
    })
}

/// Delete a layer.
pub fn delete(path: &Path, config: &EditorConfig, id: &str) -> Result<()> {
    edit(path, config, |session| session.delete_layer(&LayerId::from(id)))
}

/// Split a layer at `frame`, or at the playhead.
pub fn split(path: &Path, config: &EditorConfig, id: &str, frame: Option<u32>) -> Result<()> {
    edit(path, config, |session| {
        let frame = frame.unwrap_or_else(|| session.playhead().current_frame());
        let second = session.split_layer(&LayerId::from(id), frame)?;
        println!("Second part: {}", second);
        Ok(())
    })
}

/// Move the layer at `from` to `to`.
pub fn reorder(path: &Path, config: &EditorConfig, from: usize, to: usize) -> Result<()> {
    edit(path, config, |session| session.reorder_layers(from, to))
}

/// Move a layer one step toward the bottom (`up == true`) or the top.
pub fn move_layer(path: &Path, config: &EditorConfig, id: &str, up: bool) -> Result<()> {
    edit(path, config, |session| {
        let id = LayerId::from(id);
        let moved = if up {
            session.move_layer_up(&id)?
        } else {
            session.move_layer_down(&id)?
        };
        if !moved {
            println!("Layer is already at the {}", if up { "bottom" } else { "top" });
        }
        Ok(())
    })
}

/// Undo the last edit.
pub fn undo(path: &Path, config: &EditorConfig) -> Result<()> {
    edit(path, config, |session| {
        if !session.undo() {
            println!("Nothing to undo.");
        }
        Ok(())
    })
}

/// Redo the last undone edit.
pub fn redo(path: &Path, config: &EditorConfig) -> Result<()> {
    edit(path, config, |session| {
        if !session.redo() {
            println!("Nothing to redo.");
        }
        Ok(())
    })
}

/// Show edit history.
pub fn show_history(path: &Path, config: &EditorConfig) -> Result<()> {
    let (_, session) = ProjectDir::new(path).open_session(config.clone())?;
    let history = session.history();

    println!("Edit History:");
    println!("{:-<60}", "");
    for (i, snapshot) in history.entries().iter().enumerate() {
        let marker = if i == history.index() { ">>> " } else { "    " };
        println!(
            "{}{:>3}: {} ({})",
            marker,
            i,
            snapshot.label,
            snapshot.recorded_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    println!("{:-<60}", "");
    println!(
        "Undo: {} | Redo: {} | Cap: {}",
        history.index(),
        history.len() - 1 - history.index(),
        history.max_entries()
    );
    Ok(())
}

/// Select a layer, or clear the selection.
pub fn select(path: &Path, config: &EditorConfig, id: Option<&str>) -> Result<()> {
    edit(path, config, |session| session.select_layer(id.map(LayerId::from)))
}

/// Move the playhead.
pub fn seek(path: &Path, config: &EditorConfig, frame: u32) -> Result<()> {
    edit(path, config, |session| {
        session.playhead_mut().seek(frame);
        println!("Playhead at frame {}", session.playhead().current_frame());
        Ok(())
    })
}

/// Render the project and save it to the backend.
#[cfg(feature = "remote")]
pub async fn save(path: &Path, config: &EditorConfig, composition: Option<&str>) -> Result<()> {
    use crate::remote::{ProjectSaver, RemoteClient};

    let store = ProjectDir::new(path);
    let (mut project, session) = store.open_session(config.clone())?;
    project.layers = session.layers().to_vec();

    let client = RemoteClient::new(&config.remote)?;
    client.set_token(std::env::var(ENV_TOKEN).ok()).await;

    let composition = composition.unwrap_or(config.remote.composition_id.as_str());
    let outcome = ProjectSaver::new(&client, composition).save(&mut project).await?;
    println!("{}", outcome.message());
    if let Some(url) = &project.remote.video_url {
        println!("Video: {}", url);
    }
    store.store_session(&mut project, &session)
}

/// Environment variable holding the backend access token.
#[cfg(feature = "remote")]
pub const ENV_TOKEN: &str = "MONTAGE_TOKEN";

/// Open a session, apply `op`, print notices and store the session.
///
/// Nothing is written when `op` fails.
fn edit<T>(
    path: &Path,
    config: &EditorConfig,
    op: impl FnOnce(&mut EditorSession) -> Result<T>,
) -> Result<T> {
    let store = ProjectDir::new(path);
    let (mut project, mut session) = store.open_session(config.clone())?;

    let outcome = op(&mut session);
    for notice in session.drain_notices() {
        println!("{}", notice);
    }
    let value = outcome?;

    store.store_session(&mut project, &session)?;
    Ok(value)
}

fn seek_if_given(session: &mut EditorSession, frame: Option<u32>) {
    if let Some(frame) = frame {
        session.playhead_mut().seek(frame);
    }
}

/// The file name defaults to the last segment of `src`.
fn media_source(media: &MediaArgs) -> MediaSource {
    let file_name = media.name.clone().or_else(|| {
        media
            .src
            .rsplit(|c| c == '/' || c == '\\')
            .next()
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
    });
    let source = MediaSource::new(media.src.as_str());
    match file_name {
        Some(name) => source.with_file_name(name),
        None => source,
    }
}
