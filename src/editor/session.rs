//! Editor Session
//!
//! Owns everything one open project needs while it is being edited: the
//! undo history of layer lists, the selection, the playhead and the notice
//! log. Every edit computes a new layer list with [`super::operations`] and
//! commits it as exactly one history entry; a rejected edit commits nothing.

use log::{debug, info, warn};

use super::notice::{Notice, NoticeLog};
use super::operations::{self, Placement};
use super::playhead::Playhead;
use crate::config::EditorConfig;
use crate::error::{MontageError, Result};
use crate::layers::{Layer, LayerFactory, LayerId, LayerKind, LayerPatch, MediaSource};
use crate::state::history::History;

/// State of one editing session.
#[derive(Debug, Clone)]
pub struct EditorSession {
    config: EditorConfig,
    history: History<Vec<Layer>>,
    selected: Option<LayerId>,
    playhead: Playhead,
    notices: NoticeLog,
}

impl EditorSession {
    /// Open a session on `layers` with a fresh history.
    pub fn new(config: EditorConfig, layers: Vec<Layer>, total_frames: u32) -> Self {
        let history = History::new(layers, config.max_history_size);
        Self::with_history(config, history, total_frames)
    }

    /// Resume a session from an existing history.
    pub fn with_history(config: EditorConfig, history: History<Vec<Layer>>, total_frames: u32) -> Self {
        let playhead = Playhead::new(total_frames, config.fps);
        let notices = NoticeLog::new(config.notice_capacity);
        Self {
            config,
            history,
            selected: None,
            playhead,
            notices,
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// The current layer list, bottom to top.
    pub fn layers(&self) -> &[Layer] {
        self.history.current()
    }

    pub fn layer(&self, id: &LayerId) -> Option<&Layer> {
        self.layers().iter().find(|l| l.id() == id)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &History<Vec<Layer>> {
        &self.history
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn selected_layer(&self) -> Option<&LayerId> {
        self.selected.as_ref()
    }

    /// Select a layer, or clear the selection with `None`.
    pub fn select_layer(&mut self, id: Option<LayerId>) -> Result<()> {
        if let Some(id) = &id {
            if self.layer(id).is_none() {
                return self.reject(MontageError::LayerNotFound { id: id.to_string() });
            }
        }
        self.selected = id;
        Ok(())
    }

    pub fn playhead(&self) -> &Playhead {
        &self.playhead
    }

    pub fn playhead_mut(&mut self) -> &mut Playhead {
        &mut self.playhead
    }

    pub fn notices(&self) -> &NoticeLog {
        &self.notices
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    // ========================================================================
    // Adding layers
    // ========================================================================

    /// Add a placeholder text layer at the playhead and select it.
    pub fn add_text_layer(&mut self) -> Result<LayerId> {
        let (frame, total) = self.cursor();
        let layer = LayerFactory::new(&self.config.layers).text(self.layers(), frame, total);
        self.add_layer(layer, Placement::Top, None)
    }

    /// Add an image layer at the playhead and select it.
    pub fn add_image_layer(&mut self, source: MediaSource) -> Result<LayerId> {
        let (frame, total) = self.cursor();
        let layer =
            LayerFactory::new(&self.config.layers).image(self.layers(), &source, frame, total);
        self.add_layer(layer, Placement::Top, None)
    }

    /// Add a background image beneath every other layer and select it.
    ///
    /// The background covers the whole timeline, wherever the playhead is.
    pub fn add_background_image(&mut self, source: MediaSource) -> Result<LayerId> {
        let total = self.playhead.total_frames();
        let layer = LayerFactory::new(&self.config.layers).background(&source, total);
        self.add_layer(layer, Placement::Bottom, None)
    }

    /// Add an audio layer at the playhead and select it.
    pub fn add_audio_layer(&mut self, source: MediaSource) -> Result<LayerId> {
        let (frame, total) = self.cursor();
        let layer =
            LayerFactory::new(&self.config.layers).audio(self.layers(), &source, frame, total);
        self.add_layer(layer, Placement::Top, Some("Audio added"))
    }

    /// Add a video layer at the playhead, beneath every other layer, and select it.
    pub fn add_video_layer(&mut self, source: MediaSource) -> Result<LayerId> {
        let (frame, total) = self.cursor();
        let layer =
            LayerFactory::new(&self.config.layers).video(self.layers(), &source, frame, total);
        self.add_layer(layer, Placement::Bottom, Some("Video added"))
    }

    fn cursor(&self) -> (u32, u32) {
        (self.playhead.current_frame(), self.playhead.total_frames())
    }

    fn add_layer(
        &mut self,
        layer: Result<Layer>,
        placement: Placement,
        notice: Option<&str>,
    ) -> Result<LayerId> {
        let layer = match layer {
            Ok(layer) => layer,
            Err(e) => return self.reject(e),
        };
        let id = layer.id().clone();
        let label = format!("Add {} layer '{}'", layer.kind(), layer.name());

        let new_layers = operations::insert_layer(self.layers(), layer, placement);
        self.commit(label, new_layers);
        self.selected = Some(id.clone());
        if let Some(message) = notice {
            self.notices.success(message);
        }
        Ok(id)
    }

    // ========================================================================
    // Editing layers
    // ========================================================================

    /// Shallow-merge `patch` into one layer.
    pub fn update_layer(&mut self, id: &LayerId, patch: &LayerPatch) -> Result<()> {
        debug!("update_layer {} ({} fields)", id, patch.len());
        match operations::update_layer(self.layers(), id, patch) {
            Ok(new_layers) => {
                let label = format!("Update {}", self.describe(id));
                self.commit(label, new_layers);
                Ok(())
            }
            Err(e) => self.reject(e),
        }
    }

    /// Delete a layer and clear the selection.
    pub fn delete_layer(&mut self, id: &LayerId) -> Result<()> {
        match operations::delete_layer(self.layers(), id) {
            Ok(new_layers) => {
                let label = format!("Delete {}", self.describe(id));
                self.commit(label, new_layers);
                self.selected = None;
                self.notices.success("Layer deleted");
                Ok(())
            }
            Err(e) => self.reject(e),
        }
    }

    /// Split a layer at `frame` and select the second part.
    ///
    /// Returns the id of the second part.
    pub fn split_layer(&mut self, id: &LayerId, frame: u32) -> Result<LayerId> {
        let second_id = LayerId::generate();
        match operations::split_layer(self.layers(), id, frame, second_id.clone()) {
            Ok(new_layers) => {
                let label = format!("Split {} at frame {}", self.describe(id), frame);
                self.commit(label, new_layers);
                self.selected = Some(second_id.clone());
                self.notices.success("Layer split successfully");
                Ok(second_id)
            }
            Err(e) => self.reject(e),
        }
    }

    /// Move the layer at `from` to `to`.
    ///
    /// Out-of-range or equal indices are refused without a notice.
    pub fn reorder_layers(&mut self, from: usize, to: usize) -> Result<()> {
        match operations::reorder_layers(self.layers(), from, to) {
            Ok(new_layers) => {
                let name = self.layers()[from].name();
                let label = format!("Move '{}' from {} to {}", name, from, to);
                self.commit(label, new_layers);
                Ok(())
            }
            Err(e @ MontageError::InvalidReorder { .. }) => {
                debug!("Ignoring reorder: {}", e);
                Err(e)
            }
            Err(e) => self.reject(e),
        }
    }

    /// Move a layer one step toward the bottom of the stack.
    ///
    /// Returns false when it is already first.
    pub fn move_layer_up(&mut self, id: &LayerId) -> Result<bool> {
        let moved = operations::move_layer_up(self.layers(), id);
        self.commit_move(id, "up", moved)
    }

    /// Move a layer one step toward the top of the stack.
    ///
    /// Returns false when it is already last.
    pub fn move_layer_down(&mut self, id: &LayerId) -> Result<bool> {
        let moved = operations::move_layer_down(self.layers(), id);
        self.commit_move(id, "down", moved)
    }

    fn commit_move(
        &mut self,
        id: &LayerId,
        direction: &str,
        moved: Result<Option<Vec<Layer>>>,
    ) -> Result<bool> {
        match moved {
            Ok(Some(new_layers)) => {
                let label = format!("Move {} {}", self.describe(id), direction);
                self.commit(label, new_layers);
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(e) => self.reject(e),
        }
    }

    // ========================================================================
    // History navigation
    // ========================================================================

    /// Revert the last edit. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let label = self.history.undo_label().map(str::to_string);
        if !self.history.undo() {
            return false;
        }
        if let Some(label) = label {
            info!("Undone: {}", label);
            self.notices.info(format!("Undone: {}", label));
        }
        self.drop_stale_selection();
        true
    }

    /// Re-apply the last undone edit. Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let label = self.history.redo_label().map(str::to_string);
        if !self.history.redo() {
            return false;
        }
        if let Some(label) = label {
            info!("Redone: {}", label);
            self.notices.info(format!("Redone: {}", label));
        }
        self.drop_stale_selection();
        true
    }

    /// Show `layers` without recording an edit.
    pub fn apply_snapshot(&mut self, layers: Vec<Layer>) {
        self.history.apply_snapshot(layers);
        self.drop_stale_selection();
    }

    /// Replace the whole document, e.g. when another project is opened.
    ///
    /// History is reset so undo cannot cross into the previous document.
    pub fn load_layers(&mut self, layers: Vec<Layer>, total_frames: u32) {
        info!("Loading {} layers ({} frames)", layers.len(), total_frames);
        self.history.reset(layers);
        self.selected = None;
        self.playhead.set_total_frames(total_frames);
        self.playhead.pause();
        self.playhead.seek(0);
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn commit(&mut self, label: String, layers: Vec<Layer>) {
        debug!("Commit: {} ({} layers)", label, layers.len());
        self.history.commit_edit(label, layers);
    }

    fn reject<T>(&mut self, error: MontageError) -> Result<T> {
        warn!("Edit rejected: {}", error);
        self.notices.error(error.user_message());
        Err(error)
    }

    fn drop_stale_selection(&mut self) {
        if let Some(id) = &self.selected {
            if self.layer(id).is_none() {
                self.selected = None;
            }
        }
    }

    /// "text layer 'Title'" for history labels.
    fn describe(&self, id: &LayerId) -> String {
        match self.layer(id) {
            Some(layer) => format!("{} layer '{}'", kind_word(layer.kind()), layer.name()),
            None => format!("layer {}", id),
        }
    }
}

fn kind_word(kind: LayerKind) -> &'static str {
    match kind {
        LayerKind::Text => "text",
        LayerKind::Image => "image",
        LayerKind::Audio => "audio",
        LayerKind::Video => "video",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::notice::Severity;

    fn session() -> EditorSession {
        EditorSession::new(EditorConfig::default(), Vec::new(), 300)
    }

    #[test]
    fn test_add_text_selects_new_layer() {
        let mut session = session();
        let id = session.add_text_layer().unwrap();

        assert_eq!(session.layers().len(), 1);
        assert_eq!(session.selected_layer(), Some(&id));
        assert!(session.can_undo());
        assert_eq!(
            session.history().undo_label(),
            Some("Add Text layer 'Text 1'")
        );
    }

    #[test]
    fn test_add_uses_playhead_position() {
        let mut session = session();
        session.playhead_mut().seek(250);
        let id = session.add_text_layer().unwrap();
        assert_eq!(session.layer(&id).unwrap().frame_range(), 250..300);
    }

    #[test]
    fn test_video_goes_to_the_bottom() {
        let mut session = session();
        session.add_text_layer().unwrap();
        let video = session
            .add_video_layer(MediaSource::new("clip.mp4").with_file_name("clip.mp4"))
            .unwrap();

        assert_eq!(session.layers()[0].id(), &video);
        assert_eq!(session.layers()[0].name(), "clip");
        assert_eq!(session.notices().latest().unwrap().message, "Video added");
    }

    #[test]
    fn test_rejection_records_error_notice_only() {
        let mut session = session();
        let id = session.add_text_layer().unwrap();
        let len_before = session.history().len();

        let err = session.split_layer(&id, 0).unwrap_err();

        assert_eq!(err.error_code(), "SPLIT_OUT_OF_RANGE");
        assert_eq!(session.history().len(), len_before);
        let notice = session.notices().latest().unwrap();
        assert_eq!(notice.severity, Severity::Error);
        assert_eq!(notice.message, "Split point must be within layer duration");
    }

    #[test]
    fn test_invalid_reorder_is_silent() {
        let mut session = session();
        session.add_text_layer().unwrap();
        session.drain_notices();

        assert!(session.reorder_layers(0, 0).is_err());
        assert!(session.reorder_layers(0, 7).is_err());
        assert!(session.notices().is_empty());
    }

    #[test]
    fn test_undo_clears_selection_of_removed_layer() {
        let mut session = session();
        let id = session.add_text_layer().unwrap();
        assert_eq!(session.selected_layer(), Some(&id));

        assert!(session.undo());
        assert!(session.selected_layer().is_none());
        assert!(session.layers().is_empty());

        assert!(session.redo());
        assert_eq!(session.layers().len(), 1);
    }

    #[test]
    fn test_load_layers_resets_history() {
        let mut session = session();
        session.add_text_layer().unwrap();
        session.playhead_mut().seek(100);

        session.load_layers(Vec::new(), 600);

        assert!(!session.can_undo());
        assert!(!session.can_redo());
        assert_eq!(session.playhead().current_frame(), 0);
        assert_eq!(session.playhead().total_frames(), 600);
    }

    #[test]
    fn test_select_unknown_layer_is_rejected() {
        let mut session = session();
        assert!(session.select_layer(Some(LayerId::new("nope"))).is_err());
        assert!(session.select_layer(None).is_ok());
    }
}
