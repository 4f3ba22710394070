//! Construction of new layers with editor defaults

use super::id::LayerId;
use super::model::{
    Animation, AudioLayer, ImageLayer, Layer, LayerCommon, LayerKind, ObjectFit, Position, Size,
    TextAlign, TextLayer, VideoLayer,
};
use crate::config::LayerDefaults;
use crate::error::{MontageError, Result};

/// Source reference of an uploaded media file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSource {
    /// URL, path or data URL the renderer loads the media from
    pub src: String,
    /// Name of the file the user picked, if known
    pub file_name: Option<String>,
}

impl MediaSource {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// File name without its last extension, if anything is left.
    pub fn display_name(&self) -> Option<&str> {
        let name = strip_extension(self.file_name.as_deref()?);
        (!name.is_empty()).then_some(name)
    }
}

/// Remove a trailing `.ext` ("clip.final.mp4" -> "clip.final").
fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot) if dot + 1 < name.len() && !name[dot + 1..].contains('/') => &name[..dot],
        _ => name,
    }
}

/// Frame window for a new layer starting at the playhead.
///
/// The window is `[current_frame, current_frame + duration)` clipped to the
/// timeline; an empty window is rejected.
pub fn time_window(current_frame: u32, duration: u32, total_frames: u32) -> Result<(u32, u32)> {
    let end = current_frame.saturating_add(duration).min(total_frames);
    if end <= current_frame {
        return Err(MontageError::NoRoomOnTimeline {
            frame: current_frame,
            total_frames,
        });
    }
    Ok((current_frame, end))
}

/// Builds new layers from the configured defaults.
#[derive(Debug, Clone, Copy)]
pub struct LayerFactory<'a> {
    defaults: &'a LayerDefaults,
}

impl<'a> LayerFactory<'a> {
    pub fn new(defaults: &'a LayerDefaults) -> Self {
        Self { defaults }
    }

    /// A placeholder text layer with a fade-in entrance.
    pub fn text(&self, existing: &[Layer], current_frame: u32, total_frames: u32) -> Result<Layer> {
        let window = time_window(current_frame, self.defaults.text_duration, total_frames)?;
        let name = numbered_name(existing, LayerKind::Text);

        Ok(Layer::Text(TextLayer {
            common: self.common(name, window, Size::new(70.0, 15.0)),
            content: self.defaults.text_content.clone(),
            font_family: self.defaults.font_family.clone(),
            font_size: 4.0,
            font_color: "#ffffff".to_string(),
            font_weight: "normal".to_string(),
            font_style: "normal".to_string(),
            text_align: TextAlign::Center,
            line_height: 1.4,
            text_outline: false,
            outline_color: "#000000".to_string(),
            text_shadow: false,
            shadow_color: "#000000".to_string(),
            shadow_x: 0.0,
            shadow_y: 0.0,
            shadow_blur: 0.0,
            animation: Some(Animation::fade(self.defaults.entrance_duration)),
        }))
    }

    pub fn image(
        &self,
        existing: &[Layer],
        source: &MediaSource,
        current_frame: u32,
        total_frames: u32,
    ) -> Result<Layer> {
        let window = time_window(current_frame, self.defaults.image_duration, total_frames)?;
        let name = numbered_name(existing, LayerKind::Image);

        Ok(Layer::Image(ImageLayer {
            common: self.common(name, window, Size::new(40.0, 25.0)),
            src: source.src.clone(),
            is_background: false,
            object_fit: ObjectFit::Contain,
        }))
    }

    /// A background image covering the canvas for the whole timeline.
    pub fn background(&self, source: &MediaSource, total_frames: u32) -> Result<Layer> {
        let window = time_window(0, total_frames, total_frames)?;
        let name = source.display_name().unwrap_or("Background").to_string();

        Ok(Layer::Image(ImageLayer {
            common: self.common(name, window, Size::new(100.0, 100.0)),
            src: source.src.clone(),
            is_background: true,
            object_fit: ObjectFit::Cover,
        }))
    }

    pub fn audio(
        &self,
        existing: &[Layer],
        source: &MediaSource,
        current_frame: u32,
        total_frames: u32,
    ) -> Result<Layer> {
        let window = time_window(current_frame, self.defaults.audio_duration, total_frames)?;
        let name = media_name(existing, source, LayerKind::Audio);

        Ok(Layer::Audio(AudioLayer {
            common: self.common(name, window, Size::new(100.0, 10.0)),
            src: source.src.clone(),
            volume: 1.0,
            looped: false,
            fade_in: 0,
            fade_out: 0,
        }))
    }

    pub fn video(
        &self,
        existing: &[Layer],
        source: &MediaSource,
        current_frame: u32,
        total_frames: u32,
    ) -> Result<Layer> {
        let window = time_window(current_frame, self.defaults.video_duration, total_frames)?;
        let name = media_name(existing, source, LayerKind::Video);

        Ok(Layer::Video(VideoLayer {
            common: self.common(name, window, Size::new(60.0, 45.0)),
            src: source.src.clone(),
            volume: 0.8,
            looped: false,
            playback_rate: 1.0,
            object_fit: ObjectFit::Contain,
            filter: String::new(),
            fade_in: 0,
            fade_out: 0,
            animation: Some(Animation::fade(self.defaults.entrance_duration)),
        }))
    }

    fn common(&self, name: String, (start_frame, end_frame): (u32, u32), size: Size) -> LayerCommon {
        LayerCommon {
            id: LayerId::generate(),
            name,
            visible: true,
            locked: false,
            start_frame,
            end_frame,
            position: Position::CENTER,
            size,
            rotation: 0.0,
            opacity: 1.0,
        }
    }
}

/// "Text 3" when two text layers already exist.
fn numbered_name(existing: &[Layer], kind: LayerKind) -> String {
    let count = existing.iter().filter(|l| l.kind() == kind).count();
    format!("{} {}", kind.label(), count + 1)
}

fn media_name(existing: &[Layer], source: &MediaSource, kind: LayerKind) -> String {
    source
        .display_name()
        .map(str::to_string)
        .unwrap_or_else(|| numbered_name(existing, kind))
}
