//! Layer data model
//!
//! Every variant embeds [`LayerCommon`] (identity, visibility, timing and
//! geometry). The JSON form is internally tagged on `"type"` with camelCase
//! field names, which is the shape the render service consumes.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::id::LayerId;
use crate::error::{MontageError, Result};

/// Position of a layer's center, in percent of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Canvas center, where new layers are placed.
    pub const CENTER: Position = Position { x: 50.0, y: 50.0 };
}

/// Size of a layer, in percent of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Entrance animation played when the layer appears.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Animation {
    /// Animation name, e.g. "fade" or "slide-up"
    pub entrance: String,
    /// Duration of the entrance in frames
    pub entrance_duration: u32,
}

impl Animation {
    pub fn fade(duration: u32) -> Self {
        Self {
            entrance: "fade".to_string(),
            entrance_duration: duration,
        }
    }
}

/// How media is fitted into the layer box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectFit {
    #[default]
    Contain,
    Cover,
    Fill,
    None,
    ScaleDown,
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Fields shared by every layer variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerCommon {
    pub id: LayerId,
    pub name: String,
    pub visible: bool,
    pub locked: bool,
    /// First frame on which the layer is shown (inclusive)
    pub start_frame: u32,
    /// Frame at which the layer stops (exclusive)
    pub end_frame: u32,
    pub position: Position,
    pub size: Size,
    /// Rotation in degrees
    pub rotation: f64,
    /// Opacity in `[0, 1]`
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLayer {
    #[serde(flatten)]
    pub common: LayerCommon,
    pub content: String,
    pub font_family: String,
    /// Font size in percent of the canvas height
    pub font_size: f64,
    pub font_color: String,
    pub font_weight: String,
    pub font_style: String,
    pub text_align: TextAlign,
    pub line_height: f64,
    pub text_outline: bool,
    pub outline_color: String,
    pub text_shadow: bool,
    pub shadow_color: String,
    pub shadow_x: f64,
    pub shadow_y: f64,
    pub shadow_blur: f64,
    #[serde(default)]
    pub animation: Option<Animation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageLayer {
    #[serde(flatten)]
    pub common: LayerCommon,
    pub src: String,
    /// The background image may not be deleted, split or reordered
    #[serde(default)]
    pub is_background: bool,
    #[serde(default)]
    pub object_fit: ObjectFit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioLayer {
    #[serde(flatten)]
    pub common: LayerCommon,
    pub src: String,
    pub volume: f64,
    #[serde(rename = "loop")]
    pub looped: bool,
    /// Fade-in length in frames
    pub fade_in: u32,
    /// Fade-out length in frames
    pub fade_out: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoLayer {
    #[serde(flatten)]
    pub common: LayerCommon,
    pub src: String,
    pub volume: f64,
    #[serde(rename = "loop")]
    pub looped: bool,
    pub playback_rate: f64,
    #[serde(default)]
    pub object_fit: ObjectFit,
    /// CSS filter expression, empty for none
    #[serde(default)]
    pub filter: String,
    pub fade_in: u32,
    pub fade_out: u32,
    #[serde(default)]
    pub animation: Option<Animation>,
}

/// Discriminant of a [`Layer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Text,
    Image,
    Audio,
    Video,
}

impl LayerKind {
    /// Prefix used when naming new layers ("Text 1", "Video 2", ...).
    pub fn label(&self) -> &'static str {
        match self {
            LayerKind::Text => "Text",
            LayerKind::Image => "Image",
            LayerKind::Audio => "Audio",
            LayerKind::Video => "Video",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single timeline element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Layer {
    Text(TextLayer),
    Image(ImageLayer),
    Audio(AudioLayer),
    Video(VideoLayer),
}

impl Layer {
    pub fn common(&self) -> &LayerCommon {
        match self {
            Layer::Text(l) => &l.common,
            Layer::Image(l) => &l.common,
            Layer::Audio(l) => &l.common,
            Layer::Video(l) => &l.common,
        }
    }

    pub fn common_mut(&mut self) -> &mut LayerCommon {
        match self {
            Layer::Text(l) => &mut l.common,
            Layer::Image(l) => &mut l.common,
            Layer::Audio(l) => &mut l.common,
            Layer::Video(l) => &mut l.common,
        }
    }

    pub fn id(&self) -> &LayerId {
        &self.common().id
    }

    pub fn name(&self) -> &str {
        &self.common().name
    }

    pub fn kind(&self) -> LayerKind {
        match self {
            Layer::Text(_) => LayerKind::Text,
            Layer::Image(_) => LayerKind::Image,
            Layer::Audio(_) => LayerKind::Audio,
            Layer::Video(_) => LayerKind::Video,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.common().locked
    }

    /// Only an image layer flagged as background is protected.
    pub fn is_background(&self) -> bool {
        matches!(self, Layer::Image(image) if image.is_background)
    }

    pub fn start_frame(&self) -> u32 {
        self.common().start_frame
    }

    pub fn end_frame(&self) -> u32 {
        self.common().end_frame
    }

    /// Frames covered by the layer, end exclusive.
    pub fn frame_range(&self) -> Range<u32> {
        self.start_frame()..self.end_frame()
    }

    pub fn duration(&self) -> u32 {
        self.end_frame().saturating_sub(self.start_frame())
    }

    /// Whether the layer is on screen at `frame`.
    pub fn contains_frame(&self, frame: u32) -> bool {
        self.frame_range().contains(&frame)
    }

    /// Check the invariants every committed layer must satisfy.
    pub fn validate(&self) -> Result<()> {
        let common = self.common();
        if common.start_frame >= common.end_frame {
            return Err(MontageError::InvalidUpdate {
                reason: format!(
                    "startFrame ({}) must be before endFrame ({})",
                    common.start_frame, common.end_frame
                ),
            });
        }
        if !(0.0..=1.0).contains(&common.opacity) {
            return Err(MontageError::InvalidUpdate {
                reason: format!("opacity {} is outside [0, 1]", common.opacity),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_common(id: &str) -> LayerCommon {
        LayerCommon {
            id: LayerId::new(id),
            name: "Background".to_string(),
            visible: true,
            locked: false,
            start_frame: 0,
            end_frame: 300,
            position: Position::CENTER,
            size: Size::new(100.0, 100.0),
            rotation: 0.0,
            opacity: 1.0,
        }
    }

    fn background() -> Layer {
        Layer::Image(ImageLayer {
            common: sample_common("bg"),
            src: "https://cdn.example.com/bg.png".to_string(),
            is_background: true,
            object_fit: ObjectFit::Cover,
        })
    }

    #[test]
    fn test_json_shape_is_tagged_camel_case() {
        let value = serde_json::to_value(background()).unwrap();
        assert_eq!(value["type"], "image");
        assert_eq!(value["startFrame"], 0);
        assert_eq!(value["endFrame"], 300);
        assert_eq!(value["isBackground"], true);
        assert_eq!(value["objectFit"], "cover");
        assert_eq!(value["position"], json!({"x": 50.0, "y": 50.0}));
    }

    #[test]
    fn test_parses_props_from_render_payload() {
        let value = json!({
            "type": "audio",
            "id": "a1",
            "name": "Voiceover",
            "visible": true,
            "locked": false,
            "startFrame": 10,
            "endFrame": 160,
            "position": {"x": 50, "y": 50},
            "size": {"width": 100, "height": 10},
            "rotation": 0,
            "opacity": 1,
            "src": "voice.mp3",
            "volume": 1,
            "loop": true,
            "fadeIn": 15,
            "fadeOut": 0
        });
        let layer: Layer = serde_json::from_value(value).unwrap();
        assert_eq!(layer.kind(), LayerKind::Audio);
        assert_eq!(layer.frame_range(), 10..160);
        match layer {
            Layer::Audio(audio) => {
                assert!(audio.looped);
                assert_eq!(audio.fade_in, 15);
            }
            other => panic!("expected audio layer, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_background_flag_only_counts_for_images() {
        assert!(background().is_background());

        let mut layer = background();
        if let Layer::Image(image) = &mut layer {
            image.is_background = false;
        }
        assert!(!layer.is_background());
    }

    #[test]
    fn test_contains_frame_is_end_exclusive() {
        let layer = background();
        assert!(layer.contains_frame(0));
        assert!(layer.contains_frame(299));
        assert!(!layer.contains_frame(300));
        assert_eq!(layer.duration(), 300);
    }

    #[test]
    fn test_validate_rejects_empty_window_and_bad_opacity() {
        let mut layer = background();
        layer.common_mut().end_frame = 0;
        assert!(layer.validate().is_err());

        let mut layer = background();
        layer.common_mut().opacity = 1.5;
        assert!(layer.validate().is_err());

        assert!(background().validate().is_ok());
    }
}
