//! Layer Model Module
//!
//! Timeline layers as a tagged union:
//! - Text: styled text with an optional entrance animation
//! - Image: still image, one of which may be the protected background
//! - Audio: audio clip with volume and fades
//! - Video: video clip with playback and filter settings
//!
//! List order is z-order: later layers render on top.

mod factory;
mod id;
mod model;
mod patch;

pub use factory::{time_window, LayerFactory, MediaSource};
pub use id::LayerId;
pub use model::{
    Animation, AudioLayer, ImageLayer, Layer, LayerCommon, LayerKind, ObjectFit, Position, Size,
    TextAlign, TextLayer, VideoLayer,
};
pub use patch::LayerPatch;
