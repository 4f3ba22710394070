//! Editor Module
//!
//! The editing core of the timeline:
//! - Layer operations (pure list transformations)
//! - Editor session (history, selection, playhead, notices)
//! - Playhead state
//! - User notices

pub mod notice;
pub mod operations;
pub mod playhead;
pub mod session;

pub use notice::{Notice, NoticeLog, Severity};
pub use operations::Placement;
pub use playhead::{PlaybackState, Playhead};
pub use session::EditorSession;
