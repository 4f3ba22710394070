//! Playhead and playback state
//!
//! Tracks the current frame of the timeline. New layers start at the
//! playhead, and splitting usually happens there too.

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

/// Playback states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// Playhead is still (default state)
    #[default]
    Paused,
    /// Playhead advances with every rendered frame
    Playing,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackState::Paused => write!(f, "Paused"),
            PlaybackState::Playing => write!(f, "Playing"),
        }
    }
}

/// Position on the timeline plus playback mode.
///
/// Invariant: `current_frame < total_frames` unless the timeline is empty,
/// in which case `current_frame == 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playhead {
    state: PlaybackState,
    current_frame: u32,
    total_frames: u32,
    fps: u32,
}

impl Playhead {
    /// A paused playhead at frame 0.
    ///
    /// `fps` is raised to 1 if zero.
    pub fn new(total_frames: u32, fps: u32) -> Self {
        Self {
            state: PlaybackState::Paused,
            current_frame: 0,
            total_frames,
            fps: fps.max(1),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn is_paused(&self) -> bool {
        self.state == PlaybackState::Paused
    }

    pub fn current_frame(&self) -> u32 {
        self.current_frame
    }

    pub fn total_frames(&self) -> u32 {
        self.total_frames
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    fn last_frame(&self) -> u32 {
        self.total_frames.saturating_sub(1)
    }

    /// Start playback. Playing from the last frame rewinds to the start.
    pub fn play(&mut self) {
        if self.total_frames == 0 {
            return;
        }
        if self.current_frame >= self.last_frame() {
            self.current_frame = 0;
        }
        self.state = PlaybackState::Playing;
        debug!("[PLAYHEAD] Playing from frame {}", self.current_frame);
    }

    pub fn pause(&mut self) {
        self.state = PlaybackState::Paused;
        debug!("[PLAYHEAD] Paused at frame {}", self.current_frame);
    }

    /// Toggle between playing and paused, returning the new state.
    pub fn toggle(&mut self) -> PlaybackState {
        match self.state {
            PlaybackState::Playing => self.pause(),
            PlaybackState::Paused => self.play(),
        }
        self.state
    }

    /// Move to `frame`, clamped to the timeline.
    pub fn seek(&mut self, frame: u32) {
        self.current_frame = frame.min(self.last_frame());
    }

    /// Move by `delta` frames in either direction, clamped to the timeline.
    pub fn step(&mut self, delta: i64) {
        let target = i64::from(self.current_frame).saturating_add(delta).max(0);
        self.seek(u32::try_from(target).unwrap_or(u32::MAX));
    }

    /// Advance playback by `frames`. Playback stops on the last frame.
    pub fn advance(&mut self, frames: u32) {
        if !self.is_playing() {
            return;
        }
        let target = self.current_frame.saturating_add(frames);
        if target >= self.last_frame() {
            self.current_frame = self.last_frame();
            self.state = PlaybackState::Paused;
            debug!("[PLAYHEAD] Reached end of timeline");
        } else {
            self.current_frame = target;
        }
    }

    /// Change the timeline length, pulling the playhead back inside it.
    pub fn set_total_frames(&mut self, total_frames: u32) {
        self.total_frames = total_frames;
        self.seek(self.current_frame);
        if total_frames == 0 {
            self.state = PlaybackState::Paused;
        }
    }

    pub fn frames_to_seconds(&self, frames: u32) -> f64 {
        f64::from(frames) / f64::from(self.fps)
    }

    /// Convert seconds to a frame index, rounding down.
    pub fn seconds_to_frames(&self, seconds: f64) -> u32 {
        (seconds.max(0.0) * f64::from(self.fps)).floor() as u32
    }

    pub fn current_time_secs(&self) -> f64 {
        self.frames_to_seconds(self.current_frame)
    }
}

impl Default for Playhead {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_TOTAL_FRAMES, crate::config::DEFAULT_FPS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_initial_state() {
        let playhead = Playhead::new(300, 30);
        assert!(playhead.is_paused());
        assert_eq!(playhead.current_frame(), 0);
        assert_eq!(playhead.state().to_string(), "Paused");
    }

    #[test]
    fn test_seek_is_clamped() {
        let mut playhead = Playhead::new(300, 30);
        playhead.seek(120);
        assert_eq!(playhead.current_frame(), 120);
        playhead.seek(5000);
        assert_eq!(playhead.current_frame(), 299);
    }

    #[test]
    fn test_step_both_directions() {
        let mut playhead = Playhead::new(100, 30);
        playhead.step(10);
        assert_eq!(playhead.current_frame(), 10);
        playhead.step(-25);
        assert_eq!(playhead.current_frame(), 0);
        playhead.step(i64::MAX);
        assert_eq!(playhead.current_frame(), 99);
    }

    #[test]
    fn test_advance_stops_at_end() {
        let mut playhead = Playhead::new(100, 30);
        playhead.play();
        playhead.advance(50);
        assert_eq!(playhead.current_frame(), 50);
        assert!(playhead.is_playing());

        playhead.advance(80);
        assert_eq!(playhead.current_frame(), 99);
        assert!(playhead.is_paused());
    }

    #[test]
    fn test_advance_ignored_when_paused() {
        let mut playhead = Playhead::new(100, 30);
        playhead.advance(10);
        assert_eq!(playhead.current_frame(), 0);
    }

    #[test]
    fn test_play_from_end_rewinds() {
        let mut playhead = Playhead::new(100, 30);
        playhead.seek(99);
        assert_eq!(playhead.toggle(), PlaybackState::Playing);
        assert_eq!(playhead.current_frame(), 0);
    }

    #[test]
    fn test_shrinking_timeline_pulls_playhead_back() {
        let mut playhead = Playhead::new(300, 30);
        playhead.seek(250);
        playhead.set_total_frames(100);
        assert_eq!(playhead.current_frame(), 99);

        playhead.set_total_frames(0);
        assert_eq!(playhead.current_frame(), 0);
    }

    #[test]
    fn test_time_conversion() {
        let mut playhead = Playhead::new(300, 30);
        playhead.seek(45);
        assert_relative_eq!(playhead.current_time_secs(), 1.5);
        assert_eq!(playhead.seconds_to_frames(2.0), 60);
        assert_eq!(playhead.seconds_to_frames(-1.0), 0);
    }
}
