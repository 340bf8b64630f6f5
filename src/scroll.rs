//! Teleprompter scroll engine.
//!
//! A two-state machine (`Stopped` / `Running`) over a read position. The
//! engine never touches a clock: whoever drives it calls [`ScrollEngine::advance`]
//! once per frame tick and renders the returned offset.

use serde::Serialize;

pub const MIN_SPEED: f64 = 0.1;
pub const MAX_SPEED: f64 = 10.0;
pub const MIN_TEXT_SIZE: u32 = 16;
pub const MAX_TEXT_SIZE: u32 = 72;

/// Position units advanced per frame for each unit of speed.
///
/// There is no delta-time compensation: the effective rate follows the
/// frame rate of whatever drives the engine.
pub const ADVANCE_PER_SPEED_UNIT: f64 = 0.5;

/// A manual scroll that lands this close to the end rewinds to the top.
pub const END_THRESHOLD: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayState {
    Stopped,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollState {
    pub position: f64,
    pub speed: f64,
    pub is_running: bool,
    pub content_extent: f64,
}

/// Viewport geometry reported by the view when the user scrolls by hand.
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub client_height: f64,
    pub scroll_height: f64,
}

impl ScrollMetrics {
    pub fn near_end(&self) -> bool {
        self.scroll_top + self.client_height >= self.scroll_height - END_THRESHOLD
    }
}

#[derive(Debug, Clone)]
pub struct ScrollEngine {
    state: ScrollState,
    text_size: u32,
}

impl Default for ScrollEngine {
    fn default() -> Self {
        Self::new(crate::settings::DEFAULT_SPEED, crate::settings::DEFAULT_TEXT_SIZE)
    }
}

impl ScrollEngine {
    /// Creates a running engine at the top of empty content.
    pub fn new(speed: f64, text_size: u32) -> Self {
        let mut engine = Self {
            state: ScrollState {
                position: 0.0,
                speed: crate::settings::DEFAULT_SPEED,
                is_running: true,
                content_extent: 0.0,
            },
            text_size: crate::settings::DEFAULT_TEXT_SIZE,
        };
        engine.set_speed(speed);
        engine.set_text_size(text_size);
        engine
    }

    pub fn state(&self) -> ScrollState {
        self.state
    }

    pub fn play_state(&self) -> PlayState {
        if self.state.is_running {
            PlayState::Running
        } else {
            PlayState::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    pub fn position(&self) -> f64 {
        self.state.position
    }

    pub fn speed(&self) -> f64 {
        self.state.speed
    }

    pub fn text_size(&self) -> u32 {
        self.text_size
    }

    /// Begins playback from the top, even when paused mid-way.
    pub fn start(&mut self) {
        self.reset();
        self.state.is_running = true;
    }

    pub fn stop(&mut self) {
        self.state.is_running = false;
    }

    pub fn toggle(&mut self) -> PlayState {
        if self.state.is_running {
            self.stop();
        } else {
            self.start();
        }
        self.play_state()
    }

    pub fn reset(&mut self) {
        self.state.position = 0.0;
    }

    /// The user took over scrolling. Always stops; rewinds when the
    /// viewport ended up at the bottom of the text.
    ///
    /// Returns true when the position was reset.
    pub fn manual_scroll(&mut self, metrics: ScrollMetrics) -> bool {
        self.stop();
        if metrics.near_end() {
            self.reset();
            return true;
        }
        false
    }

    pub fn adjust_speed(&mut self, delta: f64) -> f64 {
        self.set_speed(self.state.speed + delta)
    }

    /// Sets speed from the slider. Non-finite input is ignored.
    pub fn set_speed(&mut self, speed: f64) -> f64 {
        if speed.is_finite() {
            self.state.speed = speed.clamp(MIN_SPEED, MAX_SPEED);
        }
        self.state.speed
    }

    pub fn adjust_text_size(&mut self, delta: i32) -> u32 {
        let size = i64::from(self.text_size) + i64::from(delta);
        self.text_size = size.clamp(i64::from(MIN_TEXT_SIZE), i64::from(MAX_TEXT_SIZE)) as u32;
        self.text_size
    }

    pub fn set_text_size(&mut self, size: u32) -> u32 {
        self.text_size = size.clamp(MIN_TEXT_SIZE, MAX_TEXT_SIZE);
        self.text_size
    }

    /// Total scrollable length of the displayed text.
    pub fn set_content_extent(&mut self, extent: f64) {
        self.state.content_extent = if extent.is_finite() { extent } else { 0.0 };
    }

    /// One frame tick. Returns the offset to render, or `None` while stopped.
    ///
    /// Running past the end of the content wraps to the top and keeps going.
    pub fn advance(&mut self) -> Option<f64> {
        if !self.state.is_running {
            return None;
        }

        self.state.position += self.state.speed * ADVANCE_PER_SPEED_UNIT;
        if self.state.position > self.state.content_extent {
            self.reset();
        }
        Some(self.state.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with_extent(extent: f64) -> ScrollEngine {
        let mut engine = ScrollEngine::default();
        engine.set_content_extent(extent);
        engine
    }

    #[test]
    fn starts_running_at_top() {
        let engine = ScrollEngine::default();
        assert_eq!(engine.play_state(), PlayState::Running);
        assert_eq!(engine.position(), 0.0);
        assert_eq!(engine.speed(), 3.0);
        assert_eq!(engine.text_size(), 24);
    }

    #[test]
    fn speed_five_advances_two_and_a_half() {
        let mut engine = engine_with_extent(1000.0);
        engine.set_speed(5.0);
        assert_eq!(engine.advance(), Some(2.5));
        assert_eq!(engine.position(), 2.5);
    }

    #[test]
    fn wraps_to_top_past_the_end_and_keeps_running() {
        let mut engine = engine_with_extent(100.0);
        engine.set_speed(10.0);
        for _ in 0..19 {
            engine.advance();
        }
        assert_eq!(engine.position(), 95.0);

        // 95 -> 100 is still within the extent
        assert_eq!(engine.advance(), Some(100.0));
        // 100 -> 105 exceeds it
        assert_eq!(engine.advance(), Some(0.0));
        assert!(engine.is_running());
    }

    #[test]
    fn position_ninety_nine_at_speed_ten_wraps() {
        let mut engine = engine_with_extent(100.0);
        engine.set_speed(10.0);
        engine.state.position = 99.0;

        assert_eq!(engine.advance(), Some(0.0));
        assert_eq!(engine.play_state(), PlayState::Running);
    }

    #[test]
    fn position_never_overshoots_by_more_than_one_step() {
        let mut engine = engine_with_extent(37.0);
        for speed in [0.1, 1.3, 4.0, 9.9, 10.0] {
            engine.set_speed(speed);
            for _ in 0..500 {
                let offset = engine.advance().unwrap();
                assert!(offset <= engine.state().content_extent + speed * ADVANCE_PER_SPEED_UNIT);
                assert!(offset >= 0.0);
            }
        }
    }

    #[test]
    fn zero_extent_loops_at_top() {
        let mut engine = engine_with_extent(0.0);
        for _ in 0..10 {
            assert_eq!(engine.advance(), Some(0.0));
        }
        assert!(engine.is_running());
    }

    #[test]
    fn start_rewinds_after_pause_mid_scroll() {
        let mut engine = engine_with_extent(500.0);
        for _ in 0..10 {
            engine.advance();
        }
        engine.stop();
        assert!(engine.position() > 0.0);

        engine.start();
        assert_eq!(engine.position(), 0.0);
        assert!(engine.is_running());
    }

    #[test]
    fn stop_is_idempotent_and_freezes_position() {
        let mut engine = engine_with_extent(500.0);
        engine.advance();
        engine.stop();
        engine.stop();
        let position = engine.position();
        assert_eq!(engine.advance(), None);
        assert_eq!(engine.position(), position);
        assert_eq!(engine.play_state(), PlayState::Stopped);
    }

    #[test]
    fn toggle_inverts_state() {
        let mut engine = ScrollEngine::default();
        assert_eq!(engine.toggle(), PlayState::Stopped);
        assert_eq!(engine.toggle(), PlayState::Running);
    }

    #[test]
    fn reset_keeps_play_state() {
        let mut engine = engine_with_extent(500.0);
        engine.advance();
        engine.stop();
        engine.reset();
        assert_eq!(engine.position(), 0.0);
        assert_eq!(engine.play_state(), PlayState::Stopped);
    }

    #[test]
    fn manual_scroll_near_end_stops_and_rewinds() {
        let mut engine = engine_with_extent(500.0);
        for _ in 0..20 {
            engine.advance();
        }

        let rewound = engine.manual_scroll(ScrollMetrics {
            scroll_top: 395.0,
            client_height: 100.0,
            scroll_height: 500.0,
        });

        assert!(rewound);
        assert_eq!(engine.play_state(), PlayState::Stopped);
        assert_eq!(engine.position(), 0.0);
    }

    #[test]
    fn manual_scroll_mid_text_only_stops() {
        let mut engine = engine_with_extent(500.0);
        for _ in 0..20 {
            engine.advance();
        }
        let position = engine.position();

        let rewound = engine.manual_scroll(ScrollMetrics {
            scroll_top: 200.0,
            client_height: 100.0,
            scroll_height: 500.0,
        });

        assert!(!rewound);
        assert_eq!(engine.play_state(), PlayState::Stopped);
        assert_eq!(engine.position(), position);
    }

    #[test]
    fn speed_stays_in_range_for_any_delta() {
        let mut engine = ScrollEngine::default();
        for delta in [-1000.0, -3.0, -0.1, 0.0, 0.1, 2.5, 7.0, 1e9, f64::NAN] {
            let speed = engine.adjust_speed(delta);
            assert!((MIN_SPEED..=MAX_SPEED).contains(&speed), "delta {delta} gave {speed}");
        }
        assert_eq!(engine.adjust_speed(-100.0), MIN_SPEED);
        assert_eq!(engine.adjust_speed(100.0), MAX_SPEED);
    }

    #[test]
    fn text_size_stays_in_range_for_any_delta() {
        let mut engine = ScrollEngine::default();
        for delta in [i32::MIN, -100, -2, 0, 2, 30, i32::MAX] {
            let size = engine.adjust_text_size(delta);
            assert!((MIN_TEXT_SIZE..=MAX_TEXT_SIZE).contains(&size), "delta {delta} gave {size}");
        }
        assert_eq!(engine.adjust_text_size(-1000), MIN_TEXT_SIZE);
        assert_eq!(engine.adjust_text_size(1000), MAX_TEXT_SIZE);
    }

    #[test]
    fn speed_change_applies_on_next_frame_without_restart() {
        let mut engine = engine_with_extent(1000.0);
        engine.set_speed(2.0);
        engine.advance();
        engine.set_speed(6.0);
        assert_eq!(engine.advance(), Some(4.0));
        assert!(engine.is_running());
    }
}
