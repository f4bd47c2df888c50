use std::collections::BTreeSet;

use crate::{
    config::{LoopConfig, MAX_PAUSE_MS, MIN_PAUSE_MS},
    error::{LoopsmithError, LoopsmithResult},
};

/// Stable slide identity, assigned 1..N at initialization and never reused.
pub type SlideId = u32;

/// Narrowest wrapper width the artifact stylesheet and the runtime sizing
/// pass both honor.
pub const MIN_LAYOUT_WIDTH: u32 = 640;

/// Factor the speed controls scale the dwell interval by.
pub const SPEED_SCALE: f64 = 1.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerState {
    Playing,
    Paused,
}

/// Every control the navigation bar can host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ControlKind {
    Counter,
    Reset,
    PlayPause,
    Prev,
    Next,
    Slower,
    Faster,
    OverlayToggle,
}

/// The set of controls actually present, decided once from the config flags.
/// The same decision gates rendering and wiring, so a handler can never be
/// attached to a control that was not rendered.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ControlRegistry {
    controls: BTreeSet<ControlKind>,
}

impl ControlRegistry {
    pub fn from_config(config: &LoopConfig) -> Self {
        let mut controls = BTreeSet::new();
        if config.navigation {
            if config.slide_counter {
                controls.insert(ControlKind::Counter);
            }
            controls.insert(ControlKind::Reset);
            controls.insert(ControlKind::PlayPause);
            if config.forward_backward {
                controls.insert(ControlKind::Prev);
                controls.insert(ControlKind::Next);
            }
            if config.speed_controls {
                controls.insert(ControlKind::Slower);
                controls.insert(ControlKind::Faster);
            }
            if config.overlay_toggle {
                controls.insert(ControlKind::OverlayToggle);
            }
        }
        Self { controls }
    }

    pub fn has(&self, kind: ControlKind) -> bool {
        self.controls.contains(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ControlKind> + '_ {
        self.controls.iter().copied()
    }
}

/// The session's one repeating advance timer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timer {
    pub interval_ms: f64,
}

/// One crossfade loop bound to one slide container.
///
/// Slides live in display order: the last element is the visually topmost
/// slide, which is what the counter reports. Every control action cancels any
/// pending timer before touching state, so two advances can never race on the
/// display order.
#[derive(Clone, Debug)]
pub struct PlaybackSession {
    config: LoopConfig,
    controls: ControlRegistry,
    slides: Vec<SlideId>,
    current_pause_ms: f64,
    state: PlayerState,
    timer: Option<Timer>,
    overlay_visible: bool,
}

impl PlaybackSession {
    /// Structural setup: ids 1..N in document order, then the first slide is
    /// rotated to the end of the display order so it is visually topmost.
    pub fn new(slide_count: usize, config: &LoopConfig) -> LoopsmithResult<Self> {
        if slide_count == 0 {
            return Err(LoopsmithError::NoImages);
        }
        let config = config.clone().normalized();
        let mut slides: Vec<SlideId> = (1..=slide_count as SlideId).collect();
        slides.rotate_left(1);

        let mut session = Self {
            controls: ControlRegistry::from_config(&config),
            slides,
            current_pause_ms: f64::from(config.pause_duration_ms),
            state: PlayerState::Paused,
            timer: None,
            overlay_visible: false,
            config,
        };
        if session.config.autoplay {
            session.play();
        }
        Ok(session)
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    pub fn controls(&self) -> &ControlRegistry {
        &self.controls
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayerState::Playing
    }

    pub fn active_timer(&self) -> Option<Timer> {
        self.timer
    }

    pub fn current_pause_ms(&self) -> f64 {
        self.current_pause_ms
    }

    pub fn total_slides(&self) -> usize {
        self.slides.len()
    }

    /// Display order, backmost first; the last entry is visible.
    pub fn display_order(&self) -> &[SlideId] {
        &self.slides
    }

    /// Id of the visually topmost slide, what the counter shows.
    pub fn counter(&self) -> SlideId {
        self.slides.last().copied().unwrap_or(1)
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    /// Timer fire: auto-advance. Ignored when no timer is pending.
    pub fn tick(&mut self) {
        if self.timer.is_some() {
            self.advance_forward();
        }
    }

    pub fn play(&mut self) {
        if self.state == PlayerState::Playing {
            return;
        }
        self.start_timer();
        self.state = PlayerState::Playing;
    }

    /// Idempotent.
    pub fn pause(&mut self) {
        self.cancel_timer();
        self.state = PlayerState::Paused;
    }

    pub fn toggle_play(&mut self) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Manual step forward; manual navigation never runs alongside autoplay.
    pub fn next(&mut self) {
        self.pause();
        self.advance_forward();
    }

    /// Manual step backward; never auto-triggered.
    pub fn prev(&mut self) {
        self.pause();
        self.advance_backward();
    }

    /// Stop playback and restore ascending id order with slide 1 topmost.
    /// Does not resume autoplay.
    pub fn reset(&mut self) {
        self.pause();
        self.slides.sort_unstable();
        self.slides.rotate_left(1);
    }

    pub fn slower(&mut self) {
        if self.current_pause_ms >= MAX_PAUSE_MS {
            return;
        }
        self.cancel_timer();
        self.current_pause_ms = (self.current_pause_ms * SPEED_SCALE).min(MAX_PAUSE_MS);
        self.start_timer();
        self.state = PlayerState::Playing;
    }

    pub fn faster(&mut self) {
        if self.current_pause_ms <= MIN_PAUSE_MS {
            return;
        }
        self.cancel_timer();
        self.current_pause_ms = (self.current_pause_ms / SPEED_SCALE).max(MIN_PAUSE_MS);
        self.start_timer();
        self.state = PlayerState::Playing;
    }

    /// Purely visual; does not touch the slide state machine.
    pub fn toggle_overlay(&mut self) {
        if self.controls.has(ControlKind::OverlayToggle) {
            self.overlay_visible = !self.overlay_visible;
        }
    }

    fn start_timer(&mut self) {
        self.timer = Some(Timer {
            interval_ms: self.current_pause_ms,
        });
    }

    fn cancel_timer(&mut self) {
        self.timer = None;
    }

    /// Frontmost slide moves to the back of the stacking order and fades in
    /// there, becoming topmost. A single slide redisplays itself.
    fn advance_forward(&mut self) {
        if self.slides.len() > 1 {
            self.slides.rotate_left(1);
        }
    }

    fn advance_backward(&mut self) {
        if self.slides.len() > 1 {
            self.slides.rotate_right(1);
        }
    }
}

/// Max-width for the outer wrapper, from the last slide's natural width when
/// it is measurable, else the floor.
pub fn layout_max_width(natural_width: Option<u32>) -> u32 {
    match natural_width {
        Some(width) if width > 0 => width,
        _ => MIN_LAYOUT_WIDTH,
    }
}
