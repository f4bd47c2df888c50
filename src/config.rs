use std::collections::BTreeSet;

/// Default crossfade duration between slides, in milliseconds.
pub const DEFAULT_TRANSITION_SPEED_MS: u32 = 100;
/// Default dwell time per slide before auto-advance, in milliseconds.
pub const DEFAULT_PAUSE_MS: u32 = 1000;
/// Lower bound the speed controls may reach, in milliseconds.
pub const MIN_PAUSE_MS: f64 = 100.0;
/// Upper bound the speed controls may reach, in milliseconds.
pub const MAX_PAUSE_MS: f64 = 2000.0;

/// Playback configuration shared between the builder and the player.
///
/// The serialized field names are the wire contract: the object literal the
/// builder embeds into the entry document is read verbatim by the player
/// script, so both sides speak exactly this schema. `speed` and `pause` keep
/// their short wire spellings via renames.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LoopConfig {
    pub navigation: bool,
    pub slide_counter: bool,
    pub speed_controls: bool,
    pub forward_backward: bool,
    pub autoplay: bool,
    pub slide_captions: bool,
    #[serde(rename = "speed")]
    pub transition_speed_ms: u32,
    #[serde(rename = "pause")]
    pub pause_duration_ms: u32,
    /// Set by the builder when an overlay leaf is emitted; never user-supplied.
    #[serde(default)]
    pub overlay_toggle: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            navigation: true,
            slide_counter: true,
            speed_controls: true,
            forward_backward: true,
            autoplay: true,
            slide_captions: false,
            transition_speed_ms: DEFAULT_TRANSITION_SPEED_MS,
            pause_duration_ms: DEFAULT_PAUSE_MS,
            overlay_toggle: false,
        }
    }
}

impl LoopConfig {
    /// A dwell shorter than the fade would start the next fade mid-transition,
    /// so the pause is pushed past the fade by a fixed margin. The player
    /// script applies the same rule with the same constant.
    pub fn normalized(mut self) -> Self {
        if self.pause_duration_ms <= self.transition_speed_ms {
            self.pause_duration_ms = self.transition_speed_ms + 100;
        }
        self
    }
}

/// File acceptance policy for ingestion.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FilterConfig {
    /// Normalized lower-case extensions; `jpeg` arrives as `jpg`.
    pub accepted_extensions: BTreeSet<String>,
    /// Raw substrings matched case-insensitively against the whole filename.
    pub exclude_substrings: BTreeSet<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            accepted_extensions: ["gif", "jpg", "png", "webp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exclude_substrings: BTreeSet::new(),
        }
    }
}

impl FilterConfig {
    pub fn with_excludes<I>(mut self, excludes: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.exclude_substrings
            .extend(excludes.into_iter().map(Into::into));
        self
    }
}
