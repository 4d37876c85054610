//! Engine Timing Parameters
//!
//! Every delay the engine schedules comes from [`Timings`]. The defaults
//! reproduce the hero banner's pacing: a character every 150ms, deletion
//! every 100ms, ten seconds on the finished word and a one second fade.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default delay between typed characters
pub const DEFAULT_TYPING_INTERVAL_MS: u64 = 150;

/// Default delay between deleted characters
pub const DEFAULT_DELETE_INTERVAL_MS: u64 = 100;

/// Default chance of fumbling a character
pub const DEFAULT_TYPO_PROBABILITY: f64 = 0.08;

/// Default time a wrong character stays visible
pub const DEFAULT_TYPO_HOLD_MS: u64 = 400;

/// Default time the finished word stays on screen before the fade
pub const DEFAULT_COMPLETION_HOLD_MS: u64 = 10_000;

/// Default background fade-out duration
pub const DEFAULT_FADE_MS: u64 = 1_000;

/// Default pause between an emptied word and the next one
pub const DEFAULT_SETTLE_MS: u64 = 300;

/// Timing parameters for the typing machine and the sequencer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Timings {
    /// Delay between appended characters
    pub typing_interval: Duration,
    /// Delay between deleted characters
    pub delete_interval: Duration,
    /// Chance (0.0-1.0) of a typo at each eligible append
    pub typo_probability: f64,
    /// How long a wrong character stays before it is backspaced
    pub typo_hold: Duration,
    /// How long the completed word (and its background) is held
    pub completion_hold: Duration,
    /// Background fade-out duration
    pub fade: Duration,
    /// Pause after deletion before the next item starts
    pub settle: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            typing_interval: Duration::from_millis(DEFAULT_TYPING_INTERVAL_MS),
            delete_interval: Duration::from_millis(DEFAULT_DELETE_INTERVAL_MS),
            typo_probability: DEFAULT_TYPO_PROBABILITY,
            typo_hold: Duration::from_millis(DEFAULT_TYPO_HOLD_MS),
            completion_hold: Duration::from_millis(DEFAULT_COMPLETION_HOLD_MS),
            fade: Duration::from_millis(DEFAULT_FADE_MS),
            settle: Duration::from_millis(DEFAULT_SETTLE_MS),
        }
    }
}

impl Timings {
    /// Caption pacing: a fixed interval, no typos, nothing to hold or fade
    #[must_use]
    pub fn caption(typing_interval: Duration) -> Self {
        Self {
            typing_interval,
            delete_interval: typing_interval,
            typo_probability: 0.0,
            typo_hold: Duration::ZERO,
            completion_hold: Duration::ZERO,
            fade: Duration::ZERO,
            settle: Duration::ZERO,
        }
    }

    /// Set the typing interval
    #[must_use]
    pub fn with_typing_interval(mut self, interval: Duration) -> Self {
        self.typing_interval = interval;
        self
    }

    /// Set the deletion interval
    #[must_use]
    pub fn with_delete_interval(mut self, interval: Duration) -> Self {
        self.delete_interval = interval;
        self
    }

    /// Set the typo probability (clamped to 0.0-1.0, NaN becomes 0.0)
    #[must_use]
    pub fn with_typo_probability(mut self, probability: f64) -> Self {
        self.typo_probability = if probability.is_nan() {
            0.0
        } else {
            probability.clamp(0.0, 1.0)
        };
        self
    }

    /// Set how long a typo is shown
    #[must_use]
    pub fn with_typo_hold(mut self, hold: Duration) -> Self {
        self.typo_hold = hold;
        self
    }

    /// Set the completed-word hold
    #[must_use]
    pub fn with_completion_hold(mut self, hold: Duration) -> Self {
        self.completion_hold = hold;
        self
    }

    /// Set the fade-out duration
    #[must_use]
    pub fn with_fade(mut self, fade: Duration) -> Self {
        self.fade = fade;
        self
    }

    /// Set the settle delay
    #[must_use]
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Typo probability safe to hand to `Rng::gen_bool`
    #[must_use]
    pub fn typo_chance(&self) -> f64 {
        if self.typo_probability.is_nan() {
            0.0
        } else {
            self.typo_probability.clamp(0.0, 1.0)
        }
    }

    /// Total time one item spends between finishing and starting deletion
    #[must_use]
    pub fn display_window(&self) -> Duration {
        self.completion_hold + self.fade
    }
}
