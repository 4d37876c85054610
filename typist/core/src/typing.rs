//! Typing State Machine
//!
//! Produces the growing and shrinking display string for one word. The
//! machine never owns a clock: every call to [`TypingMachine::tick`] is one
//! fired timer, and the returned [`Tick`] says how long to wait before the
//! next one. Whoever drives it holds exactly one pending timer.
//!
//! # Lifecycle
//!
//! ```text
//! Idle ──start──► Typing ──tick──► Typing … ──► done (is_done)
//!                   │  ▲
//!              roll │  │ tick (one typing interval)
//!                   ▼  │
//!              TypoShown ──tick (typo hold)──► TypoDeleting
//!
//! done ──begin_delete──► Deleting ──tick──► … ──► Idle (Cleared)
//! ```
//!
//! # Typo policy
//!
//! A typo is only rolled for a character that is not the last one, so the
//! final character before done is always the true one. The first append
//! after a corrected typo never rolls; the re-typed character always lands.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::classifier;
use crate::timing::Timings;

/// Phase of a single word's typing lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypingPhase {
    /// Not started, or fully deleted
    Idle,
    /// Appending characters (also the resting phase once done)
    Typing,
    /// A wrong character is on screen
    TypoShown,
    /// The wrong character was removed; waiting one beat before retyping
    TypoDeleting,
    /// Removing characters
    Deleting,
}

/// A wrong character currently on screen (or just removed)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypoRecord {
    /// Character index the typo was placed at
    pub position: usize,
    /// The substitute that was shown instead of the true character
    pub wrong_char: char,
}

/// Outcome of a fired timer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    /// Schedule the next tick after this delay
    Next(Duration),
    /// The word is fully and correctly typed; nothing more is scheduled
    Done,
    /// Deletion reached the empty string
    Cleared,
    /// The machine is idle and has nothing to do
    Stopped,
}

/// Per-word typing state machine
#[derive(Clone, Debug)]
pub struct TypingMachine {
    /// True characters of the word
    chars: Vec<char>,
    /// Text currently on screen
    display: String,
    /// Characters in `display`
    shown: usize,
    /// Current phase
    phase: TypingPhase,
    /// Pending typo, present in `TypoShown` and `TypoDeleting` only
    typo: Option<TypoRecord>,
    /// Skip the typo roll on the next append
    honest_next: bool,
    /// Pacing
    timings: Timings,
}

impl TypingMachine {
    /// Create an idle machine for `word`
    pub fn new(word: &str, timings: Timings) -> Self {
        Self {
            chars: word.chars().collect(),
            display: String::new(),
            shown: 0,
            phase: TypingPhase::Idle,
            typo: None,
            honest_next: false,
            timings,
        }
    }

    /// Begin typing
    ///
    /// Returns the delay before the first character, or [`Tick::Done`] for an
    /// empty word. Starting a machine that is already running is a no-op
    /// that reports [`Tick::Stopped`].
    pub fn start(&mut self) -> Tick {
        if self.phase != TypingPhase::Idle || self.shown > 0 {
            return Tick::Stopped;
        }
        self.phase = TypingPhase::Typing;
        if self.chars.is_empty() {
            Tick::Done
        } else {
            Tick::Next(self.timings.typing_interval)
        }
    }

    /// Drop back to idle with an empty display
    pub fn reset(&mut self) {
        self.display.clear();
        self.shown = 0;
        self.phase = TypingPhase::Idle;
        self.typo = None;
        self.honest_next = false;
    }

    /// Advance by one fired timer
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Tick {
        match self.phase {
            TypingPhase::Idle => Tick::Stopped,
            TypingPhase::Typing => self.type_next(rng),
            TypingPhase::TypoShown => {
                self.pop_char();
                self.phase = TypingPhase::TypoDeleting;
                Tick::Next(self.timings.typing_interval)
            }
            TypingPhase::TypoDeleting => {
                self.typo = None;
                self.honest_next = true;
                self.phase = TypingPhase::Typing;
                Tick::Next(self.timings.typing_interval)
            }
            TypingPhase::Deleting => {
                self.pop_char();
                if self.shown == 0 {
                    self.phase = TypingPhase::Idle;
                    Tick::Cleared
                } else {
                    Tick::Next(self.timings.delete_interval)
                }
            }
        }
    }

    /// Start removing the typed word
    ///
    /// Only a finished word can be deleted; anything else reports
    /// [`Tick::Stopped`] and leaves the machine untouched.
    pub fn begin_delete(&mut self) -> Tick {
        if !self.is_done() {
            return Tick::Stopped;
        }
        if self.shown == 0 {
            self.phase = TypingPhase::Idle;
            return Tick::Cleared;
        }
        self.phase = TypingPhase::Deleting;
        Tick::Next(self.timings.delete_interval)
    }

    fn type_next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Tick {
        if self.shown >= self.chars.len() {
            return Tick::Done;
        }

        let position = self.shown;
        let truth = self.chars[position];
        let honest = std::mem::take(&mut self.honest_next);

        if !honest && position + 1 < self.chars.len() && self.roll_typo(rng) {
            let wrong_char = classifier::substitute(truth, rng);
            // Unscripted characters and exhausted draws come back unchanged;
            // type them honestly instead of showing a "typo" that is correct.
            if !classifier::same_keystroke(wrong_char, truth) {
                trace!(position, %truth, %wrong_char, "Injecting typo");
                self.push_char(wrong_char);
                self.typo = Some(TypoRecord {
                    position,
                    wrong_char,
                });
                self.phase = TypingPhase::TypoShown;
                return Tick::Next(self.timings.typo_hold);
            }
        }

        self.push_char(truth);
        if self.shown == self.chars.len() {
            Tick::Done
        } else {
            Tick::Next(self.timings.typing_interval)
        }
    }

    fn roll_typo<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        let chance = self.timings.typo_chance();
        chance > 0.0 && rng.gen_bool(chance)
    }

    fn push_char(&mut self, c: char) {
        self.display.push(c);
        self.shown += 1;
    }

    fn pop_char(&mut self) {
        if self.display.pop().is_some() {
            self.shown -= 1;
        }
    }

    /// Text currently on screen
    #[must_use]
    pub fn display_text(&self) -> &str {
        &self.display
    }

    /// Characters currently on screen
    #[must_use]
    pub fn shown_len(&self) -> usize {
        self.shown
    }

    /// Length of the true word in characters
    #[must_use]
    pub fn word_len(&self) -> usize {
        self.chars.len()
    }

    /// Current phase
    #[must_use]
    pub fn phase(&self) -> TypingPhase {
        self.phase
    }

    /// Pending typo, if any
    #[must_use]
    pub fn typo(&self) -> Option<TypoRecord> {
        self.typo
    }

    /// Whether the whole word is on screen with no pending typo
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.phase == TypingPhase::Typing && self.typo.is_none() && self.shown == self.chars.len()
    }

    /// Pacing in use
    #[must_use]
    pub fn timings(&self) -> &Timings {
        &self.timings
    }
}
