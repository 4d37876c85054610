//! Showcase Caption Chains
//!
//! Showcase cards type their title, then their description, once the card
//! scrolls into view. A [`CaptionChain`] strings [`TypingMachine`]s together
//! so each caption starts only after the one before it is done. Captions
//! never delete and never resolve a background.

use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tracing::debug;

use crate::timing::Timings;
use crate::typing::{Tick, TypingMachine};

/// Title typing interval on showcase cards
pub const TITLE_INTERVAL_MS: u64 = 50;

/// Description typing interval on showcase cards
pub const DESCRIPTION_INTERVAL_MS: u64 = 20;

/// A sequence of captions typed one after another
#[derive(Clone, Debug)]
pub struct CaptionChain {
    captions: Vec<TypingMachine>,
    /// Index of the caption currently typing
    cursor: usize,
    visible: bool,
}

impl CaptionChain {
    /// Build a chain from `(text, timings)` pairs in typing order
    pub fn new<S: AsRef<str>>(captions: impl IntoIterator<Item = (S, Timings)>) -> Self {
        Self {
            captions: captions
                .into_iter()
                .map(|(text, timings)| TypingMachine::new(text.as_ref(), timings))
                .collect(),
            cursor: 0,
            visible: false,
        }
    }

    /// Title-then-description chain with showcase pacing
    pub fn title_and_description(title: &str, description: &str) -> Self {
        Self::new([
            (title, Timings::caption(Duration::from_millis(TITLE_INTERVAL_MS))),
            (
                description,
                Timings::caption(Duration::from_millis(DESCRIPTION_INTERVAL_MS)),
            ),
        ])
    }

    /// Show or hide the chain
    ///
    /// Showing starts the first caption and returns the delay before its
    /// first tick. Hiding clears every caption back to empty.
    pub fn set_visible(&mut self, visible: bool) -> Option<Duration> {
        if visible == self.visible {
            return None;
        }
        self.visible = visible;
        self.cursor = 0;
        for caption in &mut self.captions {
            caption.reset();
        }
        if visible {
            self.start_from_cursor()
        } else {
            None
        }
    }

    /// Advance the active caption by one fired timer
    ///
    /// Returns the delay before the next tick, or `None` once every caption
    /// is done (or the chain is hidden).
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Duration> {
        if !self.visible {
            return None;
        }
        let caption = self.captions.get_mut(self.cursor)?;
        match caption.tick(rng) {
            Tick::Next(delay) => Some(delay),
            Tick::Done | Tick::Cleared | Tick::Stopped => {
                self.cursor += 1;
                self.start_from_cursor()
            }
        }
    }

    /// Start captions from the cursor, skipping any that finish instantly
    fn start_from_cursor(&mut self) -> Option<Duration> {
        while let Some(caption) = self.captions.get_mut(self.cursor) {
            if let Tick::Next(delay) = caption.start() {
                debug!(caption = self.cursor, "Caption started");
                return Some(delay);
            }
            self.cursor += 1;
        }
        None
    }

    /// Type the whole chain in real time, reporting after every tick
    pub async fn play<R, F>(&mut self, rng: &mut R, mut on_frame: F)
    where
        R: Rng + ?Sized,
        F: FnMut(&Self),
    {
        let mut next = self.set_visible(true);
        on_frame(self);
        while let Some(delay) = next {
            sleep(delay).await;
            next = self.tick(rng);
            on_frame(self);
        }
    }

    /// Text of caption `index`
    #[must_use]
    pub fn display_text(&self, index: usize) -> &str {
        self.captions.get(index).map_or("", TypingMachine::display_text)
    }

    /// Whether caption `index` is fully typed
    #[must_use]
    pub fn is_caption_done(&self, index: usize) -> bool {
        self.captions.get(index).is_some_and(TypingMachine::is_done)
    }

    /// Whether every caption is fully typed
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.captions.iter().all(TypingMachine::is_done)
    }

    /// Visible and still typing
    #[must_use]
    pub fn is_typing(&self) -> bool {
        self.visible && !self.is_done()
    }

    /// Whether the chain is shown
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Number of captions
    #[must_use]
    pub fn len(&self) -> usize {
        self.captions.len()
    }

    /// Whether the chain has no captions
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.captions.is_empty()
    }
}
