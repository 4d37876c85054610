//! Item Sequencer
//!
//! Walks the item list forever: type a word, hand it to the resolver, hold
//! it, fade the background, delete the word, settle, move to the next one.
//! Every step is a [`SequencerAction`] telling the driver what to schedule;
//! the sequencer itself never waits.
//!
//! ```text
//! Typing ──done──► Holding ──hold──► Fading ──fade──► Deleting ──empty──► Settling
//!   ▲                                                                        │
//!   └──────────────────────── next index (wraps) ◄──────────settle───────────┘
//! ```
//!
//! The resolver request is emitted exactly once per item, on the
//! `Typing → Holding` edge. Each pass through an item gets a fresh cycle
//! number; a resolution that comes back tagged with an old cycle is dropped.

use std::time::Duration;

use rand::Rng;
use tracing::{debug, info};

use crate::item::{AssetReference, ItemList, TextItem};
use crate::state::{EngineState, Phase};
use crate::timing::Timings;
use crate::typing::{Tick, TypingMachine};

/// Identifies one pass through one item
pub type CycleId = u64;

/// What the driver must do next
#[derive(Clone, Debug, PartialEq)]
pub enum SequencerAction {
    /// Fire [`Sequencer::on_timer`] after this delay, replacing any pending timer
    Schedule(Duration),
    /// Resolve a background for `item`, and fire `on_timer` after `hold`
    Resolve {
        /// Cycle the result must be tagged with
        cycle: CycleId,
        /// Item whose word just finished
        item: TextItem,
        /// Completion hold before the fade starts
        hold: Duration,
    },
    /// Nothing to schedule (disabled engine)
    Idle,
}

/// Sequencer stage; maps onto [`Phase`] together with the typing machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Typing,
    Holding,
    Fading,
    Deleting,
    Settling,
}

/// Drives a [`TypingMachine`] across a wrapping [`ItemList`]
#[derive(Debug)]
pub struct Sequencer<R> {
    items: ItemList,
    active: usize,
    machine: TypingMachine,
    stage: Stage,
    timings: Timings,
    asset: Option<AssetReference>,
    image_fading: bool,
    cycle: CycleId,
    completed_cycles: u64,
    rng: R,
}

impl<R: Rng> Sequencer<R> {
    /// Create a sequencer positioned at the first item (not yet started)
    pub fn new(items: ItemList, timings: Timings, rng: R) -> Self {
        let machine = Self::machine_for(&items, 0, &timings);
        Self {
            items,
            active: 0,
            machine,
            stage: Stage::Typing,
            timings,
            asset: None,
            image_fading: false,
            cycle: 0,
            completed_cycles: 0,
            rng,
        }
    }

    fn machine_for(items: &ItemList, index: usize, timings: &Timings) -> TypingMachine {
        let word = items.get(index).map_or("", |item| item.word.as_str());
        TypingMachine::new(word, timings.clone())
    }

    /// Whether there is anything to sequence
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.items.is_empty()
    }

    /// Start typing the active item
    pub fn start(&mut self) -> SequencerAction {
        if !self.is_enabled() {
            debug!("Empty item list, engine disabled");
            return SequencerAction::Idle;
        }
        self.stage = Stage::Typing;
        info!(
            index = self.active,
            word = %self.items[self.active].word,
            cycle = self.cycle,
            "Typing item"
        );
        let tick = self.machine.start();
        self.after_typing_tick(tick)
    }

    /// Handle the single pending timer firing
    pub fn on_timer(&mut self) -> SequencerAction {
        if !self.is_enabled() {
            return SequencerAction::Idle;
        }
        match self.stage {
            Stage::Typing => {
                let tick = self.machine.tick(&mut self.rng);
                self.after_typing_tick(tick)
            }
            Stage::Holding => {
                debug!(index = self.active, "Fading background");
                self.stage = Stage::Fading;
                self.image_fading = true;
                SequencerAction::Schedule(self.timings.fade)
            }
            Stage::Fading => {
                self.asset = None;
                self.image_fading = false;
                self.stage = Stage::Deleting;
                let tick = self.machine.begin_delete();
                self.after_delete_tick(tick)
            }
            Stage::Deleting => {
                let tick = self.machine.tick(&mut self.rng);
                self.after_delete_tick(tick)
            }
            Stage::Settling => self.advance(),
        }
    }

    fn after_typing_tick(&mut self, tick: Tick) -> SequencerAction {
        match tick {
            Tick::Next(delay) => SequencerAction::Schedule(delay),
            Tick::Done => {
                debug!(index = self.active, cycle = self.cycle, "Word complete");
                self.stage = Stage::Holding;
                SequencerAction::Resolve {
                    cycle: self.cycle,
                    item: self.items[self.active].clone(),
                    hold: self.timings.completion_hold,
                }
            }
            // Unreachable from a started machine; restart the item rather than stall
            Tick::Cleared | Tick::Stopped => {
                self.machine.reset();
                let tick = self.machine.start();
                self.after_typing_tick(tick)
            }
        }
    }

    fn after_delete_tick(&mut self, tick: Tick) -> SequencerAction {
        match tick {
            Tick::Next(delay) => SequencerAction::Schedule(delay),
            Tick::Cleared | Tick::Stopped | Tick::Done => {
                self.stage = Stage::Settling;
                SequencerAction::Schedule(self.timings.settle)
            }
        }
    }

    fn advance(&mut self) -> SequencerAction {
        self.completed_cycles += 1;
        self.cycle += 1;
        self.active = self.items.next_index(self.active);
        self.machine = Self::machine_for(&self.items, self.active, &self.timings);
        self.start()
    }

    /// Accept a resolved background for `cycle`
    ///
    /// Returns `false` (and drops the asset) when the cycle is stale or the
    /// hold already ended.
    pub fn on_resolved(&mut self, cycle: CycleId, asset: Option<AssetReference>) -> bool {
        if cycle != self.cycle || self.stage != Stage::Holding {
            debug!(
                cycle,
                current = self.cycle,
                "Discarding stale background resolution"
            );
            return false;
        }
        self.asset = asset;
        true
    }

    /// Swap in a new item list
    ///
    /// A list with the same identity is ignored (`None`). Anything else
    /// resets to index 0, drops the background, invalidates in-flight
    /// resolutions and restarts typing.
    pub fn replace_items(&mut self, items: ItemList) -> Option<SequencerAction> {
        if self.items.same_list(&items) {
            return None;
        }
        info!(
            old_len = self.items.len(),
            new_len = items.len(),
            "Item list replaced, restarting at index 0"
        );
        self.items = items;
        self.active = 0;
        self.cycle += 1;
        self.completed_cycles = 0;
        self.asset = None;
        self.image_fading = false;
        self.machine = Self::machine_for(&self.items, 0, &self.timings);
        Some(self.start())
    }

    /// Phase of the active item
    #[must_use]
    pub fn phase(&self) -> Phase {
        if !self.is_enabled() {
            return Phase::Idle;
        }
        match self.stage {
            Stage::Typing | Stage::Deleting => self.machine.phase().into(),
            Stage::Holding => Phase::HoldingComplete,
            Stage::Fading => Phase::FadingImage,
            Stage::Settling => Phase::Idle,
        }
    }

    /// Text is being typed or deleted and is non-empty
    #[must_use]
    pub fn is_typing(&self) -> bool {
        self.phase().is_animating() && !self.machine.display_text().is_empty()
    }

    /// The active word is fully typed
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.is_enabled() && self.machine.is_done()
    }

    /// Text on screen
    #[must_use]
    pub fn display_text(&self) -> &str {
        self.machine.display_text()
    }

    /// Index of the active item
    #[must_use]
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Current cycle number
    #[must_use]
    pub fn cycle(&self) -> CycleId {
        self.cycle
    }

    /// Background currently shown
    #[must_use]
    pub fn asset(&self) -> Option<&AssetReference> {
        self.asset.as_ref()
    }

    /// Whether a resolution result would still be accepted
    #[must_use]
    pub fn awaiting_asset(&self) -> bool {
        self.stage == Stage::Holding && self.asset.is_none()
    }

    /// Snapshot for observers
    #[must_use]
    pub fn state(&self) -> EngineState {
        EngineState {
            active_index: self.active,
            display_text: self.machine.display_text().to_string(),
            phase: self.phase(),
            typo: self.machine.typo(),
            is_typing: self.is_typing(),
            is_done: self.is_done(),
            asset: self.asset.clone(),
            image_fading: self.image_fading,
            completed_cycles: self.completed_cycles,
        }
    }
}
