//! Observable Engine State
//!
//! The presentation layer never touches the sequencer. It reads
//! [`EngineState`] snapshots that the engine publishes after every
//! transition.

use serde::{Deserialize, Serialize};

use crate::item::AssetReference;
use crate::typing::{TypingPhase, TypoRecord};

/// Engine-wide phase of the active item
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Nothing running: disabled, not started, or settling between items
    #[default]
    Idle,
    /// Appending characters
    Typing,
    /// A wrong character is on screen
    TypoShown,
    /// The wrong character was removed; about to retype
    TypoDeleting,
    /// Word finished; background resolving or displayed
    HoldingComplete,
    /// Background fading out
    FadingImage,
    /// Removing characters
    Deleting,
}

impl Phase {
    /// Whether the text is visibly changing in this phase
    #[must_use]
    pub fn is_animating(self) -> bool {
        matches!(
            self,
            Self::Typing | Self::TypoShown | Self::TypoDeleting | Self::Deleting
        )
    }
}

impl From<TypingPhase> for Phase {
    fn from(phase: TypingPhase) -> Self {
        match phase {
            TypingPhase::Idle => Self::Idle,
            TypingPhase::Typing => Self::Typing,
            TypingPhase::TypoShown => Self::TypoShown,
            TypingPhase::TypoDeleting => Self::TypoDeleting,
            TypingPhase::Deleting => Self::Deleting,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Typing => "typing",
            Self::TypoShown => "typo-shown",
            Self::TypoDeleting => "typo-deleting",
            Self::HoldingComplete => "holding",
            Self::FadingImage => "fading",
            Self::Deleting => "deleting",
        };
        f.write_str(name)
    }
}

/// Snapshot of everything a presenter needs
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    /// Index of the active item
    pub active_index: usize,
    /// Text on screen
    pub display_text: String,
    /// Current phase
    pub phase: Phase,
    /// Pending typo (only in `TypoShown` / `TypoDeleting`)
    pub typo: Option<TypoRecord>,
    /// Text is being typed or deleted (drives the cursor styling)
    pub is_typing: bool,
    /// The active word is fully typed
    pub is_done: bool,
    /// Background to render, if any
    pub asset: Option<AssetReference>,
    /// The background is fading out
    pub image_fading: bool,
    /// Items fully cycled through since start or the last list replacement
    pub completed_cycles: u64,
}

impl EngineState {
    /// Whether the background should be drawn at full strength
    #[must_use]
    pub fn shows_background(&self) -> bool {
        self.asset.is_some() && !self.image_fading
    }
}
