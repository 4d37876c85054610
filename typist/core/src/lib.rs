//! Typist Core - Headless Sequenced Typing Animation for the Hive hero banner
//!
//! This crate produces the animated text of the banner ("Where ___ Thrives.")
//! without knowing anything about how it is drawn. A page, a terminal or a
//! test harness subscribes to [`EngineState`] snapshots and renders them.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         Presenters                               │
//! │   ┌──────────┐   ┌──────────────┐   ┌──────────────────────────┐ │
//! │   │ Web page │   │ typist (CLI) │   │  Tests (virtual clock)   │ │
//! │   └────┬─────┘   └──────┬───────┘   └────────────┬─────────────┘ │
//! │        └────────────────┴────────────────────────┘               │
//! │                 watch::Receiver<EngineState> (down)              │
//! │                 EngineCommand (up)                               │
//! └──────────────────────────┼───────────────────────────────────────┘
//!                            │
//! ┌──────────────────────────┼───────────────────────────────────────┐
//! │                     TYPIST CORE                                  │
//! │  ┌───────────────────────┴────────────────────────────────────┐  │
//! │  │ TypingEngine (one timer, one pending lookup)               │  │
//! │  │  ┌────────────┐  ┌───────────────┐  ┌────────────────────┐ │  │
//! │  │  │ Sequencer  │─►│ TypingMachine │─►│ CharClass (typos)  │ │  │
//! │  │  └─────┬──────┘  └───────────────┘  └────────────────────┘ │  │
//! │  │        │ Resolve                                           │  │
//! │  │  ┌─────▼─────────┐  ┌──────────────────────────────┐       │  │
//! │  │  │ AssetResolver │─►│ ImageSearch (Pexels, mocks)  │       │  │
//! │  │  └───────────────┘  └──────────────────────────────┘       │  │
//! │  └────────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`TypingEngine`]: spawns the driver and returns an [`EngineHandle`]
//! - [`Sequencer`]: the item rotation, usable without a runtime
//! - [`TypingMachine`]: one word's typing, typo and delete lifecycle
//! - [`AssetResolver`]: direct reference, keyword search, fallback
//! - [`CaptionChain`]: showcase captions typed one after another
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use rand::{rngs::StdRng, SeedableRng};
//! use typist_core::{
//!     config::load_config, AssetResolver, PexelsSearch, TypingEngine,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     let search = Arc::new(PexelsSearch::new(config.search.clone())?);
//!     let resolver = Arc::new(AssetResolver::new(search, config.fallback.clone()));
//!
//!     let handle = TypingEngine::spawn(
//!         config.items.clone(),
//!         config.timings.clone(),
//!         resolver,
//!         StdRng::from_entropy(),
//!     );
//!
//!     let mut state = handle.subscribe();
//!     while state.changed().await.is_ok() {
//!         println!("Where {} Thrives.", state.borrow().display_text);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`classifier`]: script detection and typo substitutes
//! - [`timing`]: pacing parameters
//! - [`item`]: items, item lists and asset references
//! - [`typing`]: per-word typing state machine
//! - [`state`]: observable phase and state snapshot
//! - [`sequencer`]: item rotation and side-effect requests
//! - [`search`]: image search trait and the Pexels backend
//! - [`resolver`]: background resolution with fallback
//! - [`engine`]: tokio driver owning the single timer
//! - [`showcase`]: chained caption typing
//! - [`config`]: TOML, environment and CLI configuration
//!
//! # No Terminal Dependencies
//!
//! This crate has no dependency on any rendering or terminal library.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod classifier;
pub mod config;
pub mod engine;
pub mod item;
pub mod resolver;
pub mod search;
pub mod sequencer;
pub mod showcase;
pub mod state;
pub mod timing;
pub mod typing;

// Re-exports for convenience
pub use classifier::CharClass;
pub use config::{
    load_config, load_config_from_path, ConfigError, ConfigOverrides, ConfigSource,
    TypistConfigFile,
};
pub use engine::{EngineCommand, EngineHandle, EngineStopped, TypingEngine};
pub use item::{AssetOrigin, AssetReference, ItemList, TextItem};
pub use resolver::{AssetResolver, FallbackAsset};
pub use search::{ImageCandidate, ImageSearch, PexelsSearch, SearchConfig, SearchError};
pub use sequencer::{CycleId, Sequencer, SequencerAction};
pub use showcase::CaptionChain;
pub use state::{EngineState, Phase};
pub use timing::Timings;
pub use typing::{Tick, TypingMachine, TypingPhase, TypoRecord};
