//! Typing Engine Driver
//!
//! Runs a [`Sequencer`] on the tokio clock. The driver owns exactly one
//! timer: every [`SequencerAction::Schedule`] resets it, so a stale tick can
//! never fire after a newer transition. The background lookup is the only
//! other pending work; it is polled in-task (never spawned), so replacing
//! the list or shutting down simply drops it.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use rand::{rngs::StdRng, SeedableRng};
//! use typist_core::{AssetResolver, FallbackAsset, ItemList, TextItem, Timings, TypingEngine};
//!
//! let handle = TypingEngine::spawn(
//!     ItemList::new(vec![TextItem::with_keyword("Growth", "growth")]),
//!     Timings::default(),
//!     Arc::new(AssetResolver::new(search, FallbackAsset::default())),
//!     StdRng::from_entropy(),
//! );
//! let mut state = handle.subscribe();
//! while state.changed().await.is_ok() {
//!     println!("{}", state.borrow().display_text);
//! }
//! ```

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use rand::Rng;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant, Sleep};
use tracing::{debug, info};

use crate::item::{AssetReference, ItemList};
use crate::resolver::AssetResolver;
use crate::sequencer::{CycleId, Sequencer, SequencerAction};
use crate::state::EngineState;
use crate::timing::Timings;

/// Command channel depth
const COMMAND_BUFFER: usize = 16;

/// A background lookup in flight, tagged with its cycle
type Resolution = BoxFuture<'static, (CycleId, Option<AssetReference>)>;

/// Commands accepted by a running engine
#[derive(Debug)]
pub enum EngineCommand {
    /// Swap the item list (restarts at index 0 unless it is the same list)
    ReplaceItems(ItemList),
    /// Stop the engine, discarding pending timers and lookups
    Shutdown,
}

/// The engine task is gone
#[derive(Debug, Error)]
#[error("Typing engine has stopped")]
pub struct EngineStopped;

/// Handle to a spawned engine
#[derive(Debug)]
pub struct EngineHandle {
    commands: mpsc::Sender<EngineCommand>,
    state: watch::Receiver<EngineState>,
    task: JoinHandle<()>,
}

impl EngineHandle {
    /// Subscribe to state snapshots
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<EngineState> {
        self.state.clone()
    }

    /// Latest snapshot
    #[must_use]
    pub fn state(&self) -> EngineState {
        self.state.borrow().clone()
    }

    /// Replace the item list
    ///
    /// # Errors
    ///
    /// Returns [`EngineStopped`] if the engine has already shut down.
    pub async fn replace_items(&self, items: ItemList) -> Result<(), EngineStopped> {
        self.commands
            .send(EngineCommand::ReplaceItems(items))
            .await
            .map_err(|_| EngineStopped)
    }

    /// Stop the engine and wait for its task to finish
    pub async fn shutdown(self) {
        // A closed channel means the task is already on its way out
        let _ = self.commands.send(EngineCommand::Shutdown).await;
        if let Err(e) = self.task.await {
            debug!(error = %e, "Engine task ended abnormally");
        }
    }

    /// Whether the engine task has finished
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Timer-driven runner for a [`Sequencer`]
pub struct TypingEngine<R> {
    sequencer: Sequencer<R>,
    resolver: Arc<AssetResolver>,
    state_tx: watch::Sender<EngineState>,
    commands: mpsc::Receiver<EngineCommand>,
    /// The one pending timer
    timer: Pin<Box<Sleep>>,
    /// Whether `timer` is live
    armed: bool,
    /// The one pending background lookup
    in_flight: Option<Resolution>,
}

impl<R: Rng + Send + 'static> TypingEngine<R> {
    /// Spawn the engine on the current tokio runtime
    pub fn spawn(
        items: ItemList,
        timings: Timings,
        resolver: Arc<AssetResolver>,
        rng: R,
    ) -> EngineHandle {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let sequencer = Sequencer::new(items, timings, rng);
        let (state_tx, state_rx) = watch::channel(sequencer.state());

        let engine = Self {
            sequencer,
            resolver,
            state_tx,
            commands: command_rx,
            timer: Box::pin(sleep(Duration::ZERO)),
            armed: false,
            in_flight: None,
        };
        let task = tokio::spawn(engine.run());

        EngineHandle {
            commands: command_tx,
            state: state_rx,
            task,
        }
    }

    async fn run(mut self) {
        let action = self.sequencer.start();
        self.apply(action);
        self.publish();

        loop {
            tokio::select! {
                () = &mut self.timer, if self.armed => {
                    self.armed = false;
                    // Only the hold timer can fire with a lookup pending; the hold is over
                    self.in_flight = None;
                    let action = self.sequencer.on_timer();
                    self.apply(action);
                }
                (cycle, asset) = poll_resolution(&mut self.in_flight), if self.in_flight.is_some() => {
                    self.in_flight = None;
                    self.sequencer.on_resolved(cycle, asset);
                }
                command = self.commands.recv() => match command {
                    Some(EngineCommand::ReplaceItems(items)) => {
                        if let Some(action) = self.sequencer.replace_items(items) {
                            self.in_flight = None;
                            self.apply(action);
                        }
                    }
                    Some(EngineCommand::Shutdown) | None => break,
                },
            }
            self.publish();
        }

        info!(
            pending_timer = self.armed,
            pending_lookup = self.in_flight.is_some(),
            "Typing engine stopped"
        );
    }

    /// Carry out a sequencer action, replacing the pending timer
    fn apply(&mut self, action: SequencerAction) {
        match action {
            SequencerAction::Schedule(delay) => self.arm(delay),
            SequencerAction::Resolve { cycle, item, hold } => {
                let resolver = Arc::clone(&self.resolver);
                self.in_flight = Some(
                    async move {
                        let asset = resolver.resolve(&item).await;
                        (cycle, asset)
                    }
                    .boxed(),
                );
                self.arm(hold);
            }
            SequencerAction::Idle => {
                self.armed = false;
                self.in_flight = None;
            }
        }
    }

    fn arm(&mut self, delay: Duration) {
        self.timer.as_mut().reset(Instant::now() + delay);
        self.armed = true;
    }

    fn publish(&self) {
        let next = self.sequencer.state();
        self.state_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

/// Await the pending lookup, or never resolve when there is none
async fn poll_resolution(in_flight: &mut Option<Resolution>) -> (CycleId, Option<AssetReference>) {
    match in_flight {
        Some(resolution) => resolution.await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future;
    use tokio_test::{assert_pending, assert_ready_eq, task};

    #[test]
    fn test_no_lookup_never_resolves() {
        let mut in_flight: Option<Resolution> = None;
        let mut poll = task::spawn(poll_resolution(&mut in_flight));
        assert_pending!(poll.poll());
        assert_pending!(poll.poll());
    }

    #[test]
    fn test_pending_lookup_yields_tagged_result() {
        let asset = AssetReference::direct("/img/trust.jpg");
        let mut in_flight: Option<Resolution> =
            Some(future::ready((3, Some(asset.clone()))).boxed());
        let mut poll = task::spawn(poll_resolution(&mut in_flight));
        assert_ready_eq!(poll.poll(), (3, Some(asset)));
    }

    #[test]
    fn test_command_debug_names() {
        assert_eq!(format!("{:?}", EngineCommand::Shutdown), "Shutdown");
        assert_eq!(EngineStopped.to_string(), "Typing engine has stopped");
    }
}
