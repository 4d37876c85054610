//! Engine integration tests
//!
//! Everything runs on tokio's paused clock, so hours of banner time pass in
//! milliseconds and timer ordering is exact.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::watch;
use tokio::time::{timeout, Instant};

use typist_core::{
    AssetOrigin, AssetResolver, EngineHandle, EngineState, FallbackAsset, ImageCandidate,
    ImageSearch, ItemList, Phase, SearchError, TextItem, Timings, TypingEngine,
};

/// Search backend that answers after a delay with one image per keyword
struct MockSearch {
    delay: Duration,
    fail: bool,
    calls: AtomicUsize,
}

impl MockSearch {
    fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            fail: false,
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            delay: Duration::ZERO,
            fail: true,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageSearch for MockSearch {
    fn name(&self) -> &str {
        "Mock"
    }

    async fn search(&self, keyword: &str) -> Result<Vec<ImageCandidate>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(SearchError::Status {
                status: 500,
                body: "upstream unavailable".to_string(),
            });
        }
        Ok(vec![ImageCandidate::new(format!("https://img/{keyword}.jpg"))])
    }
}

fn timings() -> Timings {
    Timings::default()
        .with_typo_probability(0.0)
        .with_typing_interval(Duration::from_millis(150))
        .with_delete_interval(Duration::from_millis(100))
        .with_completion_hold(Duration::from_millis(1_000))
        .with_fade(Duration::from_millis(200))
        .with_settle(Duration::from_millis(50))
}

fn items(words: &[&str]) -> ItemList {
    words
        .iter()
        .map(|w| TextItem::with_keyword(*w, w.to_lowercase()))
        .collect::<Vec<_>>()
        .into()
}

fn spawn(list: ItemList, timings: Timings, search: Arc<MockSearch>) -> EngineHandle {
    let resolver = AssetResolver::with_rng(
        search,
        FallbackAsset::default(),
        StdRng::seed_from_u64(1),
    );
    TypingEngine::spawn(list, timings, Arc::new(resolver), StdRng::seed_from_u64(7))
}

async fn wait_for(
    rx: &mut watch::Receiver<EngineState>,
    what: impl FnMut(&EngineState) -> bool,
) -> EngineState {
    timeout(Duration::from_secs(3_600), rx.wait_for(what))
        .await
        .expect("engine never reached the expected state")
        .expect("engine stopped")
        .clone()
}

#[tokio::test(start_paused = true)]
async fn test_single_item_full_cycle() {
    let search = MockSearch::new(Duration::ZERO);
    let handle = spawn(items(&["Hi"]), timings(), Arc::clone(&search));
    let mut rx = handle.subscribe();
    let started = Instant::now();

    let held = wait_for(&mut rx, |s| s.asset.is_some()).await;
    assert_eq!(held.display_text, "Hi");
    assert_eq!(held.phase, Phase::HoldingComplete);
    assert!(held.is_done);
    assert!(!held.is_typing);
    let asset = held.asset.unwrap();
    assert_eq!(asset.url, "https://img/hi.jpg");
    assert_eq!(
        asset.origin,
        AssetOrigin::Search {
            keyword: "hi".to_string()
        }
    );
    // Two characters at 150 ms each
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(300) && elapsed < Duration::from_millis(450));

    let fading = wait_for(&mut rx, |s| s.image_fading).await;
    assert_eq!(fading.phase, Phase::FadingImage);
    assert!(!fading.shows_background());

    let after = wait_for(&mut rx, |s| s.completed_cycles == 1).await;
    assert_eq!(after.active_index, 0);
    assert_eq!(after.display_text, "");
    assert!(after.asset.is_none());
    assert_eq!(search.calls(), 1);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_items_visited_in_order_and_wrap() {
    let search = MockSearch::new(Duration::ZERO);
    let handle = spawn(items(&["Trust", "Code", "Impact"]), timings(), Arc::clone(&search));
    let mut rx = handle.subscribe();

    let mut visited = Vec::new();
    let mut last_index = None;
    loop {
        let state = rx.borrow_and_update().clone();
        if last_index != Some(state.active_index) {
            visited.push(state.active_index);
            last_index = Some(state.active_index);
        }
        if state.completed_cycles >= 4 {
            break;
        }
        rx.changed().await.unwrap();
    }

    assert_eq!(visited, vec![0, 1, 2, 0, 1]);
    // One lookup per completed word
    assert_eq!(search.calls(), 4);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_display_is_always_a_prefix() {
    let search = MockSearch::new(Duration::ZERO);
    let words = ["Kindness", "Purpose"];
    let handle = spawn(
        items(&words),
        timings().with_typo_probability(0.0),
        Arc::clone(&search),
    );
    let mut rx = handle.subscribe();

    loop {
        let state = rx.borrow_and_update().clone();
        let word = words[state.active_index];
        assert!(
            word.starts_with(&state.display_text),
            "{:?} is not a prefix of {word}",
            state.display_text
        );
        if state.completed_cycles >= 2 {
            break;
        }
        rx.changed().await.unwrap();
    }

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_typos_stay_within_word_length() {
    let search = MockSearch::new(Duration::ZERO);
    let words = ["Collaboration", "Excellence"];
    let handle = spawn(
        items(&words),
        timings().with_typo_probability(0.5),
        Arc::clone(&search),
    );
    let mut rx = handle.subscribe();

    let mut saw_typo = false;
    loop {
        let state = rx.borrow_and_update().clone();
        let word = words[state.active_index];
        assert!(state.display_text.chars().count() <= word.chars().count());
        if let Some(typo) = state.typo {
            saw_typo = true;
            assert!(typo.position < word.chars().count() - 1);
        }
        if state.is_done {
            assert_eq!(state.display_text, word);
        }
        if state.completed_cycles >= 4 {
            break;
        }
        rx.changed().await.unwrap();
    }
    assert!(saw_typo);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_replacing_items_discards_pending_lookup() {
    let search = MockSearch::new(Duration::from_secs(5));
    let handle = spawn(
        items(&["Hi"]),
        timings().with_completion_hold(Duration::from_secs(10)),
        Arc::clone(&search),
    );
    let mut rx = handle.subscribe();

    wait_for(&mut rx, |s| s.phase == Phase::HoldingComplete).await;
    assert_eq!(search.calls(), 1);

    handle.replace_items(items(&["Yo"])).await.unwrap();
    let restarted = wait_for(&mut rx, |s| s.display_text == "Y").await;
    assert_eq!(restarted.active_index, 0);
    assert_eq!(restarted.completed_cycles, 0);
    assert!(restarted.asset.is_none());

    // Long after the first lookup would have answered
    tokio::time::sleep(Duration::from_secs(6)).await;
    let state = handle.state();
    assert_eq!(state.display_text, "Yo");
    assert_eq!(state.asset.map(|a| a.url), Some("https://img/yo.jpg".to_string()));
    assert_eq!(search.calls(), 2);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_lookup_slower_than_hold_is_dropped() {
    let search = MockSearch::new(Duration::from_secs(5));
    let handle = spawn(items(&["Hi"]), timings(), Arc::clone(&search));
    let mut rx = handle.subscribe();

    loop {
        let state = rx.borrow_and_update().clone();
        assert!(state.asset.is_none(), "late background leaked: {state:?}");
        if state.completed_cycles >= 2 {
            break;
        }
        rx.changed().await.unwrap();
    }
    assert_eq!(search.calls(), 2);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_failed_lookup_shows_fallback() {
    let search = MockSearch::failing();
    let handle = spawn(items(&["Passion"]), timings(), Arc::clone(&search));
    let mut rx = handle.subscribe();

    let held = wait_for(&mut rx, |s| s.asset.is_some()).await;
    let asset = held.asset.unwrap();
    assert!(asset.is_fallback());
    assert_eq!(asset.url, "/img/hero-backgrounds/passion.jpg");

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_direct_image_skips_search() {
    let search = MockSearch::new(Duration::ZERO);
    let list: ItemList = vec![TextItem::with_image(
        "Unity",
        typist_core::AssetReference::direct("/img/unity.png"),
    )]
    .into();
    let handle = spawn(list, timings(), Arc::clone(&search));
    let mut rx = handle.subscribe();

    let held = wait_for(&mut rx, |s| s.asset.is_some()).await;
    assert_eq!(held.asset.unwrap().url, "/img/unity.png");
    assert_eq!(search.calls(), 0);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_empty_list_is_inert_until_replaced() {
    let search = MockSearch::new(Duration::ZERO);
    let handle = spawn(ItemList::default(), timings(), Arc::clone(&search));
    let mut rx = handle.subscribe();

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(handle.state(), EngineState::default());
    assert!(!rx.has_changed().unwrap());
    assert_eq!(search.calls(), 0);

    handle.replace_items(items(&["Go"])).await.unwrap();
    let typed = wait_for(&mut rx, |s| s.display_text == "Go").await;
    assert!(typed.is_done);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_replacing_with_empty_list_stops() {
    let search = MockSearch::new(Duration::ZERO);
    let handle = spawn(items(&["Growth"]), timings(), Arc::clone(&search));
    let mut rx = handle.subscribe();

    wait_for(&mut rx, |s| s.display_text == "Gro").await;
    handle.replace_items(ItemList::default()).await.unwrap();
    let stopped = wait_for(&mut rx, |s| s.phase == Phase::Idle).await;
    assert_eq!(stopped.display_text, "");

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(handle.state().display_text, "");
    assert_eq!(search.calls(), 0);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_the_task() {
    let search = MockSearch::new(Duration::from_secs(5));
    let handle = spawn(items(&["Hi"]), timings(), Arc::clone(&search));
    let mut rx = handle.subscribe();

    wait_for(&mut rx, |s| s.phase == Phase::HoldingComplete).await;
    handle.shutdown().await;

    // The sender is gone with the task
    assert!(rx.changed().await.is_err());
}
