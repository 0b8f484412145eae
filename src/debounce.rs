//! Debounced input adapter between raw keystrokes and the query store.
//!
//! The local text value updates on every keystroke; the store only sees it
//! after a quiet period (300 ms) with no further input, and only when it
//! actually differs from the store's current text. Enter commits immediately,
//! Escape clears immediately, both bypassing the delay. If the store's text
//! changes from outside (back-button navigation), the local value follows —
//! local state is a cache of store state, never the reverse, except inside
//! the debounce window.

use crate::query::Param;
use crate::store::QueryStore;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::debug;

pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(300);

/// Raw input events from the search box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// The full current contents of the input after a keystroke.
    Text(String),
    /// Enter: push the local value now.
    Commit,
    /// Escape: clear the input and the store's text now.
    Clear,
}

/// Debounced bridge from input events to [`QueryStore`] text updates.
///
/// Drive it by sending [`InputEvent`]s into the channel handed to [`run`];
/// observe the local (pre-commit) value through [`local`] for rendering the
/// input box itself.
///
/// [`run`]: DebouncedInput::run
/// [`local`]: DebouncedInput::local
pub struct DebouncedInput {
    store: QueryStore,
    window: Duration,
    local_tx: watch::Sender<String>,
}

impl DebouncedInput {
    pub fn new(store: QueryStore, window: Duration) -> Self {
        let initial = store.current().text;
        let (local_tx, _) = watch::channel(initial);
        Self {
            store,
            window,
            local_tx,
        }
    }

    /// The local input value as the user sees it, including text not yet
    /// pushed to the store.
    pub fn local(&self) -> watch::Receiver<String> {
        self.local_tx.subscribe()
    }

    /// Event loop. Runs until the event channel closes; a pending value is
    /// flushed on shutdown so typed input is never lost.
    pub async fn run(self, mut events: mpsc::UnboundedReceiver<InputEvent>) {
        let mut store_rx = self.store.subscribe();
        let mut deadline: Option<Instant> = None;

        loop {
            let quiet_period = async move {
                match deadline {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => futures::future::pending().await,
                }
            };

            tokio::select! {
                event = events.recv() => match event {
                    Some(InputEvent::Text(text)) => {
                        self.local_tx.send_replace(text);
                        deadline = Some(Instant::now() + self.window);
                    }
                    Some(InputEvent::Commit) => {
                        deadline = None;
                        self.push_local();
                    }
                    Some(InputEvent::Clear) => {
                        deadline = None;
                        self.local_tx.send_replace(String::new());
                        self.push_local();
                    }
                    None => {
                        if deadline.is_some() {
                            self.push_local();
                        }
                        break;
                    }
                },
                _ = quiet_period, if deadline.is_some() => {
                    deadline = None;
                    self.push_local();
                }
                changed = store_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    // External navigation resynchronizes the local value,
                    // unless the user is mid-typing inside the window.
                    if deadline.is_none() {
                        let text = store_rx.borrow_and_update().text.clone();
                        self.local_tx.send_if_modified(|local| {
                            if *local == text {
                                return false;
                            }
                            debug!(text, "input resynchronized from store");
                            *local = text.clone();
                            true
                        });
                    }
                }
            }
        }
    }

    /// Push the local value into the store if it differs from the store's
    /// current text.
    fn push_local(&self) {
        let text = self.local_tx.borrow().clone();
        if self.store.current().text != text {
            self.store.set_param(Param::Text(text));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn spawn_input(store: &QueryStore) -> mpsc::UnboundedSender<InputEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let input = DebouncedInput::new(store.clone(), DEFAULT_DEBOUNCE_WINDOW);
        tokio::spawn(input.run(rx));
        tx
    }

    /// Spawn a task counting every store publication.
    fn count_store_updates(store: &QueryStore) -> Arc<AtomicU32> {
        let counter = Arc::new(AtomicU32::new(0));
        let mut rx = store.subscribe();
        let task_counter = counter.clone();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                task_counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        counter
    }

    #[tokio::test(start_paused = true)]
    async fn typing_coalesces_into_one_update() {
        let store = QueryStore::default();
        let updates = count_store_updates(&store);
        let tx = spawn_input(&store);

        for prefix in ["s", "su", "sun", "suns", "sunse", "sunset"] {
            tx.send(InputEvent::Text(prefix.into())).unwrap();
            tokio::time::advance(Duration::from_millis(100)).await;
        }
        tokio::time::advance(Duration::from_millis(350)).await;
        tokio::task::yield_now().await;

        assert_eq!(
            updates.load(Ordering::SeqCst),
            1,
            "six keystrokes should produce one store update"
        );
        assert_eq!(store.current().text, "sunset");
    }

    #[tokio::test(start_paused = true)]
    async fn commit_bypasses_the_window() {
        let store = QueryStore::default();
        let tx = spawn_input(&store);

        tx.send(InputEvent::Text("aurora".into())).unwrap();
        tx.send(InputEvent::Commit).unwrap();
        tokio::task::yield_now().await;

        assert_eq!(store.current().text, "aurora");
    }

    #[tokio::test(start_paused = true)]
    async fn clear_resets_both_local_and_store() {
        let store = QueryStore::from_query_string("q=aurora");
        let input = DebouncedInput::new(store.clone(), DEFAULT_DEBOUNCE_WINDOW);
        let local = input.local();
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(input.run(rx));

        tx.send(InputEvent::Clear).unwrap();
        tokio::task::yield_now().await;

        assert_eq!(store.current().text, "");
        assert_eq!(*local.borrow(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn unchanged_text_does_not_touch_the_store() {
        let store = QueryStore::from_query_string("q=sunset&page=4");
        let tx = spawn_input(&store);

        tx.send(InputEvent::Text("sunset".into())).unwrap();
        tokio::time::advance(Duration::from_millis(350)).await;
        tokio::task::yield_now().await;

        // A no-op push must not reset pagination.
        assert_eq!(store.current().page, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn external_navigation_resynchronizes_local() {
        let store = QueryStore::default();
        let input = DebouncedInput::new(store.clone(), DEFAULT_DEBOUNCE_WINDOW);
        let local = input.local();
        let (_tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(input.run(rx));

        store.navigate("q=glacier");
        tokio::task::yield_now().await;

        assert_eq!(*local.borrow(), "glacier");
    }
}
