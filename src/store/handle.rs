use std::sync::Arc;

use tokio::sync::{broadcast, watch};

use super::{
    action::Action,
    state::{reduce, BookmarksState},
};
use crate::bookmarks::Bookmark;

const TRANSITION_BUFFER: usize = 256;

/// One applied transition: the action and the state it produced.
#[derive(Debug, Clone)]
pub struct Transition {
    pub action: Action,
    pub state: Arc<BookmarksState>,
}

/// Owner of the bookmark state.
///
/// Two subscriptions are offered: [`Store::watch`] replays the latest state to
/// late subscribers, [`Store::transitions`] delivers every transition in the
/// order it was applied.
pub struct Store {
    state: watch::Sender<Arc<BookmarksState>>,
    transitions: broadcast::Sender<Transition>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self::with_capacity(TRANSITION_BUFFER)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (state, _) = watch::channel(Arc::new(BookmarksState::new()));
        let (transitions, _) = broadcast::channel(capacity);
        Self { state, transitions }
    }

    /// Apply `action` and publish the result. Calls are serialized by the
    /// watch channel's lock, so transitions land in dispatch order.
    pub fn dispatch(&self, action: Action) -> Arc<BookmarksState> {
        let mut applied = None;

        self.state.send_modify(|state| {
            let next = Arc::new(reduce(state, &action));
            log::debug!(
                "{} -> {} bookmarks, loading={}, error={:?}",
                action.name(),
                next.all().len(),
                next.loading(),
                next.error()
            );

            // no subscribers is fine
            let _ = self.transitions.send(Transition {
                action,
                state: next.clone(),
            });

            *state = next.clone();
            applied = Some(next);
        });

        applied.unwrap_or_else(|| self.snapshot())
    }

    pub fn snapshot(&self) -> Arc<BookmarksState> {
        self.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<Arc<BookmarksState>> {
        self.state.subscribe()
    }

    pub fn transitions(&self) -> broadcast::Receiver<Transition> {
        self.transitions.subscribe()
    }

    pub fn all(&self) -> Arc<Vec<Bookmark>> {
        self.snapshot().all().clone()
    }

    pub fn error(&self) -> Option<String> {
        self.snapshot().error().map(str::to_string)
    }
}
