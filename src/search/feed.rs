use std::sync::Arc;

use parking_lot::Mutex;
use tokio::{sync::watch, task::JoinHandle};

use crate::{bookmarks::Bookmark, config::SearchConfig, id::BookmarkId, store::Store};

use super::{
    index::{Field, Span},
    view::SearchView,
};

/// Live search results: re-evaluated whenever the store or the query changes.
pub struct SearchFeed {
    query: watch::Sender<String>,
    results: watch::Receiver<Arc<Vec<Bookmark>>>,
    view: Arc<Mutex<SearchView>>,
    task: JoinHandle<()>,
}

impl SearchFeed {
    /// Must be called from within a tokio runtime.
    pub fn spawn(store: &Store, config: SearchConfig) -> Self {
        let mut states = store.watch();
        let (query_tx, mut query_rx) = watch::channel(String::new());
        let view = Arc::new(Mutex::new(SearchView::new(config)));

        let initial = {
            let state = states.borrow_and_update().clone();
            view.lock().query(state.all(), "")
        };
        let (results_tx, results_rx) = watch::channel(initial);

        let task = tokio::spawn({
            let view = view.clone();
            async move {
                loop {
                    tokio::select! {
                        changed = states.changed() => if changed.is_err() { break },
                        changed = query_rx.changed() => if changed.is_err() { break },
                    }

                    let list = states.borrow_and_update().all().clone();
                    let query = query_rx.borrow_and_update().clone();
                    let results = view.lock().query(&list, &query);

                    if results_tx.send(results).is_err() {
                        break;
                    }
                }
                log::debug!("search feed stopped");
            }
        });

        Self {
            query: query_tx,
            results: results_rx,
            view,
            task,
        }
    }

    pub fn set_query(&self, query: impl Into<String>) {
        self.query.send_replace(query.into());
    }

    pub fn results(&self) -> watch::Receiver<Arc<Vec<Bookmark>>> {
        self.results.clone()
    }

    pub fn current(&self) -> Arc<Vec<Bookmark>> {
        self.results.borrow().clone()
    }

    pub fn matches_for(&self, id: &BookmarkId, field: Field) -> Option<Vec<Span>> {
        self.view.lock().matches_for(id, field).map(<[Span]>::to_vec)
    }

    pub fn index_builds(&self) -> usize {
        self.view.lock().index_builds()
    }
}

impl Drop for SearchFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}
