use std::sync::Arc;

use crate::{
    bookmarks::{Bookmark, BookmarkCreate, BookmarkUpdate},
    config::ConcurrencyConfig,
    id::BookmarkId,
    store::{Action, OpKind, Store},
};

use super::{
    backend::{fetch_one, BookmarkApi},
    errors::AppError,
    task_runner::{Dispatched, Job, Lane, Tracker},
};

/// Turns intents into remote calls and remote results into outcome actions.
///
/// Each intent is dispatched to the store first, then handed to the lane of
/// its kind. Failures never escape: they become `*Failure` actions.
pub struct Pipeline {
    api: Arc<dyn BookmarkApi>,
    store: Arc<Store>,
    tracker: Tracker,
    load_lane: Lane,
    create_lane: Lane,
    update_lane: Lane,
    delete_lane: Lane,
}

impl Pipeline {
    pub fn new(
        api: Arc<dyn BookmarkApi>,
        store: Arc<Store>,
        concurrency: &ConcurrencyConfig,
    ) -> Pipeline {
        let tracker = Tracker::default();
        let lane = |kind: OpKind| {
            Lane::new(kind, concurrency.policy(kind), store.clone(), tracker.clone())
        };
        let load_lane = lane(OpKind::Load);
        let create_lane = lane(OpKind::Create);
        let update_lane = lane(OpKind::Update);
        let delete_lane = lane(OpKind::Delete);

        Pipeline {
            load_lane,
            create_lane,
            update_lane,
            delete_lane,
            api,
            store,
            tracker,
        }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn load(&self) -> Dispatched {
        self.store.dispatch(Action::Load);

        let api = self.api.clone();
        self.submit(OpKind::Load, async move {
            match api.list().await {
                Ok(items) => Action::LoadSuccess(items),
                Err(err) => failure(OpKind::Load, err),
            }
        })
    }

    pub fn create(&self, draft: BookmarkCreate) -> Dispatched {
        self.store.dispatch(Action::Create(draft.clone()));

        let api = self.api.clone();
        self.submit(OpKind::Create, async move {
            match api.create(&draft).await {
                Ok(item) => Action::CreateSuccess(item),
                Err(err) => failure(OpKind::Create, err),
            }
        })
    }

    pub fn update(&self, id: BookmarkId, changes: BookmarkUpdate) -> Dispatched {
        self.store.dispatch(Action::Update {
            id: id.clone(),
            changes: changes.clone(),
        });

        let api = self.api.clone();
        self.submit(OpKind::Update, async move {
            match api.update(&id, &changes).await {
                Ok(item) => Action::UpdateSuccess(item),
                Err(err) => failure(OpKind::Update, err),
            }
        })
    }

    pub fn delete(&self, id: BookmarkId) -> Dispatched {
        self.store.dispatch(Action::Delete(id.clone()));

        let api = self.api.clone();
        self.submit(OpKind::Delete, async move {
            match api.delete(&id).await {
                Ok(()) => Action::DeleteSuccess(id),
                Err(err) => failure(OpKind::Delete, err),
            }
        })
    }

    /// Read one record, falling back to a filtered list on not-found.
    /// Does not touch the store.
    pub async fn fetch(&self, id: &BookmarkId) -> anyhow::Result<Bookmark, AppError> {
        fetch_one(self.api.as_ref(), id).await
    }

    /// Resolves when every started or queued intent has been applied.
    pub async fn idle(&self) {
        self.tracker.idle().await
    }

    pub fn pending(&self) -> usize {
        self.tracker.pending()
    }

    fn submit<F>(&self, kind: OpKind, job: F) -> Dispatched
    where
        F: std::future::Future<Output = Action> + Send + 'static,
    {
        let lane = match kind {
            OpKind::Load => &self.load_lane,
            OpKind::Create => &self.create_lane,
            OpKind::Update => &self.update_lane,
            OpKind::Delete => &self.delete_lane,
        };

        let job: Job = Box::pin(job);
        let dispatched = lane.submit(job);
        log::debug!("{kind} intent {dispatched:?} ({:?})", lane.policy());
        dispatched
    }
}

fn failure(kind: OpKind, err: AppError) -> Action {
    log::warn!("{kind} failed: {err}");
    let message = err
        .message()
        .unwrap_or_else(|| kind.default_failure().to_string());
    Action::failed(kind, message)
}
