use std::{collections::HashMap, sync::Arc};

use crate::{bookmarks::Bookmark, id::BookmarkId};

use super::action::Action;

/// Normalized bookmark state.
///
/// `entities` is keyed by [`BookmarkId::key`]. `all` is the ordered view and is
/// only reallocated when a transition touches entities, so consumers can use
/// `Arc::ptr_eq` on it to detect change.
#[derive(Debug, Clone, Default)]
pub struct BookmarksState {
    entities: Arc<HashMap<String, Bookmark>>,
    all: Arc<Vec<Bookmark>>,
    loading: bool,
    error: Option<String>,
}

impl BookmarksState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &Arc<Vec<Bookmark>> {
        &self.all
    }

    pub fn get(&self, id: &BookmarkId) -> Option<&Bookmark> {
        self.entities.get(&id.key())
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn with_entities<F>(&self, mutate: F) -> Self
    where
        F: FnOnce(&mut HashMap<String, Bookmark>),
    {
        let mut entities = (*self.entities).clone();
        mutate(&mut entities);

        let mut all = entities.values().cloned().collect::<Vec<_>>();
        all.sort_by(Bookmark::newest_first);

        Self {
            entities: Arc::new(entities),
            all: Arc::new(all),
            loading: self.loading,
            error: self.error.clone(),
        }
    }

    fn settled(mut self) -> Self {
        self.loading = false;
        self
    }

    fn failed(&self, error: &str) -> Self {
        Self {
            loading: false,
            error: Some(error.to_string()),
            ..self.clone()
        }
    }

    fn requested(&self) -> Self {
        Self {
            loading: true,
            error: None,
            ..self.clone()
        }
    }
}

/// The transition function. Every store change goes through here.
///
/// Intents raise `loading` and clear the last error; outcomes lower `loading`.
/// Successes never touch the error field.
pub fn reduce(state: &BookmarksState, action: &Action) -> BookmarksState {
    match action {
        Action::Load | Action::Create(_) | Action::Update { .. } | Action::Delete(_) => {
            state.requested()
        }

        Action::LoadSuccess(items) => state
            .with_entities(|entities| {
                entities.clear();
                for item in items {
                    entities.insert(item.key(), item.clone());
                }
            })
            .settled(),

        Action::CreateSuccess(item) | Action::UpdateSuccess(item) => state
            .with_entities(|entities| {
                entities.insert(item.key(), item.clone());
            })
            .settled(),

        Action::DeleteSuccess(id) => {
            if state.get(id).is_some() {
                state
                    .with_entities(|entities| {
                        entities.remove(&id.key());
                    })
                    .settled()
            } else {
                state.clone().settled()
            }
        }

        Action::LoadFailure(err)
        | Action::CreateFailure(err)
        | Action::UpdateFailure(err)
        | Action::DeleteFailure(err) => state.failed(err),
    }
}
