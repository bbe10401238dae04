use std::{collections::HashMap, sync::Arc};

use crate::{bookmarks::Bookmark, config::SearchConfig, id::BookmarkId};

use super::index::{Field, FieldMatch, SearchIndex, Span};

/// Query evaluation over the store's ordered list, with a memoized index.
///
/// The index is rebuilt lazily, and only when the list handed in is a
/// different allocation from the one it was built from.
pub struct SearchView {
    config: SearchConfig,
    source: Option<Arc<Vec<Bookmark>>>,
    index: Option<SearchIndex>,
    matches_by_id: HashMap<String, Vec<FieldMatch>>,
    builds: usize,
}

impl SearchView {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            source: None,
            index: None,
            matches_by_id: HashMap::new(),
            builds: 0,
        }
    }

    /// Blank query: the list itself, in store order, and no spans.
    /// Otherwise: ranked matches, best first.
    pub fn query(&mut self, list: &Arc<Vec<Bookmark>>, query: &str) -> Arc<Vec<Bookmark>> {
        let query = query.trim();
        if query.is_empty() {
            self.matches_by_id.clear();
            return list.clone();
        }

        let hits = self.index_for(list).search(query);

        self.matches_by_id = hits
            .iter()
            .map(|hit| (hit.bookmark.key(), hit.matches.clone()))
            .collect();

        Arc::new(hits.into_iter().map(|hit| hit.bookmark).collect())
    }

    fn index_for(&mut self, list: &Arc<Vec<Bookmark>>) -> &SearchIndex {
        let stale = self
            .source
            .as_ref()
            .map_or(true, |source| !Arc::ptr_eq(source, list));
        if stale {
            self.index = None;
            self.source = Some(list.clone());
        }

        let builds = &mut self.builds;
        let config = &self.config;
        self.index.get_or_insert_with(|| {
            *builds += 1;
            log::debug!("building search index over {} bookmarks", list.len());
            SearchIndex::build(list, config)
        })
    }

    /// Spans recorded by the last non-blank query for this id and field.
    pub fn matches_for(&self, id: &BookmarkId, field: Field) -> Option<&[Span]> {
        self.matches_by_id
            .get(&id.key())?
            .iter()
            .find(|m| m.field == field)
            .map(|m| m.spans.as_slice())
    }

    /// How many times an index has been constructed.
    pub fn index_builds(&self) -> usize {
        self.builds
    }
}
