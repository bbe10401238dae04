use std::sync::Arc;

use crate::{
    bookmarks::{Bookmark, BookmarkCreate, BookmarkUpdate},
    id::BookmarkId,
    store::{
        state::{reduce, BookmarksState},
        Action, Store,
    },
};

use super::mock::{bmark, seed};

fn loaded(items: Vec<Bookmark>) -> BookmarksState {
    reduce(&BookmarksState::new(), &Action::LoadSuccess(items))
}

fn tokio_bmark() -> Bookmark {
    bmark(4, "Tokio", "https://tokio.rs", "2024-06-01T00:00:00.000Z")
}

fn titles(state: &BookmarksState) -> Vec<&str> {
    state.all().iter().map(|b| b.title.as_str()).collect()
}

#[test]
fn test_list_is_newest_first() {
    let mut items = seed();
    items.reverse();

    let state = loaded(items);
    assert_eq!(titles(&state), vec!["Angular", "RxJS", "MDN"]);

    let state = reduce(&state, &Action::CreateSuccess(tokio_bmark()));
    assert_eq!(titles(&state), vec!["Tokio", "Angular", "RxJS", "MDN"]);

    let serde = bmark(5, "Serde", "https://serde.rs", "2023-01-01T00:00:00.000Z");
    let state = reduce(&state, &Action::CreateSuccess(serde));
    assert_eq!(titles(&state).last(), Some(&"Serde"));
}

#[test]
fn test_equal_timestamps_order_by_id() {
    let stamp = "2024-05-01T00:00:00.000Z";
    let state = loaded(vec![
        bmark(2, "two", "https://two.example", stamp),
        bmark(1, "one", "https://one.example", stamp),
    ]);
    assert_eq!(titles(&state), vec!["one", "two"]);
}

#[test]
fn test_load_success_replaces_everything() {
    let state = loaded(seed());
    let only = bmark(9, "Only", "https://only.example", "2024-01-01T00:00:00.000Z");
    let state = reduce(&state, &Action::LoadSuccess(vec![only]));
    assert_eq!(state.all().len(), 1);
    assert!(state.get(&1u64.into()).is_none());
    assert!(!state.loading());
}

#[test]
fn test_ids_are_normalized_both_ways() {
    let state = loaded(seed());

    // numeric entity, string lookup
    let rxjs = state.get(&BookmarkId::from("2"));
    assert_eq!(rxjs.map(|b| b.title.as_str()), Some("RxJS"));

    // string id from the server, numeric delete
    let state = reduce(
        &state,
        &Action::CreateSuccess(Bookmark {
            id: BookmarkId::Str("42".to_string()),
            title: "Answer".to_string(),
            url: "https://answer.example".to_string(),
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
        }),
    );
    let state = reduce(&state, &Action::DeleteSuccess(42u64.into()));
    assert!(state.get(&42u64.into()).is_none());
    assert_eq!(state.all().len(), 3);

    // numeric id from the server, string delete
    let five = bmark(5, "Five", "https://five.example", "2024-01-02T00:00:00.000Z");
    let state = reduce(&state, &Action::CreateSuccess(five));
    assert_eq!(state.all().len(), 4);
    let state = reduce(&state, &Action::DeleteSuccess(BookmarkId::Str("5".to_string())));
    assert!(state.get(&5u64.into()).is_none());
    assert_eq!(titles(&state), vec!["Angular", "RxJS", "MDN"]);
}

#[test]
fn test_update_success_upserts() {
    let state = loaded(seed());
    let mut renamed = state.get(&3u64.into()).cloned().unwrap();
    renamed.title = "MDN Web Docs".to_string();

    let state = reduce(&state, &Action::UpdateSuccess(renamed));
    assert_eq!(state.get(&3u64.into()).unwrap().title, "MDN Web Docs");
    assert_eq!(state.all().len(), 3);
}

#[test]
fn test_intents_raise_loading_and_clear_error() {
    let intents = vec![
        Action::Load,
        Action::Create(BookmarkCreate::new("x", "https://x.example")),
        Action::Update {
            id: 1u64.into(),
            changes: BookmarkUpdate::default(),
        },
        Action::Delete(1u64.into()),
    ];

    for intent in intents {
        let failure = Action::DeleteFailure("Delete failed".to_string());
        let failed = reduce(&loaded(seed()), &failure);
        assert_eq!(failed.error(), Some("Delete failed"));

        let state = reduce(&failed, &intent);
        assert!(state.loading(), "{} should raise loading", intent.name());
        assert_eq!(state.error(), None, "{} should clear the error", intent.name());
    }
}

#[test]
fn test_failure_keeps_entities() {
    let state = reduce(&loaded(seed()), &Action::Delete(3u64.into()));
    let state = reduce(&state, &Action::DeleteFailure("Delete failed".to_string()));

    assert!(state.get(&3u64.into()).is_some());
    assert_eq!(state.error(), Some("Delete failed"));
    assert!(!state.loading());
}

#[test]
fn test_success_leaves_error_alone() {
    let failure = Action::UpdateFailure("Update failed".to_string());
    let state = reduce(&loaded(seed()), &failure);
    let state = reduce(&state, &Action::CreateSuccess(tokio_bmark()));
    assert_eq!(state.error(), Some("Update failed"));
}

#[test]
fn test_list_identity_tracks_entity_changes() {
    let state = loaded(seed());
    let list = state.all().clone();

    let state = reduce(&state, &Action::Load);
    assert!(Arc::ptr_eq(&list, state.all()));

    let state = reduce(&state, &Action::LoadFailure("nope".to_string()));
    assert!(Arc::ptr_eq(&list, state.all()));

    // deleting something that is not there changes nothing
    let state = reduce(&state, &Action::DeleteSuccess(99u64.into()));
    assert!(Arc::ptr_eq(&list, state.all()));

    let state = reduce(&state, &Action::DeleteSuccess(1u64.into()));
    assert!(!Arc::ptr_eq(&list, state.all()));
}

#[test]
fn test_store_replays_latest_to_late_subscribers() {
    let store = Store::new();
    store.dispatch(Action::LoadSuccess(seed()));

    let rx = store.watch();
    assert_eq!(rx.borrow().all().len(), 3);
    assert_eq!(store.all().len(), 3);
    assert!(!store.snapshot().loading());
    assert_eq!(store.error(), None);
}

#[test]
fn test_store_transitions_arrive_in_order() {
    let store = Store::new();
    let mut transitions = store.transitions();

    store.dispatch(Action::Load);
    store.dispatch(Action::LoadSuccess(seed()));
    store.dispatch(Action::Delete(2u64.into()));
    store.dispatch(Action::DeleteSuccess(2u64.into()));

    let mut seen = vec![];
    while let Ok(transition) = transitions.try_recv() {
        seen.push((transition.action.name(), transition.state.all().len()));
    }
    assert_eq!(
        seen,
        vec![
            ("load", 0),
            ("load success", 3),
            ("delete", 3),
            ("delete success", 2),
        ]
    );
}
