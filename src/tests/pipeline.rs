use std::{sync::Arc, time::Duration};

use crate::{
    app::{task_runner::ConcurrencyPolicy, AppError, AppFactory, Dispatched, Pipeline},
    bookmarks::{BookmarkCreate, BookmarkUpdate},
    config::{ConcurrencyConfig, Config},
    store::{Action, Store},
};

use super::mock::{seed, MockApi};

fn pipeline_with(api: &Arc<MockApi>, concurrency: ConcurrencyConfig) -> Pipeline {
    Pipeline::new(api.clone(), Arc::new(Store::new()), &concurrency)
}

async fn loaded(api: &Arc<MockApi>, concurrency: ConcurrencyConfig) -> Pipeline {
    let pipeline = pipeline_with(api, concurrency);
    pipeline.load();
    pipeline.idle().await;
    assert_eq!(pipeline.store().all().len(), 3);
    pipeline
}

fn all_concurrent() -> ConcurrencyConfig {
    ConcurrencyConfig {
        load: ConcurrencyPolicy::Concurrent,
        create: ConcurrencyPolicy::Concurrent,
        update: ConcurrencyPolicy::Concurrent,
        delete: ConcurrencyPolicy::Concurrent,
    }
}

fn rename(title: &str) -> BookmarkUpdate {
    BookmarkUpdate {
        title: Some(title.to_string()),
        url: None,
    }
}

#[tokio::test]
async fn test_load_fills_store() {
    let api = Arc::new(MockApi::with(seed()));
    let pipeline = pipeline_with(&api, ConcurrencyConfig::default());

    assert_eq!(pipeline.load(), Dispatched::Started);
    assert!(pipeline.store().snapshot().loading());

    pipeline.idle().await;
    let store = pipeline.store();
    assert!(!store.snapshot().loading());
    assert_eq!(store.error(), None);
    assert_eq!(store.all()[0].title, "Angular");
}

#[tokio::test]
async fn test_second_load_is_ignored_while_first_in_flight() {
    let api = Arc::new(MockApi::with(seed()));
    api.delay("list", Duration::from_millis(20));
    let pipeline = pipeline_with(&api, ConcurrencyConfig::default());

    assert_eq!(pipeline.load(), Dispatched::Started);
    assert_eq!(pipeline.load(), Dispatched::Dropped);
    pipeline.idle().await;

    assert_eq!(api.calls("list"), 1);
    assert_eq!(pipeline.store().all().len(), 3);
    assert!(!pipeline.store().snapshot().loading());
}

#[tokio::test]
async fn test_create_double_submit_is_dropped() {
    let api = Arc::new(MockApi::with(seed()));
    api.delay("create", Duration::from_millis(20));
    let pipeline = loaded(&api, ConcurrencyConfig::default()).await;

    let draft = BookmarkCreate::new("Tokio", "https://tokio.rs");
    assert_eq!(pipeline.create(draft.clone()), Dispatched::Started);
    assert_eq!(pipeline.create(draft), Dispatched::Dropped);
    pipeline.idle().await;

    assert_eq!(api.calls("create"), 1);
    let all = pipeline.store().all();
    assert_eq!(all.len(), 4);
    // freshly stamped, so it is the newest
    assert_eq!(all[0].title, "Tokio");
}

#[tokio::test]
async fn test_queued_updates_apply_in_submission_order() {
    let api = Arc::new(MockApi::with(seed()));
    api.delay_update_titled("A", Duration::from_millis(50));
    let pipeline = loaded(&api, ConcurrencyConfig::default()).await;

    assert_eq!(pipeline.update(1u64.into(), rename("A")), Dispatched::Queued);
    assert_eq!(pipeline.update(1u64.into(), rename("B")), Dispatched::Queued);
    assert_eq!(pipeline.pending(), 2);
    pipeline.idle().await;

    let store = pipeline.store();
    assert_eq!(store.snapshot().get(&1u64.into()).unwrap().title, "B");
    assert_eq!(api.calls("update"), 2);
}

#[tokio::test]
async fn test_queued_deletes_apply_in_submission_order() {
    let api = Arc::new(MockApi::with(seed()));
    api.delay_delete_of(&1u64.into(), Duration::from_millis(50));
    let pipeline = loaded(&api, ConcurrencyConfig::default()).await;
    let mut transitions = pipeline.store().transitions();

    assert_eq!(pipeline.delete(1u64.into()), Dispatched::Queued);
    assert_eq!(pipeline.delete(2u64.into()), Dispatched::Queued);
    pipeline.idle().await;

    let mut deleted = vec![];
    while let Ok(transition) = transitions.try_recv() {
        if let Action::DeleteSuccess(id) = transition.action {
            deleted.push(id.key());
        }
    }
    // the slow first delete still lands first
    assert_eq!(deleted, vec!["1", "2"]);
    assert_eq!(pipeline.store().all().len(), 1);
}

#[tokio::test]
async fn test_concurrent_updates_land_in_completion_order() {
    let api = Arc::new(MockApi::with(seed()));
    api.delay_update_titled("A", Duration::from_millis(50));
    let pipeline = loaded(&api, all_concurrent()).await;

    assert_eq!(pipeline.update(1u64.into(), rename("A")), Dispatched::Started);
    assert_eq!(pipeline.update(1u64.into(), rename("B")), Dispatched::Started);
    pipeline.idle().await;

    // the slow one finishes last and wins
    let store = pipeline.store();
    assert_eq!(store.snapshot().get(&1u64.into()).unwrap().title, "A");
}

#[tokio::test]
async fn test_delete_failure_keeps_record() {
    let api = Arc::new(MockApi::with(seed()));
    api.fail("delete");
    let pipeline = loaded(&api, ConcurrencyConfig::default()).await;

    pipeline.delete(3u64.into());
    pipeline.idle().await;

    let store = pipeline.store();
    assert!(store.snapshot().get(&3u64.into()).is_some());
    assert_eq!(store.error().as_deref(), Some("delete exploded"));
    assert!(!store.snapshot().loading());
}

#[tokio::test]
async fn test_blank_failure_uses_default_message() {
    let api = Arc::new(MockApi::with(seed()));
    api.fail_with("list", "  ");
    let pipeline = pipeline_with(&api, ConcurrencyConfig::default());

    pipeline.load();
    pipeline.idle().await;

    let store = pipeline.store();
    assert_eq!(store.error().as_deref(), Some("Failed to load bookmarks"));
    assert!(store.all().is_empty());
}

#[tokio::test]
async fn test_next_intent_clears_error() {
    let api = Arc::new(MockApi::with(seed()));
    api.fail("update");
    let pipeline = loaded(&api, ConcurrencyConfig::default()).await;

    pipeline.update(2u64.into(), rename("nope"));
    pipeline.idle().await;
    assert_eq!(pipeline.store().error().as_deref(), Some("update exploded"));

    pipeline.delete(2u64.into());
    assert_eq!(pipeline.store().error(), None);
    pipeline.idle().await;

    assert!(pipeline.store().snapshot().get(&2u64.into()).is_none());
    assert_eq!(pipeline.store().error(), None);
}

#[tokio::test]
async fn test_transitions_follow_intents() {
    let api = Arc::new(MockApi::with(seed()));
    let pipeline = pipeline_with(&api, ConcurrencyConfig::default());
    let mut transitions = pipeline.store().transitions();

    pipeline.load();
    pipeline.idle().await;
    pipeline.delete(1u64.into());
    pipeline.idle().await;

    let mut names = vec![];
    while let Ok(transition) = transitions.try_recv() {
        names.push(transition.action.name());
    }
    assert_eq!(names, vec!["load", "load success", "delete", "delete success"]);
}

#[tokio::test]
async fn test_fetch_falls_back_to_filtered_list() {
    let api = Arc::new(MockApi::with(seed()));
    api.break_direct_get();
    let pipeline = pipeline_with(&api, ConcurrencyConfig::default());

    let bmark = pipeline.fetch(&2u64.into()).await.unwrap();
    assert_eq!(bmark.title, "RxJS");
    assert_eq!(api.calls("get"), 1);
    assert_eq!(api.calls("list_by_id"), 1);

    // reads do not go through the store
    assert!(pipeline.store().all().is_empty());
}

#[tokio::test]
async fn test_fetch_missing_everywhere_is_not_found() {
    let api = Arc::new(MockApi::with(seed()));
    api.break_direct_get();
    let pipeline = pipeline_with(&api, ConcurrencyConfig::default());

    let err = pipeline.fetch(&99u64.into()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_fetch_other_errors_skip_fallback() {
    let api = Arc::new(MockApi::with(seed()));
    api.fail("get");
    let pipeline = pipeline_with(&api, ConcurrencyConfig::default());

    let err = pipeline.fetch(&1u64.into()).await.unwrap_err();
    assert!(matches!(err, AppError::Other(_)));
    assert_eq!(api.calls("list_by_id"), 0);
}

#[tokio::test]
async fn test_assembled_app_shares_store() {
    let api = Arc::new(MockApi::with(seed()));
    let app = AppFactory::assemble(Config::default(), api);

    app.pipeline.load();
    app.pipeline.idle().await;

    assert!(Arc::ptr_eq(app.store(), app.pipeline.store()));
    assert_eq!(app.store().all().len(), 3);
}

#[tokio::test]
async fn test_dropped_intents_still_raise_loading_and_clear_error() {
    let api = Arc::new(MockApi::with(seed()));
    api.delay("list", Duration::from_millis(30));
    api.delay("create", Duration::from_millis(30));
    let pipeline = pipeline_with(&api, ConcurrencyConfig::default());
    let store = pipeline.store();

    assert_eq!(pipeline.load(), Dispatched::Started);
    store.dispatch(Action::CreateFailure("stale".to_string()));
    assert!(!store.snapshot().loading());

    assert_eq!(pipeline.load(), Dispatched::Dropped);
    assert!(store.snapshot().loading());
    assert_eq!(store.error(), None);

    let draft = BookmarkCreate::new("Tokio", "https://tokio.rs");
    assert_eq!(pipeline.create(draft.clone()), Dispatched::Started);
    store.dispatch(Action::LoadFailure("stale".to_string()));

    assert_eq!(pipeline.create(draft), Dispatched::Dropped);
    assert!(store.snapshot().loading());
    assert_eq!(store.error(), None);

    pipeline.idle().await;
    assert_eq!(api.calls("list"), 1);
    assert_eq!(api.calls("create"), 1);
    assert_eq!(store.error(), None);
}
