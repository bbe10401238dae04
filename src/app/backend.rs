use async_trait::async_trait;

use crate::{bookmarks, id::BookmarkId};

use super::errors::AppError;

/// REST collaborator the pipeline talks to.
#[async_trait]
pub trait BookmarkApi: Send + Sync {
    async fn list(&self) -> anyhow::Result<Vec<bookmarks::Bookmark>, AppError>;

    /// `LIST` filtered by id, for backends whose by-id route rejects some id shapes.
    async fn list_by_id(
        &self,
        id: &BookmarkId,
    ) -> anyhow::Result<Vec<bookmarks::Bookmark>, AppError>;

    async fn get(&self, id: &BookmarkId) -> anyhow::Result<bookmarks::Bookmark, AppError>;

    async fn create(
        &self,
        bmark_create: &bookmarks::BookmarkCreate,
    ) -> anyhow::Result<bookmarks::Bookmark, AppError>;

    async fn update(
        &self,
        id: &BookmarkId,
        bmark_update: &bookmarks::BookmarkUpdate,
    ) -> anyhow::Result<bookmarks::Bookmark, AppError>;

    async fn delete(&self, id: &BookmarkId) -> anyhow::Result<(), AppError>;
}

/// Single record read with a not-found fallback.
///
/// Tries `GET(id)` first; on not-found retries as `LIST(id=…)` and takes the
/// first element. If that is empty too, the first not-found error is returned.
pub async fn fetch_one(
    api: &dyn BookmarkApi,
    id: &BookmarkId,
) -> anyhow::Result<bookmarks::Bookmark, AppError> {
    match api.get(id).await {
        Ok(bmark) => Ok(bmark),
        Err(err) if err.is_not_found() => {
            log::debug!("bookmark {id} not found by id, retrying as filtered list");
            match api.list_by_id(id).await?.into_iter().next() {
                Some(bmark) => Ok(bmark),
                None => Err(err),
            }
        }
        Err(err) => Err(err),
    }
}
