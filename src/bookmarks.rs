use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, hash::Hash};

use crate::id::BookmarkId;

#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: BookmarkId,

    pub title: String,
    pub url: String,

    /// ISO-8601 timestamp, fixed at creation.
    pub created_at: String,
}

impl Hash for Bookmark {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl PartialEq for Bookmark {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.title == other.title
            && self.url == other.url
            && self.created_at == other.created_at
    }
}

impl Bookmark {
    pub fn key(&self) -> String {
        self.id.key()
    }

    /// Newest first. ISO-8601 strings sort lexicographically in time order;
    /// equal timestamps fall back to the normalized id.
    pub fn newest_first(a: &Bookmark, b: &Bookmark) -> Ordering {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.key().cmp(&b.key()))
    }
}

/// A bookmark before the server has assigned it an id.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkCreate {
    pub title: String,
    pub url: String,
    pub created_at: String,
}

impl BookmarkCreate {
    /// Draft stamped with the current UTC time, in the same shape browsers
    /// produce with `toISOString()`.
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            created_at: now_iso(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct BookmarkUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl BookmarkUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.url.is_none()
    }
}

pub fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
