use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{
    bookmarks::{Bookmark, BookmarkCreate, BookmarkUpdate},
    id::BookmarkId,
};

/// Operation family an action belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    Load,
    Create,
    Update,
    Delete,
}

impl OpKind {
    /// Message used when a failed call carries no text of its own.
    pub fn default_failure(&self) -> &'static str {
        match self {
            OpKind::Load => "Failed to load bookmarks",
            OpKind::Create => "Create failed",
            OpKind::Update => "Update failed",
            OpKind::Delete => "Delete failed",
        }
    }
}

impl Display for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OpKind::Load => "load",
            OpKind::Create => "create",
            OpKind::Update => "update",
            OpKind::Delete => "delete",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Load,
    LoadSuccess(Vec<Bookmark>),
    LoadFailure(String),

    Create(BookmarkCreate),
    CreateSuccess(Bookmark),
    CreateFailure(String),

    Update { id: BookmarkId, changes: BookmarkUpdate },
    UpdateSuccess(Bookmark),
    UpdateFailure(String),

    Delete(BookmarkId),
    DeleteSuccess(BookmarkId),
    DeleteFailure(String),
}

impl Action {
    pub fn kind(&self) -> OpKind {
        match self {
            Action::Load | Action::LoadSuccess(_) | Action::LoadFailure(_) => OpKind::Load,
            Action::Create(_) | Action::CreateSuccess(_) | Action::CreateFailure(_) => {
                OpKind::Create
            }
            Action::Update { .. } | Action::UpdateSuccess(_) | Action::UpdateFailure(_) => {
                OpKind::Update
            }
            Action::Delete(_) | Action::DeleteSuccess(_) | Action::DeleteFailure(_) => {
                OpKind::Delete
            }
        }
    }

    /// True for the terminal success/failure actions.
    pub fn is_outcome(&self) -> bool {
        !matches!(
            self,
            Action::Load | Action::Create(_) | Action::Update { .. } | Action::Delete(_)
        )
    }

    /// Failure text, if this is a failure outcome.
    pub fn failure(&self) -> Option<&str> {
        match self {
            Action::LoadFailure(err)
            | Action::CreateFailure(err)
            | Action::UpdateFailure(err)
            | Action::DeleteFailure(err) => Some(err),
            _ => None,
        }
    }

    pub fn failed(kind: OpKind, error: String) -> Action {
        match kind {
            OpKind::Load => Action::LoadFailure(error),
            OpKind::Create => Action::CreateFailure(error),
            OpKind::Update => Action::UpdateFailure(error),
            OpKind::Delete => Action::DeleteFailure(error),
        }
    }

    /// Short name for logs; payloads can be large.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Load => "load",
            Action::LoadSuccess(_) => "load success",
            Action::LoadFailure(_) => "load failure",
            Action::Create(_) => "create",
            Action::CreateSuccess(_) => "create success",
            Action::CreateFailure(_) => "create failure",
            Action::Update { .. } => "update",
            Action::UpdateSuccess(_) => "update success",
            Action::UpdateFailure(_) => "update failure",
            Action::Delete(_) => "delete",
            Action::DeleteSuccess(_) => "delete success",
            Action::DeleteFailure(_) => "delete failure",
        }
    }
}
