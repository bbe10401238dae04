#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("bookmark not found")]
    NotFound,

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("server responded with {0}")]
    Status(reqwest::StatusCode),

    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound)
    }

    /// Human readable text, or `None` when the error has nothing to say.
    pub fn message(&self) -> Option<String> {
        let message = self.to_string();
        let message = message.trim();
        if message.is_empty() {
            None
        } else {
            Some(message.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_messages_are_none() {
        let err = AppError::Rejected {
            status: 500,
            message: "  ".to_string(),
        };
        assert_eq!(err.message(), None);

        let err = AppError::Other(anyhow::anyhow!("boom"));
        assert_eq!(err.message().as_deref(), Some("boom"));
        assert!(AppError::NotFound.is_not_found());
    }
}
