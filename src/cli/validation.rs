use crate::{
    bookmarks::BookmarkUpdate,
    cli::errors::{CliError, CliResult},
};
use url::Url;

const MAX_TITLE_LEN: usize = 500;

/// Validates URL format: an absolute http(s) URL with a host
pub fn validate_url(url: &str) -> CliResult<()> {
    if url.trim().is_empty() {
        return Err(CliError::validation("url", "URL cannot be empty"));
    }

    match Url::parse(url.trim()) {
        Ok(parsed_url) => {
            if !matches!(parsed_url.scheme(), "http" | "https") {
                return Err(CliError::validation(
                    "url",
                    "URL must start with http:// or https://",
                ));
            }
            if parsed_url.host_str().map_or(true, str::is_empty) {
                return Err(CliError::validation("url", "URL must have a host"));
            }
            Ok(())
        }
        Err(_) => Err(CliError::validation("url", "Invalid URL format")),
    }
}

/// Validates title: required, bounded
pub fn validate_title(title: &str) -> CliResult<()> {
    if title.trim().is_empty() {
        return Err(CliError::validation("title", "Title cannot be empty"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(CliError::validation(
            "title",
            format!("Title cannot exceed {MAX_TITLE_LEN} characters"),
        ));
    }
    Ok(())
}

/// Validates bookmark creation input
pub fn validate_bookmark_create(title: &str, url: &str) -> CliResult<()> {
    validate_title(title)?;
    validate_url(url)?;
    Ok(())
}

/// Validates bookmark update input
pub fn validate_bookmark_update(update: &BookmarkUpdate) -> CliResult<()> {
    if update.is_empty() {
        return Err(CliError::invalid_input("This update request does nothing"));
    }
    if let Some(title) = &update.title {
        validate_title(title)?;
    }
    if let Some(url) = &update.url {
        validate_url(url)?;
    }
    Ok(())
}
