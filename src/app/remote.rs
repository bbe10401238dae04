use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::{bookmarks, id::BookmarkId};

use super::{
    backend::{fetch_one, BookmarkApi},
    errors::AppError,
};

pub struct AppRemote {
    client: reqwest::Client,
    base: Url,
    basic_auth: Option<(String, Option<String>)>,
    bearer_token: Option<String>,
}

impl AppRemote {
    pub fn new(
        addr: &str,
        resource_path: &str,
        basic_auth: Option<(String, Option<String>)>,
        bearer_token: Option<String>,
        timeout: Duration,
    ) -> anyhow::Result<AppRemote> {
        let remote_addr = addr.strip_suffix("/").unwrap_or(addr);
        let resource_path = resource_path.trim_end_matches('/');
        let base = Url::parse(&format!("{remote_addr}{resource_path}"))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("{base} cannot be used as a base url");
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(AppRemote {
            client,
            base,
            basic_auth,
            bearer_token,
        })
    }

    fn item_url(&self, id: &BookmarkId) -> anyhow::Result<Url, AppError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("{} cannot be used as a base url", self.base))?
            .pop_if_empty()
            .push(&id.key());
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        log::info!("{method} {url}");
        let builder = self.client.request(method, url);

        match (self.basic_auth.clone(), self.bearer_token.as_ref()) {
            (Some((username, password)), _) => builder.basic_auth(username, password),
            (None, Some(token)) => builder.bearer_auth(token),
            (None, None) => builder,
        }
    }
}

/// Error payloads the backend may answer with.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(untagged)]
enum ErrorBody {
    Error { error: String },
    Message { message: String },
}

async fn check_status(response: reqwest::Response) -> anyhow::Result<reqwest::Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(AppError::NotFound);
    }

    let text = response.text().await.unwrap_or_default();
    log::error!("{status}: {text:?}");

    match serde_json::from_str::<ErrorBody>(&text) {
        Ok(ErrorBody::Error { error: message }) | Ok(ErrorBody::Message { message }) => {
            Err(AppError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
        Err(_) => Err(AppError::Status(status)),
    }
}

async fn handle_response<T>(response: reqwest::Response) -> anyhow::Result<T, AppError>
where
    T: DeserializeOwned,
{
    let text = check_status(response).await?.text().await?;

    let data = serde_json::from_str::<T>(&text).map_err(|err| {
        log::error!("{err}. tried to parse: {text:?}");
        err
    })?;

    Ok(data)
}

#[async_trait]
impl BookmarkApi for AppRemote {
    async fn list(&self) -> anyhow::Result<Vec<bookmarks::Bookmark>, AppError> {
        let resp = self.request(Method::GET, self.base.clone()).send().await?;
        handle_response(resp).await
    }

    async fn list_by_id(
        &self,
        id: &BookmarkId,
    ) -> anyhow::Result<Vec<bookmarks::Bookmark>, AppError> {
        let resp = self
            .request(Method::GET, self.base.clone())
            .query(&[("id", id.key())])
            .send()
            .await?;
        handle_response(resp).await
    }

    async fn get(&self, id: &BookmarkId) -> anyhow::Result<bookmarks::Bookmark, AppError> {
        let resp = self.request(Method::GET, self.item_url(id)?).send().await?;
        handle_response(resp).await
    }

    async fn create(
        &self,
        bmark_create: &bookmarks::BookmarkCreate,
    ) -> anyhow::Result<bookmarks::Bookmark, AppError> {
        let resp = self
            .request(Method::POST, self.base.clone())
            .json(bmark_create)
            .send()
            .await?;
        handle_response(resp).await
    }

    async fn update(
        &self,
        id: &BookmarkId,
        bmark_update: &bookmarks::BookmarkUpdate,
    ) -> anyhow::Result<bookmarks::Bookmark, AppError> {
        let mut body = serde_json::to_value(bmark_update)?;
        if let Value::Object(fields) = &mut body {
            fields.insert("id".to_string(), serde_json::to_value(id)?);
        }

        let resp = self
            .request(Method::PUT, self.item_url(id)?)
            .json(&body)
            .send()
            .await?;
        let text = check_status(resp).await?.text().await?;

        // some backends answer PUT with 204 and no body
        if text.trim().is_empty() {
            log::debug!("empty update response for {id}, fetching canonical record");
            return fetch_one(self, id).await;
        }

        Ok(serde_json::from_str(&text)?)
    }

    async fn delete(&self, id: &BookmarkId) -> anyhow::Result<(), AppError> {
        let resp = self.request(Method::DELETE, self.item_url(id)?).send().await?;
        check_status(resp).await?;
        Ok(())
    }
}
