//! Dropbox HTTP API v2 adapter.
//!
//! RPC endpoints live on the api host and take a JSON body; `files/download`
//! and `files/upload` live on the content host and carry their arguments in
//! the `Dropbox-API-Arg` header.

use crate::config::AppConfig;
use crate::domain::model::{EntryKind, StorageEntry};
use crate::domain::ports::FileStore;
use crate::utils::error::{Result, SyncError};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

const API_ARG_HEADER: &str = "Dropbox-API-Arg";

#[derive(Debug, Deserialize)]
struct RawMetadata {
    #[serde(rename = ".tag")]
    tag: EntryKind,
    name: String,
    #[serde(default)]
    path_display: Option<String>,
}

impl From<RawMetadata> for StorageEntry {
    fn from(raw: RawMetadata) -> Self {
        Self {
            kind: raw.tag,
            path_display: raw.path_display.unwrap_or_else(|| raw.name.clone()),
            name: raw.name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListFolderResponse {
    entries: Vec<RawMetadata>,
    cursor: String,
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Deserialize)]
struct AccountName {
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct AccountResponse {
    name: AccountName,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error_summary: String,
}

#[derive(Debug, Serialize)]
struct PathArg<'a> {
    path: &'a str,
}

#[derive(Clone)]
pub struct DropboxStore {
    client: Client,
    api_url: String,
    content_url: String,
    token: String,
}

impl DropboxStore {
    pub fn new(config: &AppConfig, token: impl Into<String>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.storage_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            api_url: config.storage.api_url.trim_end_matches('/').to_string(),
            content_url: config.storage.content_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    async fn rpc<B: Serialize + ?Sized, T: DeserializeOwned>(&self, endpoint: &str, body: &B) -> Result<T> {
        let url = format!("{}/{}", self.api_url, endpoint);
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;

        let response = check_status(endpoint, response).await?;
        Ok(response.json().await?)
    }

    async fn list_folder_continue(&self, cursor: &str) -> Result<ListFolderResponse> {
        self.rpc("files/list_folder/continue", &json!({ "cursor": cursor }))
            .await
    }
}

/// Turns a non-2xx response into `StorageApiError`, preferring the
/// `error_summary` field when the body is JSON.
async fn check_status(endpoint: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let summary = serde_json::from_str::<ApiErrorBody>(&text)
        .map(|body| body.error_summary)
        .unwrap_or(text);

    Err(SyncError::StorageApiError {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        summary,
    })
}

/// JSON for the `Dropbox-API-Arg` header. Header values must be ASCII, so
/// every non-ASCII char is written as a `\uXXXX` escape.
pub fn api_arg_header<T: Serialize>(arg: &T) -> Result<String> {
    let raw = serde_json::to_string(arg)?;
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii() {
            escaped.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                escaped.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    Ok(escaped)
}

impl FileStore for DropboxStore {
    async fn verify_account(&self) -> Result<String> {
        let endpoint = "users/get_current_account";
        let url = format!("{}/{}", self.api_url, endpoint);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header(CONTENT_TYPE, "application/json")
            .body("null")
            .send()
            .await?;

        let account: AccountResponse = check_status(endpoint, response).await?.json().await?;
        Ok(account.name.display_name)
    }

    async fn get_metadata(&self, path: &str) -> Result<StorageEntry> {
        let raw: RawMetadata = self.rpc("files/get_metadata", &PathArg { path }).await?;
        Ok(raw.into())
    }

    async fn list_folder(&self, path: &str) -> Result<Vec<StorageEntry>> {
        let mut page: ListFolderResponse = self.rpc("files/list_folder", &PathArg { path }).await?;
        let mut entries: Vec<StorageEntry> = Vec::new();

        loop {
            entries.extend(page.entries.into_iter().map(StorageEntry::from));
            if !page.has_more {
                break;
            }
            tracing::debug!("Listing of {} continues (cursor {})", path, page.cursor);
            page = self.list_folder_continue(&page.cursor).await?;
        }

        Ok(entries)
    }

    async fn download(&self, path: &str) -> Result<Vec<u8>> {
        let endpoint = "files/download";
        let url = format!("{}/{}", self.content_url, endpoint);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header(API_ARG_HEADER, api_arg_header(&PathArg { path })?)
            .send()
            .await?;

        let bytes = check_status(endpoint, response).await?.bytes().await?;
        tracing::debug!("Downloaded {} ({} bytes)", path, bytes.len());
        Ok(bytes.to_vec())
    }

    async fn upload(&self, path: &str, data: &[u8]) -> Result<()> {
        let endpoint = "files/upload";
        let url = format!("{}/{}", self.content_url, endpoint);
        let arg = json!({
            "path": path,
            "mode": "add",
            "autorename": false,
            "mute": false,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header(API_ARG_HEADER, api_arg_header(&arg)?)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(data.to_vec())
            .send()
            .await?;

        check_status(endpoint, response).await?;
        tracing::debug!("Uploaded {} ({} bytes)", path, data.len());
        Ok(())
    }

    async fn create_folder(&self, path: &str) -> Result<bool> {
        let body = json!({ "path": path, "autorename": false });
        match self.rpc::<_, serde_json::Value>("files/create_folder_v2", &body).await {
            Ok(_) => Ok(true),
            Err(SyncError::StorageApiError {
                status: 409,
                summary,
                ..
            }) if summary.starts_with("path/conflict") => {
                tracing::debug!("Folder {} already exists", path);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
