//! In-memory stand-ins for the storage and CRM ports used by unit tests.

use crate::domain::model::{Attachment, EntryKind, ExtractedCustomerInfo, StorageEntry};
use crate::domain::ports::{CrmGateway, FileStore};
use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

fn parent_of(path: &str) -> &str {
    path.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("")
}

fn not_found(endpoint: &str) -> SyncError {
    SyncError::StorageApiError {
        endpoint: endpoint.to_string(),
        status: 409,
        summary: "path/not_found/..".to_string(),
    }
}

/// Keeps entries in insertion order, like a listing from the real store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<Vec<(String, Option<Vec<u8>>)>>>,
    failing_downloads: Arc<Mutex<HashSet<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_folder(&self, path: &str) {
        self.entries.lock().await.push((path.to_string(), None));
    }

    pub async fn add_file(&self, path: &str, content: Vec<u8>) {
        self.entries.lock().await.push((path.to_string(), Some(content)));
    }

    pub async fn fail_download(&self, path: &str) {
        self.failing_downloads.lock().await.insert(path.to_string());
    }

    pub async fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.entries
            .lock()
            .await
            .iter()
            .find(|(p, content)| p == path && content.is_some())
            .and_then(|(_, content)| content.clone())
    }

    pub async fn paths(&self) -> Vec<String> {
        self.entries.lock().await.iter().map(|(p, _)| p.clone()).collect()
    }
}

fn to_entry(path: &str, content: &Option<Vec<u8>>) -> StorageEntry {
    StorageEntry {
        kind: if content.is_some() {
            EntryKind::File
        } else {
            EntryKind::Folder
        },
        name: path.rsplit('/').next().unwrap_or(path).to_string(),
        path_display: path.to_string(),
    }
}

impl FileStore for MemoryStore {
    async fn verify_account(&self) -> Result<String> {
        Ok("Test Account".to_string())
    }

    async fn get_metadata(&self, path: &str) -> Result<StorageEntry> {
        self.entries
            .lock()
            .await
            .iter()
            .find(|(p, _)| p == path)
            .map(|(p, content)| to_entry(p, content))
            .ok_or_else(|| not_found("files/get_metadata"))
    }

    async fn list_folder(&self, path: &str) -> Result<Vec<StorageEntry>> {
        let entries = self.entries.lock().await;
        if !entries.iter().any(|(p, content)| p == path && content.is_none()) {
            return Err(not_found("files/list_folder"));
        }
        Ok(entries
            .iter()
            .filter(|(p, _)| parent_of(p) == path)
            .map(|(p, content)| to_entry(p, content))
            .collect())
    }

    async fn download(&self, path: &str) -> Result<Vec<u8>> {
        if self.failing_downloads.lock().await.contains(path) {
            return Err(SyncError::StorageApiError {
                endpoint: "files/download".to_string(),
                status: 500,
                summary: "internal_error".to_string(),
            });
        }
        self.file(path).await.ok_or_else(|| not_found("files/download"))
    }

    async fn upload(&self, path: &str, data: &[u8]) -> Result<()> {
        let mut entries = self.entries.lock().await;
        // mode "add" 不覆寫既有檔案
        if entries.iter().any(|(p, _)| p == path) {
            return Err(SyncError::StorageApiError {
                endpoint: "files/upload".to_string(),
                status: 409,
                summary: "path/conflict/file/..".to_string(),
            });
        }
        entries.push((path.to_string(), Some(data.to_vec())));
        Ok(())
    }

    async fn create_folder(&self, path: &str) -> Result<bool> {
        let mut entries = self.entries.lock().await;
        if entries.iter().any(|(p, _)| p == path) {
            return Ok(false);
        }
        entries.push((path.to_string(), None));
        Ok(true)
    }
}

/// Records every CRM call as `"<operation>:<argument>"`.
#[derive(Clone, Default)]
pub struct RecordingCrm {
    pub calls: Arc<Mutex<Vec<String>>>,
    pub people: Arc<Mutex<Vec<ExtractedCustomerInfo>>>,
    pub fail_person: bool,
    pub failing_uploads: HashSet<String>,
}

impl RecordingCrm {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    pub async fn attached_names(&self) -> Vec<String> {
        self.calls()
            .await
            .into_iter()
            .filter_map(|call| call.strip_prefix("createAttachment:").map(str::to_string))
            .collect()
    }
}

#[async_trait]
impl CrmGateway for RecordingCrm {
    async fn create_person(&self, info: &ExtractedCustomerInfo) -> Result<String> {
        let name = format!(
            "{} {}",
            info.first_name.as_deref().unwrap_or_default(),
            info.last_name.as_deref().unwrap_or_default()
        );
        self.calls.lock().await.push(format!("createPerson:{}", name.trim()));

        if self.fail_person {
            return Err(SyncError::GraphQlError {
                operation: "createPerson".to_string(),
                message: r#"[{"message":"Forbidden"}]"#.to_string(),
            });
        }

        let mut people = self.people.lock().await;
        people.push(info.clone());
        Ok(format!("person-{}", people.len()))
    }

    async fn upload_file(&self, file_name: &str, _content: Vec<u8>) -> Result<String> {
        self.calls.lock().await.push(format!("uploadFile:{}", file_name));

        if self.failing_uploads.contains(file_name) {
            return Err(SyncError::GraphQlError {
                operation: "uploadFile".to_string(),
                message: "HTTP 413: payload too large".to_string(),
            });
        }
        Ok(format!("attachment/{}?token=t", file_name.replace(' ', "-")))
    }

    async fn create_attachment(
        &self,
        file_reference: &str,
        person_id: &str,
        name: Option<&str>,
    ) -> Result<Attachment> {
        let name = name.unwrap_or(file_reference).to_string();
        self.calls.lock().await.push(format!("createAttachment:{}", name));

        Ok(Attachment {
            id: format!("att-{}", name),
            name: Some(name),
            attachment_type: Some("attachment".to_string()),
            person_id: Some(person_id.to_string()),
            person: None,
            full_path: Some(file_reference.split('?').next().unwrap_or_default().to_string()),
        })
    }
}
