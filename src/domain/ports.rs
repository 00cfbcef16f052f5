use crate::domain::model::{Attachment, ExtractedCustomerInfo, StorageEntry};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Remote file store holding one folder per customer.
pub trait FileStore: Send + Sync {
    /// Confirms the token works; returns the account's display name.
    fn verify_account(&self) -> impl std::future::Future<Output = Result<String>> + Send;

    fn get_metadata(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = Result<StorageEntry>> + Send;

    /// Entries directly under `path`, in the order the store returns them.
    fn list_folder(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = Result<Vec<StorageEntry>>> + Send;

    fn download(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;

    fn upload(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Returns `false` when the folder already existed.
    fn create_folder(&self, path: &str) -> impl std::future::Future<Output = Result<bool>> + Send;
}

#[async_trait]
pub trait CrmGateway: Send + Sync {
    /// Creates a person and returns its id.
    async fn create_person(&self, info: &ExtractedCustomerInfo) -> Result<String>;

    /// Uploads raw bytes; returns the stored-file reference (may carry a `?token=` suffix).
    async fn upload_file(&self, file_name: &str, content: Vec<u8>) -> Result<String>;

    async fn create_attachment(
        &self,
        file_reference: &str,
        person_id: &str,
        name: Option<&str>,
    ) -> Result<Attachment>;
}
