use crate::domain::model::GeneratedDocument;
use crate::domain::ports::FileStore;
use crate::utils::error::Result;

/// Uploads generated documents into `/<root>/<customer name>/`.
pub struct StorageUploader<'a, S: FileStore> {
    store: &'a S,
    root_path: String,
}

impl<'a, S: FileStore> StorageUploader<'a, S> {
    pub fn new(store: &'a S, root_path: impl Into<String>) -> Self {
        Self {
            store,
            root_path: root_path.into(),
        }
    }

    /// 根目錄不存在時建立
    pub async fn ensure_root_folder(&self) -> Result<()> {
        match self.store.get_metadata(&self.root_path).await {
            Ok(_) => {
                tracing::info!("📁 Using existing folder: {}", self.root_path);
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                tracing::info!("📁 Creating new folder: {}", self.root_path);
                self.store.create_folder(&self.root_path).await?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Creates the customer folder (an existing one is reused) and uploads
    /// every document in order. Returns the folder path.
    pub async fn upload_customer(&self, customer_name: &str, documents: &[GeneratedDocument]) -> Result<String> {
        let folder_path = format!("{}/{}", self.root_path, customer_name);

        if !self.store.create_folder(&folder_path).await? {
            tracing::debug!("Reusing existing folder {}", folder_path);
        }

        for document in documents {
            let path = format!("{}/{}", folder_path, document.file_name);
            self.store.upload(&path, &document.content).await?;
            tracing::debug!("Uploaded {}", path);
        }

        Ok(folder_path)
    }
}
