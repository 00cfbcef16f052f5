use crate::app::sync::extractor::InfoExtractor;
use crate::config::toml_config::FolderErrorPolicy;
use crate::domain::model::{FolderOutcome, StorageEntry, SyncReport};
use crate::domain::ports::{CrmGateway, FileStore};
use crate::utils::error::{Result, SyncError};

/// What a dry run found in one customer folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderPlan {
    pub folder: String,
    pub info_file: Option<String>,
    pub files: usize,
}

/// Walks the root folder one customer at a time:
/// info file, extraction, person, then every file as an attachment.
pub struct FolderSync<'a, S: FileStore, C: CrmGateway> {
    store: &'a S,
    crm: &'a C,
    extractor: InfoExtractor,
    policy: FolderErrorPolicy,
}

impl<'a, S: FileStore, C: CrmGateway> FolderSync<'a, S, C> {
    pub fn new(store: &'a S, crm: &'a C, policy: FolderErrorPolicy) -> Result<Self> {
        Ok(Self {
            store,
            crm,
            extractor: InfoExtractor::new()?,
            policy,
        })
    }

    /// 確認根目錄存在，不存在視為設定錯誤
    pub async fn verify_root(&self, root_path: &str) -> Result<()> {
        match self.store.get_metadata(root_path).await {
            Ok(entry) if entry.is_folder() => {
                tracing::info!("📁 Using existing folder: {}", root_path);
                Ok(())
            }
            Ok(_) => Err(SyncError::ConfigError {
                message: format!("'{}' is not a folder", root_path),
            }),
            Err(e) if e.is_not_found() => Err(SyncError::ConfigError {
                message: format!("Folder '{}' not found in storage", root_path),
            }),
            Err(e) => Err(e),
        }
    }

    /// Top-level folders under the root; loose files are ignored.
    pub async fn customer_folders(&self, root_path: &str) -> Result<Vec<StorageEntry>> {
        let entries = self.store.list_folder(root_path).await?;
        let folders: Vec<StorageEntry> = entries.into_iter().filter(StorageEntry::is_folder).collect();
        tracing::info!("Found {} customer folders in {}", folders.len(), root_path);
        Ok(folders)
    }

    /// Person creation must succeed before any attachment is tried. After
    /// that, each file's failure is recorded and the loop moves on.
    pub async fn process_folder(&self, folder: &StorageEntry) -> Result<FolderOutcome> {
        tracing::info!("🚀 Processing folder: {}", folder.name);

        let entries = self.store.list_folder(&folder.path_display).await?;
        let info_entry = entries
            .iter()
            .find(|e| e.is_info_document())
            .ok_or_else(|| SyncError::InfoFileMissing {
                folder: folder.name.clone(),
            })?;

        let info_bytes = self.store.download(&info_entry.path_display).await?;
        let info = self
            .extractor
            .extract(&info_entry.name, &info_bytes)?
            .with_derived_name(&info_entry.name);
        tracing::debug!("Extracted info for {}: {:?}", folder.name, info);

        let person_id = self.crm.create_person(&info).await?;

        let mut outcome = FolderOutcome {
            folder: folder.name.clone(),
            person_id,
            ..Default::default()
        };

        for entry in entries.iter().filter(|e| e.is_file()) {
            match self.attach_file(entry, &outcome.person_id).await {
                Ok(()) => outcome.attached.push(entry.name.clone()),
                Err(e) => {
                    tracing::error!("❌ Failed to attach {}: {}", entry.name, e);
                    outcome.failed.push((entry.name.clone(), e.to_string()));
                }
            }
        }

        tracing::info!(
            "✅ Folder {} done: {} attached, {} failed",
            outcome.folder,
            outcome.attached.len(),
            outcome.failed.len()
        );
        Ok(outcome)
    }

    async fn attach_file(&self, entry: &StorageEntry, person_id: &str) -> Result<()> {
        let content = self.store.download(&entry.path_display).await?;
        let reference = self.crm.upload_file(&entry.name, content).await?;
        self.crm
            .create_attachment(&reference, person_id, Some(&entry.name))
            .await?;
        Ok(())
    }

    /// Errors before enumeration (missing root, listing failure) are returned
    /// as-is. Folder failures are handled by the configured policy.
    pub async fn run(&self, root_path: &str) -> Result<SyncReport> {
        self.verify_root(root_path).await?;
        let folders = self.customer_folders(root_path).await?;

        let mut report = SyncReport::default();
        for folder in &folders {
            match self.process_folder(folder).await {
                Ok(outcome) => report.folders.push(outcome),
                Err(e) => {
                    tracing::error!("❌ Error processing folder {}: {}", folder.name, e);
                    report.failed_folders.push((folder.name.clone(), e.to_string()));

                    if self.policy == FolderErrorPolicy::Abort {
                        tracing::warn!("⚠️ Stopping run after folder failure (on_folder_error = abort)");
                        report.aborted = true;
                        break;
                    }
                }
            }
        }

        Ok(report)
    }

    /// Lists what `run` would touch without downloading anything or calling the CRM.
    pub async fn plan(&self, root_path: &str) -> Result<Vec<FolderPlan>> {
        self.verify_root(root_path).await?;

        let mut plans = Vec::new();
        for folder in self.customer_folders(root_path).await? {
            let entries = self.store.list_folder(&folder.path_display).await?;
            plans.push(FolderPlan {
                info_file: entries
                    .iter()
                    .find(|e| e.is_info_document())
                    .map(|e| e.name.clone()),
                files: entries.iter().filter(|e| e.is_file()).count(),
                folder: folder.name,
            });
        }
        Ok(plans)
    }
}
