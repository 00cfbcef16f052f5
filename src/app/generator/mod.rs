pub mod documents;
pub mod factory;
pub mod uploader;

use crate::domain::ports::FileStore;
use crate::utils::error::Result;
use documents::build_customer_documents;
use factory::CustomerFactory;
use rand::Rng;
use uploader::StorageUploader;

/// What one generator run produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationSummary {
    pub root_path: String,
    pub customers: Vec<String>,
    pub documents_uploaded: usize,
}

/// 產生 `count` 位客戶並逐一上傳，任何錯誤都會中止整個流程
pub async fn run_generator<S: FileStore, R: Rng>(
    store: &S,
    root_path: &str,
    count: usize,
    files_per_customer: usize,
    factory: &mut CustomerFactory<R>,
) -> Result<GenerationSummary> {
    let uploader = StorageUploader::new(store, root_path);
    uploader.ensure_root_folder().await?;

    let mut summary = GenerationSummary {
        root_path: root_path.to_string(),
        ..Default::default()
    };

    for customer in factory.generate(count) {
        tracing::info!("Creating data for {}...", customer.name);
        let documents = build_customer_documents(&customer, files_per_customer, factory.rng_mut())?;
        uploader.upload_customer(&customer.name, &documents).await?;
        tracing::info!("✅ Successfully uploaded data for {}", customer.name);

        summary.documents_uploaded += documents.len();
        summary.customers.push(customer.name);
    }

    Ok(summary)
}
