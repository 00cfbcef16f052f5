use clap::Parser;
use crm_folder_sync::domain::model::SyncReport;
use crm_folder_sync::domain::ports::FileStore;
use crm_folder_sync::utils::{logger, validation::Validate};
use crm_folder_sync::{AppConfig, Credentials, DropboxStore, FolderSync, SyncCli, SyncError, TwentyClient};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = SyncCli::parse();

    let mut config = match AppConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };
    args.apply_to(&mut config);

    // 初始化日誌（console + log file）
    logger::init_cli_logger_with_file(args.verbose, Path::new(&config.logging.log_file))?;

    tracing::info!("🚀 Starting crm-folder-sync");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    if let Err(e) = config.validate() {
        fail(&e);
    }

    let stdin = std::io::stdin();
    let credentials = match Credentials::load(&config, &mut stdin.lock(), &mut std::io::stdout()) {
        Ok(credentials) => credentials,
        Err(e) => fail(&e),
    };

    if let Err(e) = run(&config, &credentials, args.dry_run).await {
        fail(&e);
    }

    Ok(())
}

async fn run(config: &AppConfig, credentials: &Credentials, dry_run: bool) -> crm_folder_sync::Result<()> {
    let store = DropboxStore::new(config, credentials.storage_token.clone())?;
    let crm = TwentyClient::new(config, credentials.crm_token.clone())?;

    let account = store.verify_account().await?;
    tracing::info!("✅ Successfully connected to Dropbox as {}", account);

    let root_path = config.root_path();
    let sync = FolderSync::new(&store, &crm, config.run.on_folder_error)?;

    if dry_run {
        tracing::info!("🔍 DRY RUN MODE - No CRM records will be created");
        for plan in sync.plan(&root_path).await? {
            match plan.info_file {
                Some(info) => println!("  📁 {} ({} files, info: {})", plan.folder, plan.files, info),
                None => println!("  📁 {} ({} files, ⚠️ no *_info.pdf)", plan.folder, plan.files),
            }
        }
        return Ok(());
    }

    let report = sync.run(&root_path).await?;
    print_summary(&report);

    if !report.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_summary(report: &SyncReport) {
    tracing::info!(
        "📊 Folders processed: {}, failed: {}, attachments: {}, attachment failures: {}",
        report.folders.len(),
        report.failed_folders.len(),
        report.attachments_created(),
        report.attachment_failures()
    );
    for (folder, reason) in &report.failed_folders {
        tracing::error!("❌ {}: {}", folder, reason);
    }
    if report.aborted {
        tracing::warn!("⚠️ Run stopped early; remaining folders were not processed");
    }

    if report.is_success() {
        println!("✅ Sync completed: {} people created", report.folders.len());
    } else {
        eprintln!(
            "❌ Sync finished with {} failed folder(s)",
            report.failed_folders.len()
        );
    }
}

fn fail(e: &SyncError) -> ! {
    tracing::error!("❌ {} (Category: {:?})", e, e.category());
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e);
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(1);
}
