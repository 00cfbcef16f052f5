use clap::Parser;
use crm_folder_sync::app::generator::{factory::CustomerFactory, run_generator};
use crm_folder_sync::domain::ports::FileStore;
use crm_folder_sync::utils::{logger, validation, validation::Validate};
use crm_folder_sync::{AppConfig, Credentials, DropboxStore, GenerateCli, SyncError};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = GenerateCli::parse();

    logger::init_cli_logger(args.verbose);
    tracing::info!("🚀 Starting customer data generator");

    let mut config = match AppConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => fail(&e),
    };
    if let Some(root) = &args.root_folder {
        config.storage.root_folder = root.clone();
    }

    // 驗證配置與數量範圍
    if let Err(e) = config
        .validate()
        .and_then(|_| validation::validate_range("customers", args.customers, 1, 100))
        .and_then(|_| validation::validate_range("files_per_customer", args.files_per_customer, 0, 10))
    {
        fail(&e);
    }

    let stdin = std::io::stdin();
    let token = match Credentials::load_storage_only(&config, &mut stdin.lock(), &mut std::io::stdout()) {
        Ok(token) => token,
        Err(e) => fail(&e),
    };

    let rng = match args.seed {
        Some(seed) => {
            tracing::info!("🎲 Using seed {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };
    let mut factory = CustomerFactory::new(rng, chrono::Local::now().naive_local());

    let result = async {
        let store = DropboxStore::new(&config, token)?;
        let account = store.verify_account().await?;
        tracing::info!("✅ Successfully connected to Dropbox as {}", account);

        run_generator(
            &store,
            &config.root_path(),
            args.customers,
            args.files_per_customer,
            &mut factory,
        )
        .await
    }
    .await;

    match result {
        Ok(summary) => {
            println!(
                "✅ All customer data has been successfully uploaded to Dropbox folder: {}",
                summary.root_path
            );
            println!(
                "📁 Generated {} customers with {} additional files each ({} documents)",
                summary.customers.len(),
                args.files_per_customer,
                summary.documents_uploaded
            );
            Ok(())
        }
        Err(e) => fail(&e),
    }
}

fn fail(e: &SyncError) -> ! {
    tracing::error!("❌ {} (Category: {:?})", e, e.category());
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e);
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(1);
}
