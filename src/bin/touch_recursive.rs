use clap::Parser;
use crm_folder_sync::app::touch::{resolve_directory, run_touch, SleepThrottle, TouchOptions};
use crm_folder_sync::utils::{logger, validation};
use crm_folder_sync::TouchCli;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let args = TouchCli::parse();
    logger::init_cli_logger(args.verbose);

    if let Err(e) = validation::validate_positive_number("batch_size", args.batch_size, 1) {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let directory = match resolve_directory(&args.directory) {
        Ok(directory) => directory,
        Err(e) => {
            eprintln!("❌ Error: {} cannot be resolved: {}", args.directory, e);
            std::process::exit(1);
        }
    };

    println!("Starting recursive touch at {}", chrono::Local::now());
    println!("Directory: {}", directory.display());
    println!("Batch size: {}", args.batch_size);
    println!("Delay between batches: {} seconds", args.delay);
    if !args.ignore.is_empty() {
        println!("Ignoring patterns: {}", args.ignore.join(", "));
    }

    let options = TouchOptions {
        batch_size: args.batch_size,
        delay: Duration::from_secs(args.delay),
        verbose: args.verbose,
        ignore: args.ignore.clone(),
    };
    let mut throttle = SleepThrottle::with_ctrl_c();

    let success = match run_touch(&directory, &options, &mut throttle).await {
        Ok(report) => {
            if report.failed > 0 {
                eprintln!("Errors encountered: {}", report.failed);
            }
            report.is_success()
        }
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            false
        }
    };

    println!("Finished at {}", chrono::Local::now());
    std::process::exit(if success { 0 } else { 1 });
}
