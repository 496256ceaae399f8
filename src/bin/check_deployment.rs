//! Checks the API deployment through `gcloud run services describe`, showing the
//! latest Cloud Build status when the service cannot be described.
//!
//! Exits 0 once the service has a URL, 1 otherwise.

use std::io;
use std::process;

use deploy_status::cli::{self, CliInputs};
use deploy_status::{describe, logging, Console};

#[tokio::main(flavor = "current_thread")]
pub async fn main() {
    let args = CliInputs::parse("check-deployment", "Check Cloud Run API deployment status using gcloud");
    logging::init(cli::verbosity_level(&args));

    let config = match args.into_config() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("❌ {}", error);
            process::exit(1);
        }
    };

    let mut console = Console::new(io::stdout());
    let report = describe::check(&config, &mut console).await;
    process::exit(report.exit_code());
}
