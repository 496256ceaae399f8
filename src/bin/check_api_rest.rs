//! Checks the API deployment through the Cloud Run REST API, authenticating with
//! the token printed by `gcloud auth print-access-token`.
//!
//! Exits 0 once the service has a URL, 1 otherwise.

use std::io;
use std::process;

use deploy_status::cli::{self, CliInputs};
use deploy_status::{logging, rest, Console};

#[tokio::main(flavor = "current_thread")]
pub async fn main() {
    let args = CliInputs::parse("check-api-rest", "Check Cloud Run API status using the REST API");
    logging::init(cli::verbosity_level(&args));

    let config = match args.into_config() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("❌ {}", error);
            process::exit(1);
        }
    };

    let mut console = Console::new(io::stdout());
    let report = rest::check(&config, &mut console).await;
    process::exit(report.exit_code());
}
