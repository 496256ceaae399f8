use structopt::{
    clap::AppSettings::{ColorAuto, ColoredHelp},
    StructOpt,
};

use crate::config::{CheckerConfig, CliProgram, ConfigError, ServiceDescriptor};

#[derive(Debug, StructOpt)]
#[structopt(setting(ColorAuto), setting(ColoredHelp), about)]
pub struct CliInputs {
    /// Verbosity level (-v, -vv, -vvv, etc.)
    /// Default (no `-v` flag(s)) => warnings only.
    #[structopt(short, parse(from_occurrences))]
    pub verbosity_level: usize,

    /// GCP project hosting the service
    #[structopt(long, default_value = "gen-lang-client-0803362165")]
    pub project: String,

    /// Cloud Run region of the service
    #[structopt(long, default_value = "asia-south1")]
    pub region: String,

    /// Cloud Run service name
    #[structopt(long, default_value = "whatsay-api")]
    pub service: String,

    /// gcloud executable used for tokens, describe and build listing
    #[structopt(long, default_value = "gcloud")]
    pub gcloud: String,
}

impl CliInputs {
    /// Parses the process arguments under the given binary name.
    pub fn parse(name: &str, about: &str) -> CliInputs {
        let app = CliInputs::clap().name(name).about(about);
        CliInputs::from_clap(&app.get_matches())
    }

    pub fn into_config(self) -> Result<CheckerConfig, ConfigError> {
        let service = ServiceDescriptor::new(self.project, self.region, self.service)?;
        let mut config = CheckerConfig::new(service);
        config.gcloud = CliProgram::new(self.gcloud);
        Ok(config)
    }
}

pub fn verbosity_level(args: &CliInputs) -> usize {
    args.verbosity_level
}
