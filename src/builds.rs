//! Latest Cloud Build entry, used as a secondary signal when the service itself
//! cannot be described.

use std::fmt;
use std::io::Write;

use failure::Fail;
use tracing::{debug, info};

use crate::auth::AccessToken;
use crate::cloudrun::{Build, BuildList};
use crate::command::{self, CommandError};
use crate::config::CheckerConfig;
use crate::http::{HttpClient, HttpError};
use crate::report::{Console, StatusReport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
    Success,
    Working,
    Failure,
    /// Any other value, kept verbatim (`QUEUED`, `TIMEOUT`, `CANCELLED`, ...).
    Unknown(String),
}

impl BuildStatus {
    pub fn parse(raw: &str) -> BuildStatus {
        match raw {
            "SUCCESS" => BuildStatus::Success,
            "WORKING" => BuildStatus::Working,
            "FAILURE" => BuildStatus::Failure,
            other => BuildStatus::Unknown(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BuildStatus::Success => "SUCCESS",
            BuildStatus::Working => "WORKING",
            BuildStatus::Failure => "FAILURE",
            BuildStatus::Unknown(raw) => raw.as_str(),
        }
    }

    /// Human reading of the status; `None` when the raw value is all there is to say.
    pub fn interpretation(&self) -> Option<&'static str> {
        match self {
            BuildStatus::Success => Some("✅ Build completed successfully!"),
            BuildStatus::Working => Some("⏳ Build still in progress..."),
            BuildStatus::Failure => Some("❌ Build failed - check logs"),
            BuildStatus::Unknown(_) => None,
        }
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Fail)]
pub enum BuildError {
    #[fail(display = "{}", _0)]
    Command(#[cause] CommandError),
    #[fail(display = "builds list exited with {:?}: {}", code, stderr)]
    Exit { code: Option<i32>, stderr: String },
    #[fail(display = "{}", _0)]
    Http(#[cause] HttpError),
    #[fail(display = "Cloud Build API answered {}: {}", code, body)]
    Status { code: u16, body: String },
    #[fail(display = "invalid build list: {}", _0)]
    Parse(#[cause] serde_json::Error),
    #[fail(display = "no builds found")]
    Empty,
}

/// `gcloud builds list --limit 1 --format json`.
pub async fn latest_via_cli(config: &CheckerConfig) -> Result<Build, BuildError> {
    let finished = command::run(
        &config.gcloud,
        &[
            "builds",
            "list",
            "--limit",
            "1",
            "--project",
            config.service.project_id.as_str(),
            "--format",
            "json",
        ],
        config.timeouts.cli,
    )
    .await
    .map_err(BuildError::Command)?;

    if !finished.success() {
        return Err(BuildError::Exit {
            code: finished.code,
            stderr: finished.stderr.trim().to_owned(),
        });
    }

    let builds: Vec<Build> = serde_json::from_str(&finished.stdout).map_err(BuildError::Parse)?;
    builds.into_iter().next().ok_or(BuildError::Empty)
}

/// Cloud Build REST API, newest entry first.
pub async fn latest_via_api(
    client: &HttpClient,
    config: &CheckerConfig,
    token: &AccessToken,
) -> Result<Build, BuildError> {
    let fetched = client
        .get(&config.latest_build_url(), Some(token), config.timeouts.rest)
        .await
        .map_err(BuildError::Http)?;

    if !fetched.status.is_success() {
        return Err(BuildError::Status {
            code: fetched.status.as_u16(),
            body: fetched.body,
        });
    }

    let list: BuildList = serde_json::from_str(&fetched.body).map_err(BuildError::Parse)?;
    list.builds.into_iter().next().ok_or(BuildError::Empty)
}

/// Prints the outcome of a build lookup. Never touches `report.deployed`.
pub fn render<W: Write>(
    lookup: Result<Build, BuildError>,
    console: &mut Console<W>,
    report: &mut StatusReport,
) {
    let build = match lookup {
        Ok(build) => build,
        Err(error) => {
            debug!(%error, "build lookup failed");
            console.line(format_args!("Could not check build status: {}", error));
            return;
        }
    };

    let status = BuildStatus::parse(&build.status);
    info!(build = ?build.id, %status, "latest build");
    console.line(format_args!("Latest build status: {}", status));
    if let Some(reading) = status.interpretation() {
        console.line(reading);
    }
    if let Some(id) = &build.id {
        console.line(format_args!("Build ID: {}", id));
    }
    if let Some(created) = &build.create_time {
        console.line(format_args!("Created: {}", created));
    }
    report.build_status = Some(status);
}
