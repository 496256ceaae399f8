use failure::Fail;
use serde::{Deserialize, Deserializer};

use crate::command::CommandError;
use crate::http::HttpError;

/// Why the service status could not be read, by kind.
#[derive(Debug, Fail)]
pub enum QueryError {
    /// The service does not exist (yet); normal while a first deploy is running.
    #[fail(display = "service not found")]
    NotFound,
    #[fail(display = "{} - {}", code, body)]
    Http { code: u16, body: String },
    #[fail(display = "gcloud exited with {:?}: {}", code, stderr)]
    Exit { code: Option<i32>, stderr: String },
    #[fail(display = "{}", _0)]
    Command(#[cause] CommandError),
    #[fail(display = "{}", _0)]
    Transport(#[cause] HttpError),
    #[fail(display = "invalid service description: {}", _0)]
    Parse(#[cause] serde_json::Error),
}

impl QueryError {
    pub fn is_timeout(&self) -> bool {
        match self {
            QueryError::Command(CommandError::Timeout { .. }) => true,
            QueryError::Transport(HttpError::Timeout { .. }) => true,
            _ => false,
        }
    }
}

// A missing key and an explicit `null` read the same everywhere below.

#[derive(Clone, Deserialize, Debug, Default)]
pub struct ServiceResource {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ServiceStatus,
}

#[derive(Clone, Deserialize, Debug, Default)]
pub struct ServiceStatus {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub conditions: Vec<Condition>,
}

#[derive(Clone, Deserialize, Debug, PartialEq, Eq)]
pub struct Condition {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
}

#[derive(Clone, Deserialize, Debug, Default)]
pub struct BuildList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub builds: Vec<Build>,
}

#[derive(Clone, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default = "unknown_status", deserialize_with = "null_as_unknown")]
    pub status: String,
    #[serde(default)]
    pub create_time: Option<String>,
}

fn unknown_status() -> String {
    "UNKNOWN".to_owned()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_unknown<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(unknown_status))
}

impl ServiceStatus {
    /// The assigned URL, if the platform has published a non-empty one.
    pub fn ready_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.is_empty())
    }
}
