use std::fmt;
use std::time::Duration;

use failure::Fail;
use tracing::debug;

use crate::command::{self, CommandError};
use crate::config::CliProgram;

#[derive(Debug, Fail)]
pub enum AuthError {
    #[fail(display = "{}", _0)]
    Command(#[cause] CommandError),
    #[fail(display = "print-access-token exited with {:?}: {}", code, stderr)]
    Exit { code: Option<i32>, stderr: String },
    #[fail(display = "print-access-token returned an empty token")]
    Empty,
}

/// Short-lived OAuth bearer token. The value is kept out of `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn secret(&self) -> &str {
        &self.0
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken(<{} chars>)", self.0.len())
    }
}

/// `gcloud auth print-access-token`, trimmed.
pub async fn access_token(cli: &CliProgram, timeout: Duration) -> Result<AccessToken, AuthError> {
    let finished = command::run(cli, &["auth", "print-access-token"], timeout)
        .await
        .map_err(AuthError::Command)?;

    if !finished.success() {
        return Err(AuthError::Exit {
            code: finished.code,
            stderr: finished.stderr.trim().to_owned(),
        });
    }

    let token = finished.stdout.trim();
    if token.is_empty() {
        return Err(AuthError::Empty);
    }
    debug!(length = token.len(), "obtained access token");
    Ok(AccessToken(token.to_owned()))
}
