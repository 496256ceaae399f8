use std::io;
use std::process::{Output, Stdio};
use std::time::{Duration, Instant};

use failure::Fail;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::CliProgram;

#[derive(Debug, Fail)]
pub enum CommandError {
    #[fail(display = "failed to run {}: {}", program, error)]
    Spawn {
        program: String,
        #[cause]
        error: io::Error,
    },
    #[fail(display = "{} timed out after {:?}", program, timeout)]
    Timeout { program: String, timeout: Duration },
}

/// Captured result of a finished command.
#[derive(Debug)]
pub struct Finished {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl Finished {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<Output> for Finished {
    fn from(output: Output) -> Finished {
        Finished {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Runs `gcloud` (or its stand-in) with `args`, capturing stdout and stderr. The
/// child is killed if it outlives `timeout`.
pub async fn run(cli: &CliProgram, args: &[&str], timeout: Duration) -> Result<Finished, CommandError> {
    let started = Instant::now();
    debug!(program = %cli.program, ?args, "running command");

    let mut command = Command::new(&cli.program);
    command
        .args(&cli.args)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true);

    match tokio::time::timeout(timeout, command.output()).await {
        Ok(Ok(output)) => {
            let finished = Finished::from(output);
            debug!(
                program = %cli.program,
                code = ?finished.code,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "command finished"
            );
            Ok(finished)
        }
        Ok(Err(error)) => {
            warn!(program = %cli.program, %error, "command could not be started");
            Err(CommandError::Spawn { program: cli.program.clone(), error })
        }
        Err(_) => {
            warn!(program = %cli.program, ?timeout, "command timed out");
            Err(CommandError::Timeout { program: cli.program.clone(), timeout })
        }
    }
}
