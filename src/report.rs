use std::fmt::Display;
use std::io::Write;

use tracing::debug;

use crate::builds::BuildStatus;
use crate::cloudrun::Condition;

/// Where the human-readable status lines go. Stdout for the binaries, a buffer in
/// tests.
pub struct Console<W: Write> {
    out: W,
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Console<W> {
        Console { out }
    }

    pub fn line(&mut self, message: impl Display) {
        if let Err(error) = writeln!(self.out, "{}", message).and_then(|_| self.out.flush()) {
            debug!(%error, "could not write status line");
        }
    }

    pub fn blank(&mut self) {
        self.line("");
    }
}

impl Console<Vec<u8>> {
    pub fn buffered() -> Console<Vec<u8>> {
        Console::new(Vec::new())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.out).into_owned()
    }
}

/// What one invocation found out. Filled in as the checks progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusReport {
    pub deployed: bool,
    pub service_url: Option<String>,
    pub health_body: Option<String>,
    pub conditions: Vec<Condition>,
    pub build_status: Option<BuildStatus>,
}

impl StatusReport {
    pub fn exit_code(&self) -> i32 {
        if self.deployed {
            0
        } else {
            1
        }
    }
}
