//! Ordered fallback chains. Each strategy looks at the deployment one way and
//! either settles the verdict or hands over to the next one; running out of
//! strategies means the deployment is not confirmed.

use std::future::Future;
use std::io::Write;
use std::pin::Pin;

use tracing::debug;

use crate::auth::AccessToken;
use crate::config::CheckerConfig;
use crate::http::HttpClient;
use crate::report::{Console, StatusReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The service has a URL; the deployment is complete.
    Deployed,
    /// Nothing conclusive, try the next strategy.
    Inconclusive,
    /// Settled: the deployment is not (yet) complete.
    Failed,
}

/// State shared by the strategies of one invocation.
pub struct Check<'a, W: Write> {
    pub config: &'a CheckerConfig,
    pub client: &'a HttpClient,
    pub console: &'a mut Console<W>,
    pub token: Option<AccessToken>,
    pub report: StatusReport,
}

impl<'a, W: Write> Check<'a, W> {
    pub fn new(config: &'a CheckerConfig, client: &'a HttpClient, console: &'a mut Console<W>) -> Check<'a, W> {
        Check {
            config,
            client,
            console,
            token: None,
            report: StatusReport::default(),
        }
    }

    pub fn with_token(mut self, token: AccessToken) -> Check<'a, W> {
        self.token = Some(token);
        self
    }
}

pub type StepFuture<'s> = Pin<Box<dyn Future<Output = Step> + 's>>;

pub trait Strategy<W: Write + 'static> {
    fn name(&self) -> &'static str;

    fn run<'s, 'c: 's>(&'s self, check: &'s mut Check<'c, W>) -> StepFuture<'s>;
}

/// Runs `chain` in order until a strategy settles the verdict. The final verdict
/// is also stored in `check.report.deployed`.
pub async fn run_chain<W: Write + 'static>(chain: &[&dyn Strategy<W>], check: &mut Check<'_, W>) -> Step {
    let mut verdict = Step::Failed;
    for strategy in chain {
        let step = strategy.run(check).await;
        debug!(strategy = strategy.name(), ?step, "strategy finished");
        if step != Step::Inconclusive {
            verdict = step;
            break;
        }
    }
    check.report.deployed = verdict == Step::Deployed;
    verdict
}
