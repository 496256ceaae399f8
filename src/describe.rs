//! Deployment check through the `gcloud` CLI.
//!
//! `gcloud run services describe` is authoritative. If it does not answer (timeout,
//! launch failure, unreadable output) the latest Cloud Build entry is shown for
//! context, but it never turns the verdict into success.

use std::io::Write;

use tracing::{info, warn};

use crate::builds;
use crate::cloudrun::{QueryError, ServiceResource, ServiceStatus};
use crate::command;
use crate::config::CheckerConfig;
use crate::health;
use crate::http::HttpClient;
use crate::report::{Console, StatusReport};
use crate::strategy::{run_chain, Check, Step, StepFuture, Strategy};

/// `gcloud run services describe <service> --format json`.
pub async fn describe_service(config: &CheckerConfig) -> Result<ServiceStatus, QueryError> {
    let service = &config.service;
    let finished = command::run(
        &config.gcloud,
        &[
            "run",
            "services",
            "describe",
            service.service_name.as_str(),
            "--region",
            service.region.as_str(),
            "--project",
            service.project_id.as_str(),
            "--format",
            "json",
        ],
        config.timeouts.cli,
    )
    .await
    .map_err(QueryError::Command)?;

    if !finished.success() {
        return Err(QueryError::Exit {
            code: finished.code,
            stderr: finished.stderr.trim().to_owned(),
        });
    }

    let resource: ServiceResource = serde_json::from_str(&finished.stdout).map_err(QueryError::Parse)?;
    Ok(resource.status)
}

pub struct DescribeService;

impl<W: Write + 'static> Strategy<W> for DescribeService {
    fn name(&self) -> &'static str {
        "describe-service"
    }

    fn run<'s, 'c: 's>(&'s self, check: &'s mut Check<'c, W>) -> StepFuture<'s> {
        Box::pin(describe_step(check))
    }
}

async fn describe_step<W: Write + 'static>(check: &mut Check<'_, W>) -> Step {
    match describe_service(check.config).await {
        Ok(status) => match status.ready_url().map(str::to_owned) {
            Some(url) => {
                info!(service = %check.config.service, %url, "service is deployed");
                check.console.line("✅ API DEPLOYMENT COMPLETE!");
                check.console.line(format_args!("URL: {}", url));
                check.console.blank();
                check.report.service_url = Some(url.clone());
                check.report.conditions = status.conditions.clone();
                health::check(
                    check.client,
                    &url,
                    check.config.timeouts.health,
                    check.console,
                    &mut check.report,
                )
                .await;
                Step::Deployed
            }
            None => {
                check.console.line("⏳ Service exists but URL not available yet");
                for condition in &status.conditions {
                    check.console.line(format_args!("  {}: {}", condition.kind, condition.status));
                }
                check.report.conditions = status.conditions;
                Step::Failed
            }
        },
        Err(QueryError::Exit { stderr, .. }) => {
            check.console.line("⏳ Service not found - may still be deploying");
            check.console.line(format_args!("Error: {}", stderr));
            Step::Failed
        }
        Err(error) if error.is_timeout() => {
            check.console.line("⏳ Command timed out - checking build status...");
            Step::Inconclusive
        }
        Err(error) => {
            warn!(%error, "describe-service failed");
            check.console.line(format_args!("Error: {}", error));
            Step::Inconclusive
        }
    }
}

/// Informational only: always hands the verdict on.
pub struct LatestBuild;

impl<W: Write + 'static> Strategy<W> for LatestBuild {
    fn name(&self) -> &'static str {
        "latest-build"
    }

    fn run<'s, 'c: 's>(&'s self, check: &'s mut Check<'c, W>) -> StepFuture<'s> {
        Box::pin(async move {
            let lookup = builds::latest_via_cli(check.config).await;
            builds::render(lookup, check.console, &mut check.report);
            Step::Inconclusive
        })
    }
}

/// Full CLI check. The report's `deployed` flag is the verdict.
pub async fn check<W: Write + 'static>(config: &CheckerConfig, console: &mut Console<W>) -> StatusReport {
    console.line("🔍 Checking API Deployment Status...");
    console.blank();

    let client = HttpClient::new();
    let mut check = Check::new(config, &client, console);
    run_chain(&[&DescribeService, &LatestBuild], &mut check).await;
    check.report
}
