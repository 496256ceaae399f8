//! Deployment check against the Cloud Run management API.

use std::io::Write;

use hyper::StatusCode;
use tracing::{info, warn};

use crate::auth::{self, AccessToken};
use crate::builds;
use crate::cloudrun::{QueryError, ServiceResource, ServiceStatus};
use crate::config::CheckerConfig;
use crate::health;
use crate::http::HttpClient;
use crate::report::{Console, StatusReport};
use crate::strategy::{run_chain, Check, Step, StepFuture, Strategy};

/// `GET /v1/projects/{project}/locations/{region}/services/{service}`.
pub async fn query_service(
    client: &HttpClient,
    config: &CheckerConfig,
    token: &AccessToken,
) -> Result<ServiceStatus, QueryError> {
    let fetched = client
        .get(&config.service_url(), Some(token), config.timeouts.rest)
        .await
        .map_err(QueryError::Transport)?;

    if fetched.status == StatusCode::NOT_FOUND {
        return Err(QueryError::NotFound);
    }
    if !fetched.status.is_success() {
        return Err(QueryError::Http {
            code: fetched.status.as_u16(),
            body: fetched.body,
        });
    }

    let resource: ServiceResource = serde_json::from_str(&fetched.body).map_err(QueryError::Parse)?;
    Ok(resource.status)
}

pub struct ServiceApi;

impl<W: Write + 'static> Strategy<W> for ServiceApi {
    fn name(&self) -> &'static str {
        "service-api"
    }

    fn run<'s, 'c: 's>(&'s self, check: &'s mut Check<'c, W>) -> StepFuture<'s> {
        Box::pin(service_step(check))
    }
}

async fn service_step<W: Write + 'static>(check: &mut Check<'_, W>) -> Step {
    let token = match &check.token {
        Some(token) => token.clone(),
        None => return Step::Failed,
    };

    match query_service(check.client, check.config, &token).await {
        Ok(status) => match status.ready_url().map(str::to_owned) {
            Some(url) => {
                info!(service = %check.config.service, %url, "service is deployed");
                check.console.line("✅ API DEPLOYED!");
                check.console.line(format_args!("URL: {}", url));
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
                check.console.line("⏳ Service exists but URL not ready");
                for condition in &status.conditions {
                    check.console.line(format_args!("  {}: {}", condition.kind, condition.status));
                }
                check.report.conditions = status.conditions;
                Step::Failed
            }
        },
        Err(QueryError::NotFound) => {
            check.console.line("⏳ Service not found - may still be deploying");
            check.console.blank();
            check.console.line("Checking build status...");
            Step::Inconclusive
        }
        Err(error) => {
            warn!(%error, "management API query failed");
            check.console.line(format_args!("❌ Error: {}", error));
            Step::Failed
        }
    }
}

/// Cloud Build context for a service that does not exist yet. Informational only.
pub struct BuildApi;

impl<W: Write + 'static> Strategy<W> for BuildApi {
    fn name(&self) -> &'static str {
        "build-api"
    }

    fn run<'s, 'c: 's>(&'s self, check: &'s mut Check<'c, W>) -> StepFuture<'s> {
        Box::pin(async move {
            if let Some(token) = check.token.clone() {
                let lookup = builds::latest_via_api(check.client, check.config, &token).await;
                builds::render(lookup, check.console, &mut check.report);
            }
            Step::Inconclusive
        })
    }
}

/// Full REST check. Without an access token nothing is sent over the network.
pub async fn check<W: Write + 'static>(config: &CheckerConfig, console: &mut Console<W>) -> StatusReport {
    console.line("🔍 Checking API via REST API...");
    console.blank();

    let token = match auth::access_token(&config.gcloud, config.timeouts.token).await {
        Ok(token) => token,
        Err(error) => {
            warn!(%error, "no access token");
            console.line(format_args!("Error getting token: {}", error));
            console.line("❌ Could not get access token");
            return StatusReport::default();
        }
    };

    let client = HttpClient::new();
    let mut check = Check::new(config, &client, console).with_token(token);
    run_chain(&[&ServiceApi, &BuildApi], &mut check).await;
    check.report
}
