//! Best-effort `GET <service>/health`. The result is diagnostic only; a deployment
//! with a URL counts as complete whatever the probe says.

use std::io::Write;
use std::time::Duration;

use failure::Fail;
use hyper::Uri;
use tracing::{debug, info, warn};

use crate::http::{HttpClient, HttpError};
use crate::report::{Console, StatusReport};

#[derive(Debug, Fail)]
pub enum ProbeError {
    #[fail(display = "{}", _0)]
    Http(#[cause] HttpError),
    #[fail(display = "HTTP {}: {}", code, body)]
    Status { code: u16, body: String },
}

pub fn health_url(service_url: &str) -> String {
    let base = service_url.strip_suffix('/').unwrap_or(service_url);
    format!("{}/health", base)
}

/// `location` as an absolute URL, taking scheme and host from `from` when it is a
/// bare path.
fn resolve_location(from: &str, location: &str) -> String {
    if location.starts_with("http://") || location.starts_with("https://") {
        return location.to_owned();
    }
    match from.parse::<Uri>() {
        Ok(uri) => match (uri.scheme_str(), uri.authority()) {
            (Some(scheme), Some(authority)) => {
                let path = if location.starts_with('/') {
                    location.to_owned()
                } else {
                    format!("/{}", location)
                };
                format!("{}://{}{}", scheme, authority, path)
            }
            _ => location.to_owned(),
        },
        Err(_) => location.to_owned(),
    }
}

/// Returns the raw body of a 2xx answer. One redirect is followed.
pub async fn probe(client: &HttpClient, service_url: &str, timeout: Duration) -> Result<String, ProbeError> {
    let url = health_url(service_url);
    let mut fetched = client.get(&url, None, timeout).await.map_err(ProbeError::Http)?;

    if fetched.status.is_redirection() {
        if let Some(location) = fetched.location.take() {
            let target = resolve_location(&url, &location);
            debug!(from = %url, to = %target, "following health redirect");
            fetched = client.get(&target, None, timeout).await.map_err(ProbeError::Http)?;
        }
    }

    if fetched.status.is_success() {
        Ok(fetched.body)
    } else {
        Err(ProbeError::Status {
            code: fetched.status.as_u16(),
            body: fetched.body,
        })
    }
}

/// Probes once and reports the outcome. `report.deployed` is left untouched.
pub async fn check<W: Write>(
    client: &HttpClient,
    service_url: &str,
    timeout: Duration,
    console: &mut Console<W>,
    report: &mut StatusReport,
) {
    console.line("Testing health endpoint...");
    match probe(client, service_url, timeout).await {
        Ok(body) => {
            info!(url = %service_url, "health probe answered");
            console.line(format_args!("Health check: {}", body));
            console.blank();
            console.line("✅ API is ready!");
            report.health_body = Some(body);
        }
        Err(error) => {
            warn!(url = %service_url, %error, "health probe failed");
            console.line(format_args!("⚠️  Health check failed: {}", error));
            console.line("But API URL exists, so deployment is complete.");
        }
    }
}
