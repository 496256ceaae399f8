use std::time::{Duration, Instant};

use failure::Fail;
use hyper::client::HttpConnector;
use hyper::header::{AUTHORIZATION, CONTENT_TYPE, LOCATION, USER_AGENT};
use hyper::http::uri::InvalidUri;
use hyper::{Body, Client, Request, StatusCode, Uri};
use hyper_rustls::HttpsConnector;
use tracing::debug;

use crate::auth::AccessToken;
use crate::tls;

const AGENT: &str = concat!("deploy-status/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Fail)]
pub enum HttpError {
    #[fail(display = "invalid URL {}: {}", url, error)]
    Url {
        url: String,
        #[cause]
        error: InvalidUri,
    },
    #[fail(display = "could not build request: {}", _0)]
    Request(#[cause] hyper::http::Error),
    #[fail(display = "{}", error)]
    Transport {
        url: String,
        #[cause]
        error: hyper::Error,
    },
    #[fail(display = "request to {} timed out after {:?}", url, timeout)]
    Timeout { url: String, timeout: Duration },
}

/// Status and body of a completed response, whatever the status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub status: StatusCode,
    /// `Location` header, kept for redirects.
    pub location: Option<String>,
    pub body: String,
}

pub struct HttpClient {
    client: Client<HttpsConnector<HttpConnector>, Body>,
}

impl HttpClient {
    pub fn new() -> HttpClient {
        HttpClient {
            client: Client::builder().build(tls::https_connector()),
        }
    }

    /// One GET, body included, bounded by `timeout`. Non-2xx answers are returned as
    /// `Ok`; deciding what they mean is up to the caller.
    pub async fn get(
        &self,
        url: &str,
        token: Option<&AccessToken>,
        timeout: Duration,
    ) -> Result<Fetched, HttpError> {
        let uri: Uri = url.parse().map_err(|error| HttpError::Url {
            url: url.to_owned(),
            error,
        })?;

        let mut request = Request::get(uri).header(USER_AGENT, AGENT);
        if let Some(token) = token {
            request = request
                .header(AUTHORIZATION, token.bearer())
                .header(CONTENT_TYPE, "application/json");
        }
        let request = request.body(Body::empty()).map_err(HttpError::Request)?;

        let started = Instant::now();
        let exchange = async {
            let response = self.client.request(request).await?;
            let status = response.status();
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .map(|value| value.to_owned());
            let body = hyper::body::to_bytes(response.into_body()).await?;
            Ok::<_, hyper::Error>(Fetched {
                status,
                location,
                body: String::from_utf8_lossy(&body).into_owned(),
            })
        };

        match tokio::time::timeout(timeout, exchange).await {
            Ok(Ok(fetched)) => {
                debug!(
                    %url,
                    status = fetched.status.as_u16(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "GET finished"
                );
                Ok(fetched)
            }
            Ok(Err(error)) => {
                debug!(%url, %error, "GET failed");
                Err(HttpError::Transport { url: url.to_owned(), error })
            }
            Err(_) => {
                debug!(%url, ?timeout, "GET timed out");
                Err(HttpError::Timeout { url: url.to_owned(), timeout })
            }
        }
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        HttpClient::new()
    }
}
