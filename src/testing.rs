//! Test doubles: a scripted stand-in for `gcloud` and a local HTTP server that
//! records what it was asked.

use std::collections::HashMap;
use std::convert::Infallible;
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hyper::header::{AUTHORIZATION, LOCATION};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response, Server, StatusCode};
use tempfile::TempDir;
use tokio::sync::oneshot;

use crate::config::{CheckerConfig, CliProgram, Endpoints, ServiceDescriptor, Timeouts};

#[derive(Clone, Default)]
struct Reply {
    stdout: String,
    stderr: String,
    code: i32,
    sleep_secs: u64,
}

impl Reply {
    fn to_script(&self) -> String {
        let mut script = String::new();
        if self.sleep_secs > 0 {
            script.push_str(&format!("    sleep {}\n", self.sleep_secs));
        }
        script.push_str(&format!("    cat <<'__FAKE_OUT__'\n{}\n__FAKE_OUT__\n", self.stdout));
        if !self.stderr.is_empty() {
            script.push_str(&format!("    cat >&2 <<'__FAKE_ERR__'\n{}\n__FAKE_ERR__\n", self.stderr));
        }
        script.push_str(&format!("    exit {}\n", self.code));
        script
    }
}

/// Builder for a shell script that answers the three `gcloud` invocations the
/// checkers make. Unscripted invocations exit with status 2.
pub struct FakeCli {
    token: Option<Reply>,
    describe: Option<Reply>,
    builds: Option<Reply>,
}

impl FakeCli {
    pub fn new() -> FakeCli {
        FakeCli {
            token: Some(Reply { stdout: "test-token".to_owned(), ..Reply::default() }),
            describe: None,
            builds: None,
        }
    }

    pub fn token(mut self, stdout: &str) -> FakeCli {
        self.token = Some(Reply { stdout: stdout.to_owned(), ..Reply::default() });
        self
    }

    pub fn token_failure(mut self, stderr: &str) -> FakeCli {
        self.token = Some(Reply { stderr: stderr.to_owned(), code: 1, ..Reply::default() });
        self
    }

    pub fn token_hangs(mut self) -> FakeCli {
        self.token = Some(Reply { sleep_secs: 10, ..Reply::default() });
        self
    }

    pub fn describe(mut self, json: &str) -> FakeCli {
        self.describe = Some(Reply { stdout: json.to_owned(), ..Reply::default() });
        self
    }

    pub fn describe_failure(mut self, stderr: &str) -> FakeCli {
        self.describe = Some(Reply { stderr: stderr.to_owned(), code: 1, ..Reply::default() });
        self
    }

    pub fn describe_hangs(mut self) -> FakeCli {
        self.describe = Some(Reply { sleep_secs: 10, ..Reply::default() });
        self
    }

    pub fn builds(mut self, json: &str) -> FakeCli {
        self.builds = Some(Reply { stdout: json.to_owned(), ..Reply::default() });
        self
    }

    pub fn builds_failure(mut self, stderr: &str) -> FakeCli {
        self.builds = Some(Reply { stderr: stderr.to_owned(), code: 1, ..Reply::default() });
        self
    }

    pub fn build(self) -> InstalledCli {
        let dir = tempfile::tempdir().unwrap();
        let calls = dir.path().join("calls.log");
        let mut script = format!("#!/bin/sh\necho \"$*\" >> '{}'\ncase \"$*\" in\n", calls.display());

        let cases = [
            ("\"auth print-access-token\"", &self.token),
            ("\"run services describe \"*", &self.describe),
            ("\"builds list \"*", &self.builds),
        ];
        for (pattern, reply) in cases.iter() {
            if let Some(reply) = reply {
                script.push_str(&format!("  {})\n{}    ;;\n", pattern, reply.to_script()));
            }
        }
        script.push_str("  *)\n    echo \"unscripted: $*\" >&2\n    exit 2\n    ;;\nesac\n");

        let path = dir.path().join("gcloud.sh");
        fs::write(&path, script).unwrap();
        InstalledCli { _dir: dir, script: path, calls }
    }
}

pub struct InstalledCli {
    _dir: TempDir,
    script: PathBuf,
    calls: PathBuf,
}

impl InstalledCli {
    /// Runs the script through `sh`, so the file never needs to be executable.
    pub fn program(&self) -> CliProgram {
        CliProgram::with_args("sh", vec![self.script.display().to_string()])
    }

    /// Argument lists of every invocation so far, oldest first.
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(&self.calls)
            .unwrap_or_default()
            .lines()
            .map(|line| line.to_owned())
            .collect()
    }

    pub fn calls_starting_with(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|call| call.starts_with(prefix)).count()
    }
}

#[derive(Clone)]
struct Route {
    status: StatusCode,
    body: String,
    delay: Duration,
    location: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Recorded {
    pub path: String,
    pub authorization: Option<String>,
}

pub struct FakeServerBuilder {
    routes: HashMap<String, Route>,
}

impl FakeServerBuilder {
    pub fn route(mut self, path: &str, status: u16, body: &str) -> FakeServerBuilder {
        self.routes.insert(
            path.to_owned(),
            Route {
                status: StatusCode::from_u16(status).unwrap(),
                body: body.to_owned(),
                delay: Duration::from_secs(0),
                location: None,
            },
        );
        self
    }

    /// Answers `path` with a 302 pointing at `location`.
    pub fn redirect(mut self, path: &str, location: &str) -> FakeServerBuilder {
        self.routes.insert(
            path.to_owned(),
            Route {
                status: StatusCode::FOUND,
                body: String::new(),
                delay: Duration::from_secs(0),
                location: Some(location.to_owned()),
            },
        );
        self
    }

    pub fn slow_route(mut self, path: &str, delay: Duration) -> FakeServerBuilder {
        self.routes.insert(
            path.to_owned(),
            Route { status: StatusCode::OK, body: "late".to_owned(), delay, location: None },
        );
        self
    }

    /// Binds to an ephemeral localhost port. Must be called inside a tokio runtime.
    pub fn start(self) -> FakeServer {
        let routes = Arc::new(self.routes);
        let requests: Arc<Mutex<Vec<Recorded>>> = Arc::new(Mutex::new(vec![]));

        let service_routes = routes.clone();
        let service_requests = requests.clone();
        let make_service = make_service_fn(move |_| {
            let routes = service_routes.clone();
            let requests = service_requests.clone();
            async move {
                Ok::<_, Infallible>(service_fn(move |req: Request<Body>| {
                    let routes = routes.clone();
                    let requests = requests.clone();
                    async move {
                        let path = req.uri().path().to_owned();
                        requests.lock().unwrap().push(Recorded {
                            path: req.uri().path_and_query().map(|pq| pq.to_string()).unwrap_or_default(),
                            authorization: req
                                .headers()
                                .get(AUTHORIZATION)
                                .and_then(|value| value.to_str().ok())
                                .map(|value| value.to_owned()),
                        });
                        let response = match routes.get(&path) {
                            Some(route) => {
                                tokio::time::sleep(route.delay).await;
                                let mut response = Response::builder().status(route.status);
                                if let Some(location) = &route.location {
                                    response = response.header(LOCATION, location.as_str());
                                }
                                response.body(Body::from(route.body.clone())).unwrap()
                            }
                            None => Response::builder()
                                .status(StatusCode::NOT_FOUND)
                                .body(Body::from(format!("no route for {}", path)))
                                .unwrap(),
                        };
                        Ok::<_, Infallible>(response)
                    }
                }))
            }
        });

        let server = Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0))).serve(make_service);
        let addr = server.local_addr();
        let (shutdown, signal) = oneshot::channel::<()>();
        tokio::spawn(server.with_graceful_shutdown(async {
            signal.await.ok();
        }));

        FakeServer { addr, requests, _shutdown: shutdown }
    }
}

pub struct FakeServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
    _shutdown: oneshot::Sender<()>,
}

impl FakeServer {
    pub fn builder() -> FakeServerBuilder {
        FakeServerBuilder { routes: HashMap::new() }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn hits(&self, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|request| request.path.split('?').next() == Some(path))
            .count()
    }
}

pub fn descriptor() -> ServiceDescriptor {
    ServiceDescriptor::new("demo-project", "asia-south1", "demo-api").unwrap()
}

pub const SERVICE_PATH: &str = "/v1/projects/demo-project/locations/asia-south1/services/demo-api";
pub const BUILDS_PATH: &str = "/v1/projects/demo-project/builds";

/// Checker config wired to the given stand-ins, with short bounds so timeout
/// tests finish quickly.
pub fn config(cli: &InstalledCli, api: Option<&FakeServer>) -> CheckerConfig {
    let base = api.map(|server| server.url()).unwrap_or_else(|| "http://127.0.0.1:9".to_owned());
    CheckerConfig {
        service: descriptor(),
        gcloud: cli.program(),
        endpoints: Endpoints { run_api: base.clone(), build_api: base },
        timeouts: Timeouts {
            health: Duration::from_millis(500),
            token: Duration::from_secs(5),
            rest: Duration::from_secs(5),
            cli: Duration::from_secs(2),
        },
    }
}
