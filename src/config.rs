use std::fmt;
use std::time::Duration;

use failure::Fail;
use regex::Regex;

const IDENTIFIER: &str = r"^[A-Za-z0-9][A-Za-z0-9._-]*$";

pub const RUN_API: &str = "https://run.googleapis.com";
pub const BUILD_API: &str = "https://cloudbuild.googleapis.com";

#[derive(Debug, Fail)]
pub enum ConfigError {
    #[fail(display = "{} must not be empty", field)]
    Empty { field: &'static str },
    #[fail(display = "{} '{}' contains characters outside [A-Za-z0-9._-]", field, value)]
    Invalid { field: &'static str, value: String },
    #[fail(display = "identifier pattern failed to compile: {}", _0)]
    Pattern(#[cause] regex::Error),
}

/// The one deployed service a checker looks at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub project_id: String,
    pub region: String,
    pub service_name: String,
}

impl ServiceDescriptor {
    /// Builds a descriptor, rejecting empty fields and anything that could not be
    /// interpolated verbatim into a URL path or an argument list.
    pub fn new(
        project_id: impl Into<String>,
        region: impl Into<String>,
        service_name: impl Into<String>,
    ) -> Result<ServiceDescriptor, ConfigError> {
        let descriptor = ServiceDescriptor {
            project_id: project_id.into(),
            region: region.into(),
            service_name: service_name.into(),
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let regex = Regex::new(IDENTIFIER).map_err(ConfigError::Pattern)?;
        let fields = [
            ("project", &self.project_id),
            ("region", &self.region),
            ("service", &self.service_name),
        ];
        for &(field, value) in fields.iter() {
            if value.is_empty() {
                return Err(ConfigError::Empty { field });
            }
            if !regex.is_match(value) {
                return Err(ConfigError::Invalid { field, value: value.to_string() });
            }
        }
        Ok(())
    }

    /// Management API path of the service, relative to the Cloud Run host.
    pub fn service_path(&self) -> String {
        format!(
            "/v1/projects/{}/locations/{}/services/{}",
            self.project_id, self.region, self.service_name
        )
    }
}

impl fmt::Display for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.project_id, self.region, self.service_name)
    }
}

/// Upper bounds for every external call. A timeout is the only way a call gets
/// cancelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timeouts {
    pub health: Duration,
    pub token: Duration,
    pub rest: Duration,
    pub cli: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Timeouts {
            health: Duration::from_secs(5),
            token: Duration::from_secs(10),
            rest: Duration::from_secs(10),
            cli: Duration::from_secs(30),
        }
    }
}

/// Base URLs of the management APIs, without trailing slash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    pub run_api: String,
    pub build_api: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints {
            run_api: RUN_API.to_owned(),
            build_api: BUILD_API.to_owned(),
        }
    }
}

/// How to launch `gcloud`. `args` are placed before every subcommand, which lets a
/// wrapper such as `sh <script>` stand in for the real binary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CliProgram {
    pub program: String,
    pub args: Vec<String>,
}

impl CliProgram {
    pub fn new(program: impl Into<String>) -> CliProgram {
        CliProgram { program: program.into(), args: vec![] }
    }

    pub fn with_args(program: impl Into<String>, args: Vec<String>) -> CliProgram {
        CliProgram { program: program.into(), args }
    }
}

impl Default for CliProgram {
    fn default() -> Self {
        CliProgram::new("gcloud")
    }
}

/// Everything a checker needs for one invocation.
#[derive(Clone, Debug)]
pub struct CheckerConfig {
    pub service: ServiceDescriptor,
    pub gcloud: CliProgram,
    pub endpoints: Endpoints,
    pub timeouts: Timeouts,
}

impl CheckerConfig {
    pub fn new(service: ServiceDescriptor) -> CheckerConfig {
        CheckerConfig {
            service,
            gcloud: CliProgram::default(),
            endpoints: Endpoints::default(),
            timeouts: Timeouts::default(),
        }
    }

    pub fn service_url(&self) -> String {
        format!("{}{}", self.endpoints.run_api, self.service.service_path())
    }

    pub fn latest_build_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/builds?pageSize=1&orderBy=createTime%20desc",
            self.endpoints.build_api, self.service.project_id
        )
    }
}
