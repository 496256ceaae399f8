//! Deployment status checks for a single Cloud Run service.
//!
//! Two entry points share this library:
//!
//! * [`rest::check`] asks the Cloud Run management API directly, using a
//!   bearer token printed by `gcloud auth print-access-token`.
//! * [`describe::check`] asks `gcloud run services describe` and falls back
//!   to the latest Cloud Build entry when that call does not answer.
//!
//! Both fill a [`report::StatusReport`] while printing progress to a
//! [`report::Console`], and never return an error: every failure ends up as
//! console text plus a non-deployed verdict.

pub mod auth;
pub mod builds;
pub mod cli;
pub mod cloudrun;
pub mod command;
pub mod config;
pub mod describe;
pub mod health;
pub mod http;
pub mod logging;
pub mod report;
pub mod rest;
pub mod strategy;
pub mod tls;

#[cfg(test)]
mod testing;

pub use config::{CheckerConfig, Endpoints, ServiceDescriptor, Timeouts};
pub use report::{Console, StatusReport};
