//! HTTP client for the Talent Match backend.
//!
//! This crate provides:
//! - One typed operation per backend route (auth, profile, resume upload, jobs, matches)
//! - Explicit credential binding: a client either carries a bearer token or sends anonymous requests
//! - Status-to-error mapping with no retries
//! - Observability (tracing spans, metrics)

pub mod client;
pub mod error;
pub mod metrics;
pub mod types;

pub use client::{ApiClient, ClientConfig, DEFAULT_BASE_URL};
pub use error::{ClientError, ClientResult};
pub use types::UploadAck;
