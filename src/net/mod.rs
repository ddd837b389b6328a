//! Networking modules for the CaseHub REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `http` owns request construction and the transport seam, `error` the single
//! failure type, `api` the typed endpoint surface, and `types` the wire schema.

pub mod api;
pub mod error;
pub mod http;
pub mod types;

pub use api::{ApiClient, Registry};
pub use error::ApiError;
pub use http::{ApiRequest, ApiResponse, HttpTransport, RequestBody, Transport, UploadForm};

#[cfg(test)]
pub(crate) mod mock;
