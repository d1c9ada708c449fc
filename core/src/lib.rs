//! Synchronous client for the CodeClimate REST API.
//!
//! # Overview
//! Exposes CodeClimate's orgs, repos, snapshots, issues, builds, metrics and
//! test-report endpoints as method calls. Each operation maps its typed
//! arguments onto a route, attaches the stored auth token, performs exactly
//! one HTTP round-trip and decodes the JSON body. There is no caching, no
//! retry and no protocol state between calls.
//!
//! # Design
//! - `CodeClimateClient` holds only the credential, the base URL and a shared
//!   [`Transport`]; per-call configuration (pagination, filters) is passed by
//!   argument, so concurrent calls on one instance cannot interfere.
//! - Requests and responses cross the transport seam as plain data
//!   (`HttpRequest` / `HttpResponse`), which keeps request construction
//!   deterministic and lets tests substitute counting stubs.
//! - Auth uses the header scheme of the current API:
//!   `Authorization: Token token=<key>` with the `application/vnd.api+json`
//!   media type. Write bodies use the JSON:API `{data:{attributes,type}}`
//!   envelope.
//! - Failures are values: [`ApiError`] distinguishes client-side validation,
//!   unexpected HTTP statuses, undecodable bodies and transport faults.

pub mod client;
mod endpoints;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::{CodeClimateClient, DEFAULT_BASE_URL, TOKEN_ENV_VAR};
pub use error::{status_message, ApiError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use transport::UreqTransport;
pub use types::{BuildFilter, IssueFilter, Page, RefPointFilter, TIME_SERIES_METRICS};
