//! Request construction and execution for the CodeClimate API.
//!
//! # Design
//! `CodeClimateClient` holds the credential, the base URL, and a shared
//! `Transport`; it carries no mutable per-call state. Pagination and filters
//! arrive as arguments and flow through `get`/`post` into a freshly built
//! `HttpRequest`, so two calls (or two threads sharing one client) can never
//! see each other's query or body. The auth token is attached to every
//! outgoing request; callers never pass it per call.
//!
//! Write calls wrap their attributes in the JSON:API envelope
//! `{"data":{"attributes":...,"type":...}}` and mark the body with the
//! `application/vnd.api+json` media type. GET calls carry filters and
//! pagination as query pairs and never have a body.

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Value};
use url::Url;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, Transport};
use crate::transport::UreqTransport;
use crate::types::QueryPairs;

/// Base URL of the current CodeClimate API.
pub const DEFAULT_BASE_URL: &str = "https://api.codeclimate.com/v1";

/// Environment variable read by `CodeClimateClient::from_env`.
pub const TOKEN_ENV_VAR: &str = "CODECLIMATE_API_TOKEN";

const MEDIA_TYPE: &str = "application/vnd.api+json";

/// Synchronous client for the CodeClimate REST API.
///
/// One instance per configured account. The instance is immutable between
/// calls and can be shared across threads; each operation performs exactly
/// one HTTP round-trip with no retries.
#[derive(Clone)]
pub struct CodeClimateClient {
    base_url: String,
    token: String,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for CodeClimateClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeClimateClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl CodeClimateClient {
    /// Client against the production API using the ureq transport.
    pub fn new(token: &str) -> Result<Self, ApiError> {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    /// Client against a non-default base URL (mock server, proxy).
    pub fn with_base_url(token: &str, base_url: &str) -> Result<Self, ApiError> {
        Self::with_transport(token, base_url, Arc::new(UreqTransport::new()))
    }

    /// Client with a caller-supplied transport. This is the seam test stubs
    /// plug into.
    pub fn with_transport(
        token: &str,
        base_url: &str,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ApiError> {
        require_token(token)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            transport,
        })
    }

    /// Client with the token taken from `CODECLIMATE_API_TOKEN`.
    pub fn from_env() -> Result<Self, ApiError> {
        let token = std::env::var(TOKEN_ENV_VAR)
            .map_err(|_| ApiError::Validation(format!("{TOKEN_ENV_VAR} is not set")))?;
        Self::new(&token)
    }

    /// Rotate the credential. Subsequent calls use the new token.
    pub fn set_token(&mut self, token: &str) -> Result<(), ApiError> {
        require_token(token)?;
        self.token = token.to_string();
        Ok(())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Single GET round-trip. `query` carries `filter[...]`/`page[...]` pairs
    /// and is encoded into the URL; the request never has a body.
    pub(crate) fn get(&self, route: &str, query: &QueryPairs) -> Result<Value, ApiError> {
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: self.build_url(route, query)?,
            headers: self.headers(false),
            body: None,
        };
        self.execute(&request, 200)
    }

    /// Single write round-trip. `attributes` are wrapped in the JSON:API
    /// envelope, with `"type"` present only when `resource_type` is given.
    pub(crate) fn post(
        &self,
        route: &str,
        resource_type: Option<&str>,
        attributes: Value,
        expected_status: u16,
    ) -> Result<Value, ApiError> {
        let request = HttpRequest {
            method: HttpMethod::Post,
            url: self.build_url(route, &Vec::new())?,
            headers: self.headers(true),
            body: Some(envelope(attributes, resource_type).to_string()),
        };
        self.execute(&request, expected_status)
    }

    /// Perform the round-trip and normalize the outcome: an unexpected status
    /// becomes `ApiError::Http` without the body ever being parsed; an
    /// expected status must carry a JSON body or the call fails with
    /// `ApiError::Decode`.
    fn execute(&self, request: &HttpRequest, expected_status: u16) -> Result<Value, ApiError> {
        let response = self.transport.send(request)?;
        if response.status != expected_status {
            return Err(ApiError::http(response.status));
        }
        serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn build_url(&self, route: &str, query: &QueryPairs) -> Result<String, ApiError> {
        let mut url = Url::parse(&format!("{}/{}", self.base_url, route))
            .map_err(|e| ApiError::Validation(format!("invalid request URL: {e}")))?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(url.into())
    }

    fn headers(&self, write: bool) -> Vec<(String, String)> {
        let mut headers = vec![
            (
                "Authorization".to_string(),
                format!("Token token={}", self.token),
            ),
            ("Accept".to_string(), MEDIA_TYPE.to_string()),
        ];
        if write {
            headers.push(("Content-Type".to_string(), MEDIA_TYPE.to_string()));
        }
        headers
    }
}

fn envelope(attributes: Value, resource_type: Option<&str>) -> Value {
    let mut data = json!({ "attributes": attributes });
    if let Some(resource_type) = resource_type {
        data["type"] = Value::String(resource_type.to_string());
    }
    json!({ "data": data })
}

fn require_token(token: &str) -> Result<(), ApiError> {
    if token.trim().is_empty() {
        return Err(ApiError::Validation("API token must not be empty".to_string()));
    }
    Ok(())
}
