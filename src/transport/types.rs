//! Transport request and response types

use crate::error::{Error, Result};
use crate::types::{Method, StringMap};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A single request handed to a [`Transport`](super::Transport)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportRequest {
    /// HTTP method
    pub method: Method,
    /// Path relative to the transport's base URL, query string included
    pub path: String,
    /// Request headers
    pub headers: StringMap,
    /// Raw request body
    pub body: Option<String>,
}

impl TransportRequest {
    /// Create a GET request for a path
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            ..Default::default()
        }
        .header("Accept", "application/json")
    }

    /// Create a POST request carrying a JSON body
    pub fn post_json(path: impl Into<String>, body: &Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: Some(body.to_string()),
            ..Default::default()
        }
        .header("Accept", "application/json")
        .header("Content-Type", "application/json")
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// Status code and raw body returned by a [`Transport`](super::Transport)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: Bytes,
}

impl TransportResponse {
    /// Create a response
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Create a 200 response with a JSON body
    pub fn json_ok(body: &Value) -> Self {
        Self::new(200, body.to_string())
    }

    /// Check for a 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text (lossy)
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Fail with `HttpStatus` unless the status is 2xx
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::http_status(self.status, self.text()))
        }
    }

    /// Parse the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}
