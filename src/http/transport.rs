//! [`Transport`] implementation over [`HttpClient`]

use super::client::{HttpClient, HttpClientConfig, RequestConfig};
use crate::error::Result;
use crate::transport::{Transport, TransportRequest, TransportResponse};
use async_trait::async_trait;
use tracing::debug;

/// Sends transport requests over HTTP
///
/// Non-2xx responses surface as `Error::HttpStatus` once the client's retry
/// budget is spent.
#[derive(Debug)]
pub struct HttpTransport {
    client: HttpClient,
}

impl HttpTransport {
    /// Wrap an existing client
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Build a client from config and wrap it
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        Ok(Self::new(HttpClient::with_config(config)?))
    }

    /// Get the underlying client
    pub fn client(&self) -> &HttpClient {
        &self.client
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let mut config = RequestConfig::new();
        config.headers = request.headers;
        config.body = request.body;

        let response = self
            .client
            .request(request.method.into(), &request.path, config)
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;
        debug!(status, bytes = body.len(), path = %request.path, "transport response");

        Ok(TransportResponse::new(status, body))
    }
}
