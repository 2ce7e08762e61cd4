//! The transport seam: how described requests reach the network.
//!
//! The core never talks to an HTTP library directly. It describes a request
//! as a [`TransportRequest`] and hands it to whichever [`Transport`] the
//! configuration carries. Alternative transports (a compressing one, a
//! recording one for tests) plug in here without touching any parsing or
//! materialization logic.

use crate::{Error, Result};
use async_trait::async_trait;
use http::{HeaderMap, Method, StatusCode};
use serde_json::Value;
use std::sync::Arc;

/// A fully described HTTP request for a transport to perform.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP verb.
    pub method: Method,
    /// Absolute target URL.
    pub url: String,
    /// Query parameters to append to the url.
    pub query: Vec<(String, String)>,
    /// JSON body, for verbs that carry one.
    pub body: Option<Value>,
}

impl TransportRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            body: None,
        }
    }
}

/// What came back from the wire.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

/// Performs described requests.
///
/// Implementations own connection management, TLS enforcement, timeouts,
/// and any body encoding concerns. Whatever failure they surface (timeout,
/// cancellation, connection error) is reported as a transport error and
/// never retried here.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse>;
}

/// The default transport, backed by a pooled reqwest client.
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds the transport. With `verify` off, server certificates are
    /// accepted without validation; reserve that for local development.
    pub fn new(verify: bool) -> Result<Self> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(!verify)
            .build()
            .map_err(Error::Network)?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let mut pending = self.http.request(request.method.clone(), request.url.as_str());
        if !request.query.is_empty() {
            pending = pending.query(&request.query);
        }
        if let Some(body) = &request.body {
            pending = pending.json(body);
        }

        let response = pending.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;
        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

/// Everything a generated member needs to perform its request: the TLS
/// verification choice and the transport that honors it.
///
/// Passed down explicitly through build and materialize calls; there is no
/// shared mutable transport state anywhere in the crate.
#[derive(Clone)]
pub struct SirenConfig {
    /// Whether server TLS certificates are validated. Recorded here for
    /// diagnostics; enforcement lives in the transport built from it.
    pub verify: bool,
    /// The transport every generated member sends through.
    pub transport: Arc<dyn Transport>,
}

impl SirenConfig {
    /// Config with the default reqwest transport.
    pub fn new(verify: bool) -> Result<Self> {
        Ok(Self {
            verify,
            transport: Arc::new(ReqwestTransport::new(verify)?),
        })
    }

    /// Config with a caller-supplied transport.
    pub fn with_transport(verify: bool, transport: Arc<dyn Transport>) -> Self {
        Self { verify, transport }
    }
}

impl std::fmt::Debug for SirenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SirenConfig")
            .field("verify", &self.verify)
            .finish_non_exhaustive()
    }
}
