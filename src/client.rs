//! The entry point: connect to a root url and hand back a live object.
//!
//! The client performs exactly one request of its own, the bootstrap GET.
//! Everything after that hangs off the [`MaterializedObject`] it returns:
//! invoking that object's members performs further requests and yields
//! further objects, so pointing the client at any siren-speaking url is
//! enough to traverse the whole API.

use crate::materialize::{perform, MaterializedObject};
use crate::transport::{SirenConfig, Transport, TransportRequest};
use crate::{Error, Result};
use http::Method;
use std::sync::Arc;
use url::Url;

/// A client for siren hypermedia APIs.
///
/// # Examples
///
/// ```no_run
/// use sirena::SirenClient;
///
/// # async fn example() -> Result<(), sirena::Error> {
/// let client = SirenClient::builder().build()?;
///
/// if let Some(root) = client.connect("https://api.example.com/").await? {
///     println!("connected to a {}", root.classname());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SirenClient {
    config: SirenConfig,
}

impl SirenClient {
    /// Creates a new [`SirenClientBuilder`] for configuring a client.
    pub fn builder() -> SirenClientBuilder {
        SirenClientBuilder::new()
    }

    /// Issues one GET to `root_url` and materializes the response.
    ///
    /// Failure to reach the server at all surfaces as [`Error::Connect`].
    /// A 404 root is `Ok(None)`, the same absence contract every generated
    /// member follows.
    pub async fn connect(&self, root_url: impl AsRef<str>) -> Result<Option<MaterializedObject>> {
        let url = Url::parse(root_url.as_ref())?;
        tracing::info!(url = %url, "connecting to siren root");

        let request = TransportRequest::new(Method::GET, url.as_str());
        perform(&self.config, request).await.map_err(|error| match error {
            Error::Network(source) => Error::Connect {
                url: url.to_string(),
                source,
            },
            other => other,
        })
    }

    /// The configuration handed to every object this client materializes.
    pub fn config(&self) -> &SirenConfig {
        &self.config
    }
}

/// Builder for configuring and creating a [`SirenClient`].
///
/// # Examples
///
/// ```no_run
/// use sirena::SirenClient;
///
/// # fn example() -> Result<(), sirena::Error> {
/// let client = SirenClient::builder()
///     .verify(false) // local development server with a self-signed cert
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct SirenClientBuilder {
    verify: bool,
    transport: Option<Arc<dyn Transport>>,
}

impl SirenClientBuilder {
    /// Creates a builder with TLS verification on and the default
    /// transport.
    pub fn new() -> Self {
        Self {
            verify: true,
            transport: None,
        }
    }

    /// Whether server TLS certificates are validated. On by default; turn
    /// it off only against local development servers.
    pub fn verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Replaces the default reqwest-backed transport, e.g. with a
    /// compressing or recording one.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the configured client.
    pub fn build(self) -> Result<SirenClient> {
        let config = match self.transport {
            Some(transport) => SirenConfig::with_transport(self.verify, transport),
            None => SirenConfig::new(self.verify)?,
        };
        Ok(SirenClient { config })
    }
}

impl Default for SirenClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
