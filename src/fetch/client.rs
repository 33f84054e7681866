//! Streaming HTTP transport built on reqwest.
//!
//! One [`HttpTransport`] wraps one pooled reqwest client, so every probe in a
//! batch multiplexes over the same connection pool. Response bodies are
//! exposed as chunk streams; dropping a stream releases its connection.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, ClientBuilder, redirect};
use tracing::{debug, instrument};
use url::Url;

use super::config::{IpPreference, TransportConfig};
use super::engine::EngineError;
use super::transport::{BodyStream, Transport};
use super::TransportError;

/// HTTP(S) transport for probe transfers.
///
/// Cheap to clone; clones share the underlying connection pool.
///
/// # Example
///
/// ```no_run
/// use image_probe::{HttpTransport, TransportConfig};
///
/// let transport = HttpTransport::new(&TransportConfig::default())?;
/// # Ok::<(), image_probe::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds a transport from a full configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] if the configuration is invalid and
    /// [`EngineError::ClientBuild`] if reqwest cannot build the client (for
    /// example a user agent that is not a valid header value).
    #[instrument(level = "debug", skip(config), fields(timeout_secs = config.timeout_secs))]
    pub fn new(config: &TransportConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let client = client_builder(config)
            .build()
            .map_err(EngineError::ClientBuild)?;
        debug!(
            max_redirects = config.max_redirects,
            connect_timeout_secs = config.connect_timeout_secs,
            verify_tls = config.verify_tls,
            ip_preference = ?config.ip_preference,
            "built HTTP transport"
        );
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn open(&self, url: &str) -> Result<BodyStream, TransportError> {
        let parsed = Url::parse(url).map_err(|_| TransportError::invalid_url(url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TransportError::invalid_url(url));
        }

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::http_status(url, status.as_u16()));
        }
        debug!(url, status = status.as_u16(), "transfer opened");

        let owned_url = url.to_string();
        Ok(response
            .bytes_stream()
            .map(move |chunk| chunk.map_err(|e| TransportError::from_reqwest(owned_url.clone(), e)))
            .boxed())
    }
}

fn client_builder(config: &TransportConfig) -> ClientBuilder {
    let redirect_policy = if config.max_redirects == 0 {
        redirect::Policy::none()
    } else {
        redirect::Policy::limited(config.max_redirects)
    };

    let builder = Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(config.timeout_secs))
        .redirect(redirect_policy)
        .referer(config.auto_referer)
        .gzip(config.compression)
        .brotli(config.compression)
        .deflate(config.compression)
        .danger_accept_invalid_certs(!config.verify_tls)
        .user_agent(config.user_agent.clone());

    // Binding to the unspecified address of one family restricts connection
    // attempts to resolved addresses of that family.
    match config.ip_preference {
        IpPreference::Any => builder,
        IpPreference::V4 => builder.local_address(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
        IpPreference::V6 => builder.local_address(IpAddr::V6(Ipv6Addr::UNSPECIFIED)),
    }
}
