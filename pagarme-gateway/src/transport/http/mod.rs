//! HTTP transport using reqwest.

use std::sync::LazyLock;

use reqwest::{Client, header};
use tracing::{debug, instrument, warn};

use crate::{
    config::HttpConfig,
    error::{GatewayError, Result},
    request::HttpMethod,
    transport::{Transport, TransportRequest, TransportResponse},
};

const DEFAULT_USER_AGENT: &str = concat!("pagarme-gateway/", env!("CARGO_PKG_VERSION"));

/// Shared client for [`HttpTransport::new`], so default transports share one
/// connection pool.
#[allow(clippy::expect_used, reason = "default client configuration is static and valid")]
static DEFAULT_HTTP_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    let config = HttpConfig::default();
    Client::builder()
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout())
        .user_agent(DEFAULT_USER_AGENT)
        .build()
        .expect("Failed to create default HTTP client")
});

/// HTTPS transport with connection pooling.
///
/// # Examples
///
/// ```
/// use pagarme_gateway::{config::HttpConfig, transport::HttpTransport};
///
/// let config = HttpConfig { timeout_secs: 60, ..HttpConfig::default() };
/// let transport = HttpTransport::with_config(&config).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport on the shared default client.
    ///
    /// # Errors
    ///
    /// This method is infallible but returns `Result` for API consistency.
    pub fn new() -> Result<Self> {
        Ok(Self { client: DEFAULT_HTTP_CLIENT.clone() })
    }

    /// Creates a transport with its own client.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the client cannot be
    /// built.
    pub fn with_config(config: &HttpConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT))
            .build()
            .map_err(GatewayError::HttpError)?;
        Ok(Self { client })
    }

    #[instrument(
        skip(self, request),
        fields(method = %request.method, path = request.url.path(), status = tracing::field::Empty)
    )]
    async fn execute(&self, request: TransportRequest<'_>) -> Result<TransportResponse> {
        if request.url.scheme() != "https" {
            return Err(GatewayError::TransportError("Only HTTPS URLs are allowed".to_owned()));
        }

        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(request.url.clone()),
            HttpMethod::Post => self.client.post(request.url.clone()),
        };
        builder = builder
            .header(header::AUTHORIZATION, request.authorization)
            .header(header::ACCEPT, "application/json");
        if let Some(body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        tracing::Span::current().record("status", status.as_u16());

        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_owned()))
            .collect();
        let body = response.bytes().await.map_err(GatewayError::HttpError)?.to_vec();

        if !status.is_success() {
            warn!(status = status.as_u16(), bytes = body.len(), "API returned error status");
            return Err(GatewayError::ApiError { status: status.as_u16(), body });
        }

        debug!(status = status.as_u16(), bytes = body.len(), "response received");
        Ok(TransportResponse { status: status.as_u16(), body, headers })
    }
}

impl Transport for HttpTransport {
    async fn send<'a>(&'a self, request: TransportRequest<'a>) -> Result<TransportResponse> {
        self.execute(request).await
    }
}
