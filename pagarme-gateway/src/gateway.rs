//! Gateway client.
//!
//! [`Gateway`] ties a [`GatewayConfig`], a [`Transport`] and an optional
//! [`DeviceResolver`] together. It hands out fresh request builders and sends
//! them:
//!
//! ```no_run
//! use pagarme_gateway::{
//!     config::GatewayConfig,
//!     gateway::Gateway,
//!     payment::PaymentMethod,
//!     request::RequestFields,
//! };
//! use rust_decimal::Decimal;
//!
//! # async fn example() -> pagarme_gateway::error::Result<()> {
//! let gateway = Gateway::new(GatewayConfig::with_api_key("sk_test_123"))?;
//!
//! let mut request = gateway.purchase();
//! request
//!     .set_amount(Decimal::new(4990, 2))?
//!     .set_payment_method(PaymentMethod::Pix)
//!     .set_customer_reference("cus_123");
//!
//! let response = gateway.send(&request).await?;
//! if response.is_successful() {
//!     println!("order {:?} is {:?}", response.order_reference(), response.status());
//! } else {
//!     println!("declined: {:?}", response.message());
//! }
//! # Ok(())
//! # }
//! ```

use std::{fmt, sync::Arc};

use serde_json::Value;
use tracing::{Span, debug, info, instrument, warn};
use url::Url;

use crate::{
    config::GatewayConfig,
    error::{GatewayError, Result},
    request::{
        CalculateInstallmentsRequest, CaptureRequest, CreateAddressRequest, CreateCardRequest,
        CreateCustomerRequest, DeviceResolver, FetchCustomerCardRequest, FetchHookRequest,
        FetchTransactionRequest, GatewayRequest, HttpMethod, ListCustomerCardsRequest,
        ListHooksRequest, OrderRequest, RequestContext, RetryHookRequest, SubscribeRequest,
    },
    response::Response,
    transport::{HttpTransport, Transport, TransportRequest, basic_authorization},
};

/// A request resolved to method, URL and body, ready for the transport.
struct Prepared {
    method: HttpMethod,
    url: Url,
    body: Option<Value>,
}

/// Pagar.me API client.
pub struct Gateway<T: Transport = HttpTransport> {
    config: GatewayConfig,
    base_url: Url,
    api_key: String,
    authorization: String,
    transport: T,
    device_resolver: Option<Arc<dyn DeviceResolver>>,
}

impl<T: Transport> fmt::Debug for Gateway<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gateway")
            .field("config", &self.config)
            .field("base_url", &self.base_url.as_str())
            .field("protocol", &self.transport.protocol_name())
            .field("device_resolver", &self.device_resolver.is_some())
            .finish_non_exhaustive()
    }
}

impl Gateway<HttpTransport> {
    /// Creates a client with an HTTP transport built from `config.http`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ConfigError`] if the configuration is invalid
    /// or no API key can be resolved, or an HTTP error if the client cannot be
    /// built.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let transport = HttpTransport::with_config(&config.http)?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> Gateway<T> {
    /// Creates a client over a custom transport.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ConfigError`] if the configuration is invalid
    /// or no API key can be resolved.
    pub fn with_transport(config: GatewayConfig, transport: T) -> Result<Self> {
        config.validate()?;
        let base_url = config.parsed_base_url()?;
        let api_key = config.resolve_api_key()?;
        let authorization = basic_authorization(&api_key);
        Ok(Self { config, base_url, api_key, authorization, transport, device_resolver: None })
    }

    /// Attaches a resolver used when an order has a user agent but no device.
    #[must_use]
    pub fn with_device_resolver(mut self, resolver: Arc<dyn DeviceResolver>) -> Self {
        self.device_resolver = Some(resolver);
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Returns the validated API root.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// New authorize-only order.
    #[must_use]
    pub fn authorize(&self) -> OrderRequest {
        OrderRequest::authorize()
    }

    /// New auto-captured order.
    #[must_use]
    pub fn purchase(&self) -> OrderRequest {
        OrderRequest::purchase()
    }

    /// New charge capture.
    #[must_use]
    pub fn capture(&self) -> CaptureRequest {
        CaptureRequest::new()
    }

    /// New subscription.
    #[must_use]
    pub fn subscribe(&self) -> SubscribeRequest {
        SubscribeRequest::new()
    }

    /// New customer.
    #[must_use]
    pub fn create_customer(&self) -> CreateCustomerRequest {
        CreateCustomerRequest::new()
    }

    /// New stored card.
    #[must_use]
    pub fn create_card(&self) -> CreateCardRequest {
        CreateCardRequest::new()
    }

    /// New customer address.
    #[must_use]
    pub fn create_address(&self) -> CreateAddressRequest {
        CreateAddressRequest::new()
    }

    /// Lists a customer's cards.
    #[must_use]
    pub fn list_customer_cards(&self) -> ListCustomerCardsRequest {
        ListCustomerCardsRequest::new()
    }

    /// Fetches one customer card.
    #[must_use]
    pub fn fetch_customer_card(&self) -> FetchCustomerCardRequest {
        FetchCustomerCardRequest::new()
    }

    /// Resends a webhook.
    #[must_use]
    pub fn retry_hook(&self) -> RetryHookRequest {
        RetryHookRequest::new()
    }

    /// Fetches a webhook.
    #[must_use]
    pub fn fetch_hook(&self) -> FetchHookRequest {
        FetchHookRequest::new()
    }

    /// Lists webhooks.
    #[must_use]
    pub fn list_hooks(&self) -> ListHooksRequest {
        ListHooksRequest::new()
    }

    /// Fetches a transaction.
    #[must_use]
    pub fn fetch_transaction(&self) -> FetchTransactionRequest {
        FetchTransactionRequest::new()
    }

    /// Simulates installments.
    #[must_use]
    pub fn calculate_installments(&self) -> CalculateInstallmentsRequest {
        CalculateInstallmentsRequest::new()
    }

    fn context(&self) -> RequestContext<'_> {
        let ctx = RequestContext::new(&self.api_key);
        match self.device_resolver.as_deref() {
            Some(resolver) => ctx.with_device_resolver(resolver),
            None => ctx,
        }
    }

    fn prepare<R: GatewayRequest + ?Sized>(&self, request: &R) -> Result<Prepared> {
        let ctx = self.context();
        let body = request.data(&ctx)?;
        let endpoint = request.endpoint()?;
        let query = request.query(&ctx)?;
        let url = endpoint.url(&self.base_url, &query)?;
        Ok(Prepared { method: endpoint.method(), url, body })
    }

    /// Builds, sends and normalizes one request.
    ///
    /// Local validation failures and API error bodies both come back as an
    /// unsuccessful [`Response`]; check [`Response::is_successful`].
    ///
    /// # Errors
    ///
    /// Returns an error only when no response body exists: network and
    /// transport failures, configuration errors, or a success body that is
    /// not JSON.
    #[instrument(
        skip(self, request),
        fields(
            operation = %request.operation(),
            method = tracing::field::Empty,
            path = tracing::field::Empty,
        )
    )]
    pub async fn send<R>(&self, request: &R) -> Result<Response>
    where
        R: GatewayRequest + Sync + ?Sized,
    {
        let operation = request.operation();
        let prepared = match self.prepare(request) {
            Ok(prepared) => prepared,
            Err(err) if err.is_validation() => {
                debug!(field = err.field(), error = %err, "request failed local validation");
                return Ok(Response::from_validation_error(operation, &err));
            }
            Err(err) => return Err(err),
        };

        let span = Span::current();
        span.record("method", prepared.method.as_str());
        span.record("path", prepared.url.path());

        let transport_request = TransportRequest {
            method: prepared.method,
            url: prepared.url,
            authorization: &self.authorization,
            body: prepared.body.as_ref(),
        };

        match self.transport.send(transport_request).await {
            Ok(raw) => {
                let payload = if raw.body.iter().all(u8::is_ascii_whitespace) {
                    Value::Null
                } else {
                    serde_json::from_slice(&raw.body)?
                };
                let response = Response::new(operation, payload).with_http_status(raw.status);
                info!(
                    status = raw.status,
                    successful = response.is_successful(),
                    "request completed"
                );
                Ok(response)
            }
            Err(GatewayError::ApiError { status, body }) => {
                warn!(status, bytes = body.len(), "API rejected request");
                Ok(Response::from_api_error(operation, status, &body))
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unreachable, reason = "test code uses unreachable for expected-path assertions")]
mod tests {
    use std::sync::Mutex;

    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;
    use crate::{
        payment::PaymentMethod,
        request::{Operation, RequestFields},
        transport::TransportResponse,
    };

    #[derive(Debug, Default)]
    struct Recorder {
        seen: Mutex<Vec<(HttpMethod, String, Option<Value>)>>,
    }

    impl Transport for Recorder {
        async fn send<'a>(&'a self, request: TransportRequest<'a>) -> Result<TransportResponse> {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push((request.method, request.url.to_string(), request.body.cloned()));
            }
            Ok(TransportResponse {
                status: 200,
                body: br#"{"id":"or_1","status":"paid"}"#.to_vec(),
                headers: vec![],
            })
        }

        fn protocol_name(&self) -> &'static str {
            "memory"
        }
    }

    fn gateway() -> Gateway<Recorder> {
        let Ok(gateway) =
            Gateway::with_transport(GatewayConfig::with_api_key("sk_test"), Recorder::default())
        else {
            unreachable!("valid config");
        };
        gateway
    }

    #[test]
    fn test_with_transport_requires_api_key() {
        let config = GatewayConfig {
            api_key_env: "PAGARME_GATEWAY_TEST_UNSET".to_owned(),
            ..GatewayConfig::default()
        };
        let result = Gateway::with_transport(config, Recorder::default());
        assert!(matches!(result, Err(GatewayError::ConfigError(_))));
    }

    #[test]
    fn test_debug_hides_credentials() {
        let debug = format!("{:?}", gateway());
        assert!(!debug.contains("sk_test"));
        assert!(!debug.contains("c2tfdGVzdDo"));
        assert!(debug.contains("memory"));
    }

    #[test]
    fn test_factories_are_fresh() {
        let gateway = gateway();
        assert_eq!(gateway.authorize().operation(), Operation::Authorize);
        assert_eq!(gateway.purchase().operation(), Operation::Purchase);
        assert_eq!(gateway.capture().operation(), Operation::Capture);
        assert_eq!(gateway.subscribe().operation(), Operation::Subscribe);
        assert_eq!(gateway.create_customer().operation(), Operation::CreateCustomer);
        assert_eq!(gateway.create_card().operation(), Operation::CreateCard);
        assert_eq!(gateway.create_address().operation(), Operation::CreateAddress);
        assert_eq!(gateway.list_customer_cards().operation(), Operation::ListCustomerCards);
        assert_eq!(gateway.fetch_customer_card().operation(), Operation::FetchCustomerCard);
        assert_eq!(gateway.retry_hook().operation(), Operation::RetryHook);
        assert_eq!(gateway.fetch_hook().operation(), Operation::FetchHook);
        assert_eq!(gateway.list_hooks().operation(), Operation::ListHooks);
        assert_eq!(gateway.fetch_transaction().operation(), Operation::FetchTransaction);
        assert_eq!(
            gateway.calculate_installments().operation(),
            Operation::CalculateInstallments
        );
    }

    #[tokio::test]
    async fn test_send_posts_order() {
        let gateway = gateway();
        let mut request = gateway.purchase();
        request
            .set_amount(Decimal::new(1000, 2))
            .expect("amount is valid")
            .set_payment_method(PaymentMethod::Pix)
            .set_customer_reference("cus_1");

        let Ok(response) = gateway.send(&request).await else { unreachable!("send succeeds") };
        assert!(response.is_paid());
        assert_eq!(response.http_status(), Some(200));

        let seen = gateway.transport().seen.lock().map(|s| s.clone()).expect("lock is not poisoned");
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, HttpMethod::Post);
        assert_eq!(seen[0].1, "https://api.pagar.me/core/v5/orders");
        assert_eq!(seen[0].2.as_ref().map(|b| &b["capture"]), Some(&json!(true)));
    }

    #[tokio::test]
    async fn test_validation_failure_never_reaches_transport() {
        let gateway = gateway();
        let request = gateway.authorize();

        let Ok(response) = gateway.send(&request).await else { unreachable!("folded into response") };
        assert!(!response.is_successful());
        assert_eq!(response.message().as_deref(), Some("The amount parameter is required"));
        let seen = gateway.transport().seen.lock().map(|s| s.len()).expect("lock is not poisoned");
        assert_eq!(seen, 0);
    }
}
