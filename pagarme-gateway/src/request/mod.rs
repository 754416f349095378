//! Request builders.
//!
//! One builder per operation. Each builder owns its fields, validates them in
//! [`GatewayRequest::data`] and resolves its own [`Endpoint`]. Builders never
//! perform I/O; [`crate::gateway::Gateway::send`] hands the payload to a
//! transport.
//!
//! # Examples
//!
//! ```
//! use pagarme_gateway::{
//!     payment::PaymentMethod,
//!     request::{GatewayRequest, OrderRequest, RequestContext, RequestFields},
//! };
//! use rust_decimal::Decimal;
//!
//! let mut request = OrderRequest::authorize();
//! request
//!     .set_amount(Decimal::new(1000, 2))
//!     .unwrap()
//!     .set_payment_method(PaymentMethod::Pix)
//!     .set_customer_reference("cus_123");
//!
//! let data = request.data(&RequestContext::new("sk_test")).unwrap().unwrap();
//! assert_eq!(data["amount"], 1000);
//! assert_eq!(data["payments"][0]["payment_method"], "pix");
//! ```

mod capture;
mod common;
mod customer;
mod endpoint;
mod hook;
mod order;
mod subscribe;
mod transaction;

use std::fmt;

use serde_json::Value;

pub use capture::CaptureRequest;
pub use common::{CURRENCY, RequestFields, RequestParameters, normalize_key};
pub use customer::{
    CreateAddressRequest, CreateCardRequest, CreateCustomerRequest, FetchCustomerCardRequest,
    ListCustomerCardsRequest,
};
pub use endpoint::{Endpoint, HttpMethod, Operation};
pub use hook::{FetchHookRequest, ListHooksRequest, RetryHookRequest};
pub use order::{OrderRequest, Shipping};
pub use subscribe::{BillingType, Interval, SubscribeRequest};
pub use transaction::{CalculateInstallmentsRequest, FetchTransactionRequest};

use crate::error::Result;

/// Maps a caller's user agent to a device name.
///
/// Implemented outside the crate, typically over a user-agent parsing
/// library.
pub trait DeviceResolver: Send + Sync {
    /// Returns the device name, or `None` when it cannot be determined.
    fn device_name(&self, user_agent: &str) -> Option<String>;
}

/// Per-call context handed to [`GatewayRequest::data`].
#[derive(Clone, Copy)]
pub struct RequestContext<'a> {
    api_key: &'a str,
    device_resolver: Option<&'a dyn DeviceResolver>,
}

impl<'a> RequestContext<'a> {
    /// Creates a context with no device resolver.
    #[must_use]
    pub const fn new(api_key: &'a str) -> Self {
        Self { api_key, device_resolver: None }
    }

    /// Attaches a device resolver.
    #[must_use]
    pub fn with_device_resolver(mut self, resolver: &'a dyn DeviceResolver) -> Self {
        self.device_resolver = Some(resolver);
        self
    }

    /// Returns the API key.
    #[must_use]
    pub const fn api_key(&self) -> &'a str {
        self.api_key
    }

    /// Returns the device resolver.
    #[must_use]
    pub fn device_resolver(&self) -> Option<&'a dyn DeviceResolver> {
        self.device_resolver
    }
}

impl fmt::Debug for RequestContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("api_key", &"[REDACTED]")
            .field("device_resolver", &self.device_resolver.is_some())
            .finish()
    }
}

/// A request the gateway can send.
pub trait GatewayRequest {
    /// Returns the operation this request performs.
    fn operation(&self) -> Operation;

    /// Resolves the endpoint, validating path ids.
    ///
    /// # Errors
    ///
    /// Returns error if a required id is missing or malformed.
    fn endpoint(&self) -> Result<Endpoint>;

    /// Validates the request and builds the JSON body.
    ///
    /// Returns `Ok(None)` for requests without a body.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first offending field.
    fn data(&self, ctx: &RequestContext<'_>) -> Result<Option<Value>>;

    /// Builds query parameters for GET lookups.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first offending field.
    fn query(&self, _ctx: &RequestContext<'_>) -> Result<Vec<(String, String)>> {
        Ok(Vec::new())
    }
}
