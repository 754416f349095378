//! Resource endpoints and operation identifiers.
//!
//! Every request builder resolves to an [`Endpoint`]: an HTTP method plus a
//! path relative to the API base URL. Paths come from templates such as
//! `customers/{customer_id}/cards`, with placeholders filled from request
//! fields.

use std::fmt;

use url::Url;

use crate::{
    error::{GatewayError, Result},
    response::ResponseKind,
};

/// HTTP methods used by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// Fetch and list operations.
    Get,
    /// Every mutating operation.
    Post,
}

impl HttpMethod {
    /// Returns the method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation performed by a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Create an order without capturing.
    Authorize,
    /// Create an order and capture it.
    Purchase,
    /// Capture an authorized charge.
    Capture,
    /// Create a subscription.
    Subscribe,
    /// Create a customer.
    CreateCustomer,
    /// Save a card on a customer.
    CreateCard,
    /// Save an address on a customer.
    CreateAddress,
    /// List a customer's cards.
    ListCustomerCards,
    /// Fetch one of a customer's cards.
    FetchCustomerCard,
    /// Resend a webhook delivery.
    RetryHook,
    /// Fetch a webhook delivery.
    FetchHook,
    /// List webhook deliveries.
    ListHooks,
    /// Fetch a transaction.
    FetchTransaction,
    /// Simulate installment amounts.
    CalculateInstallments,
}

impl Operation {
    /// Returns a stable snake_case name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Authorize => "authorize",
            Self::Purchase => "purchase",
            Self::Capture => "capture",
            Self::Subscribe => "subscribe",
            Self::CreateCustomer => "create_customer",
            Self::CreateCard => "create_card",
            Self::CreateAddress => "create_address",
            Self::ListCustomerCards => "list_customer_cards",
            Self::FetchCustomerCard => "fetch_customer_card",
            Self::RetryHook => "retry_hook",
            Self::FetchHook => "fetch_hook",
            Self::ListHooks => "list_hooks",
            Self::FetchTransaction => "fetch_transaction",
            Self::CalculateInstallments => "calculate_installments",
        }
    }

    /// Returns how responses to this operation are interpreted.
    #[must_use]
    pub const fn response_kind(self) -> ResponseKind {
        match self {
            Self::Authorize | Self::Purchase => ResponseKind::Order,
            Self::Capture => ResponseKind::Charge,
            Self::Subscribe => ResponseKind::Subscription,
            Self::CreateCustomer => ResponseKind::Customer,
            _ => ResponseKind::Resource,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP method and a path relative to the API base URL.
///
/// # Examples
///
/// ```
/// use pagarme_gateway::request::{Endpoint, HttpMethod};
///
/// let endpoint = Endpoint::resource(
///     HttpMethod::Get,
///     "customers/{customer_id}/cards/{card_id}",
///     &[("customer_id", "cus_123"), ("card_id", "card_456")],
/// )
/// .unwrap();
///
/// assert_eq!(endpoint.path(), "customers/cus_123/cards/card_456");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    method: HttpMethod,
    path: String,
}

impl Endpoint {
    /// A `POST` to a fixed path.
    #[must_use]
    pub fn post(path: &str) -> Self {
        Self { method: HttpMethod::Post, path: path.to_owned() }
    }

    /// A `GET` of a fixed path.
    #[must_use]
    pub fn get(path: &str) -> Self {
        Self { method: HttpMethod::Get, path: path.to_owned() }
    }

    /// Fills `{name}` placeholders in `template` with path-safe ids.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidParameter`] if an id is empty or contains
    /// characters that would escape its path segment.
    pub fn resource(method: HttpMethod, template: &str, ids: &[(&str, &str)]) -> Result<Self> {
        let mut path = template.to_owned();
        for (name, id) in ids {
            validate_segment(name, id)?;
            path = path.replace(&format!("{{{name}}}"), id);
        }
        Ok(Self { method, path })
    }

    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Returns the relative path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Resolves the endpoint against `base` and appends `query`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ConfigError`] if the joined URL is invalid.
    pub fn url(&self, base: &Url, query: &[(String, String)]) -> Result<Url> {
        let mut url = base
            .join(&self.path)
            .map_err(|e| GatewayError::ConfigError(format!("invalid endpoint '{}': {e}", self.path)))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }
}

fn validate_segment(name: &str, id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(GatewayError::MissingParameter(name.to_owned()));
    }
    if id == "." || id == ".." || id.chars().any(|c| "/?#%\\".contains(c) || c.is_whitespace()) {
        return Err(GatewayError::invalid(name, format!("'{id}' is not a valid resource id")));
    }
    Ok(())
}
