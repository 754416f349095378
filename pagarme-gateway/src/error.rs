//! Error types for the Pagar.me gateway.
//!
//! Every fallible operation in this crate returns [`Result`], whose error type
//! is [`GatewayError`]. Errors fall into two families:
//!
//! - **Local validation errors** ([`GatewayError::MissingParameter`],
//!   [`GatewayError::InvalidParameter`], [`GatewayError::InvalidAddress`],
//!   [`GatewayError::InvalidCreditCard`]): raised while a request payload is
//!   assembled, before anything is sent. Each one names the offending field.
//! - **Remote and transport errors** ([`GatewayError::ApiError`],
//!   [`GatewayError::HttpError`], [`GatewayError::TransportError`]): raised
//!   by the [`Transport`](crate::transport::Transport) collaborator.
//!
//! [`Gateway::send`](crate::gateway::Gateway::send) folds local validation
//! errors and API error bodies into a [`Response`](crate::response::Response),
//! so callers inspect `is_successful()` instead of matching on two shapes.
//!
//! # Examples
//!
//! ```
//! use pagarme_gateway::error::{GatewayError, Result};
//!
//! fn require_code(code: Option<&str>) -> Result<&str> {
//!     code.ok_or_else(|| GatewayError::MissingParameter("code".to_owned()))
//! }
//!
//! let err = require_code(None).unwrap_err();
//! assert_eq!(err.to_string(), "The code parameter is required");
//! assert_eq!(err.field(), Some("code"));
//! ```

use thiserror::Error;

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Errors that can occur while building, sending or decoding gateway requests.
///
/// This type implements `#[must_use]` to ensure errors are not silently ignored.
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum GatewayError {
    /// A required request field is absent.
    ///
    /// The payload is the public field name, e.g. `amount` or `paymentMethod`.
    #[error("The {0} parameter is required")]
    MissingParameter(String),

    /// A restricted-value field holds a value outside its allowed set.
    ///
    /// Raised at set-time for `interval`, `billing_type` and `document_type`,
    /// and at build-time for unknown payment methods or malformed amounts.
    #[error("Invalid {field} parameter: {reason}")]
    InvalidParameter {
        /// Name of the offending field.
        field: String,
        /// Human-readable explanation.
        reason: String,
    },

    /// An address is missing one of its required fields.
    ///
    /// Required fields are checked in order: `line_1`, `zip_code`, `city`,
    /// `state`, `country`. The payload names the first one found missing.
    #[error("The {0} parameter is required")]
    InvalidAddress(String),

    /// Card validation failed.
    ///
    /// Common causes include a missing number or expiry date, an expired card,
    /// or a number failing the Luhn checksum.
    #[error("Invalid credit card: {0}")]
    InvalidCreditCard(String),

    /// Gateway configuration is invalid.
    #[error("Invalid gateway configuration: {0}")]
    ConfigError(String),

    /// The transport failed without receiving a response body.
    #[error("Transport error: {0}")]
    TransportError(String),

    /// The remote API answered with a non-success status.
    ///
    /// The raw body is preserved so it can be decoded into a
    /// [`Response`](crate::response::Response).
    #[error("API returned status {status}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: Vec<u8>,
    },

    /// HTTP request failed.
    ///
    /// This error wraps [`reqwest::Error`] and covers timeouts, refused
    /// connections, DNS and TLS failures.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON encoding or decoding failed.
    #[error("Serialization failed: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl GatewayError {
    /// Builds an [`InvalidParameter`](Self::InvalidParameter) error.
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter { field: field.to_owned(), reason: reason.into() }
    }

    /// Returns the name of the offending field for validation errors.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingParameter(field) | Self::InvalidAddress(field) => Some(field),
            Self::InvalidParameter { field, .. } => Some(field),
            Self::InvalidCreditCard(_) => Some("card"),
            _ => None,
        }
    }

    /// Returns `true` for errors raised while assembling a payload locally.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingParameter(_)
                | Self::InvalidParameter { .. }
                | Self::InvalidAddress(_)
                | Self::InvalidCreditCard(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_parameter_display() {
        let error = GatewayError::MissingParameter("amount".to_owned());
        assert_eq!(error.to_string(), "The amount parameter is required");
        assert_eq!(error.field(), Some("amount"));
        assert!(error.is_validation());
    }

    #[test]
    fn test_invalid_parameter_display() {
        let error = GatewayError::invalid("interval", "must be one of day, week, month, year");
        assert_eq!(
            error.to_string(),
            "Invalid interval parameter: must be one of day, week, month, year"
        );
        assert_eq!(error.field(), Some("interval"));
    }

    #[test]
    fn test_invalid_address_names_field() {
        let error = GatewayError::InvalidAddress("zip_code".to_owned());
        assert_eq!(error.to_string(), "The zip_code parameter is required");
        assert_eq!(error.field(), Some("zip_code"));
    }

    #[test]
    fn test_api_error_is_not_validation() {
        let error = GatewayError::ApiError { status: 422, body: b"{}".to_vec() };
        assert_eq!(error.to_string(), "API returned status 422");
        assert!(!error.is_validation());
        assert_eq!(error.field(), None);
    }

    #[test]
    fn test_config_error_display() {
        let error = GatewayError::ConfigError("base_url must use HTTPS".into());
        assert!(error.to_string().contains("Invalid gateway configuration"));
    }
}
