//! Pagar.me gateway: request builders and response normalization for the
//! Pagar.me core API.
//!
//! The crate translates payment intents (authorize, purchase, capture,
//! subscribe, customer and card management, webhook lookups) into the JSON
//! payloads the API expects, and reads its answers back into one uniform
//! [`Response`](response::Response).
//!
//! # Architecture
//!
//! ```text
//! caller ──► request builder ──► GatewayRequest::data / endpoint / query
//!                                        │
//!                  Gateway::send ◄───────┘
//!                        │   local validation error ──► Response (unsuccessful)
//!                        ▼
//!                    Transport ──► HTTPS, Basic auth
//!                        │   ApiError { status, body } ──► Response (unsuccessful)
//!                        ▼
//!                    Response: status, references, errors
//! ```
//!
//! - [`params`]: the parameter store every builder reads from
//! - [`phone`], [`address`], [`card`], [`customer`], [`item`]: value objects
//!   and their wire projections
//! - [`payment`]: one capability struct per payment method
//! - [`request`]: one builder per operation
//! - [`response`]: status resolution and accessors
//! - [`config`], [`transport`], [`gateway`], [`observability`]: the client
//!
//! # Quick Start
//!
//! Builders never perform I/O, so payloads can be inspected directly:
//!
//! ```
//! use pagarme_gateway::{
//!     card::CreditCard,
//!     payment::PaymentMethod,
//!     request::{GatewayRequest, OrderRequest, RequestContext, RequestFields},
//! };
//! use rust_decimal::Decimal;
//!
//! let mut card = CreditCard::default();
//! card.number = Some("4111111111111111".to_owned());
//! card.expiry_month = Some(12);
//! card.expiry_year = Some(2099);
//! card.cvv = Some("123".to_owned());
//! card.first_name = Some("Tony".to_owned());
//! card.last_name = Some("Stark".to_owned());
//! card.email = Some("tony@example.com".to_owned());
//!
//! let mut request = OrderRequest::purchase();
//! request
//!     .set_amount(Decimal::new(19_990, 2))
//!     .unwrap()
//!     .set_payment_method(PaymentMethod::CreditCard)
//!     .set_card(card)
//!     .set_code("ORDER-1");
//!
//! let data = request.data(&RequestContext::new("sk_test")).unwrap().unwrap();
//! assert_eq!(data["amount"], 19_990);
//! assert_eq!(data["capture"], true);
//! assert_eq!(data["payments"][0]["credit_card"]["card"]["number"], "4111111111111111");
//! ```
//!
//! Sending goes through a [`Gateway`](gateway::Gateway); see its module docs.
//!
//! # Error Handling
//!
//! Fallible calls return [`error::Result`]. `Gateway::send` only returns
//! `Err` when there is no response body at all; validation failures and API
//! error bodies come back as unsuccessful responses:
//!
//! ```
//! use pagarme_gateway::{request::Operation, response::Response};
//!
//! let response = Response::from_api_error(
//!     Operation::Authorize,
//!     422,
//!     br#"{"errors":{"order.customer.email":["The email field is not valid"]}}"#,
//! );
//! assert!(!response.is_successful());
//! assert_eq!(response.message().as_deref(), Some("The email field is not valid"));
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from reqwest and tracing-subscriber"
)]

pub mod address;
pub mod card;
pub mod config;
pub mod customer;
pub mod error;
pub mod gateway;
pub mod item;
pub mod observability;
pub mod params;
pub mod payment;
pub mod phone;
pub mod request;
pub mod response;
pub mod transport;

pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
pub use gateway::Gateway;
pub use response::Response;
