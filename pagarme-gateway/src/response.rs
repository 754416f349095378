//! Response normalizer.
//!
//! Every operation answers with the same [`Response`] type: a raw decoded
//! payload plus the [`ResponseKind`] that decides how status, references and
//! errors are read from it. Local validation failures and remote error bodies
//! land in the same shape, so [`Response::is_successful`] and
//! [`Response::message`] are the only checks a caller needs.
//!
//! # Status resolution
//!
//! Order and charge responses start from the top-level `status`. Each
//! attached charge whose status differs replaces it, so the last differing
//! charge wins. The result is upper-cased:
//!
//! ```
//! use pagarme_gateway::{request::Operation, response::{OrderStatus, Response}};
//! use serde_json::json;
//!
//! let response = Response::new(
//!     Operation::Authorize,
//!     json!({"object": "order", "status": "pending", "charges": [{"status": "paid"}]}),
//! );
//!
//! assert_eq!(response.status().as_deref(), Some("PAID"));
//! assert_eq!(response.order_status(), Some(OrderStatus::Paid));
//! assert!(response.is_paid());
//! ```

use std::fmt;

use serde_json::{Map, Value};

use crate::{error::GatewayError, request::Operation};

/// Key used for errors that do not name a field.
const GENERIC_ERROR_KEY: &str = "message";

/// Key used for the first gateway-level error of an order's last transaction.
const GATEWAY_ERROR_KEY: &str = "gateway.response";

/// How a payload is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    /// Orders: status resolved across charges, references read from the last
    /// transaction.
    Order,
    /// A single charge.
    Charge,
    /// Subscriptions: only `active` counts as paid.
    Subscription,
    /// A customer.
    Customer,
    /// Any other resource: cards, addresses, hooks, transactions.
    Resource,
}

/// Resolved order or charge status.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    /// Awaiting payment.
    Pending,
    /// Paid.
    Paid,
    /// Canceled.
    Canceled,
    /// Failed.
    Failed,
    /// Any other status, upper-cased.
    Other(String),
}

impl OrderStatus {
    /// Parses an upper- or lower-case status.
    #[must_use]
    pub fn parse(status: &str) -> Self {
        match status.to_uppercase().as_str() {
            "PENDING" => Self::Pending,
            "PAID" => Self::Paid,
            "CANCELED" => Self::Canceled,
            "FAILED" => Self::Failed,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Returns the upper-case status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::Canceled => "CANCELED",
            Self::Failed => "FAILED",
            Self::Other(other) => other,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-keyed error messages, in the shape the remote API uses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    entries: Vec<(String, Vec<String>)>,
}

impl ValidationErrors {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `message` under `field`.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) -> &mut Self {
        let field = field.into();
        let message = message.into();
        if let Some((_, messages)) = self.entries.iter_mut().find(|(key, _)| *key == field) {
            messages.push(message);
        } else {
            self.entries.push((field, vec![message]));
        }
        self
    }

    /// Converts a local error, keyed by the field it names.
    #[must_use]
    pub fn from_error(error: &GatewayError) -> Self {
        let mut errors = Self::new();
        errors.push(error.field().unwrap_or(GENERIC_ERROR_KEY), error.to_string());
        errors
    }

    /// Reads a remote `errors` value.
    ///
    /// Objects map fields to a message or a list of messages; arrays and
    /// strings are filed under `message`.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let mut errors = Self::new();
        match value {
            Value::Object(map) => {
                for (field, messages) in map {
                    for message in messages_of(messages) {
                        errors.push(field.as_str(), message);
                    }
                }
            }
            other => {
                for message in messages_of(other) {
                    errors.push(GENERIC_ERROR_KEY, message);
                }
            }
        }
        errors
    }

    /// Returns `true` when there are no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of fields with messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns the messages for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.entries.iter().find(|(key, _)| key == field).map(|(_, messages)| messages.as_slice())
    }

    /// Returns the first message of the first field.
    #[must_use]
    pub fn first_message(&self) -> Option<&str> {
        self.entries.first().and_then(|(_, messages)| messages.first()).map(String::as_str)
    }

    /// Iterates fields and their messages.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }
}

fn messages_of(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(message_text).collect(),
        other => message_text(other).into_iter().collect(),
    }
}

fn message_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(map) => map.get("message").and_then(message_text),
        Value::Null | Value::String(_) => None,
        other => Some(other.to_string()),
    }
}

/// Boleto details of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boleto {
    /// Printable boleto URL.
    pub url: String,
    /// Typeable barcode line.
    pub barcode: Option<String>,
    /// Expiration date as returned.
    pub expiration_date: Option<String>,
}

/// A normalized API response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    kind: ResponseKind,
    operation: Option<Operation>,
    http_status: Option<u16>,
    data: Map<String, Value>,
    local_errors: Option<ValidationErrors>,
}

impl Response {
    /// Wraps a decoded success payload.
    ///
    /// Non-object payloads are stored under `data`.
    #[must_use]
    pub fn new(operation: Operation, payload: Value) -> Self {
        Self::with_kind(operation.response_kind(), payload).with_operation(operation)
    }

    /// Wraps a payload with an explicit kind and no originating operation.
    #[must_use]
    pub fn with_kind(kind: ResponseKind, payload: Value) -> Self {
        let data = match payload {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("data".to_owned(), other);
                map
            }
        };
        Self { kind, operation: None, http_status: None, data, local_errors: None }
    }

    /// Builds a failed response from a local validation error.
    #[must_use]
    pub fn from_validation_error(operation: Operation, error: &GatewayError) -> Self {
        let mut response = Self::new(operation, Value::Null);
        response.local_errors = Some(ValidationErrors::from_error(error));
        response
    }

    /// Builds a failed response from a remote error body.
    ///
    /// A body that is not a JSON object is kept as `message`. A body without
    /// an `errors` key gets one holding its `message`, or the status line.
    #[must_use]
    pub fn from_api_error(operation: Operation, status: u16, body: &[u8]) -> Self {
        let mut data = match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => map,
            _ => {
                let mut map = Map::new();
                let text = String::from_utf8_lossy(body).trim().to_owned();
                if !text.is_empty() {
                    map.insert("message".to_owned(), Value::String(text));
                }
                map
            }
        };
        let has_errors = data.get("errors").is_some_and(|errors| !ValidationErrors::from_value(errors).is_empty());
        if !has_errors {
            let message = data
                .get("message")
                .and_then(message_text)
                .unwrap_or_else(|| format!("API returned status {status}"));
            let mut errors = Map::new();
            errors.insert(GENERIC_ERROR_KEY.to_owned(), Value::Array(vec![Value::String(message)]));
            data.insert("errors".to_owned(), Value::Object(errors));
        }

        let mut response = Self::new(operation, Value::Object(data));
        response.http_status = Some(status);
        response
    }

    #[must_use]
    fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = Some(operation);
        self
    }

    /// Records the HTTP status the payload arrived with.
    #[must_use]
    pub const fn with_http_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    /// Returns the response kind.
    #[must_use]
    pub const fn kind(&self) -> ResponseKind {
        self.kind
    }

    /// Returns the operation that produced this response.
    #[must_use]
    pub const fn operation(&self) -> Option<Operation> {
        self.operation
    }

    /// Returns the HTTP status, when the response came from the network.
    #[must_use]
    pub const fn http_status(&self) -> Option<u16> {
        self.http_status
    }

    /// Returns the raw payload.
    #[must_use]
    pub const fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Consumes the response, returning the raw payload.
    #[must_use]
    pub fn into_data(self) -> Map<String, Value> {
        self.data
    }

    /// Returns a raw payload value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key).filter(|value| !value.is_null())
    }

    /// Reads a named attribute.
    ///
    /// Derived attributes (`status`, `transaction_reference`,
    /// `card_reference`, `order_reference`, `customer_reference`, `message`)
    /// take precedence over payload keys of the same name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<Value> {
        let derived = match name {
            "status" => self.status(),
            "transaction_reference" => self.transaction_reference(),
            "card_reference" => self.card_reference(),
            "order_reference" => self.order_reference(),
            "customer_reference" => self.customer_reference(),
            "message" => self.message(),
            _ => return self.get(name).cloned(),
        };
        derived.map(Value::String)
    }

    /// Returns the error list; empty on success.
    #[must_use]
    pub fn errors(&self) -> ValidationErrors {
        if let Some(local) = self.local_errors.as_ref().filter(|errors| !errors.is_empty()) {
            return local.clone();
        }
        if let Some(errors) = self.get("errors").map(ValidationErrors::from_value)
            && !errors.is_empty()
        {
            return errors;
        }

        let mut errors = ValidationErrors::new();
        match self.kind {
            ResponseKind::Order => {
                let first = self
                    .gateway_response()
                    .and_then(|gateway| gateway.get("errors"))
                    .and_then(Value::as_array)
                    .and_then(|list| list.first())
                    .and_then(message_text);
                if let Some(message) = first {
                    errors.push(GATEWAY_ERROR_KEY, message);
                }
            }
            ResponseKind::Subscription => {
                let bare = self.string("id").is_none() && self.string("status").is_none();
                if bare && let Some(message) = self.get("message").and_then(message_text) {
                    errors.push(GENERIC_ERROR_KEY, message);
                }
            }
            ResponseKind::Charge | ResponseKind::Customer | ResponseKind::Resource => {}
        }
        if errors.is_empty()
            && let Some(reason) = self.refuse_reason().filter(|reason| !reason.trim().is_empty())
        {
            errors.push(GENERIC_ERROR_KEY, reason);
        }
        errors
    }

    /// Returns `true` when there are no errors.
    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.errors().is_empty()
    }

    /// Returns the first human-readable error.
    ///
    /// `None` on success. A non-empty `refuse_reason` is the last error
    /// source, so declines carrying only that field still yield a message.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        self.errors().first_message().map(str::to_owned)
    }

    /// Returns the raw `refuse_reason`.
    ///
    /// Some declined transactions carry only a refuse reason.
    #[must_use]
    pub fn refuse_reason(&self) -> Option<String> {
        self.string("refuse_reason")
    }

    /// Returns the resolved status.
    ///
    /// Orders and charges resolve across attached charges and upper-case the
    /// result. Other kinds return the raw `status`.
    #[must_use]
    pub fn status(&self) -> Option<String> {
        match self.kind {
            ResponseKind::Order | ResponseKind::Charge => self.resolved_status(),
            _ => self.string("status"),
        }
    }

    fn resolved_status(&self) -> Option<String> {
        let mut status = self.string("status");
        for charge in self.charges() {
            let Some(charge_status) = string_of(charge, "status") else {
                continue;
            };
            if status.as_deref() != Some(charge_status.as_str()) {
                status = Some(charge_status);
            }
        }
        status.map(|s| s.to_uppercase())
    }

    /// Parses the resolved status.
    #[must_use]
    pub fn order_status(&self) -> Option<OrderStatus> {
        self.status().map(|status| OrderStatus::parse(&status))
    }

    /// Returns `true` when a subscription is `active`.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.string("status").as_deref() == Some("active")
    }

    /// Paid order or charge; active subscription.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.status_is(&OrderStatus::Paid)
    }

    /// Canceled order or charge; any inactive subscription.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.status_is(&OrderStatus::Canceled)
    }

    /// Failed order or charge; any inactive subscription.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.status_is(&OrderStatus::Failed)
    }

    /// Pending order or charge; any inactive subscription.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status_is(&OrderStatus::Pending)
    }

    fn status_is(&self, expected: &OrderStatus) -> bool {
        if self.kind == ResponseKind::Subscription {
            return match expected {
                OrderStatus::Paid => self.is_active(),
                _ => !self.is_active(),
            };
        }
        self.order_status().as_ref() == Some(expected)
    }

    /// Orders: the last transaction's `gateway_id`. Others: `id`.
    #[must_use]
    pub fn transaction_reference(&self) -> Option<String> {
        match self.kind {
            ResponseKind::Order => self.last_transaction().and_then(|t| string_of(t, "gateway_id")),
            _ => self.string("id"),
        }
    }

    /// Returns the card id of a card or transaction payload.
    #[must_use]
    pub fn card_reference(&self) -> Option<String> {
        match self.string("object").as_deref() {
            Some("card") => self.string("id").filter(|id| !id.is_empty()),
            Some("transaction") => self.get("card").and_then(|card| string_of(card, "id")),
            _ => None,
        }
    }

    /// Returns the order or subscription id.
    #[must_use]
    pub fn order_reference(&self) -> Option<String> {
        match self.kind {
            ResponseKind::Order | ResponseKind::Subscription => self.string("id"),
            _ => None,
        }
    }

    /// Returns the customer id.
    #[must_use]
    pub fn customer_reference(&self) -> Option<String> {
        match self.kind {
            ResponseKind::Customer => self.string("id"),
            _ => self.get("customer").and_then(|customer| string_of(customer, "id")),
        }
    }

    /// Returns the first charge's last transaction.
    #[must_use]
    pub fn last_transaction(&self) -> Option<&Value> {
        self.charges().next()?.get("last_transaction").filter(|t| !t.is_null())
    }

    /// Returns the last transaction's acquirer response.
    #[must_use]
    pub fn gateway_response(&self) -> Option<&Value> {
        self.last_transaction()?.get("gateway_response").filter(|g| !g.is_null())
    }

    /// Returns the last transaction's status.
    #[must_use]
    pub fn gateway_status(&self) -> Option<String> {
        self.last_transaction().and_then(|t| string_of(t, "status"))
    }

    /// Returns the last transaction's id.
    #[must_use]
    pub fn transaction_id(&self) -> Option<String> {
        self.last_transaction().and_then(|t| string_of(t, "id"))
    }

    /// Returns the last transaction's `gateway_id`.
    #[must_use]
    pub fn payment_token(&self) -> Option<String> {
        self.last_transaction().and_then(|t| string_of(t, "gateway_id"))
    }

    /// Returns boleto details of a transaction payload with a `boleto_url`.
    #[must_use]
    pub fn boleto(&self) -> Option<Boleto> {
        if self.string("object").as_deref() != Some("transaction") {
            return None;
        }
        let url = self.string("boleto_url").filter(|url| !url.is_empty())?;
        Some(Boleto {
            url,
            barcode: self.string("boleto_barcode"),
            expiration_date: self.string("boleto_expiration_date"),
        })
    }

    /// Returns the raw `installments` of an installment simulation.
    #[must_use]
    pub fn calculated_installments(&self) -> Option<&Value> {
        self.get("installments")
    }

    fn charges(&self) -> impl Iterator<Item = &Value> {
        let charges: &[Value] = match self.get("charges") {
            Some(Value::Array(items)) => items,
            Some(single @ Value::Object(_)) => std::slice::from_ref(single),
            _ => &[],
        };
        charges.iter()
    }

    fn string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(scalar_string)
    }
}

fn string_of(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(scalar_string)
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unreachable, reason = "test code uses unreachable for expected-path assertions")]
mod tests {
    use serde_json::json;

    use super::*;

    fn order(payload: Value) -> Response {
        Response::new(Operation::Authorize, payload)
    }

    #[test]
    fn test_status_prefers_differing_charge() {
        let response = order(json!({"status": "PENDING", "charges": [{"status": "paid"}]}));
        assert_eq!(response.status().as_deref(), Some("PAID"));
        assert!(response.is_paid());
        assert!(!response.is_pending());
    }

    #[test]
    fn test_status_last_differing_charge_wins() {
        let response = order(json!({
            "status": "pending",
            "charges": [{"status": "paid"}, {"status": "failed"}, {"status": "pending"}],
        }));
        assert_eq!(response.order_status(), Some(OrderStatus::Pending));

        let response = order(json!({
            "status": "paid",
            "charges": [{"status": "canceled"}, {"status": "canceled"}],
        }));
        assert!(response.is_cancelled());
    }

    #[test]
    fn test_status_without_charges_is_upper_cased() {
        let response = order(json!({"status": "failed"}));
        assert_eq!(response.status().as_deref(), Some("FAILED"));
        assert!(response.is_failed());
        assert_eq!(order(json!({})).status(), None);
        assert!(!order(json!({})).is_paid());
    }

    #[test]
    fn test_single_charge_object() {
        let response = order(json!({"status": "pending", "charges": {"status": "paid"}}));
        assert!(response.is_paid());
    }

    #[test]
    fn test_unknown_status() {
        let response = order(json!({"status": "processing"}));
        assert_eq!(response.order_status(), Some(OrderStatus::Other("PROCESSING".to_owned())));
        assert_eq!(OrderStatus::Other("X".to_owned()).to_string(), "X");
    }

    #[test]
    fn test_order_references() {
        let response = order(json!({
            "id": "or_1",
            "object": "order",
            "status": "paid",
            "customer": {"id": "cus_1"},
            "charges": [{
                "status": "paid",
                "last_transaction": {"id": "tran_1", "gateway_id": "gw_1", "status": "captured"},
            }],
        }));
        assert_eq!(response.order_reference().as_deref(), Some("or_1"));
        assert_eq!(response.customer_reference().as_deref(), Some("cus_1"));
        assert_eq!(response.transaction_reference().as_deref(), Some("gw_1"));
        assert_eq!(response.payment_token().as_deref(), Some("gw_1"));
        assert_eq!(response.transaction_id().as_deref(), Some("tran_1"));
        assert_eq!(response.gateway_status().as_deref(), Some("captured"));
        assert!(response.is_successful());
        assert_eq!(response.message(), None);
    }

    #[test]
    fn test_order_gateway_error() {
        let response = order(json!({
            "status": "failed",
            "charges": [{
                "status": "failed",
                "last_transaction": {
                    "gateway_response": {"code": "400", "errors": [{"message": "Card declined"}]},
                },
            }],
        }));
        assert!(!response.is_successful());
        assert_eq!(response.message().as_deref(), Some("Card declined"));
        assert_eq!(
            response.errors().get("gateway.response"),
            Some(["Card declined".to_owned()].as_slice())
        );
    }

    #[test]
    fn test_structured_errors_win() {
        let response = order(json!({
            "errors": {"order.customer.name": ["The name field is required."]},
            "refuse_reason": "ignored",
        }));
        assert_eq!(response.message().as_deref(), Some("The name field is required."));
    }

    #[test]
    fn test_message_falls_back_to_refuse_reason() {
        let response = order(json!({"id": "or_1", "status": "failed", "refuse_reason": "acquirer"}));
        assert!(!response.is_successful());
        assert_eq!(response.message().as_deref(), Some("acquirer"));
        assert_eq!(response.errors().get("message"), Some(["acquirer".to_owned()].as_slice()));
        assert_eq!(response.refuse_reason().as_deref(), Some("acquirer"));

        let response = order(json!({"errors": {"card": []}, "refuse_reason": "acquirer"}));
        assert!(!response.is_successful());
        assert_eq!(response.message().as_deref(), Some("acquirer"));
    }

    #[test]
    fn test_blank_refuse_reason_is_not_an_error() {
        let response = order(json!({"status": "paid", "refuse_reason": "  "}));
        assert!(response.is_successful());
        assert_eq!(response.message(), None);

        let response = order(json!({"status": "paid", "refuse_reason": null}));
        assert!(response.is_successful());
    }

    #[test]
    fn test_validation_error_response() {
        let error = GatewayError::MissingParameter("amount".to_owned());
        let response = Response::from_validation_error(Operation::Purchase, &error);
        assert!(!response.is_successful());
        assert_eq!(response.message().as_deref(), Some("The amount parameter is required"));
        assert_eq!(response.errors().get("amount").map(<[String]>::len), Some(1));
        assert_eq!(response.operation(), Some(Operation::Purchase));
        assert_eq!(response.http_status(), None);
    }

    #[test]
    fn test_api_error_rewrap() {
        let body = br#"{"message":"The request is invalid.","errors":{"order.amount":["Invalid amount"]}}"#;
        let response = Response::from_api_error(Operation::Authorize, 422, body);
        assert_eq!(response.http_status(), Some(422));
        assert_eq!(response.message().as_deref(), Some("Invalid amount"));

        let response = Response::from_api_error(
            Operation::FetchHook,
            401,
            br#"{"message":"Authorization has been denied for this request."}"#,
        );
        assert_eq!(
            response.message().as_deref(),
            Some("Authorization has been denied for this request.")
        );

        let response = Response::from_api_error(Operation::FetchHook, 502, b"Bad Gateway");
        assert_eq!(response.message().as_deref(), Some("Bad Gateway"));

        let response = Response::from_api_error(Operation::FetchHook, 500, b"");
        assert_eq!(response.message().as_deref(), Some("API returned status 500"));
    }

    #[test]
    fn test_subscription_states() {
        let active = Response::new(Operation::Subscribe, json!({"id": "sub_1", "status": "active"}));
        assert!(active.is_active());
        assert!(active.is_paid());
        assert!(!active.is_pending());
        assert_eq!(active.order_reference().as_deref(), Some("sub_1"));
        assert_eq!(active.status().as_deref(), Some("active"));

        let canceled = Response::new(Operation::Subscribe, json!({"id": "sub_1", "status": "canceled"}));
        assert!(!canceled.is_paid());
        assert!(canceled.is_cancelled() && canceled.is_failed() && canceled.is_pending());
    }

    #[test]
    fn test_subscription_bare_message_is_error() {
        let response = Response::new(Operation::Subscribe, json!({"message": "Plan not found"}));
        assert!(!response.is_successful());
        assert_eq!(response.message().as_deref(), Some("Plan not found"));

        let response = Response::new(Operation::Subscribe, json!({"id": "sub_1", "message": "ok"}));
        assert!(response.is_successful());
    }

    #[test]
    fn test_card_reference_by_object() {
        let card = Response::new(Operation::CreateCard, json!({"object": "card", "id": "card_1"}));
        assert_eq!(card.card_reference().as_deref(), Some("card_1"));

        let transaction = Response::new(
            Operation::FetchTransaction,
            json!({"object": "transaction", "id": 99, "card": {"id": "card_2"}}),
        );
        assert_eq!(transaction.card_reference().as_deref(), Some("card_2"));
        assert_eq!(transaction.transaction_reference().as_deref(), Some("99"));

        let other = Response::new(Operation::FetchHook, json!({"object": "hook", "id": "hook_1"}));
        assert_eq!(other.card_reference(), None);
    }

    #[test]
    fn test_boleto() {
        let response = Response::new(
            Operation::FetchTransaction,
            json!({
                "object": "transaction",
                "boleto_url": "https://boleto.example/1",
                "boleto_barcode": "1234",
                "boleto_expiration_date": "2030-01-01",
            }),
        );
        let Some(boleto) = response.boleto() else {
            unreachable!("boleto must be present");
        };
        assert_eq!(boleto.url, "https://boleto.example/1");
        assert_eq!(boleto.barcode.as_deref(), Some("1234"));

        let no_url = Response::new(Operation::FetchTransaction, json!({"object": "transaction"}));
        assert_eq!(no_url.boleto(), None);
    }

    #[test]
    fn test_calculated_installments() {
        let response = Response::new(
            Operation::CalculateInstallments,
            json!({"installments": {"1": {"installment_amount": 10000}}}),
        );
        assert_eq!(
            response.calculated_installments().and_then(|i| i.get("1")).map(|i| &i["installment_amount"]),
            Some(&json!(10000))
        );
    }

    #[test]
    fn test_attribute_table_overrides_raw_values() {
        let response = order(json!({"status": "pending", "charges": [{"status": "paid"}], "code": "ORD_1"}));
        assert_eq!(response.attribute("status"), Some(json!("PAID")));
        assert_eq!(response.attribute("code"), Some(json!("ORD_1")));
        assert_eq!(response.attribute("message"), None);
        assert_eq!(response.attribute("missing"), None);
    }

    #[test]
    fn test_customer_kind() {
        let response = Response::new(Operation::CreateCustomer, json!({"id": "cus_9", "name": "Tony"}));
        assert_eq!(response.customer_reference().as_deref(), Some("cus_9"));
        assert_eq!(response.transaction_reference().as_deref(), Some("cus_9"));
        assert_eq!(response.order_reference(), None);
    }

    #[test]
    fn test_non_object_payload() {
        let response = Response::with_kind(ResponseKind::Resource, json!([1, 2]));
        assert_eq!(response.get("data"), Some(&json!([1, 2])));
        assert!(response.is_successful());
    }
}
