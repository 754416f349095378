//! State and accessors shared by every request builder.
//!
//! [`RequestParameters`] is the explicit field table behind every builder:
//! scalar fields live in a [`Parameters`] store, structured fields in typed
//! value objects. [`RequestFields`] exposes the shared setters on each builder.

use std::str::FromStr;

use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    address::Address,
    card::CreditCard,
    customer::{Customer, Phones},
    error::{GatewayError, Result},
    item::ItemCollection,
    params::Parameters,
    payment::{PaymentFields, PaymentMethod, as_string},
    phone::Phone,
};

/// Decimal places of the only supported currency, BRL.
const CURRENCY_DECIMALS: u32 = 2;

/// Currency sent with every order and subscription.
pub const CURRENCY: &str = "BRL";

/// Fields shared by every request builder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestParameters {
    params: Parameters,
    amount: Option<Decimal>,
    card: Option<CreditCard>,
    items: Option<ItemCollection>,
    address: Option<Address>,
    customer: Option<Customer>,
    phones: Phones,
    metadata: Option<Map<String, Value>>,
    payment: PaymentFields,
}

impl RequestParameters {
    /// Returns the scalar parameter store.
    #[must_use]
    pub const fn params(&self) -> &Parameters {
        &self.params
    }

    /// Returns the scalar parameter store mutably.
    pub const fn params_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    /// Returns a scalar parameter as a string, skipping empty values.
    #[must_use]
    pub fn string(&self, key: &str) -> Option<String> {
        self.params.get_string(key).filter(|value| !value.is_empty())
    }

    /// Returns a scalar parameter or a [`GatewayError::MissingParameter`].
    ///
    /// # Errors
    ///
    /// Returns error if `key` is unset or empty.
    pub fn require_string(&self, key: &str) -> Result<String> {
        self.string(key).ok_or_else(|| GatewayError::MissingParameter(key.to_owned()))
    }

    /// Returns the amount in major units.
    #[must_use]
    pub const fn amount(&self) -> Option<Decimal> {
        self.amount
    }

    /// Sets the amount in major units, e.g. `10.00`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidParameter`] for negative amounts or more
    /// than two decimal places.
    pub fn set_amount(&mut self, amount: Decimal) -> Result<()> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(GatewayError::invalid("amount", "must not be negative"));
        }
        if amount.normalize().scale() > CURRENCY_DECIMALS {
            return Err(GatewayError::invalid(
                "amount",
                format!("{amount} has more than {CURRENCY_DECIMALS} decimal places"),
            ));
        }
        self.amount = Some(amount);
        Ok(())
    }

    /// Returns the amount in minor units, if set.
    ///
    /// # Errors
    ///
    /// Returns error if the amount does not fit in an `i64`.
    pub fn amount_integer(&self) -> Result<Option<i64>> {
        self.amount.map(to_minor_units).transpose()
    }

    /// Returns the amount in minor units.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MissingParameter`] if no amount is set.
    pub fn require_amount(&self) -> Result<i64> {
        self.amount_integer()?.ok_or_else(|| GatewayError::MissingParameter("amount".to_owned()))
    }

    /// Parses the declared payment method, if any.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidParameter`] for unknown methods.
    pub fn payment_method(&self) -> Result<Option<PaymentMethod>> {
        self.string("payment_method").map(|method| method.parse()).transpose()
    }

    /// Parses the declared payment method.
    ///
    /// # Errors
    ///
    /// Returns error if no method is set or the method is unknown.
    pub fn require_payment_method(&self) -> Result<PaymentMethod> {
        self.payment_method()?
            .ok_or_else(|| GatewayError::MissingParameter("payment_method".to_owned()))
    }

    /// Returns the card.
    #[must_use]
    pub const fn card(&self) -> Option<&CreditCard> {
        self.card.as_ref()
    }

    /// Returns the items.
    #[must_use]
    pub const fn items(&self) -> Option<&ItemCollection> {
        self.items.as_ref()
    }

    /// Returns the address.
    #[must_use]
    pub const fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    /// Returns the customer.
    #[must_use]
    pub const fn customer(&self) -> Option<&Customer> {
        self.customer.as_ref()
    }

    /// Returns the phones.
    #[must_use]
    pub const fn phones(&self) -> &Phones {
        &self.phones
    }

    /// Returns the metadata.
    #[must_use]
    pub const fn metadata(&self) -> Option<&Map<String, Value>> {
        self.metadata.as_ref()
    }

    /// Returns the payment capabilities.
    #[must_use]
    pub const fn payment(&self) -> &PaymentFields {
        &self.payment
    }

    /// Returns the customer object for order-like payloads.
    ///
    /// Uses the explicit customer when set, otherwise derives one from the
    /// card holder.
    #[must_use]
    pub fn customer_payload(&self) -> Option<Value> {
        if let Some(customer) = &self.customer {
            return Some(customer.to_transport_data());
        }
        self.card.as_ref().map(|card| {
            debug!("deriving customer from card holder");
            Customer::from_card(card).to_transport_data()
        })
    }

    /// Writes `customer_id` when a customer reference is set, `customer`
    /// otherwise.
    pub(crate) fn insert_customer(&self, data: &mut Map<String, Value>) {
        if let Some(reference) = self.string("customer_reference") {
            data.insert("customer_id".to_owned(), Value::String(reference));
        } else if let Some(customer) = self.customer_payload() {
            data.insert("customer".to_owned(), customer);
        }
    }

    /// Routes one raw field to its typed slot.
    ///
    /// # Errors
    ///
    /// Returns error if the value does not fit the field.
    pub fn apply(&mut self, key: &str, value: Value) -> Result<()> {
        match key {
            "amount" => self.set_amount(parse_amount(&value)?)?,
            "card" => self.card = Some(CreditCard::try_from(value)?),
            "items" => self.items = Some(ItemCollection::try_from(value)?),
            "address" => self.address = Some(Address::try_from(value)?),
            "customer" => self.customer = Some(Customer::try_from(value)?),
            "home_phone" => self.phones.home_phone = Some(parse_phone(key, value)?),
            "mobile_phone" => self.phones.mobile_phone = Some(parse_phone(key, value)?),
            "metadata" => match value {
                Value::Object(map) => self.metadata = Some(map),
                Value::Null => self.metadata = None,
                other => {
                    return Err(GatewayError::invalid(key, format!("expected an object, got {other}")));
                }
            },
            _ => {
                if !self.payment.apply(key, &value)? {
                    self.params.set(key, value);
                }
            }
        }
        Ok(())
    }
}

fn to_minor_units(amount: Decimal) -> Result<i64> {
    amount
        .checked_mul(Decimal::from(10_i64.pow(CURRENCY_DECIMALS)))
        .and_then(|minor| minor.trunc().to_i64())
        .ok_or_else(|| GatewayError::invalid("amount", format!("{amount} is out of range")))
}

fn parse_amount(value: &Value) -> Result<Decimal> {
    let raw = as_string(value)
        .ok_or_else(|| GatewayError::invalid("amount", format!("expected a number, got {value}")))?;
    Decimal::from_str(raw.trim())
        .map_err(|e| GatewayError::invalid("amount", format!("'{raw}' is not a decimal: {e}")))
}

fn parse_phone(key: &str, value: Value) -> Result<Phone> {
    match value {
        Value::String(raw) => Ok(Phone::parse(&raw)),
        other => serde_json::from_value(other).map_err(|e| GatewayError::invalid(key, e.to_string())),
    }
}

/// Converts `camelCase` keys to `snake_case`; snake_case keys pass through.
#[must_use]
pub fn normalize_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            if !out.is_empty() {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Shared setters available on every request builder.
///
/// Builders hold a [`RequestParameters`] and expose it through
/// [`fields`](Self::fields) and [`fields_mut`](Self::fields_mut). Builders
/// with their own fields override [`apply_field`](Self::apply_field) and
/// fall back to [`RequestParameters::apply`].
pub trait RequestFields {
    /// Returns the shared fields.
    fn fields(&self) -> &RequestParameters;

    /// Returns the shared fields mutably.
    fn fields_mut(&mut self) -> &mut RequestParameters;

    /// Routes one raw field, keyed in snake_case.
    ///
    /// # Errors
    ///
    /// Returns error if the value does not fit the field.
    fn apply_field(&mut self, key: &str, value: Value) -> Result<()> {
        self.fields_mut().apply(key, value)
    }

    /// Sets every field of a raw mapping. Keys may be camelCase.
    ///
    /// # Errors
    ///
    /// Returns the first field error; fields before it stay applied.
    fn initialize(&mut self, values: Map<String, Value>) -> Result<&mut Self> {
        for (key, value) in values {
            self.apply_field(&normalize_key(&key), value)?;
        }
        Ok(self)
    }

    /// Sets the amount in major units.
    ///
    /// # Errors
    ///
    /// See [`RequestParameters::set_amount`].
    fn set_amount(&mut self, amount: Decimal) -> Result<&mut Self> {
        self.fields_mut().set_amount(amount)?;
        Ok(self)
    }

    /// Sets the payment method.
    fn set_payment_method(&mut self, method: PaymentMethod) -> &mut Self {
        self.fields_mut().params.set("payment_method", method.as_str());
        self
    }

    /// Sets the merchant code.
    fn set_code(&mut self, code: impl Into<String>) -> &mut Self {
        self.fields_mut().params.set("code", code.into());
        self
    }

    /// Sets the remote customer id.
    fn set_customer_reference(&mut self, reference: impl Into<String>) -> &mut Self {
        self.fields_mut().params.set("customer_reference", reference.into());
        self
    }

    /// Sets the remote transaction or charge id.
    fn set_transaction_reference(&mut self, reference: impl Into<String>) -> &mut Self {
        self.fields_mut().params.set("transaction_reference", reference.into());
        self
    }

    /// Sets the remote card id.
    fn set_card_reference(&mut self, reference: impl Into<String>) -> &mut Self {
        self.fields_mut().params.set("card_reference", reference.into());
        self
    }

    /// Sets the card.
    fn set_card(&mut self, card: CreditCard) -> &mut Self {
        self.fields_mut().card = Some(card);
        self
    }

    /// Sets the items.
    fn set_items(&mut self, items: impl Into<ItemCollection>) -> &mut Self {
        self.fields_mut().items = Some(items.into());
        self
    }

    /// Sets the address.
    fn set_address(&mut self, address: Address) -> &mut Self {
        self.fields_mut().address = Some(address);
        self
    }

    /// Sets the customer.
    fn set_customer(&mut self, customer: Customer) -> &mut Self {
        self.fields_mut().customer = Some(customer);
        self
    }

    /// Sets the home phone.
    fn set_home_phone(&mut self, phone: Phone) -> &mut Self {
        self.fields_mut().phones.home_phone = Some(phone);
        self
    }

    /// Sets the mobile phone.
    fn set_mobile_phone(&mut self, phone: Phone) -> &mut Self {
        self.fields_mut().phones.mobile_phone = Some(phone);
        self
    }

    /// Sets the metadata.
    fn set_metadata(&mut self, metadata: Map<String, Value>) -> &mut Self {
        self.fields_mut().metadata = Some(metadata);
        self
    }

    /// Returns the payment capabilities for direct edits.
    fn payment_mut(&mut self) -> &mut PaymentFields {
        &mut self.fields_mut().payment
    }
}

#[cfg(test)]
#[allow(clippy::unreachable, reason = "test code uses unreachable for expected-path assertions")]
mod tests {
    use serde_json::json;

    use super::*;

    struct Plain(RequestParameters);

    impl RequestFields for Plain {
        fn fields(&self) -> &RequestParameters {
            &self.0
        }

        fn fields_mut(&mut self) -> &mut RequestParameters {
            &mut self.0
        }
    }

    fn raw(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("fixture must be an object"),
        }
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("paymentMethod"), "payment_method");
        assert_eq!(normalize_key("transactionReference"), "transaction_reference");
        assert_eq!(normalize_key("payment_method"), "payment_method");
        assert_eq!(normalize_key("Code"), "code");
    }

    #[test]
    fn test_amount_to_minor_units() {
        let mut fields = RequestParameters::default();
        assert!(fields.set_amount(Decimal::new(1050, 2)).is_ok());
        assert_eq!(fields.require_amount().ok(), Some(1050));

        assert!(fields.set_amount(Decimal::new(10, 0)).is_ok());
        assert_eq!(fields.require_amount().ok(), Some(1000));
    }

    #[test]
    fn test_amount_rejects_precision_and_sign() {
        let mut fields = RequestParameters::default();
        assert!(fields.set_amount(Decimal::new(10_001, 3)).is_err());
        assert!(fields.set_amount(Decimal::new(-1, 0)).is_err());
        assert!(fields.set_amount(Decimal::new(10_100, 3)).is_ok());
        assert_eq!(fields.require_amount().ok(), Some(1010));
    }

    #[test]
    fn test_amount_overflow_is_a_validation_error() {
        for raw_amount in ["79228162514264337593543950335", "100000000000000000000"] {
            let mut request = Plain(RequestParameters::default());
            request
                .initialize(raw(json!({"amount": raw_amount, "paymentMethod": "pix"})))
                .expect("amount parses as a decimal");
            let err = request.fields().require_amount().expect_err("amount does not fit");
            assert!(err.is_validation());
            assert_eq!(err.field(), Some("amount"));
        }
    }

    #[test]
    fn test_missing_amount() {
        let Err(err) = RequestParameters::default().require_amount() else {
            unreachable!("amount is required");
        };
        assert_eq!(err.to_string(), "The amount parameter is required");
    }

    #[test]
    fn test_initialize_wraps_raw_values() {
        let mut request = Plain(RequestParameters::default());
        let result = request.initialize(raw(json!({
            "amount": "29.90",
            "paymentMethod": "PIX",
            "card": {"number": "4111111111111111", "expiryMonth": 12, "expiryYear": 2099},
            "items": [{"name": "Tshirt", "quantity": 1, "price": 2990}],
            "homePhone": "(21) 3456-7890",
            "expiresIn": 600,
            "customerReference": "cus_1",
        })));
        assert!(result.is_ok());

        let fields = request.fields();
        assert_eq!(fields.require_amount().ok(), Some(2990));
        assert_eq!(fields.require_payment_method().ok(), Some(PaymentMethod::Pix));
        assert!(fields.card().is_some());
        assert_eq!(fields.items().map(ItemCollection::len), Some(1));
        assert_eq!(
            fields.phones().home_phone.as_ref().map(|p| p.area_code.as_str()),
            Some("21")
        );
        assert_eq!(fields.payment().pix.expires_in, Some(600));
        assert_eq!(fields.string("customer_reference").as_deref(), Some("cus_1"));
    }

    #[test]
    fn test_initialize_rejects_bad_metadata() {
        let mut request = Plain(RequestParameters::default());
        let Err(err) = request.initialize(raw(json!({"metadata": "nope"}))) else {
            unreachable!("metadata must be an object");
        };
        assert_eq!(err.field(), Some("metadata"));
    }

    #[test]
    fn test_unknown_payment_method_fails_on_read() {
        let mut request = Plain(RequestParameters::default());
        request.fields_mut().params_mut().set("payment_method", "crypto");
        assert!(request.fields().require_payment_method().is_err());
    }

    #[test]
    fn test_customer_payload_prefers_explicit_customer() {
        let mut request = Plain(RequestParameters::default());
        request.set_card(CreditCard { first_name: Some("Card".to_owned()), ..Default::default() });
        let derived = request.fields().customer_payload().expect("customer payload builds");
        assert_eq!(derived["name"], "Card");

        request.set_customer(Customer { name: Some("Explicit".to_owned()), ..Default::default() });
        let explicit = request.fields().customer_payload().expect("customer payload builds");
        assert_eq!(explicit["name"], "Explicit");
    }
}
