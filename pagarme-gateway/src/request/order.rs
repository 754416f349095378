//! Authorize and purchase requests (`POST orders`).

use serde_json::{Map, Value, json};
use tracing::debug;

use super::{
    Endpoint, GatewayRequest, Operation, RequestContext, RequestFields, RequestParameters,
    common::CURRENCY,
};
use crate::{
    address::Address,
    error::{GatewayError, Result},
    params::insert_some,
    payment::{as_i64, as_string},
};

/// Shipping block of an order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shipping {
    /// Recipient name.
    pub recipient_name: Option<String>,
    /// Recipient phone, sent as given.
    pub recipient_phone: Option<String>,
    /// Carrier or service type.
    pub shipping_type: Option<String>,
    /// Delivery address.
    pub address: Option<Address>,
    /// Shipping cost in minor units.
    pub amount: Option<i64>,
    /// Free-text description.
    pub description: Option<String>,
    /// Latest delivery date.
    pub max_delivery_date: Option<String>,
    /// Estimated delivery date.
    pub estimated_delivery_date: Option<String>,
}

impl Shipping {
    /// Returns `true` when recipient name, type and address are all set.
    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.recipient_name.as_deref().is_some_and(|name| !name.is_empty())
            && self.shipping_type.as_deref().is_some_and(|kind| !kind.is_empty())
            && self.address.is_some()
    }

    /// Builds the `shipping` object.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MissingParameter`] for the first missing of
    /// `recipient_name`, `shipping_type`, `shipping_address`.
    pub fn to_transport_data(&self) -> Result<Value> {
        let recipient_name = required(self.recipient_name.as_deref(), "recipient_name")?;
        let shipping_type = required(self.shipping_type.as_deref(), "shipping_type")?;
        let address = self
            .address
            .as_ref()
            .ok_or_else(|| GatewayError::MissingParameter("shipping_address".to_owned()))?;

        let mut data = Map::new();
        data.insert("amount".to_owned(), self.amount.unwrap_or(0).into());
        data.insert(
            "description".to_owned(),
            self.description.clone().map_or(Value::Null, Value::String),
        );
        data.insert("recipient_name".to_owned(), recipient_name.into());
        data.insert(
            "recipient_phone".to_owned(),
            self.recipient_phone.clone().map_or(Value::Null, Value::String),
        );
        data.insert("address".to_owned(), address.to_transport_data());
        data.insert("type".to_owned(), shipping_type.into());
        insert_some(
            &mut data,
            "max_delivery_date",
            self.max_delivery_date.clone().filter(|date| !date.is_empty()),
        );
        insert_some(
            &mut data,
            "estimated_delivery_date",
            self.estimated_delivery_date.clone().filter(|date| !date.is_empty()),
        );
        Ok(Value::Object(data))
    }

    /// Routes a raw shipping field. Returns `Ok(false)` for other keys.
    ///
    /// # Errors
    ///
    /// Returns error if the value has the wrong shape.
    pub fn apply(&mut self, key: &str, value: &Value) -> Result<bool> {
        match key {
            "recipient_name" => self.recipient_name = as_string(value),
            "recipient_phone" => self.recipient_phone = as_string(value),
            "shipping_type" => self.shipping_type = as_string(value),
            "shipping_address" => {
                self.address = match value {
                    Value::Null => None,
                    other => Some(Address::try_from(other.clone())?),
                };
            }
            "shipping_amount" => self.amount = Some(as_i64(key, value)?),
            "shipping_description" => self.description = as_string(value),
            "max_delivery_date" => self.max_delivery_date = as_string(value),
            "estimated_delivery_date" => self.estimated_delivery_date = as_string(value),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str> {
    value.filter(|v| !v.is_empty()).ok_or_else(|| GatewayError::MissingParameter(field.to_owned()))
}

/// Creates an order with one payment.
///
/// [`OrderRequest::authorize`] leaves the charge for a later capture;
/// [`OrderRequest::purchase`] adds `capture: true`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    operation: Operation,
    fields: RequestParameters,
    shipping: Shipping,
}

impl OrderRequest {
    /// An authorize-only order.
    #[must_use]
    pub fn authorize() -> Self {
        Self {
            operation: Operation::Authorize,
            fields: RequestParameters::default(),
            shipping: Shipping::default(),
        }
    }

    /// An order captured on creation.
    #[must_use]
    pub fn purchase() -> Self {
        Self { operation: Operation::Purchase, ..Self::authorize() }
    }

    /// Returns the shipping block.
    #[must_use]
    pub const fn shipping(&self) -> &Shipping {
        &self.shipping
    }

    /// Replaces the shipping block.
    pub fn set_shipping(&mut self, shipping: Shipping) -> &mut Self {
        self.shipping = shipping;
        self
    }

    /// Sets an explicit device platform, bypassing user-agent resolution.
    pub fn set_device(&mut self, device: impl Into<String>) -> &mut Self {
        self.fields.params_mut().set("device", device.into());
        self
    }

    /// Sets the buyer's user agent for device resolution.
    pub fn set_user_agent(&mut self, user_agent: impl Into<String>) -> &mut Self {
        self.fields.params_mut().set("user_agent", user_agent.into());
        self
    }

    /// Marks the order as closed.
    pub fn set_closed(&mut self, closed: bool) -> &mut Self {
        self.fields.params_mut().set("closed", closed);
        self
    }

    /// Sets the buyer's IP address.
    pub fn set_client_ip(&mut self, ip: impl Into<String>) -> &mut Self {
        self.fields.params_mut().set("client_ip", ip.into());
        self
    }

    /// Enables or disables antifraud screening.
    pub fn set_antifraud_enabled(&mut self, enabled: bool) -> &mut Self {
        self.fields.params_mut().set("antifraud_enabled", enabled);
        self
    }

    fn device(&self, ctx: &RequestContext<'_>) -> Option<String> {
        if let Some(device) = self.fields.string("device") {
            return Some(device);
        }
        let user_agent = self.fields.string("user_agent")?;
        let resolved = ctx.device_resolver()?.device_name(&user_agent);
        debug!(resolved = resolved.is_some(), "device resolved from user agent");
        resolved.filter(|name| !name.is_empty())
    }
}

impl RequestFields for OrderRequest {
    fn fields(&self) -> &RequestParameters {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut RequestParameters {
        &mut self.fields
    }

    fn apply_field(&mut self, key: &str, value: Value) -> Result<()> {
        let key = if key == "ip" { "client_ip" } else { key };
        if self.shipping.apply(key, &value)? {
            return Ok(());
        }
        self.fields.apply(key, value)
    }
}

impl GatewayRequest for OrderRequest {
    fn operation(&self) -> Operation {
        self.operation
    }

    fn endpoint(&self) -> Result<Endpoint> {
        Ok(Endpoint::post("orders"))
    }

    fn data(&self, ctx: &RequestContext<'_>) -> Result<Option<Value>> {
        let amount = self.fields.require_amount()?;
        let method = self.fields.require_payment_method()?;
        let params = self.fields.params();

        let mut data = Map::new();
        insert_some(&mut data, "code", self.fields.string("code"));
        data.insert("amount".to_owned(), amount.into());
        insert_some(&mut data, "antifraud_enabled", params.get("antifraud_enabled").cloned());
        insert_some(&mut data, "metadata", self.fields.metadata().cloned());
        data.insert("closed".to_owned(), params.get_bool("closed").into());
        insert_some(&mut data, "ip", self.fields.string("client_ip"));
        data.insert("currency".to_owned(), CURRENCY.into());

        self.fields.insert_customer(&mut data);

        if let Some(platform) = self.device(ctx) {
            data.insert("device".to_owned(), json!({ "platform": platform }));
        }

        if let Some(items) = self.fields.items().filter(|items| !items.is_empty()) {
            data.insert("items".to_owned(), items.to_transport_data());
        }

        let payment = self.fields.payment().to_payment(method, self.fields.card())?;
        data.insert("payments".to_owned(), Value::Array(vec![payment]));

        if self.shipping.is_requested() {
            debug!("including shipping block");
            data.insert("shipping".to_owned(), self.shipping.to_transport_data()?);
        }

        if self.operation == Operation::Purchase {
            data.insert("capture".to_owned(), true.into());
        }

        Ok(Some(Value::Object(data)))
    }
}

#[cfg(test)]
#[allow(clippy::unreachable, reason = "test code uses unreachable for expected-path assertions")]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::{
        card::CreditCard,
        item::{Item, ItemCollection},
        payment::PaymentMethod,
        request::DeviceResolver,
    };

    struct StaticDevice(&'static str);

    impl DeviceResolver for StaticDevice {
        fn device_name(&self, _user_agent: &str) -> Option<String> {
            Some(self.0.to_owned())
        }
    }

    fn ctx() -> RequestContext<'static> {
        RequestContext::new("sk_test")
    }

    fn valid_card() -> CreditCard {
        CreditCard {
            first_name: Some("Tony".to_owned()),
            last_name: Some("Stark".to_owned()),
            number: Some("4111111111111111".to_owned()),
            expiry_month: Some(12),
            expiry_year: Some(2099),
            cvv: Some("123".to_owned()),
            billing_address1: Some("10880 Malibu Point".to_owned()),
            billing_city: Some("Malibu".to_owned()),
            ..Default::default()
        }
    }

    fn build(request: &OrderRequest) -> Map<String, Value> {
        match request.data(&ctx()) {
            Ok(Some(Value::Object(map))) => map,
            other => unreachable!("expected an object payload, got {other:?}"),
        }
    }

    fn card_order() -> OrderRequest {
        let mut request = OrderRequest::authorize();
        request
            .set_amount(Decimal::new(2990, 2))
            .expect("amount is valid")
            .set_payment_method(PaymentMethod::CreditCard)
            .set_card(valid_card());
        request
    }

    #[test]
    fn test_requires_amount_then_payment_method() {
        let request = OrderRequest::authorize();
        let Err(err) = request.data(&ctx()) else {
            unreachable!("amount is required");
        };
        assert_eq!(err.field(), Some("amount"));

        let mut request = OrderRequest::authorize();
        request.set_amount(Decimal::ONE).expect("amount is valid");
        let Err(err) = request.data(&ctx()) else {
            unreachable!("payment method is required");
        };
        assert_eq!(err.field(), Some("payment_method"));
    }

    #[test]
    fn test_credit_card_order_payload() {
        let data = build(&card_order());

        assert_eq!(data["amount"], 2990);
        assert_eq!(data["currency"], "BRL");
        assert_eq!(data["closed"], false);
        assert!(data.get("capture").is_none());
        assert!(data.get("items").is_none());
        assert!(data.get("device").is_none());

        let payment = &data["payments"][0];
        assert_eq!(payment["payment_method"], "credit_card");
        assert_eq!(payment["credit_card"]["installments"], 1);
        assert_eq!(payment["credit_card"]["operation_type"], "auth_only");
        assert_eq!(payment["credit_card"]["card"]["holder_name"], "Tony Stark");
        assert_eq!(payment["credit_card"]["card"]["number"], "4111111111111111");

        assert_eq!(data["customer"]["name"], "Tony Stark");
        assert_eq!(data["customer"]["address"]["line_1"], "10880 Malibu Point");
    }

    #[test]
    fn test_customer_reference_wins_over_customer() {
        let mut request = card_order();
        request.set_customer_reference("cus_123");
        let data = build(&request);
        assert_eq!(data["customer_id"], "cus_123");
        assert!(data.get("customer").is_none());
    }

    #[test]
    fn test_oversized_amount_fails_without_panicking() {
        let mut request = OrderRequest::authorize();
        request.set_amount(Decimal::MAX).expect("amount is valid").set_payment_method(PaymentMethod::Pix);
        let Err(err) = request.data(&ctx()) else {
            unreachable!("amount overflows minor units");
        };
        assert_eq!(err.field(), Some("amount"));
    }

    #[test]
    fn test_purchase_sets_boolean_capture() {
        let mut request = OrderRequest::purchase();
        request
            .set_amount(Decimal::TEN)
            .expect("amount is valid")
            .set_payment_method(PaymentMethod::Boleto)
            .set_customer_reference("cus_1");
        let data = build(&request);
        assert_eq!(data["capture"], true);
        assert_eq!(request.operation(), Operation::Purchase);
        assert_eq!(data["payments"][0]["payment_method"], "boleto");
    }

    #[test]
    fn test_items_included_only_when_non_empty() {
        let mut request = card_order();
        request.set_items(ItemCollection::new());
        assert!(build(&request).get("items").is_none());

        request.set_items(vec![Item::new("Keychain", 3, 2990).with_code("PRD_1")]);
        let data = build(&request);
        assert_eq!(data["items"][0]["amount"], 2990);
        assert_eq!(data["items"][0]["code"], "PRD_1");
    }

    #[test]
    fn test_explicit_device_wins() {
        let resolver = StaticDevice("Android");
        let context = ctx().with_device_resolver(&resolver);

        let mut request = card_order();
        request.set_user_agent("Mozilla/5.0");
        let Ok(Some(data)) = request.data(&context) else {
            unreachable!("payload builds");
        };
        assert_eq!(data["device"]["platform"], "Android");

        request.set_device("Kiosk");
        let Ok(Some(data)) = request.data(&context) else {
            unreachable!("payload builds");
        };
        assert_eq!(data["device"]["platform"], "Kiosk");
    }

    #[test]
    fn test_empty_resolved_device_is_omitted() {
        let resolver = StaticDevice("");
        let mut request = card_order();
        request.set_user_agent("curl/8");
        let Ok(Some(data)) = request.data(&ctx().with_device_resolver(&resolver)) else {
            unreachable!("payload builds");
        };
        assert!(data.get("device").is_none());
    }

    #[test]
    fn test_shipping_requires_all_three_fields() {
        let mut request = card_order();
        request.set_shipping(Shipping {
            recipient_name: Some("Pepper".to_owned()),
            shipping_type: Some("express".to_owned()),
            ..Default::default()
        });
        assert!(build(&request).get("shipping").is_none());

        request.set_shipping(Shipping {
            recipient_name: Some("Pepper".to_owned()),
            shipping_type: Some("express".to_owned()),
            address: Some(Address { city: Some("Malibu".to_owned()), ..Default::default() }),
            amount: Some(1500),
            max_delivery_date: Some("2030-01-10".to_owned()),
            ..Default::default()
        });
        let data = build(&request);
        let shipping = &data["shipping"];
        assert_eq!(shipping["amount"], 1500);
        assert_eq!(shipping["type"], "express");
        assert_eq!(shipping["address"]["city"], "Malibu");
        assert_eq!(shipping["max_delivery_date"], "2030-01-10");
        assert!(shipping.get("estimated_delivery_date").is_none());
    }

    #[test]
    fn test_shipping_validation_order() {
        let shipping = Shipping { shipping_type: Some("express".to_owned()), ..Default::default() };
        let Err(err) = shipping.to_transport_data() else {
            unreachable!("recipient is required");
        };
        assert_eq!(err.field(), Some("recipient_name"));
    }

    #[test]
    fn test_initialize_routes_shipping_and_order_fields() {
        let mut request = OrderRequest::authorize();
        let raw = json!({
            "amount": 10,
            "paymentMethod": "pix",
            "customerReference": "cus_1",
            "recipientName": "Pepper",
            "shippingType": "standard",
            "shippingAddress": {"line_1": "Rua B", "city": "Rio"},
            "shippingAmount": "700",
            "ip": "10.0.0.1",
            "closed": true,
        });
        let Value::Object(raw) = raw else { unreachable!() };
        assert!(request.initialize(raw).is_ok());

        let data = build(&request);
        assert_eq!(data["shipping"]["amount"], 700);
        assert_eq!(data["ip"], "10.0.0.1");
        assert_eq!(data["closed"], true);
        assert_eq!(data["payments"][0]["pix"], json!({}));
    }
}
