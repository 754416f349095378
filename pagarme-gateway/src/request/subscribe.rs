//! Subscription requests (`POST subscriptions`).

use std::{fmt, str::FromStr};

use serde_json::{Map, Value};
use tracing::debug;

use super::{
    Endpoint, GatewayRequest, Operation, RequestContext, RequestFields, RequestParameters,
    common::CURRENCY,
};
use crate::{
    error::{GatewayError, Result},
    item::{Increment, SubscriptionItem},
    params::insert_some,
    payment::{CardSource, PaymentMethod, as_string},
};

/// Billing cycle unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Interval {
    /// Daily.
    Day,
    /// Weekly.
    Week,
    /// Monthly.
    #[default]
    Month,
    /// Yearly.
    Year,
}

impl Interval {
    /// Returns the wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl FromStr for Interval {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            other => Err(GatewayError::invalid(
                "interval",
                format!("'{other}' is not one of day, week, month, year"),
            )),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When each cycle is billed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BillingType {
    /// At the start of the cycle.
    #[default]
    Prepaid,
    /// At the end of the cycle.
    Postpaid,
    /// On a fixed day of the month, see `billing_day`.
    ExactDay,
}

impl BillingType {
    /// Returns the wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Prepaid => "prepaid",
            Self::Postpaid => "postpaid",
            Self::ExactDay => "exact_day",
        }
    }
}

impl FromStr for BillingType {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "prepaid" => Ok(Self::Prepaid),
            "postpaid" => Ok(Self::Postpaid),
            "exact_day" => Ok(Self::ExactDay),
            other => Err(GatewayError::invalid(
                "billing_type",
                format!("'{other}' is not one of prepaid, postpaid, exact_day"),
            )),
        }
    }
}

impl fmt::Display for BillingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Creates a recurring subscription.
///
/// Items whose code is `addition` are sent as flat one-cycle increments; the
/// rest become unit-priced subscription items.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscribeRequest {
    fields: RequestParameters,
    interval: Interval,
    billing_type: BillingType,
}

impl SubscribeRequest {
    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the billing interval, `month` when unset.
    #[must_use]
    pub const fn interval(&self) -> Interval {
        self.interval
    }

    /// Sets the billing interval.
    pub fn set_interval(&mut self, interval: Interval) -> &mut Self {
        self.interval = interval;
        self
    }

    /// Returns the billing type, `prepaid` when unset.
    #[must_use]
    pub const fn billing_type(&self) -> BillingType {
        self.billing_type
    }

    /// Sets the billing type.
    pub fn set_billing_type(&mut self, billing_type: BillingType) -> &mut Self {
        self.billing_type = billing_type;
        self
    }

    /// Returns the number of intervals per cycle, 1 when unset.
    #[must_use]
    pub fn interval_count(&self) -> i64 {
        self.fields.params().get_i64("interval_count").unwrap_or(1)
    }

    /// Sets the number of intervals per cycle.
    pub fn set_interval_count(&mut self, count: i64) -> &mut Self {
        self.fields.params_mut().set("interval_count", count);
        self
    }

    /// Sets the day of month billed under [`BillingType::ExactDay`].
    pub fn set_billing_day(&mut self, day: i64) -> &mut Self {
        self.fields.params_mut().set("billing_day", day);
        self
    }

    /// Sets the first billing date.
    pub fn set_start_at(&mut self, start_at: impl Into<String>) -> &mut Self {
        self.fields.params_mut().set("start_at", start_at.into());
        self
    }

    /// Sets the days until a boleto expires.
    pub fn set_boleto_due_days(&mut self, days: i64) -> &mut Self {
        self.fields.params_mut().set("boleto_due_days", days);
        self
    }

    /// Sets the minimum cycle price in minor units.
    pub fn set_minimum_price(&mut self, price: i64) -> &mut Self {
        self.fields.params_mut().set("minimum_price", price);
        self
    }

    /// Sets the acquirer affiliation id.
    pub fn set_gateway_affiliation_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.fields.params_mut().set("gateway_affiliation_id", id.into());
        self
    }

    fn insert_card(&self, data: &mut Map<String, Value>) -> Result<()> {
        let card_fields = &self.fields.payment().card;
        match card_fields.card_source(self.fields.card()) {
            Some(CardSource::CardId(id)) => {
                data.insert("card_id".to_owned(), id.into());
            }
            Some(CardSource::CardToken(token)) => {
                data.insert("card_token".to_owned(), token.into());
            }
            Some(CardSource::Card(card)) => {
                card.validate()?;
                let mut card_data = card.to_transport_data();
                let customer_name = data
                    .get("customer")
                    .and_then(|customer| customer.get("name"))
                    .filter(|name| !name.is_null())
                    .cloned();
                if let (Value::Object(card_map), Some(name)) = (&mut card_data, customer_name)
                    && card_map.get("holder_name").and_then(Value::as_str).is_none_or(str::is_empty)
                {
                    debug!("defaulting card holder name to customer name");
                    card_map.insert("holder_name".to_owned(), name);
                }
                data.insert("card".to_owned(), card_data);
            }
            None => return Err(GatewayError::MissingParameter("card".to_owned())),
        }
        Ok(())
    }

    fn insert_items(&self, data: &mut Map<String, Value>) {
        let Some(items) = self.fields.items().filter(|items| !items.is_empty()) else {
            return;
        };
        let (regular, additions) = items.partition_additions();
        debug!(items = regular.len(), increments = additions.len(), "partitioned subscription items");

        if !regular.is_empty() {
            let projected = regular
                .into_iter()
                .map(|item| SubscriptionItem::from_item(item).to_transport_data())
                .collect();
            data.insert("items".to_owned(), Value::Array(projected));
        }
        if !additions.is_empty() {
            let increments = additions
                .into_iter()
                .map(|item| Increment::flat(item.price.unwrap_or_default()).to_transport_data())
                .collect();
            data.insert("increments".to_owned(), Value::Array(increments));
        }
    }
}

impl RequestFields for SubscribeRequest {
    fn fields(&self) -> &RequestParameters {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut RequestParameters {
        &mut self.fields
    }

    fn apply_field(&mut self, key: &str, value: Value) -> Result<()> {
        match key {
            "interval" => {
                let raw = as_string(&value).unwrap_or_default();
                self.interval = raw.parse()?;
            }
            "billing_type" => {
                let raw = as_string(&value).unwrap_or_default();
                self.billing_type = raw.parse()?;
            }
            _ => self.fields.apply(key, value)?,
        }
        Ok(())
    }
}

impl GatewayRequest for SubscribeRequest {
    fn operation(&self) -> Operation {
        Operation::Subscribe
    }

    fn endpoint(&self) -> Result<Endpoint> {
        Ok(Endpoint::post("subscriptions"))
    }

    fn data(&self, _ctx: &RequestContext<'_>) -> Result<Option<Value>> {
        let method = self.fields.require_payment_method()?;
        let params = self.fields.params();
        let card = &self.fields.payment().card;

        let billing_day = params.try_i64("billing_day")?;
        let interval_count = params.try_i64("interval_count")?.unwrap_or(1);
        if self.billing_type == BillingType::ExactDay && billing_day.is_none() {
            return Err(GatewayError::MissingParameter("billing_day".to_owned()));
        }

        let mut data = Map::new();
        insert_some(&mut data, "code", self.fields.string("code"));
        data.insert("payment_method".to_owned(), method.as_str().into());
        data.insert("currency".to_owned(), CURRENCY.into());
        insert_some(&mut data, "start_at", self.fields.string("start_at"));
        data.insert("interval".to_owned(), self.interval.as_str().into());
        data.insert("interval_count".to_owned(), interval_count.into());
        data.insert("billing_type".to_owned(), self.billing_type.as_str().into());
        insert_some(&mut data, "billing_day", billing_day);
        data.insert("installments".to_owned(), card.installments().into());
        insert_some(&mut data, "statement_descriptor", card.statement_descriptor.clone());
        insert_some(&mut data, "boleto_due_days", params.try_i64("boleto_due_days")?);
        insert_some(&mut data, "minimum_price", params.try_i64("minimum_price")?);
        insert_some(&mut data, "gateway_affiliation_id", self.fields.string("gateway_affiliation_id"));
        insert_some(&mut data, "metadata", self.fields.metadata().cloned());

        self.fields.insert_customer(&mut data);

        if method == PaymentMethod::CreditCard {
            self.insert_card(&mut data)?;
        }

        self.insert_items(&mut data);

        Ok(Some(Value::Object(data)))
    }
}
