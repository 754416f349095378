//! Order and subscription line items.
//!
//! Prices are integers in minor currency units (centavos). An [`Item`] is sent
//! with its price under `amount`; inside subscriptions the price moves into a
//! [`PricingScheme`], and items coded [`ADDITION_CODE`] become flat
//! [`Increment`]s instead.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    error::{GatewayError, Result},
    params::{insert_some, lenient_i64, lenient_string},
};

/// Item code marking a subscription add-on billed as an increment.
pub const ADDITION_CODE: &str = "addition";

/// A line item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Description shown on the order.
    #[serde(default)]
    pub description: Option<String>,
    /// Quantity.
    #[serde(default, deserialize_with = "lenient_i64")]
    pub quantity: Option<i64>,
    /// Unit price in minor units. Raw mappings may call it `amount`.
    #[serde(default, alias = "amount", deserialize_with = "lenient_i64")]
    pub price: Option<i64>,
    /// Merchant item code.
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: Option<String>,
    /// Category.
    #[serde(default)]
    pub category: Option<String>,
}

impl Item {
    /// Creates an item with a name, quantity and unit price.
    #[must_use]
    pub fn new(name: impl Into<String>, quantity: i64, price: i64) -> Self {
        Self { name: Some(name.into()), quantity: Some(quantity), price: Some(price), ..Default::default() }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the merchant code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Returns `true` if this item is a subscription add-on.
    #[must_use]
    pub fn is_addition(&self) -> bool {
        self.code.as_deref() == Some(ADDITION_CODE)
    }

    /// Projects the item, renaming `price` to `amount`.
    #[must_use]
    pub fn to_transport_data(&self) -> Value {
        let mut data = self.base_fields();
        insert_some(&mut data, "amount", self.price);
        Value::Object(data)
    }

    fn base_fields(&self) -> Map<String, Value> {
        let mut data = Map::new();
        insert_some(&mut data, "name", self.name.clone());
        insert_some(&mut data, "description", self.description.clone());
        insert_some(&mut data, "quantity", self.quantity);
        insert_some(&mut data, "code", self.code.clone());
        insert_some(&mut data, "category", self.category.clone());
        data
    }
}

impl TryFrom<Value> for Item {
    type Error = GatewayError;

    fn try_from(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| GatewayError::invalid("items", e.to_string()))
    }
}

/// Ordered list of items.
///
/// An empty collection projects to an empty array.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemCollection {
    items: Vec<Item>,
}

impl ItemCollection {
    /// Creates an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Appends an item.
    pub fn push(&mut self, item: Item) -> &mut Self {
        self.items.push(item);
        self
    }

    /// Returns the number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the collection has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over the items in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    /// Splits into regular items and add-ons, preserving order.
    #[must_use]
    pub fn partition_additions(&self) -> (Vec<&Item>, Vec<&Item>) {
        self.items.iter().partition(|item| !item.is_addition())
    }

    /// Projects every item.
    #[must_use]
    pub fn to_transport_data(&self) -> Value {
        Value::Array(self.items.iter().map(Item::to_transport_data).collect())
    }
}

impl From<Vec<Item>> for ItemCollection {
    fn from(items: Vec<Item>) -> Self {
        Self { items }
    }
}

impl FromIterator<Item> for ItemCollection {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        Self { items: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a ItemCollection {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl TryFrom<Value> for ItemCollection {
    type Error = GatewayError;

    /// Accepts an array of raw item mappings.
    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Array(values) => values.into_iter().map(Item::try_from).collect(),
            Value::Null => Ok(Self::new()),
            other => Err(GatewayError::invalid("items", format!("expected an array, got {other}"))),
        }
    }
}

/// One tier of a volume or tier pricing scheme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBracket {
    /// First quantity covered by the bracket.
    pub start_quantity: i64,
    /// Last quantity covered, open-ended when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_quantity: Option<i64>,
    /// Unit price within the bracket.
    pub price: i64,
    /// Price for quantities past the last bracket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overage_price: Option<i64>,
}

/// Subscription item pricing.
///
/// The API spells the floor price `mininum_price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingScheme {
    /// `unit`, `package`, `volume` or `tier`.
    pub scheme_type: String,
    /// Unit price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    /// Minimum charged per cycle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mininum_price: Option<i64>,
    /// Tiers for bracketed schemes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub price_brackets: Vec<PriceBracket>,
}

impl PricingScheme {
    /// Flat per-unit pricing where the floor equals the unit price.
    #[must_use]
    pub fn unit(price: i64) -> Self {
        Self {
            scheme_type: "unit".to_owned(),
            price: Some(price),
            mininum_price: Some(price),
            price_brackets: Vec::new(),
        }
    }

    /// Projects the scheme.
    #[must_use]
    pub fn to_transport_data(&self) -> Value {
        let mut data = Map::new();
        data.insert("scheme_type".to_owned(), Value::String(self.scheme_type.clone()));
        insert_some(&mut data, "price", self.price);
        insert_some(&mut data, "mininum_price", self.mininum_price);
        if !self.price_brackets.is_empty() {
            let brackets = self.price_brackets.iter().map(bracket_value).collect();
            data.insert("price_brackets".to_owned(), Value::Array(brackets));
        }
        Value::Object(data)
    }
}

fn bracket_value(bracket: &PriceBracket) -> Value {
    let mut data = Map::new();
    data.insert("start_quantity".to_owned(), bracket.start_quantity.into());
    insert_some(&mut data, "end_quantity", bracket.end_quantity);
    data.insert("price".to_owned(), bracket.price.into());
    insert_some(&mut data, "overage_price", bracket.overage_price);
    Value::Object(data)
}

/// An item inside a subscription payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionItem {
    /// The underlying item. Its price is carried by `pricing_scheme`.
    pub item: Item,
    /// Item status, e.g. `active`.
    pub status: Option<String>,
    /// Pricing.
    pub pricing_scheme: PricingScheme,
}

impl SubscriptionItem {
    /// Rewrites an item so its price becomes a unit pricing scheme.
    #[must_use]
    pub fn from_item(item: &Item) -> Self {
        Self {
            item: item.clone(),
            status: None,
            pricing_scheme: PricingScheme::unit(item.price.unwrap_or_default()),
        }
    }

    /// Projects the item. No `amount` key is emitted.
    #[must_use]
    pub fn to_transport_data(&self) -> Value {
        let mut data = self.item.base_fields();
        insert_some(&mut data, "status", self.status.clone());
        data.insert("pricing_scheme".to_owned(), self.pricing_scheme.to_transport_data());
        Value::Object(data)
    }
}

/// A flat per-cycle surcharge on a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Increment {
    /// Amount in minor units.
    pub value: i64,
    /// `flat` or `percentage`.
    pub increment_type: String,
    /// Number of cycles the increment applies to.
    pub cycles: i64,
}

impl Increment {
    /// A flat increment applied once.
    #[must_use]
    pub fn flat(value: i64) -> Self {
        Self { value, increment_type: "flat".to_owned(), cycles: 1 }
    }

    /// Projects the increment.
    #[must_use]
    pub fn to_transport_data(&self) -> Value {
        let mut data = Map::new();
        data.insert("value".to_owned(), self.value.into());
        data.insert("increment_type".to_owned(), Value::String(self.increment_type.clone()));
        data.insert("cycles".to_owned(), self.cycles.into());
        Value::Object(data)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_item_renames_price_to_amount() {
        let item = Item::new("Tshirt", 2, 2990).with_description("Black tshirt").with_code("TS-1");
        let data = item.to_transport_data();
        assert_eq!(data["amount"], 2990);
        assert!(data.get("price").is_none());
        assert_eq!(data["quantity"], 2);
        assert_eq!(data["description"], "Black tshirt");
    }

    #[test]
    fn test_empty_collection_projects_to_empty_array() {
        assert_eq!(ItemCollection::new().to_transport_data(), json!([]));
    }

    #[test]
    fn test_collection_from_raw_values() {
        let items = ItemCollection::try_from(json!([
            {"name": "Plan", "quantity": "1", "price": "4990"},
            {"name": "Setup", "quantity": 1, "amount": 1000, "code": "addition"},
        ]))
        .expect("fixture is valid");

        assert_eq!(items.len(), 2);
        assert_eq!(items.iter().next().and_then(|item| item.price), Some(4990));
        let (regular, additions) = items.partition_additions();
        assert_eq!(regular.len(), 1);
        assert_eq!(additions.len(), 1);
    }

    #[test]
    fn test_non_integer_price_is_rejected() {
        for price in [json!("10.00"), json!("abc"), json!(29.9), json!(true)] {
            let Err(err) = Item::try_from(json!({"name": "Tshirt", "price": price.clone()})) else {
                panic!("price {price} must be rejected");
            };
            assert_eq!(err.field(), Some("items"));
        }
        assert!(Item::try_from(json!({"name": "Tshirt", "quantity": "2.5"})).is_err());
        assert!(ItemCollection::try_from(json!([{"name": "Plan", "price": "49.90"}])).is_err());
    }

    #[test]
    fn test_blank_price_reads_as_absent() {
        let item = Item::try_from(json!({"name": "Tshirt", "price": "", "quantity": null}))
            .expect("blank values are absent");
        assert_eq!(item.price, None);
        assert_eq!(item.quantity, None);
    }

    #[test]
    fn test_collection_rejects_non_array() {
        assert!(ItemCollection::try_from(json!({"name": "x"})).is_err());
        assert!(ItemCollection::try_from(Value::Null).is_ok_and(|items| items.is_empty()));
    }

    #[test]
    fn test_subscription_item_uses_pricing_scheme() {
        let item = Item::new("Plan", 1, 4990);
        let data = SubscriptionItem::from_item(&item).to_transport_data();
        assert!(data.get("amount").is_none());
        assert_eq!(
            data["pricing_scheme"],
            json!({"scheme_type": "unit", "price": 4990, "mininum_price": 4990})
        );
    }

    #[test]
    fn test_pricing_scheme_brackets() {
        let scheme = PricingScheme {
            scheme_type: "tier".to_owned(),
            price: None,
            mininum_price: None,
            price_brackets: vec![PriceBracket {
                start_quantity: 1,
                end_quantity: Some(10),
                price: 100,
                overage_price: None,
            }],
        };
        assert_eq!(
            scheme.to_transport_data(),
            json!({"scheme_type": "tier", "price_brackets": [{"start_quantity": 1, "end_quantity": 10, "price": 100}]})
        );
    }

    #[test]
    fn test_flat_increment() {
        assert_eq!(
            Increment::flat(1500).to_transport_data(),
            json!({"value": 1500, "increment_type": "flat", "cycles": 1})
        );
    }
}
