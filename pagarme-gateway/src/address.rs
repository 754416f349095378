//! Postal address value object.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    card::CreditCard,
    error::{GatewayError, Result},
    params::insert_some,
};

/// Fields checked by [`Address::validate`], in order.
const REQUIRED_FIELDS: [&str; 5] = ["line_1", "zip_code", "city", "state", "country"];

/// Customer or billing address.
///
/// Raw mappings may use either the wire names (`line_1`, `zip_code`) or the
/// short forms (`line1`, `zipCode`).
///
/// # Examples
///
/// ```
/// use pagarme_gateway::address::Address;
/// use serde_json::json;
///
/// let address = Address::try_from(json!({
///     "line1": "375, Av. General Justo, 7 andar",
///     "zipCode": "20021130",
///     "city": "Rio de Janeiro",
///     "state": "RJ",
///     "country": "BR",
/// }))
/// .unwrap();
///
/// assert!(address.validate().is_ok());
/// assert_eq!(address.to_transport_data()["zip_code"], "20021130");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// Street, number and complement in the API's single-line format.
    #[serde(default, alias = "line1", skip_serializing_if = "Option::is_none")]
    pub line_1: Option<String>,
    /// Secondary line.
    #[serde(default, alias = "line2", skip_serializing_if = "Option::is_none")]
    pub line_2: Option<String>,
    /// Postal code (CEP).
    #[serde(default, alias = "zipCode", alias = "postcode", skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    /// City.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// State code, e.g. `RJ`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// ISO 3166-1 alpha-2 country code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Neighborhood (bairro).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    /// Street name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    /// Free-form metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl Address {
    /// Projects a card's billing fields into an address. Never validates.
    #[must_use]
    pub fn from_card(card: &CreditCard) -> Self {
        Self {
            line_1: card.billing_address1.clone(),
            line_2: card.billing_address2.clone(),
            zip_code: card.billing_postcode.clone(),
            city: card.billing_city.clone(),
            state: card.billing_state.clone(),
            country: card.billing_country.clone(),
            neighborhood: None,
            street: card.billing_address1.clone(),
            metadata: None,
        }
    }

    /// Checks that every required field is present and non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidAddress`] naming the first missing field
    /// in the order `line_1`, `zip_code`, `city`, `state`, `country`.
    pub fn validate(&self) -> Result<()> {
        let values = [&self.line_1, &self.zip_code, &self.city, &self.state, &self.country];
        for (field, value) in REQUIRED_FIELDS.iter().zip(values) {
            if value.as_deref().is_none_or(str::is_empty) {
                return Err(GatewayError::InvalidAddress((*field).to_owned()));
            }
        }
        Ok(())
    }

    /// Returns `true` when no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Projects the address into its wire shape, omitting unset fields.
    #[must_use]
    pub fn to_transport_data(&self) -> Value {
        let mut data = Map::new();
        insert_some(&mut data, "line_1", self.line_1.clone());
        insert_some(&mut data, "line_2", self.line_2.clone());
        insert_some(&mut data, "zip_code", self.zip_code.clone());
        insert_some(&mut data, "city", self.city.clone());
        insert_some(&mut data, "state", self.state.clone());
        insert_some(&mut data, "country", self.country.clone());
        insert_some(&mut data, "neighborhood", self.neighborhood.clone());
        insert_some(&mut data, "street", self.street.clone());
        insert_some(&mut data, "metadata", self.metadata.clone());
        Value::Object(data)
    }
}

impl TryFrom<Value> for Address {
    type Error = GatewayError;

    fn try_from(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| GatewayError::invalid("address", e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn complete() -> Address {
        Address {
            line_1: Some("375, Av. General Justo".to_owned()),
            zip_code: Some("20021130".to_owned()),
            city: Some("Rio de Janeiro".to_owned()),
            state: Some("RJ".to_owned()),
            country: Some("BR".to_owned()),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_complete_address() {
        assert!(complete().validate().is_ok());
    }

    #[test]
    fn test_validate_reports_fields_in_order() {
        let Err(err) = Address::default().validate() else {
            panic!("empty address should not validate");
        };
        assert_eq!(err.field(), Some("line_1"));

        let address = Address { city: None, state: None, ..complete() };
        let Err(err) = address.validate() else {
            panic!("address without city should not validate");
        };
        assert_eq!(err.field(), Some("city"));
    }

    #[test]
    fn test_validate_treats_empty_string_as_missing() {
        let address = Address { country: Some(String::new()), ..complete() };
        let Err(GatewayError::InvalidAddress(field)) = address.validate() else {
            panic!("blank country should not validate");
        };
        assert_eq!(field, "country");
    }

    #[test]
    fn test_from_card_maps_billing_fields() {
        let card = CreditCard {
            billing_address1: Some("Rua A, 10".to_owned()),
            billing_address2: Some("Apto 2".to_owned()),
            billing_postcode: Some("01310100".to_owned()),
            billing_city: Some("Sao Paulo".to_owned()),
            billing_state: Some("SP".to_owned()),
            billing_country: Some("BR".to_owned()),
            ..Default::default()
        };

        let address = Address::from_card(&card);
        assert_eq!(address.line_1.as_deref(), Some("Rua A, 10"));
        assert_eq!(address.street.as_deref(), Some("Rua A, 10"));
        assert_eq!(address.line_2.as_deref(), Some("Apto 2"));
        assert_eq!(address.zip_code.as_deref(), Some("01310100"));
        assert!(address.validate().is_ok());
    }

    #[test]
    fn test_from_card_never_validates() {
        let address = Address::from_card(&CreditCard::default());
        assert!(address.is_empty());
        assert_eq!(address.to_transport_data(), json!({}));
    }

    #[test]
    fn test_try_from_rejects_wrong_types() {
        let result = Address::try_from(json!({"line_1": ["not", "a", "string"]}));
        assert!(matches!(result, Err(GatewayError::InvalidParameter { .. })));
    }
}
