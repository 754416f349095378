//! Customer value objects.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    address::Address,
    card::CreditCard,
    error::{GatewayError, Result},
    params::insert_some,
    phone::Phone,
};

/// Identity document kinds accepted by the customer endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DocumentType {
    /// Brazilian individual taxpayer id.
    Cpf,
    /// Brazilian company taxpayer id.
    Cnpj,
    /// Passport number.
    Passport,
}

impl DocumentType {
    /// Returns the upper-case wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cpf => "CPF",
            Self::Cnpj => "CNPJ",
            Self::Passport => "PASSPORT",
        }
    }
}

impl FromStr for DocumentType {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "CPF" => Ok(Self::Cpf),
            "CNPJ" => Ok(Self::Cnpj),
            "PASSPORT" => Ok(Self::Passport),
            other => Err(GatewayError::invalid(
                "document_type",
                format!("'{other}' is not one of PASSPORT, CPF, CNPJ"),
            )),
        }
    }
}

impl TryFrom<String> for DocumentType {
    type Error = GatewayError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<DocumentType> for String {
    fn from(value: DocumentType) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two phone slots a customer carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phones {
    /// Landline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_phone: Option<Phone>,
    /// Mobile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_phone: Option<Phone>,
}

impl Phones {
    /// Returns `true` when neither slot is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.home_phone.is_none() && self.mobile_phone.is_none()
    }

    /// Projects the phones into the wire `phones` object.
    #[must_use]
    pub fn to_transport_data(&self) -> Value {
        let mut data = Map::new();
        insert_some(&mut data, "home_phone", self.home_phone.as_ref().map(phone_value));
        insert_some(&mut data, "mobile_phone", self.mobile_phone.as_ref().map(phone_value));
        Value::Object(data)
    }
}

fn phone_value(phone: &Phone) -> Value {
    let mut data = Map::new();
    insert_some(&mut data, "country_code", phone.country_code.clone());
    data.insert("area_code".to_owned(), Value::String(phone.area_code.clone()));
    data.insert("number".to_owned(), Value::String(phone.number.clone()));
    Value::Object(data)
}

/// Customer embedded in orders and subscriptions, or sent to the customer
/// endpoint.
///
/// Keys the type does not model are kept in `extra` and passed through.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Customer {
    /// Full name.
    #[serde(default)]
    pub name: Option<String>,
    /// E-mail.
    #[serde(default)]
    pub email: Option<String>,
    /// Document number.
    #[serde(default)]
    pub document: Option<String>,
    /// Document kind.
    #[serde(default)]
    pub document_type: Option<DocumentType>,
    /// `individual` or `company`.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Merchant-side customer code.
    #[serde(default)]
    pub code: Option<String>,
    /// Gender.
    #[serde(default)]
    pub gender: Option<String>,
    /// Birth date as sent by the caller.
    #[serde(default)]
    pub birthdate: Option<String>,
    /// Main address.
    #[serde(default)]
    pub address: Option<Address>,
    /// Phones.
    #[serde(default)]
    pub phones: Option<Phones>,
    /// Free-form metadata.
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
    /// Keys passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Customer {
    /// Derives a customer from a card holder.
    ///
    /// The billing phone becomes the home phone only when an area code can be
    /// extracted from it.
    #[must_use]
    pub fn from_card(card: &CreditCard) -> Self {
        let address = Address::from_card(card);
        let home_phone = card
            .billing_phone
            .as_deref()
            .map(Phone::parse)
            .filter(Phone::has_area_code);

        Self {
            name: card.full_name(),
            email: card.email.clone(),
            gender: card.gender.clone(),
            birthdate: card.birthday_mdy(),
            document: card.holder_document.clone(),
            address: (!address.is_empty()).then_some(address),
            phones: home_phone.map(|phone| Phones { home_phone: Some(phone), mobile_phone: None }),
            ..Default::default()
        }
    }

    /// Projects the customer into its wire shape, omitting unset fields.
    #[must_use]
    pub fn to_transport_data(&self) -> Value {
        let mut data = self.extra.clone();
        insert_some(&mut data, "name", self.name.clone());
        insert_some(&mut data, "email", self.email.clone());
        insert_some(&mut data, "document", self.document.clone());
        insert_some(&mut data, "document_type", self.document_type.map(DocumentType::as_str));
        insert_some(&mut data, "type", self.kind.clone());
        insert_some(&mut data, "code", self.code.clone());
        insert_some(&mut data, "gender", self.gender.clone());
        insert_some(&mut data, "birthdate", self.birthdate.clone());
        insert_some(&mut data, "address", self.address.as_ref().map(Address::to_transport_data));
        insert_some(
            &mut data,
            "phones",
            self.phones.as_ref().filter(|p| !p.is_empty()).map(Phones::to_transport_data),
        );
        insert_some(&mut data, "metadata", self.metadata.clone());
        Value::Object(data)
    }
}

impl TryFrom<Value> for Customer {
    type Error = GatewayError;

    fn try_from(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| GatewayError::invalid("customer", e.to_string()))
    }
}
