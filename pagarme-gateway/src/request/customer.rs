//! Customer, address and card wallet requests.

use serde_json::{Map, Value};

use super::{
    Endpoint, GatewayRequest, HttpMethod, Operation, RequestContext, RequestFields,
    RequestParameters,
};
use crate::{
    customer::DocumentType,
    error::{GatewayError, Result},
    params::insert_some,
    payment::as_string,
};

/// Scalar customer fields copied from the parameter store, in payload order.
const CUSTOMER_FIELDS: [&str; 8] =
    ["name", "email", "document", "document_type", "type", "code", "gender", "birthdate"];

/// Fields required by the customer endpoint, checked in this order.
const REQUIRED_CUSTOMER_FIELDS: [&str; 4] = ["document", "name", "email", "document_type"];

fn customer_path(fields: &RequestParameters, template: &str) -> Result<Endpoint> {
    let customer_id = fields.string("customer_reference").unwrap_or_default();
    Endpoint::resource(HttpMethod::Post, template, &[("customer_reference", &customer_id)])
}

/// Creates a customer (`POST customers`).
///
/// Values set directly on the request override the raw `customer` mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateCustomerRequest {
    fields: RequestParameters,
}

impl CreateCustomerRequest {
    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the customer name.
    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.fields.params_mut().set("name", name.into());
        self
    }

    /// Sets the e-mail.
    pub fn set_email(&mut self, email: impl Into<String>) -> &mut Self {
        self.fields.params_mut().set("email", email.into());
        self
    }

    /// Sets the document number.
    pub fn set_document(&mut self, document: impl Into<String>) -> &mut Self {
        self.fields.params_mut().set("document", document.into());
        self
    }

    /// Sets the document type.
    pub fn set_document_type(&mut self, document_type: DocumentType) -> &mut Self {
        self.fields.params_mut().set("document_type", document_type.as_str());
        self
    }

    /// Sets the customer type, `individual` or `company`.
    pub fn set_kind(&mut self, kind: impl Into<String>) -> &mut Self {
        self.fields.params_mut().set("type", kind.into());
        self
    }

    /// Sets the gender.
    pub fn set_gender(&mut self, gender: impl Into<String>) -> &mut Self {
        self.fields.params_mut().set("gender", gender.into());
        self
    }

    /// Sets the birth date.
    pub fn set_birthdate(&mut self, birthdate: impl Into<String>) -> &mut Self {
        self.fields.params_mut().set("birthdate", birthdate.into());
        self
    }
}

impl RequestFields for CreateCustomerRequest {
    fn fields(&self) -> &RequestParameters {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut RequestParameters {
        &mut self.fields
    }

    fn apply_field(&mut self, key: &str, value: Value) -> Result<()> {
        match key {
            "document_type" => {
                let document_type: DocumentType = as_string(&value).unwrap_or_default().parse()?;
                self.set_document_type(document_type);
            }
            "type" => {
                self.fields.params_mut().set("type", value);
            }
            _ => self.fields.apply(key, value)?,
        }
        Ok(())
    }
}

impl GatewayRequest for CreateCustomerRequest {
    fn operation(&self) -> Operation {
        Operation::CreateCustomer
    }

    fn endpoint(&self) -> Result<Endpoint> {
        Ok(Endpoint::post("customers"))
    }

    fn data(&self, _ctx: &RequestContext<'_>) -> Result<Option<Value>> {
        let mut data = match self.fields.customer().map(|c| c.to_transport_data()) {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        for key in CUSTOMER_FIELDS {
            insert_some(&mut data, key, self.fields.string(key));
        }
        insert_some(&mut data, "metadata", self.fields.metadata().cloned());

        if let Some(address) = self.fields.address() {
            address.validate()?;
            data.insert("address".to_owned(), address.to_transport_data());
        }
        let phones = self.fields.phones();
        if !phones.is_empty() {
            data.insert("phones".to_owned(), phones.to_transport_data());
        }

        for key in REQUIRED_CUSTOMER_FIELDS {
            let present = data.get(key).and_then(Value::as_str).is_some_and(|v| !v.is_empty());
            if !present {
                return Err(GatewayError::MissingParameter(key.to_owned()));
            }
        }

        Ok(Some(Value::Object(data)))
    }
}

/// Saves an address on a customer (`POST customers/{id}/addresses`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateAddressRequest {
    fields: RequestParameters,
}

impl CreateAddressRequest {
    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RequestFields for CreateAddressRequest {
    fn fields(&self) -> &RequestParameters {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut RequestParameters {
        &mut self.fields
    }
}

impl GatewayRequest for CreateAddressRequest {
    fn operation(&self) -> Operation {
        Operation::CreateAddress
    }

    fn endpoint(&self) -> Result<Endpoint> {
        customer_path(&self.fields, "customers/{customer_reference}/addresses")
    }

    fn data(&self, _ctx: &RequestContext<'_>) -> Result<Option<Value>> {
        self.fields.require_string("customer_reference")?;
        let address =
            self.fields.address().ok_or_else(|| GatewayError::MissingParameter("address".to_owned()))?;
        address.validate()?;
        Ok(Some(address.to_transport_data()))
    }
}

/// Lists a customer's saved cards (`GET customers/{id}/cards`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListCustomerCardsRequest {
    fields: RequestParameters,
}

impl ListCustomerCardsRequest {
    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RequestFields for ListCustomerCardsRequest {
    fn fields(&self) -> &RequestParameters {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut RequestParameters {
        &mut self.fields
    }

    fn apply_field(&mut self, key: &str, value: Value) -> Result<()> {
        let key = if key == "customer_id" { "customer_reference" } else { key };
        self.fields.apply(key, value)
    }
}

impl GatewayRequest for ListCustomerCardsRequest {
    fn operation(&self) -> Operation {
        Operation::ListCustomerCards
    }

    fn endpoint(&self) -> Result<Endpoint> {
        let customer_id = self.fields.string("customer_reference").unwrap_or_default();
        Endpoint::resource(
            HttpMethod::Get,
            "customers/{customer_reference}/cards",
            &[("customer_reference", &customer_id)],
        )
    }

    fn data(&self, _ctx: &RequestContext<'_>) -> Result<Option<Value>> {
        self.fields.require_string("customer_reference")?;
        Ok(None)
    }
}

/// Fetches one saved card (`GET customers/{id}/cards/{card_id}`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchCustomerCardRequest {
    fields: RequestParameters,
}

impl FetchCustomerCardRequest {
    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RequestFields for FetchCustomerCardRequest {
    fn fields(&self) -> &RequestParameters {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut RequestParameters {
        &mut self.fields
    }

    fn apply_field(&mut self, key: &str, value: Value) -> Result<()> {
        let key = match key {
            "customer_id" => "customer_reference",
            "card_id" => "card_reference",
            other => other,
        };
        self.fields.apply(key, value)
    }
}

impl GatewayRequest for FetchCustomerCardRequest {
    fn operation(&self) -> Operation {
        Operation::FetchCustomerCard
    }

    fn endpoint(&self) -> Result<Endpoint> {
        let customer_id = self.fields.string("customer_reference").unwrap_or_default();
        let card_id = self.fields.string("card_reference").unwrap_or_default();
        Endpoint::resource(
            HttpMethod::Get,
            "customers/{customer_reference}/cards/{card_reference}",
            &[("customer_reference", &customer_id), ("card_reference", &card_id)],
        )
    }

    fn data(&self, _ctx: &RequestContext<'_>) -> Result<Option<Value>> {
        self.fields.require_string("customer_reference")?;
        self.fields.require_string("card_reference")?;
        Ok(None)
    }
}

/// Saves a card on a customer (`POST customers/{id}/cards`).
///
/// Sends the raw card when one is set, otherwise the card token.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateCardRequest {
    fields: RequestParameters,
}

impl CreateCardRequest {
    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RequestFields for CreateCardRequest {
    fn fields(&self) -> &RequestParameters {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut RequestParameters {
        &mut self.fields
    }

    fn apply_field(&mut self, key: &str, value: Value) -> Result<()> {
        let key = if key == "card_hash" { "card_token" } else { key };
        self.fields.apply(key, value)
    }
}

impl GatewayRequest for CreateCardRequest {
    fn operation(&self) -> Operation {
        Operation::CreateCard
    }

    fn endpoint(&self) -> Result<Endpoint> {
        customer_path(&self.fields, "customers/{customer_reference}/cards")
    }

    fn data(&self, _ctx: &RequestContext<'_>) -> Result<Option<Value>> {
        self.fields.require_string("customer_reference")?;

        if let Some(card) = self.fields.card() {
            card.validate()?;
            let Value::Object(mut data) = card.to_transport_data() else {
                return Err(GatewayError::invalid("card", "card projection is not an object"));
            };
            if let Some(id) = card.billing_address_id.as_deref().filter(|id| !id.is_empty()) {
                data.remove("billing_address");
                data.insert("billing_address_id".to_owned(), id.into());
            } else if card.billing_address1.as_deref().is_none_or(str::is_empty) {
                data.remove("billing_address");
            }
            insert_some(&mut data, "holder_document", card.holder_document.clone());
            insert_some(&mut data, "label", card.label.clone());
            return Ok(Some(Value::Object(data)));
        }

        let token = self.fields.payment().card.card_token.clone().filter(|token| !token.is_empty());
        let token = token.ok_or_else(|| GatewayError::MissingParameter("card".to_owned()))?;
        let mut data = Map::new();
        data.insert("token".to_owned(), token.into());
        Ok(Some(Value::Object(data)))
    }
}
