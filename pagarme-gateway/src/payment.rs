//! Payment-method strategies.
//!
//! Each payment method owns a capability struct holding only the fields that
//! method reads ([`CardPaymentFields`], [`BoletoPaymentFields`],
//! [`PixPaymentFields`], [`BankTransferFields`], [`CashPaymentFields`]). Requests compose all of them
//! by value in [`PaymentFields`] and dispatch on [`PaymentMethod`] to build the
//! method-specific sub-payload:
//!
//! ```json
//! {"payment_method": "pix", "pix": {"expires_in": 3600}}
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    card::CreditCard,
    error::{GatewayError, Result},
    params::{insert_some, is_filled},
};

/// Supported payment methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Credit card, by raw card, saved card id or card token.
    CreditCard,
    /// Boleto bancário.
    Boleto,
    /// Pix instant payment.
    Pix,
    /// Bank transfer.
    BankTransfer,
    /// Cash received by the merchant and recorded on the order.
    Cash,
}

impl PaymentMethod {
    /// Returns the wire name, also used as the sub-payload key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreditCard => "credit_card",
            Self::Boleto => "boleto",
            Self::Pix => "pix",
            Self::BankTransfer => "bank_transfer",
            Self::Cash => "cash",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = GatewayError;

    /// Parses a method name case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "credit_card" => Ok(Self::CreditCard),
            "boleto" => Ok(Self::Boleto),
            "pix" => Ok(Self::Pix),
            "bank_transfer" => Ok(Self::BankTransfer),
            "cash" => Ok(Self::Cash),
            other => Err(GatewayError::invalid(
                "payment_method",
                format!("'{other}' is not one of credit_card, boleto, pix, bank_transfer, cash"),
            )),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds the sub-payload of one payment method.
pub trait PaymentMethodPayload {
    /// The method this strategy serves.
    fn method(&self) -> PaymentMethod;

    /// Builds the method object placed under the method's key.
    ///
    /// # Errors
    ///
    /// Returns error if a field the method requires is missing or invalid.
    fn to_transport_data(&self, card: Option<&CreditCard>) -> Result<Value>;
}

/// How a card payment identifies the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardSource<'a> {
    /// A card saved on the customer.
    CardId(&'a str),
    /// A token produced by the checkout tokenizer.
    CardToken(&'a str),
    /// Raw card data, validated before use.
    Card(&'a CreditCard),
}

/// Fields read by the credit card strategy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardPaymentFields {
    /// Number of installments, 1 when unset.
    pub installments: Option<i64>,
    /// Text printed on the holder's statement.
    pub statement_descriptor: Option<String>,
    /// `auth_only`, `auth_and_capture` or `pre_auth`.
    pub operation_type: Option<String>,
    /// Saved card id.
    pub card_id: Option<String>,
    /// Tokenized card.
    pub card_token: Option<String>,
    /// Marks a recurring charge.
    pub recurrence: Option<bool>,
    /// Merchant category code override.
    pub merchant_category_code: Option<i64>,
    /// 3-D Secure authentication object.
    pub authentication: Option<Value>,
    /// Retry declined charges automatically.
    pub auto_recovery: Option<bool>,
    /// Wallet payload (Google Pay, Apple Pay).
    pub payload: Option<Value>,
}

impl CardPaymentFields {
    /// Default operation type.
    pub const DEFAULT_OPERATION_TYPE: &'static str = "auth_only";

    /// Returns the installment count, 1 when unset.
    #[must_use]
    pub fn installments(&self) -> i64 {
        self.installments.unwrap_or(1)
    }

    /// Picks the card source: saved id first, then token, then raw card.
    #[must_use]
    pub fn card_source<'a>(&'a self, card: Option<&'a CreditCard>) -> Option<CardSource<'a>> {
        if let Some(id) = self.card_id.as_deref().filter(|id| !id.is_empty()) {
            return Some(CardSource::CardId(id));
        }
        if let Some(token) = self.card_token.as_deref().filter(|token| !token.is_empty()) {
            return Some(CardSource::CardToken(token));
        }
        card.map(CardSource::Card)
    }

    /// Writes the optional card extras into `data`.
    pub(crate) fn insert_extras(&self, data: &mut Map<String, Value>) {
        insert_some(data, "recurrence", self.recurrence);
        insert_some(data, "merchant_category_code", self.merchant_category_code);
        insert_some(data, "authentication", self.authentication.clone());
        insert_some(data, "auto_recovery", self.auto_recovery);
        insert_some(data, "payload", self.payload.clone());
    }
}

impl PaymentMethodPayload for CardPaymentFields {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::CreditCard
    }

    fn to_transport_data(&self, card: Option<&CreditCard>) -> Result<Value> {
        let mut data = Map::new();
        data.insert("installments".to_owned(), self.installments().into());
        insert_some(&mut data, "statement_descriptor", self.statement_descriptor.clone());
        let operation_type =
            self.operation_type.as_deref().unwrap_or(Self::DEFAULT_OPERATION_TYPE);
        data.insert("operation_type".to_owned(), operation_type.into());

        match self.card_source(card) {
            Some(CardSource::CardId(id)) => {
                data.insert("card_id".to_owned(), id.into());
            }
            Some(CardSource::CardToken(token)) => {
                data.insert("card_token".to_owned(), token.into());
            }
            Some(CardSource::Card(card)) => {
                card.validate()?;
                data.insert("card".to_owned(), card.to_transport_data());
            }
            None => return Err(GatewayError::MissingParameter("card".to_owned())),
        }

        self.insert_extras(&mut data);
        Ok(Value::Object(data))
    }
}

/// Fields read by the boleto strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoletoPaymentFields {
    /// Issuing bank code, sent as `bank`.
    pub issuer: Option<String>,
    /// Instructions printed on the boleto.
    pub instructions: Option<String>,
    /// Due date.
    pub due_at: Option<String>,
    /// Bank-side identifier.
    pub nosso_numero: Option<String>,
    /// Boleto type, e.g. `DM` or `BDP`.
    pub kind: Option<String>,
    /// Merchant document number.
    pub document_number: Option<String>,
}

impl PaymentMethodPayload for BoletoPaymentFields {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Boleto
    }

    fn to_transport_data(&self, _card: Option<&CreditCard>) -> Result<Value> {
        let mut data = Map::new();
        insert_some(&mut data, "bank", self.issuer.clone());
        insert_some(&mut data, "instructions", self.instructions.clone());
        insert_some(&mut data, "due_at", self.due_at.clone());
        insert_some(&mut data, "nosso_numero", self.nosso_numero.clone());
        insert_some(&mut data, "type", self.kind.clone());
        insert_some(&mut data, "document_number", self.document_number.clone());
        Ok(Value::Object(data))
    }
}

/// Extra key/value shown to the payer in the Pix app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixAdditionalInformation {
    /// Label.
    pub name: String,
    /// Value.
    pub value: String,
}

/// Fields read by the Pix strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixPaymentFields {
    /// QR code lifetime in seconds. Wins over `expires_at`.
    pub expires_in: Option<i64>,
    /// QR code expiry timestamp.
    pub expires_at: Option<String>,
    /// Extra payer-facing information.
    pub additional_information: Vec<PixAdditionalInformation>,
}

impl PaymentMethodPayload for PixPaymentFields {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Pix
    }

    fn to_transport_data(&self, _card: Option<&CreditCard>) -> Result<Value> {
        let mut data = Map::new();
        if let Some(expires_in) = self.expires_in.filter(|seconds| *seconds != 0) {
            data.insert("expires_in".to_owned(), expires_in.into());
        } else if let Some(expires_at) = self.expires_at.as_deref().filter(|at| !at.is_empty()) {
            data.insert("expires_at".to_owned(), expires_at.into());
        }
        if !self.additional_information.is_empty() {
            let info = self
                .additional_information
                .iter()
                .map(|entry| serde_json::json!({"name": entry.name, "value": entry.value}))
                .collect();
            data.insert("additional_information".to_owned(), Value::Array(info));
        }
        Ok(Value::Object(data))
    }
}

/// Fields read by the bank transfer strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BankTransferFields {
    /// Bank code, sent as `bank`.
    pub issuer: Option<String>,
}

impl PaymentMethodPayload for BankTransferFields {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::BankTransfer
    }

    fn to_transport_data(&self, _card: Option<&CreditCard>) -> Result<Value> {
        let mut data = Map::new();
        insert_some(&mut data, "bank", self.issuer.clone());
        Ok(Value::Object(data))
    }
}

/// Fields read by the cash strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CashPaymentFields {
    /// Marks the cash as already received, settling the charge on creation.
    pub confirm: Option<bool>,
}

impl PaymentMethodPayload for CashPaymentFields {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Cash
    }

    fn to_transport_data(&self, _card: Option<&CreditCard>) -> Result<Value> {
        let mut data = Map::new();
        insert_some(&mut data, "confirm", self.confirm);
        Ok(Value::Object(data))
    }
}

/// Every payment capability a request carries.
///
/// `issuer` is shared by boleto and bank transfer and is set on both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentFields {
    /// Credit card fields.
    pub card: CardPaymentFields,
    /// Boleto fields.
    pub boleto: BoletoPaymentFields,
    /// Pix fields.
    pub pix: PixPaymentFields,
    /// Bank transfer fields.
    pub bank_transfer: BankTransferFields,
    /// Cash fields.
    pub cash: CashPaymentFields,
}

impl PaymentFields {
    /// Returns the strategy for `method`.
    #[must_use]
    pub fn strategy(&self, method: PaymentMethod) -> &dyn PaymentMethodPayload {
        match method {
            PaymentMethod::CreditCard => &self.card,
            PaymentMethod::Boleto => &self.boleto,
            PaymentMethod::Pix => &self.pix,
            PaymentMethod::BankTransfer => &self.bank_transfer,
            PaymentMethod::Cash => &self.cash,
        }
    }

    /// Builds one entry of the `payments` array.
    ///
    /// # Errors
    ///
    /// Returns error if the selected strategy rejects its inputs.
    pub fn to_payment(&self, method: PaymentMethod, card: Option<&CreditCard>) -> Result<Value> {
        debug!(payment_method = %method, "building payment sub-payload");
        let mut payment = Map::new();
        payment.insert("payment_method".to_owned(), method.as_str().into());
        payment.insert(method.as_str().to_owned(), self.strategy(method).to_transport_data(card)?);
        Ok(Value::Object(payment))
    }

    /// Sets the bank issuer for boleto and bank transfer.
    pub fn set_issuer(&mut self, issuer: impl Into<String>) -> &mut Self {
        let issuer = issuer.into();
        self.boleto.issuer = Some(issuer.clone());
        self.bank_transfer.issuer = Some(issuer);
        self
    }

    /// Routes a raw field into its capability struct.
    ///
    /// Returns `Ok(false)` when `key` is not a payment field.
    ///
    /// # Errors
    ///
    /// Returns error if the value has the wrong shape for the field.
    pub fn apply(&mut self, key: &str, value: &Value) -> Result<bool> {
        match key {
            "installments" => self.card.installments = Some(as_i64(key, value)?),
            "statement_descriptor" => self.card.statement_descriptor = as_string(value),
            "operation_type" => self.card.operation_type = as_string(value),
            "card_id" => self.card.card_id = as_string(value),
            "card_token" => self.card.card_token = as_string(value),
            "recurrence" => self.card.recurrence = Some(is_filled(value)),
            "merchant_category_code" => {
                self.card.merchant_category_code = Some(as_i64(key, value)?);
            }
            "authentication" => self.card.authentication = Some(value.clone()),
            "auto_recovery" => self.card.auto_recovery = Some(is_filled(value)),
            "payload" => self.card.payload = Some(value.clone()),
            "issuer" | "bank" => {
                if let Some(issuer) = as_string(value) {
                    self.set_issuer(issuer);
                }
            }
            "instructions" => self.boleto.instructions = as_string(value),
            "due_at" => self.boleto.due_at = as_string(value),
            "nosso_numero" => self.boleto.nosso_numero = as_string(value),
            "type" => self.boleto.kind = as_string(value),
            "document_number" => self.boleto.document_number = as_string(value),
            "confirm" => self.cash.confirm = Some(is_filled(value)),
            "expires_in" => self.pix.expires_in = Some(as_i64(key, value)?),
            "expires_at" => self.pix.expires_at = as_string(value),
            "additional_information" => {
                self.pix.additional_information = serde_json::from_value(value.clone())
                    .map_err(|e| GatewayError::invalid(key, e.to_string()))?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

pub(crate) fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn as_i64(field: &str, value: &Value) -> Result<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| GatewayError::invalid(field, format!("expected an integer, got {value}")))
}

#[cfg(test)]
#[allow(clippy::unreachable, reason = "test code uses unreachable for expected-path assertions")]
mod tests {
    use serde_json::json;

    use super::*;

    fn card() -> CreditCard {
        CreditCard {
            first_name: Some("Tony".to_owned()),
            number: Some("4111111111111111".to_owned()),
            expiry_month: Some(12),
            expiry_year: Some(2099),
            cvv: Some("123".to_owned()),
            ..Default::default()
        }
    }

    #[test]
    fn test_payment_method_parse_lowercases() {
        assert_eq!("PIX".parse::<PaymentMethod>().ok(), Some(PaymentMethod::Pix));
        assert_eq!("Credit_Card".parse::<PaymentMethod>().ok(), Some(PaymentMethod::CreditCard));
        assert_eq!(" cash ".parse::<PaymentMethod>().ok(), Some(PaymentMethod::Cash));
        let Err(err) = "crypto".parse::<PaymentMethod>() else {
            unreachable!("crypto is not supported");
        };
        assert_eq!(err.field(), Some("payment_method"));
    }

    #[test]
    fn test_credit_card_defaults() {
        let fields = CardPaymentFields::default();
        let data = fields.to_transport_data(Some(&card())).expect("payload builds");
        assert_eq!(data["installments"], 1);
        assert_eq!(data["operation_type"], "auth_only");
        assert_eq!(data["card"]["holder_name"], "Tony");
        assert!(data.get("card_id").is_none());
        assert!(data.get("recurrence").is_none());
    }

    #[test]
    fn test_credit_card_prefers_card_id_then_token() {
        let fields = CardPaymentFields {
            card_id: Some("card_123".to_owned()),
            card_token: Some("token_abc".to_owned()),
            ..Default::default()
        };
        let data = fields.to_transport_data(Some(&card())).expect("payload builds");
        assert_eq!(data["card_id"], "card_123");
        assert!(data.get("card_token").is_none());
        assert!(data.get("card").is_none());

        let fields = CardPaymentFields { card_token: Some("token_abc".to_owned()), ..Default::default() };
        let data = fields.to_transport_data(None).expect("payload builds");
        assert_eq!(data["card_token"], "token_abc");
    }

    #[test]
    fn test_credit_card_validates_raw_card() {
        let broken = CreditCard { number: None, ..card() };
        let result = CardPaymentFields::default().to_transport_data(Some(&broken));
        assert!(matches!(result, Err(GatewayError::InvalidCreditCard(_))));

        let result = CardPaymentFields::default().to_transport_data(None);
        let Err(err) = result else {
            unreachable!("a card source is required");
        };
        assert_eq!(err.field(), Some("card"));
    }

    #[test]
    fn test_credit_card_extras() {
        let fields = CardPaymentFields {
            card_id: Some("card_1".to_owned()),
            recurrence: Some(true),
            merchant_category_code: Some(4899),
            auto_recovery: Some(false),
            ..Default::default()
        };
        let data = fields.to_transport_data(None).expect("payload builds");
        assert_eq!(data["recurrence"], true);
        assert_eq!(data["merchant_category_code"], 4899);
        assert_eq!(data["auto_recovery"], false);
    }

    #[test]
    fn test_pix_expires_in_wins() {
        let fields = PixPaymentFields {
            expires_in: Some(3600),
            expires_at: Some("2026-12-31T23:59:59Z".to_owned()),
            additional_information: vec![],
        };
        let data = fields.to_transport_data(None).expect("payload builds");
        assert_eq!(data, json!({"expires_in": 3600}));

        let fields = PixPaymentFields { expires_in: None, ..fields };
        let data = fields.to_transport_data(None).expect("payload builds");
        assert_eq!(data, json!({"expires_at": "2026-12-31T23:59:59Z"}));
    }

    #[test]
    fn test_pix_additional_information() {
        let fields = PixPaymentFields {
            additional_information: vec![PixAdditionalInformation {
                name: "Pedido".to_owned(),
                value: "42".to_owned(),
            }],
            ..Default::default()
        };
        let data = fields.to_transport_data(None).expect("payload builds");
        assert_eq!(data["additional_information"], json!([{"name": "Pedido", "value": "42"}]));
    }

    #[test]
    fn test_boleto_and_bank_transfer_share_issuer() {
        let mut fields = PaymentFields::default();
        fields.set_issuer("001");
        fields.boleto.instructions = Some("Pagar até o vencimento".to_owned());
        fields.boleto.kind = Some("DM".to_owned());

        let boleto = fields.to_payment(PaymentMethod::Boleto, None).expect("payment builds");
        assert_eq!(boleto["payment_method"], "boleto");
        assert_eq!(boleto["boleto"]["bank"], "001");
        assert_eq!(boleto["boleto"]["type"], "DM");

        let transfer = fields.to_payment(PaymentMethod::BankTransfer, None).expect("payment builds");
        assert_eq!(transfer, json!({"payment_method": "bank_transfer", "bank_transfer": {"bank": "001"}}));
    }

    #[test]
    fn test_cash_confirm_flag() {
        let mut fields = PaymentFields::default();
        let cash = fields.to_payment(PaymentMethod::Cash, None).expect("payment builds");
        assert_eq!(cash, json!({"payment_method": "cash", "cash": {}}));

        assert!(fields.apply("confirm", &json!("1")).expect("confirm is a payment field"));
        let cash = fields.to_payment(PaymentMethod::Cash, None).expect("payment builds");
        assert_eq!(cash["cash"], json!({"confirm": true}));

        assert!(fields.apply("confirm", &json!(0)).expect("confirm is a payment field"));
        assert_eq!(fields.cash.confirm, Some(false));
    }

    #[test]
    fn test_apply_routes_raw_fields() {
        let mut fields = PaymentFields::default();
        assert!(fields.apply("installments", &json!("3")).unwrap_or(false));
        assert!(fields.apply("expires_in", &json!(600)).unwrap_or(false));
        assert!(fields.apply("bank", &json!("237")).unwrap_or(false));
        assert!(!fields.apply("amount", &json!("10.00")).unwrap_or(true));
        assert!(fields.apply("installments", &json!("three")).is_err());

        assert_eq!(fields.card.installments, Some(3));
        assert_eq!(fields.pix.expires_in, Some(600));
        assert_eq!(fields.bank_transfer.issuer.as_deref(), Some("237"));
    }
}
