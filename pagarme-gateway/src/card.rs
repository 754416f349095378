//! Credit card value object.
//!
//! [`CreditCard`] carries the generic card fields (holder, number, expiry,
//! billing address) plus the gateway extras: holder document, label and a
//! saved billing address id. [`CreditCard::to_transport_data`] produces the
//! `card` object used by order and subscription payloads.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::{
    address::Address,
    error::{GatewayError, Result},
    params::{insert_nullable, insert_some, lenient_i64, lenient_string},
};

/// Card brands recognised from the card number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardBrand {
    /// Elo.
    Elo,
    /// Hipercard.
    Hipercard,
    /// Visa.
    Visa,
    /// Mastercard.
    Mastercard,
    /// American Express.
    Amex,
    /// Diners Club.
    DinersClub,
    /// Discover.
    Discover,
    /// JCB.
    Jcb,
}

impl CardBrand {
    /// Returns the brand identifier sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Elo => "elo",
            Self::Hipercard => "hipercard",
            Self::Visa => "visa",
            Self::Mastercard => "mastercard",
            Self::Amex => "amex",
            Self::DinersClub => "diners_club",
            Self::Discover => "discover",
            Self::Jcb => "jcb",
        }
    }

    /// Detects the brand of a digits-only card number.
    ///
    /// Elo and Hipercard ranges overlap Visa and Discover prefixes, so they
    /// are matched first.
    #[must_use]
    pub fn detect(number: &str) -> Option<Self> {
        BRAND_PATTERNS.iter().find(|(_, pattern)| pattern.is_match(number)).map(|(brand, _)| *brand)
    }
}

#[allow(clippy::expect_used, reason = "patterns are static and covered by tests")]
static BRAND_PATTERNS: LazyLock<Vec<(CardBrand, Regex)>> = LazyLock::new(|| {
    [
        (
            CardBrand::Elo,
            r"^(4011(78|79)|43(1274|8935)|45(1416|7393|763(1|2))|50(4175|6699|67[0-7][0-9]|9000)|627780|63(6297|6368)|650(03([^4])|04([0-9])|05(0|1)|4(0[5-9]|3[0-9]|8[5-9]|9[0-9])|5([0-2][0-9]|3[0-8])|9([2-6][0-9]|7[0-8])|541|700|720|901)|651652|655000|655021)\d*$",
        ),
        (CardBrand::Hipercard, r"^(606282\d{10}(\d{3})?|3841\d{15})$"),
        (CardBrand::Visa, r"^4\d{12}(\d{3})?$"),
        (
            CardBrand::Mastercard,
            r"^(5[1-5]\d{4}|677189)\d{10}$|^2(2(2[1-9]|[3-9]\d)|[3-6]\d\d|7([01]\d|20))\d{12}$",
        ),
        (CardBrand::Amex, r"^3[47]\d{13}$"),
        (CardBrand::DinersClub, r"^3(0[0-5]|[68]\d)\d{11}$"),
        (CardBrand::Discover, r"^6(011|5\d{2})\d{12}$"),
        (CardBrand::Jcb, r"^35(28|29|[3-8]\d)\d{12}$"),
    ]
    .into_iter()
    .map(|(brand, pattern)| (brand, Regex::new(pattern).expect("brand pattern compiles")))
    .collect()
});

/// A payment card with billing details.
///
/// Raw mappings may use the snake_case field names or the camelCase forms
/// common in checkout forms (`expiryMonth`, `billingAddress1`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCard {
    /// Full holder name. When absent, first and last name are joined.
    #[serde(default)]
    pub name: Option<String>,
    /// Holder first name.
    #[serde(default, alias = "firstName")]
    pub first_name: Option<String>,
    /// Holder last name.
    #[serde(default, alias = "lastName")]
    pub last_name: Option<String>,
    /// Card number as typed; non-digits are ignored.
    #[serde(default, deserialize_with = "lenient_string")]
    pub number: Option<String>,
    /// Expiry month, 1 to 12.
    #[serde(default, alias = "expiryMonth", alias = "exp_month", deserialize_with = "lenient_i64")]
    pub expiry_month: Option<i64>,
    /// Expiry year. Two-digit years are read as 20xx.
    #[serde(default, alias = "expiryYear", alias = "exp_year", deserialize_with = "lenient_i64")]
    pub expiry_year: Option<i64>,
    /// Card verification value.
    #[serde(default, deserialize_with = "lenient_string")]
    pub cvv: Option<String>,
    /// Explicit brand. When absent, detected from the number.
    #[serde(default)]
    pub brand: Option<String>,
    /// Holder e-mail.
    #[serde(default)]
    pub email: Option<String>,
    /// Holder gender.
    #[serde(default)]
    pub gender: Option<String>,
    /// Holder birthday.
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
    /// Billing address first line.
    #[serde(default, alias = "billingAddress1", alias = "address1")]
    pub billing_address1: Option<String>,
    /// Billing address second line.
    #[serde(default, alias = "billingAddress2", alias = "address2")]
    pub billing_address2: Option<String>,
    /// Billing city.
    #[serde(default, alias = "billingCity", alias = "city")]
    pub billing_city: Option<String>,
    /// Billing postal code.
    #[serde(default, alias = "billingPostcode", alias = "postcode")]
    pub billing_postcode: Option<String>,
    /// Billing state.
    #[serde(default, alias = "billingState", alias = "state")]
    pub billing_state: Option<String>,
    /// Billing country.
    #[serde(default, alias = "billingCountry", alias = "country")]
    pub billing_country: Option<String>,
    /// Billing phone, decomposed with [`Phone::parse`](crate::phone::Phone::parse).
    #[serde(default, alias = "billingPhone", alias = "phone", deserialize_with = "lenient_string")]
    pub billing_phone: Option<String>,
    /// Holder CPF/CNPJ, digits only.
    #[serde(
        default,
        alias = "holderDocumentNumber",
        alias = "holder_document_number",
        deserialize_with = "digits_only"
    )]
    pub holder_document: Option<String>,
    /// Card label shown in the customer's wallet.
    #[serde(default)]
    pub label: Option<String>,
    /// Id of a billing address already stored for the customer.
    #[serde(default, alias = "billingAddressId")]
    pub billing_address_id: Option<String>,
}

impl CreditCard {
    /// Sets the holder document, stripping every non-digit character.
    pub fn set_holder_document(&mut self, document: &str) -> &mut Self {
        self.holder_document = Some(strip_non_digits(document));
        self
    }

    /// Returns the full holder name: `name`, else first and last name joined.
    #[must_use]
    pub fn full_name(&self) -> Option<String> {
        if let Some(name) = self.name.as_deref().map(str::trim)
            && !name.is_empty()
        {
            return Some(name.to_owned());
        }
        let joined = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        let joined = joined.trim();
        (!joined.is_empty()).then(|| joined.to_owned())
    }

    /// Returns the holder name, falling back from full name to first name.
    #[must_use]
    pub fn holder_name(&self) -> Option<String> {
        self.full_name().or_else(|| self.first_name.clone())
    }

    /// Returns the card number with non-digits removed.
    #[must_use]
    pub fn digits(&self) -> Option<String> {
        self.number.as_deref().map(strip_non_digits).filter(|digits| !digits.is_empty())
    }

    /// Returns the four-digit expiry year.
    #[must_use]
    pub fn normalized_expiry_year(&self) -> Option<i64> {
        self.expiry_year.map(|year| if (0..100).contains(&year) { 2000 + year } else { year })
    }

    /// Returns the explicit brand, else the brand detected from the number.
    #[must_use]
    pub fn brand(&self) -> Option<String> {
        if let Some(brand) = self.brand.as_deref().filter(|b| !b.is_empty()) {
            return Some(brand.to_owned());
        }
        self.digits().and_then(|digits| CardBrand::detect(&digits)).map(|b| b.as_str().to_owned())
    }

    /// Formats the birthday as `m-d-Y`.
    #[must_use]
    pub fn birthday_mdy(&self) -> Option<String> {
        self.birthday.map(|date| date.format("%m-%d-%Y").to_string())
    }

    /// Validates the card against today's date.
    ///
    /// # Errors
    ///
    /// See [`validate_at`](Self::validate_at).
    pub fn validate(&self) -> Result<()> {
        self.validate_at(Utc::now().date_naive())
    }

    /// Validates the card against `today`.
    ///
    /// Checks, in order: number, expiry month and expiry year present; month
    /// within 1 to 12; card not expired; Luhn checksum; 12 to 19 digits.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidCreditCard`] describing the first failure.
    pub fn validate_at(&self, today: NaiveDate) -> Result<()> {
        let Some(number) = self.digits() else {
            return Err(invalid_card("The number parameter is required"));
        };
        let Some(month) = self.expiry_month else {
            return Err(invalid_card("The expiryMonth parameter is required"));
        };
        let Some(year) = self.normalized_expiry_year() else {
            return Err(invalid_card("The expiryYear parameter is required"));
        };

        if !(1..=12).contains(&month) {
            return Err(invalid_card("Card expiry month must be between 1 and 12"));
        }
        let current = (i64::from(today.year()), i64::from(today.month()));
        if (year, month) < current {
            return Err(invalid_card("Card has expired"));
        }
        if !luhn_valid(&number) {
            return Err(invalid_card("Card number is invalid"));
        }
        if !(12..=19).contains(&number.len()) {
            return Err(invalid_card("Card number should have 12 to 19 digits"));
        }
        Ok(())
    }

    /// Projects the card into the wire `card` object.
    ///
    /// `number` and `cvv` appear only when set; the remaining keys are always
    /// present, `null` when unknown.
    #[must_use]
    pub fn to_transport_data(&self) -> Value {
        let mut data = Map::new();
        insert_some(&mut data, "number", self.digits());
        insert_some(&mut data, "cvv", self.cvv.clone());
        insert_nullable(&mut data, "holder_name", self.holder_name());
        insert_nullable(&mut data, "exp_month", self.expiry_month);
        insert_nullable(&mut data, "exp_year", self.normalized_expiry_year());
        insert_nullable(&mut data, "brand", self.brand());
        data.insert("billing_address".to_owned(), Address::from_card(self).to_transport_data());
        Value::Object(data)
    }
}

impl TryFrom<Value> for CreditCard {
    type Error = GatewayError;

    fn try_from(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| GatewayError::invalid("card", e.to_string()))
    }
}

fn invalid_card(message: &str) -> GatewayError {
    GatewayError::InvalidCreditCard(message.to_owned())
}

pub(crate) fn strip_non_digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

fn digits_only<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.map(|raw| strip_non_digits(&raw)))
}

/// Luhn mod-10 checksum over a digits-only string.
fn luhn_valid(digits: &str) -> bool {
    let mut sum = 0;
    for (i, ch) in digits.chars().rev().enumerate() {
        let Some(mut digit) = ch.to_digit(10) else {
            return false;
        };
        if i % 2 == 1 {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
    }
    sum % 10 == 0
}
