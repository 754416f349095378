//! Brazilian phone number decomposition.
//!
//! The remote API expects phones split into an area code (DDD) and a
//! subscriber number. [`Phone::parse`] applies the local convention:
//!
//! 1. Strip every non-digit character.
//! 2. A leading `0` is a trunk prefix: the next two digits are the area code.
//! 3. Fewer than ten digits means no area code was dialed.
//! 4. Otherwise the first two digits are the area code.

use serde::{Deserialize, Serialize};

/// A phone number split into area code and subscriber number.
///
/// # Examples
///
/// ```
/// use pagarme_gateway::phone::Phone;
///
/// let phone = Phone::parse("(021) 99876-5432");
/// assert_eq!(phone.area_code, "21");
/// assert_eq!(phone.number, "998765432");
///
/// let local = Phone::parse("9876-5432");
/// assert!(local.area_code.is_empty());
/// assert_eq!(local.number, "98765432");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phone {
    /// Country dialing code, e.g. `55`. Never derived by [`Phone::parse`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    /// Area code (DDD), possibly empty.
    #[serde(default)]
    pub area_code: String,
    /// Subscriber number.
    #[serde(default)]
    pub number: String,
}

impl Phone {
    /// Decomposes a raw phone string. Never fails.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

        let (area_code, number) = if digits.starts_with('0') {
            (slice(&digits, 1, Some(3)), slice(&digits, 3, None))
        } else if digits.len() < 10 {
            ("", digits.as_str())
        } else {
            (slice(&digits, 0, Some(2)), slice(&digits, 2, None))
        };

        Self { country_code: None, area_code: area_code.to_owned(), number: number.to_owned() }
    }

    /// Sets the country dialing code.
    #[must_use]
    pub fn with_country_code(mut self, country_code: impl Into<String>) -> Self {
        self.country_code = Some(country_code.into());
        self
    }

    /// Returns `true` when an area code was found.
    #[must_use]
    pub fn has_area_code(&self) -> bool {
        !self.area_code.is_empty()
    }
}

/// Byte slice of an ASCII digit string, clamped to its length.
fn slice(digits: &str, start: usize, end: Option<usize>) -> &str {
    let len = digits.len();
    let start = start.min(len);
    let end = end.map_or(len, |end| end.min(len));
    &digits[start..end]
}
