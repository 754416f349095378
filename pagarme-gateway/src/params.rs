//! Parameter store backing the request builders.
//!
//! [`Parameters`] is a string-keyed map of JSON values with default-fallback
//! lookup. Builders keep their scalar fields here and their typed value
//! objects (card, address, items) alongside it.

use serde::{Deserialize, Deserializer, de::Error as _};
use serde_json::{Map, Value};

use crate::error::{GatewayError, Result};

/// String-keyed parameter map.
///
/// Keys are case-sensitive. A key holding JSON `null` is treated as absent by
/// every accessor.
///
/// # Examples
///
/// ```
/// use pagarme_gateway::params::Parameters;
/// use serde_json::json;
///
/// let mut params = Parameters::new();
/// params.set("installments", 3);
///
/// assert_eq!(params.get_i64("installments"), Some(3));
/// assert_eq!(params.get_or("interval", &json!("month")), &json!("month"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    values: Map<String, Value>,
}

impl Parameters {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value for `key`, skipping `null`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key).filter(|value| !value.is_null())
    }

    /// Returns the value for `key`, or `default` when absent.
    #[must_use]
    pub fn get_or<'a>(&'a self, key: &str, default: &'a Value) -> &'a Value {
        self.get(key).unwrap_or(default)
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Removes `key` and returns its previous value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Returns `true` if `key` holds a non-null value.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Returns `true` if `key` holds a value that is not blank.
    ///
    /// See [`is_filled`] for what counts as blank.
    #[must_use]
    pub fn is_filled(&self, key: &str) -> bool {
        self.get(key).is_some_and(is_filled)
    }

    /// Returns a string view of `key`. Numbers are rendered in decimal.
    #[must_use]
    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Returns `key` as an integer, accepting numeric strings.
    ///
    /// Values that are not whole numbers read as `None`; use
    /// [`try_i64`](Self::try_i64) to reject them instead.
    #[must_use]
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.try_i64(key).ok().flatten()
    }

    /// Returns `key` as an integer, accepting numeric strings.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidParameter`] when the value is present
    /// but is not a whole number.
    pub fn try_i64(&self, key: &str) -> Result<Option<i64>> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        parse_integer(value)
            .map(Some)
            .ok_or_else(|| GatewayError::invalid(key, format!("expected an integer, got {value}")))
    }

    /// Returns `key` as a boolean using truthiness rules.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key).is_some_and(is_filled)
    }

    /// Returns the value for `key` or a [`GatewayError::MissingParameter`].
    ///
    /// # Errors
    ///
    /// Returns error if `key` is absent or `null`.
    pub fn require(&self, key: &str) -> Result<&Value> {
        self.get(key).ok_or_else(|| GatewayError::MissingParameter(key.to_owned()))
    }

    /// Checks that every key in `keys` is present, in order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MissingParameter`] naming the first absent key.
    pub fn validate(&self, keys: &[&str]) -> Result<()> {
        for key in keys {
            self.require(key)?;
        }
        Ok(())
    }

    /// Iterates over stored entries, including `null` ones.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Returns the number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Map<String, Value>> for Parameters {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

/// Returns `false` for `null`, `false`, `0`, empty strings, `"0"` and empty
/// arrays or objects.
#[must_use]
pub fn is_filled(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Inserts `value` under `key` only when it is present.
pub(crate) fn insert_some(map: &mut Map<String, Value>, key: &str, value: Option<impl Into<Value>>) {
    if let Some(value) = value {
        map.insert(key.to_owned(), value.into());
    }
}

/// Inserts `value` under `key`, writing `null` when absent.
pub(crate) fn insert_nullable(
    map: &mut Map<String, Value>,
    key: &str,
    value: Option<impl Into<Value>>,
) {
    map.insert(key.to_owned(), value.map_or(Value::Null, Into::into));
}

/// Deserializes an optional string that raw callers may send as a number.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Deserializes an optional integer that raw callers may send as a string.
///
/// `null` and blank strings read as absent; anything else that is not a whole
/// number is an error.
pub(crate) fn lenient_i64<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(value) => parse_integer(&value)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected an integer, got {value}"))),
    }
}

fn parse_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
