//! Field values and the unordered field map handed to the encoder

use crate::error::{EncodingError, EncodingResult};
use std::collections::BTreeMap;
use types::Amount;

/// A single intent field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Amount(Amount),
    /// Bps, percentages, ticks and tick spacings
    Integer(i64),
}

impl FieldValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Amount(_) => "amount",
            FieldValue::Integer(_) => "integer",
        }
    }
}

/// Caller-supplied fields for one intent
///
/// Insertion order is irrelevant: the encoder walks the operation schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntentFields {
    values: BTreeMap<String, FieldValue>,
}

impl IntentFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.values
            .insert(name.to_string(), FieldValue::Text(value.into()));
        self
    }

    pub fn amount(mut self, name: &str, value: Amount) -> Self {
        self.values
            .insert(name.to_string(), FieldValue::Amount(value));
        self
    }

    pub fn integer(mut self, name: &str, value: i64) -> Self {
        self.values
            .insert(name.to_string(), FieldValue::Integer(value));
        self
    }

    /// Set `name` only when `value` is present
    pub fn text_opt(self, name: &str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.text(name, v),
            None => self,
        }
    }

    pub fn integer_opt(self, name: &str, value: Option<i64>) -> Self {
        match value {
            Some(v) => self.integer(name, v),
            None => self,
        }
    }

    /// Parse a decimal amount string (e.g. from a CLI argument)
    ///
    /// Rejects signs, fractions and anything that does not fit in [`Amount`].
    pub fn insert_decimal_amount(&mut self, name: &str, text: &str) -> EncodingResult<()> {
        let trimmed = text.trim();
        if trimmed.starts_with('-') {
            return Err(EncodingError::out_of_range(name, trimmed, "amounts cannot be negative"));
        }
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(EncodingError::out_of_range(
                name,
                trimmed,
                "amounts are whole smallest-unit integers",
            ));
        }
        let value = trimmed
            .parse::<Amount>()
            .map_err(|_| EncodingError::out_of_range(name, trimmed, "exceeds 128-bit range"))?;
        self.values
            .insert(name.to_string(), FieldValue::Amount(value));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
