//! Loosely typed arguments as received from the caller, plus typed accessors.

use std::collections::BTreeMap;

use crate::error::GatewayError;

/// Key/value argument bag.
pub type ArgumentBag = BTreeMap<String, ArgValue>;

/// A single argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// Explicit null.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// UTF-8 string.
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Ordered list.
    List(Vec<ArgValue>),
    /// Nested bag.
    Map(ArgumentBag),
}

/// Arguments attached to a method call.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Arguments {
    /// No arguments.
    #[default]
    None,
    /// A bare string.
    Text(String),
    /// A key/value bag.
    Bag(ArgumentBag),
}

impl Arguments {
    /// Build a bag from key/value pairs.
    pub fn bag<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ArgValue)>,
    {
        Self::Bag(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        )
    }

    /// The bag, or `ExpectedMap` when the arguments are not a bag.
    pub(crate) const fn as_bag(&self) -> Result<&ArgumentBag, GatewayError> {
        match self {
            Self::Bag(bag) => Ok(bag),
            Self::None | Self::Text(_) => Err(GatewayError::ExpectedMap),
        }
    }

    /// A bare non-empty string, or the non-empty string under `key` of a bag.
    pub(crate) fn text_or_field(&self, key: &'static str) -> Result<&str, GatewayError> {
        match self {
            Self::Text(text) if !text.is_empty() => Ok(text),
            Self::Bag(bag) => required_str(bag, key),
            Self::None | Self::Text(_) => Err(GatewayError::MissingField { field: key }),
        }
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<u8>> for ArgValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

/// Non-empty string under `key`.
pub(crate) fn required_str<'a>(
    bag: &'a ArgumentBag,
    key: &'static str,
) -> Result<&'a str, GatewayError> {
    optional_str(bag, key).ok_or(GatewayError::MissingField { field: key })
}

// Optional values of the wrong type read the same as absent ones.

/// Non-empty string under `key`.
pub(crate) fn optional_str<'a>(bag: &'a ArgumentBag, key: &str) -> Option<&'a str> {
    match bag.get(key) {
        Some(ArgValue::Text(text)) if !text.is_empty() => Some(text),
        _ => None,
    }
}

/// Non-empty byte blob under `key`.
pub(crate) fn optional_bytes<'a>(bag: &'a ArgumentBag, key: &str) -> Option<&'a [u8]> {
    match bag.get(key) {
        Some(ArgValue::Bytes(bytes)) if !bytes.is_empty() => Some(bytes),
        _ => None,
    }
}

/// Boolean under `key`, or `default`.
pub(crate) fn flag(bag: &ArgumentBag, key: &str, default: bool) -> bool {
    match bag.get(key) {
        Some(ArgValue::Bool(value)) => *value,
        _ => default,
    }
}

/// String entries of the list under `key`; other entries are skipped.
pub(crate) fn string_list(bag: &ArgumentBag, key: &str) -> Vec<String> {
    match bag.get(key) {
        Some(ArgValue::List(items)) => items
            .iter()
            .filter_map(|item| match item {
                ArgValue::Text(text) => Some(text.clone()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}
