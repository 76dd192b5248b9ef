//! Value codec: bidirectional conversion between typed values and both
//! their document-node form and their textual form.
//!
//! Scalars convert through `Display` / `FromStr`. Containers are implemented
//! once per container kind, generically over the element codec, so
//! `Vec<BTreeMap<String, HashSet<i64>>>` needs no dedicated code. Record types
//! implement [`ConfigValue::to_node`] / [`ConfigValue::from_node`] (or delegate
//! to [`serde_to_node`] / [`serde_from_node`]) and then compose with every
//! container below.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::Hash;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::DocumentNode;
use crate::error::CodecError;

/// A type that can live inside a [`ConfigVar`](crate::ConfigVar).
pub trait ConfigValue: Clone + PartialEq + Send + Sync + 'static {
    /// Name used in diagnostics and type-mismatch errors.
    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }

    fn to_node(&self) -> Result<Value, CodecError>;

    fn from_node(node: &Value) -> Result<Self, CodecError>;

    /// Whether storing `other` over `self` changes nothing. Floats compare
    /// bitwise, so a stored NaN is the same as a reloaded NaN.
    fn same_value(&self, other: &Self) -> bool {
        self == other
    }

    /// Textual form of the value. Defaults to the canonical text of
    /// [`to_node`](Self::to_node).
    fn encode(&self) -> Result<String, CodecError> {
        self.to_node().map(|node| node.to_canonical_text())
    }

    /// Parse the textual form. Defaults to parsing canonical document text
    /// and handing the node to [`from_node`](Self::from_node).
    fn decode(text: &str) -> Result<Self, CodecError> {
        let node: Value = serde_json::from_str(text)
            .map_err(|e| CodecError::decode(Self::type_name(), text, e))?;
        Self::from_node(&node)
    }
}

// ---------------------------------------------------------------------------
// Scalars
// ---------------------------------------------------------------------------

fn scalar_text_of<T: ConfigValue>(node: &Value) -> Result<String, CodecError> {
    node.scalar_text()
        .ok_or_else(|| CodecError::decode(T::type_name(), node.to_canonical_text(), "expected a scalar"))
}

macro_rules! integer_value {
    ($($ty:ty),* $(,)?) => {$(
        impl ConfigValue for $ty {
            fn type_name() -> &'static str {
                stringify!($ty)
            }

            fn to_node(&self) -> Result<Value, CodecError> {
                Ok(Value::from(*self))
            }

            fn from_node(node: &Value) -> Result<Self, CodecError> {
                Self::decode(&scalar_text_of::<Self>(node)?)
            }

            fn encode(&self) -> Result<String, CodecError> {
                Ok(self.to_string())
            }

            fn decode(text: &str) -> Result<Self, CodecError> {
                text.trim()
                    .parse::<$ty>()
                    .map_err(|e| CodecError::decode(Self::type_name(), text, e))
            }
        }
    )*};
}

integer_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! float_value {
    ($($ty:ty),* $(,)?) => {$(
        impl ConfigValue for $ty {
            fn type_name() -> &'static str {
                stringify!($ty)
            }

            fn to_node(&self) -> Result<Value, CodecError> {
                serde_json::Number::from_f64(f64::from(*self))
                    .map(Value::Number)
                    .ok_or_else(|| CodecError::encode(Self::type_name(), format!("{self} has no document form")))
            }

            fn from_node(node: &Value) -> Result<Self, CodecError> {
                Self::decode(&scalar_text_of::<Self>(node)?)
            }

            fn same_value(&self, other: &Self) -> bool {
                self.to_bits() == other.to_bits()
            }

            fn encode(&self) -> Result<String, CodecError> {
                Ok(self.to_string())
            }

            fn decode(text: &str) -> Result<Self, CodecError> {
                text.trim()
                    .parse::<$ty>()
                    .map_err(|e| CodecError::decode(Self::type_name(), text, e))
            }
        }
    )*};
}

float_value!(f32, f64);

impl ConfigValue for bool {
    fn type_name() -> &'static str {
        "bool"
    }

    fn to_node(&self) -> Result<Value, CodecError> {
        Ok(Value::Bool(*self))
    }

    fn from_node(node: &Value) -> Result<Self, CodecError> {
        Self::decode(&scalar_text_of::<Self>(node)?)
    }

    fn encode(&self) -> Result<String, CodecError> {
        Ok(self.to_string())
    }

    fn decode(text: &str) -> Result<Self, CodecError> {
        match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(CodecError::decode("bool", text, "expected true or false")),
        }
    }
}

impl ConfigValue for String {
    fn type_name() -> &'static str {
        "String"
    }

    fn to_node(&self) -> Result<Value, CodecError> {
        Ok(Value::String(self.clone()))
    }

    fn from_node(node: &Value) -> Result<Self, CodecError> {
        scalar_text_of::<Self>(node)
    }

    fn encode(&self) -> Result<String, CodecError> {
        Ok(self.clone())
    }

    fn decode(text: &str) -> Result<Self, CodecError> {
        Ok(text.to_string())
    }
}

// ---------------------------------------------------------------------------
// Containers
// ---------------------------------------------------------------------------

fn encode_sequence<'a, T: ConfigValue>(
    items: impl IntoIterator<Item = &'a T>,
) -> Result<Value, CodecError> {
    items
        .into_iter()
        .map(ConfigValue::to_node)
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

fn decode_sequence<T: ConfigValue, C: FromIterator<T>>(
    node: &Value,
    type_name: &'static str,
) -> Result<C, CodecError> {
    match node {
        Value::Array(items) => items.iter().map(T::from_node).collect(),
        other => Err(CodecError::decode(type_name, other.to_canonical_text(), "expected a sequence")),
    }
}

fn encode_map<'a, T: ConfigValue>(
    entries: impl IntoIterator<Item = (&'a String, &'a T)>,
) -> Result<Value, CodecError> {
    let mut map = Map::new();
    for (key, value) in entries {
        map.insert(key.clone(), value.to_node()?);
    }
    Ok(Value::Object(map))
}

fn decode_map<T: ConfigValue, C: FromIterator<(String, T)>>(
    node: &Value,
    type_name: &'static str,
) -> Result<C, CodecError> {
    match node {
        Value::Object(map) => map
            .iter()
            .map(|(key, child)| T::from_node(child).map(|value| (key.clone(), value)))
            .collect(),
        other => Err(CodecError::decode(type_name, other.to_canonical_text(), "expected a map")),
    }
}

fn same_sequence<'a, T: ConfigValue + 'a>(
    left: impl ExactSizeIterator<Item = &'a T>,
    right: impl ExactSizeIterator<Item = &'a T>,
) -> bool {
    left.len() == right.len() && left.zip(right).all(|(a, b)| a.same_value(b))
}

impl<T: ConfigValue> ConfigValue for Vec<T> {
    fn to_node(&self) -> Result<Value, CodecError> {
        encode_sequence(self)
    }

    fn same_value(&self, other: &Self) -> bool {
        same_sequence(self.iter(), other.iter())
    }

    fn from_node(node: &Value) -> Result<Self, CodecError> {
        decode_sequence(node, Self::type_name())
    }
}

impl<T: ConfigValue> ConfigValue for VecDeque<T> {
    fn to_node(&self) -> Result<Value, CodecError> {
        encode_sequence(self)
    }

    fn same_value(&self, other: &Self) -> bool {
        same_sequence(self.iter(), other.iter())
    }

    fn from_node(node: &Value) -> Result<Self, CodecError> {
        decode_sequence(node, Self::type_name())
    }
}

impl<T: ConfigValue + Ord> ConfigValue for BTreeSet<T> {
    fn to_node(&self) -> Result<Value, CodecError> {
        encode_sequence(self)
    }

    fn from_node(node: &Value) -> Result<Self, CodecError> {
        decode_sequence(node, Self::type_name())
    }
}

impl<T: ConfigValue + Eq + Hash> ConfigValue for HashSet<T> {
    fn to_node(&self) -> Result<Value, CodecError> {
        encode_sequence(self)
    }

    fn from_node(node: &Value) -> Result<Self, CodecError> {
        decode_sequence(node, Self::type_name())
    }
}

impl<T: ConfigValue> ConfigValue for BTreeMap<String, T> {
    fn to_node(&self) -> Result<Value, CodecError> {
        encode_map(self)
    }

    fn same_value(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.iter().all(|(key, value)| other.get(key).is_some_and(|o| value.same_value(o)))
    }

    fn from_node(node: &Value) -> Result<Self, CodecError> {
        decode_map(node, Self::type_name())
    }
}

impl<T: ConfigValue> ConfigValue for HashMap<String, T> {
    fn to_node(&self) -> Result<Value, CodecError> {
        encode_map(self)
    }

    fn same_value(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.iter().all(|(key, value)| other.get(key).is_some_and(|o| value.same_value(o)))
    }

    fn from_node(node: &Value) -> Result<Self, CodecError> {
        decode_map(node, Self::type_name())
    }
}

// ---------------------------------------------------------------------------
// Serde-backed records
// ---------------------------------------------------------------------------

/// `to_node` for records that derive `Serialize`.
pub fn serde_to_node<T: Serialize>(value: &T) -> Result<Value, CodecError> {
    serde_json::to_value(value).map_err(|e| CodecError::encode(std::any::type_name::<T>(), e))
}

/// `from_node` for records that derive `Deserialize`.
pub fn serde_from_node<T: DeserializeOwned>(node: &Value) -> Result<T, CodecError> {
    T::deserialize(node)
        .map_err(|e| CodecError::decode(std::any::type_name::<T>(), node.to_canonical_text(), e))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
