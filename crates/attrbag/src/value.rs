//! Attribute value types.
//!
//! This module defines the runtime representation of everything a bag can
//! hold: scalars, sequences, ordered mappings and nested bags.

use crate::bag::AttrBag;
use indexmap::IndexMap;
use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};

/// The backing store of a bag: string keys in insertion order.
pub type AttrMap = IndexMap<String, AttrValue>;

/// Runtime representation of an attribute value.
///
/// Serializes untagged, so the JSON form is the natural one: `null`, `true`,
/// `3`, `"x"`, `[..]`, `{..}`. A nested bag serializes as its mapping and
/// deserializes back as [`AttrValue::Map`]. JSON has no NaN or infinity, so
/// serializing a non-finite float is an error.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    #[serde(serialize_with = "finite_float")]
    Float(f64),
    Str(String),
    /// Zero-indexed sequence.
    List(Vec<AttrValue>),
    /// Ordered mapping with string keys.
    Map(AttrMap),
    /// A nested bag, carrying its own accessors.
    Bag(Box<AttrBag>),
}

fn finite_float<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        Err(S::Error::custom(format!(
            "cannot serialize non-finite float {value}"
        )))
    }
}

impl AttrValue {
    /// Short type label used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Null => "null",
            AttrValue::Bool(_) => "bool",
            AttrValue::Int(_) => "int",
            AttrValue::Float(_) => "float",
            AttrValue::Str(_) => "string",
            AttrValue::List(_) | AttrValue::Map(_) => "array",
            AttrValue::Bag(_) => "AttrBag",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    /// True for raw containers (sequences and mappings), not for bags.
    pub fn is_container(&self) -> bool {
        matches!(self, AttrValue::List(_) | AttrValue::Map(_))
    }

    /// Truthiness with loose-typing rules.
    ///
    /// - Null: false
    /// - Int/Float: non-zero
    /// - Str: anything except `""` and `"0"`
    /// - List/Map: non-empty
    /// - Bag: always true
    pub fn is_truthy(&self) -> bool {
        match self {
            AttrValue::Null => false,
            AttrValue::Bool(v) => *v,
            AttrValue::Int(v) => *v != 0,
            AttrValue::Float(v) => *v != 0.0,
            AttrValue::Str(s) => !(s.is_empty() || s == "0"),
            AttrValue::List(v) => !v.is_empty(),
            AttrValue::Map(m) => !m.is_empty(),
            AttrValue::Bag(_) => true,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric value of an Int or Float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Int(v) => Some(*v as f64),
            AttrValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[AttrValue]> {
        match self {
            AttrValue::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&AttrMap> {
        match self {
            AttrValue::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_bag(&self) -> Option<&AttrBag> {
        match self {
            AttrValue::Bag(b) => Some(b),
            _ => None,
        }
    }

    /// Take the bag out of a re-wrapped dispatch result.
    pub fn into_bag(self) -> Option<AttrBag> {
        match self {
            AttrValue::Bag(b) => Some(*b),
            _ => None,
        }
    }

    /// Deep copy with every nested bag replaced by its plain mapping.
    ///
    /// Recurses without cycle detection; bags form a tree by construction.
    pub fn to_plain(&self) -> AttrValue {
        match self {
            AttrValue::List(items) => AttrValue::List(items.iter().map(Self::to_plain).collect()),
            AttrValue::Map(map) => AttrValue::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_plain()))
                    .collect(),
            ),
            AttrValue::Bag(bag) => AttrValue::Map(bag.to_array()),
            scalar => scalar.clone(),
        }
    }

    /// True if no nested bag remains anywhere in this value.
    pub fn is_plain(&self) -> bool {
        match self {
            AttrValue::List(items) => items.iter().all(Self::is_plain),
            AttrValue::Map(map) => map.values().all(Self::is_plain),
            AttrValue::Bag(_) => false,
            _ => true,
        }
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<i32> for AttrValue {
    fn from(v: i32) -> Self {
        AttrValue::Int(v.into())
    }
}

impl From<usize> for AttrValue {
    fn from(v: usize) -> Self {
        match i64::try_from(v) {
            Ok(v) => AttrValue::Int(v),
            Err(_) => AttrValue::Float(v as f64),
        }
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Float(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Str(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Str(v)
    }
}

impl From<AttrMap> for AttrValue {
    fn from(v: AttrMap) -> Self {
        AttrValue::Map(v)
    }
}

impl From<AttrBag> for AttrValue {
    fn from(v: AttrBag) -> Self {
        AttrValue::Bag(Box::new(v))
    }
}

impl<T: Into<AttrValue>> From<Vec<T>> for AttrValue {
    fn from(v: Vec<T>) -> Self {
        AttrValue::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(AttrValue::Null, Into::into)
    }
}
