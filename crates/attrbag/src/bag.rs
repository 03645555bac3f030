use crate::accessors::Accessors;
use crate::config::BagConfig;
use crate::error::{BagError, Result};
use crate::naming::{accessor_method, Verb};
use crate::value::{AttrMap, AttrValue};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Index;
use std::sync::Arc;
use tracing::trace;

static NULL: AttrValue = AttrValue::Null;

/// An ordered attribute store with convention-based accessors.
///
/// The bag exclusively owns its [`AttrMap`]. Values may themselves be bags,
/// forming a tree. Cyclic nesting cannot be built through this API and is
/// not guarded against: flattening a cycle would recurse until the stack
/// is exhausted.
///
/// Beyond the explicit API, [`AttrBag::call`] resolves method names at run
/// time: `getFooBar` / `setFooBar` reach the `foo_bar` attribute and names
/// from the operation catalog (`sort`, `filter`, `in`, ...) run against the
/// store.
#[derive(Clone, Default)]
pub struct AttrBag {
    attributes: AttrMap,
    accessors: Arc<Accessors>,
    config: BagConfig,
}

impl AttrBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing mapping.
    pub fn make(attributes: AttrMap) -> Self {
        Self {
            attributes,
            ..Default::default()
        }
    }

    /// Build a bag from any value that can back a store.
    ///
    /// Mappings are taken as-is, sequences get keys `"0".."n-1"` and null
    /// gives an empty bag. Scalars cannot back a store.
    pub fn from_value(value: AttrValue) -> Result<Self> {
        match value {
            AttrValue::Null => Ok(Self::new()),
            AttrValue::Map(map) => Ok(Self::make(map)),
            AttrValue::List(items) => Ok(Self::make(indexed(items))),
            AttrValue::Bag(bag) => Ok(*bag),
            other => Err(BagError::Configuration {
                found: other.type_name(),
            }),
        }
    }

    /// Attach accessor overrides. Re-wrapped dispatch results inherit them.
    pub fn with_accessors(mut self, accessors: Accessors) -> Self {
        self.accessors = Arc::new(accessors);
        self
    }

    pub fn with_config(mut self, config: BagConfig) -> Self {
        self.config = config;
        self
    }

    pub fn accessors(&self) -> &Accessors {
        &self.accessors
    }

    pub fn config(&self) -> &BagConfig {
        &self.config
    }

    /// A new bag of the same kind (accessors and config) around `attributes`.
    pub(crate) fn rewrap(&self, attributes: AttrMap) -> Self {
        Self {
            attributes,
            accessors: Arc::clone(&self.accessors),
            config: self.config,
        }
    }

    pub fn attributes(&self) -> &AttrMap {
        &self.attributes
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut AttrMap {
        &mut self.attributes
    }

    pub fn into_attributes(self) -> AttrMap {
        self.attributes
    }

    // --- Index access ---

    pub fn exists(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    /// Read an attribute: null when the key is absent and no getter
    /// override exists, otherwise the resolved value.
    pub fn get(&self, key: &str) -> AttrValue {
        if !self.exists(key) && !self.has_getter(key) {
            return AttrValue::Null;
        }
        self.attribute(key).unwrap_or_default()
    }

    /// Read an attribute, falling back to `default` when the key is absent
    /// and nothing resolved it to a non-null value.
    pub fn get_or(&self, name: &str, default: impl Into<AttrValue>) -> AttrValue {
        match self.attribute(name) {
            Some(value) if !value.is_null() || self.exists(name) => value,
            _ => default.into(),
        }
    }

    /// Write an attribute, through a setter override when one exists.
    pub fn set(&mut self, name: &str, value: impl Into<AttrValue>) {
        self.set_attribute(name, value.into());
    }

    /// Delete an entry. Missing keys are a no-op.
    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        self.attributes.shift_remove(key)
    }

    // --- Attribute resolution ---

    /// Resolve `name`: the stored value, superseded by the `get<Camel>`
    /// override when one is registered. `None` when neither exists.
    pub fn attribute(&self, name: &str) -> Option<AttrValue> {
        let method = accessor_method(Verb::Get, name);
        match self.accessors.find_getter(&method) {
            Some(getter) => {
                trace!(attribute = name, method = %method, "getter override");
                Some(getter(&self.attributes))
            }
            None => self.attributes.get(name).cloned(),
        }
    }

    pub(crate) fn set_attribute(&mut self, name: &str, value: AttrValue) {
        let method = accessor_method(Verb::Set, name);
        match self.accessors.find_setter(&method) {
            Some(setter) => {
                trace!(attribute = name, method = %method, "setter override");
                let setter = Arc::clone(setter);
                setter(&mut self.attributes, value);
            }
            None => {
                self.attributes.insert(name.to_string(), value);
            }
        }
    }

    fn has_getter(&self, name: &str) -> bool {
        self.accessors
            .find_getter(&accessor_method(Verb::Get, name))
            .is_some()
    }

    // --- Iteration & size ---

    /// Entries in insertion order. Every call starts from the beginning.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, AttrValue> {
        self.attributes.iter()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, AttrValue> {
        self.attributes.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, String, AttrValue> {
        self.attributes.values()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// True when the keys are exactly `"0".."n-1"` in order.
    pub fn is_list(&self) -> bool {
        self.attributes
            .keys()
            .enumerate()
            .all(|(i, k)| *k == i.to_string())
    }

    /// The values as a zero-indexed sequence, if the bag is one.
    pub fn to_list(&self) -> Option<Vec<AttrValue>> {
        self.is_list()
            .then(|| self.attributes.values().cloned().collect())
    }

    // --- Export & serialization ---

    /// Deep copy of the store with every nested bag unwrapped into a plain
    /// mapping, at any depth.
    pub fn to_array(&self) -> AttrMap {
        self.attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.to_plain()))
            .collect()
    }

    pub fn to_value(&self) -> AttrValue {
        AttrValue::Map(self.to_array())
    }

    /// JSON encoding of the flattened store.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.attributes)?)
    }

    /// Rebuild a plain bag from [`AttrBag::to_bytes`] output.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let value: AttrValue = serde_json::from_slice(bytes)?;
        Self::from_value(value)
    }

    /// Replace the store from serialized bytes, keeping this bag's
    /// accessors and config. The store is untouched on error.
    pub fn unserialize(&mut self, bytes: &[u8]) -> Result<()> {
        let restored = Self::from_bytes(bytes)?;
        self.attributes = restored.attributes;
        Ok(())
    }
}

/// Sequence to mapping with keys `"0".."n-1"`.
pub(crate) fn indexed(items: Vec<AttrValue>) -> AttrMap {
    items
        .into_iter()
        .enumerate()
        .map(|(i, v)| (i.to_string(), v))
        .collect()
}

impl fmt::Debug for AttrBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("AttrBag");
        s.field("attributes", &self.attributes);
        if !self.accessors.is_empty() {
            s.field("accessors", &self.accessors);
        }
        s.finish()
    }
}

/// Bags compare by their stores; accessors and config are not part of the value.
impl PartialEq for AttrBag {
    fn eq(&self, other: &Self) -> bool {
        self.attributes == other.attributes
    }
}

impl Index<&str> for AttrBag {
    type Output = AttrValue;

    /// Raw store read; absent keys read as null. Getter overrides are not
    /// consulted, use [`AttrBag::get`] for the resolved value.
    fn index(&self, key: &str) -> &AttrValue {
        self.attributes.get(key).unwrap_or(&NULL)
    }
}

impl From<AttrMap> for AttrBag {
    fn from(attributes: AttrMap) -> Self {
        Self::make(attributes)
    }
}

impl<K, V> FromIterator<(K, V)> for AttrBag
where
    K: Into<String>,
    V: Into<AttrValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::make(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K, V> Extend<(K, V)> for AttrBag
where
    K: Into<String>,
    V: Into<AttrValue>,
{
    /// Goes through [`AttrBag::set`], so setter overrides apply.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(&k.into(), v);
        }
    }
}

impl<'a> IntoIterator for &'a AttrBag {
    type Item = (&'a String, &'a AttrValue);
    type IntoIter = indexmap::map::Iter<'a, String, AttrValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for AttrBag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.attributes.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AttrBag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        AttrMap::deserialize(deserializer).map(Self::make)
    }
}
