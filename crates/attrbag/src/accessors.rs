//! Accessor overrides.
//!
//! A bag resolves attribute `name` through the method `get<Camel(name)>` /
//! `set<Camel(name)>` when one is registered here, and through its plain
//! store otherwise. This lets a particular kind of bag customize a handful
//! of fields without touching the generic behaviour of all the others.
//!
//! Overrides are registered under the method name, so every attribute
//! name that camel-cases to the same method shares the override
//! (`full_name` and `fullName` both reach `getFullName`).

use crate::value::{AttrMap, AttrValue};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Computes the value of an attribute from the bag's store.
pub type Getter = Arc<dyn Fn(&AttrMap) -> AttrValue + Send + Sync>;

/// Stores (or derives and stores) an incoming attribute value.
pub type Setter = Arc<dyn Fn(&mut AttrMap, AttrValue) + Send + Sync>;

/// Registry of accessor methods, keyed by method name (`getFullName`).
#[derive(Clone, Default)]
pub struct Accessors {
    getters: HashMap<String, Getter>,
    setters: HashMap<String, Setter>,
}

impl Accessors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a getter, e.g. `getFullName`.
    pub fn getter<F>(mut self, method: impl Into<String>, f: F) -> Self
    where
        F: Fn(&AttrMap) -> AttrValue + Send + Sync + 'static,
    {
        self.getters.insert(method.into(), Arc::new(f));
        self
    }

    /// Register a setter, e.g. `setFullName`.
    pub fn setter<F>(mut self, method: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut AttrMap, AttrValue) + Send + Sync + 'static,
    {
        self.setters.insert(method.into(), Arc::new(f));
        self
    }

    pub fn find_getter(&self, method: &str) -> Option<&Getter> {
        self.getters.get(method)
    }

    pub fn find_setter(&self, method: &str) -> Option<&Setter> {
        self.setters.get(method)
    }

    pub fn is_empty(&self) -> bool {
        self.getters.is_empty() && self.setters.is_empty()
    }
}

impl fmt::Debug for Accessors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<&str> = self
            .getters
            .keys()
            .chain(self.setters.keys())
            .map(String::as_str)
            .collect();
        methods.sort_unstable();
        f.debug_struct("Accessors")
            .field("methods", &methods)
            .finish()
    }
}
