//! # AttrBag
//!
//! An ordered attribute container. A bag owns a mapping of string keys to
//! loosely typed values and exposes it three ways:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Name dispatch (dispatch.rs)                                │
//! │  - getFooBar / setFooBar reach the foo_bar attribute        │
//! │  - sort, filter, in, ... run catalog operations             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Operation catalog (catalog/)                               │
//! │  - Registry of array operations by call shape               │
//! │  - Loose-typed comparison, integer-key renumbering          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Attribute store (bag.rs, value.rs)                         │
//! │  - Insertion-ordered map, index access, accessor overrides  │
//! │  - Flattening and JSON serialization                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Accessor overrides
//!
//! A bag "kind" is expressed as an [`Accessors`] registry rather than a
//! subtype: a getter registered as `getFullName` supersedes the stored
//! `full_name` value for [`AttrBag::get`], [`AttrBag::get_or`],
//! [`AttrBag::attribute`] and `getFullName` dispatch. `bag["full_name"]`
//! borrows straight from the store and never runs a getter.
//! Bags produced by catalog operations share the registry of the bag that
//! produced them.
//!
//! ```
//! use attrbag::{args, Accessors, AttrBag, AttrValue};
//!
//! let accessors = Accessors::new().getter("getFullName", |store| {
//!     let part = |k: &str| store.get(k).and_then(AttrValue::as_str).unwrap_or("").to_string();
//!     AttrValue::Str(format!("{} {}", part("first"), part("last")))
//! });
//! let mut person: AttrBag = [("first", "Ada"), ("last", "Lovelace")].into_iter().collect();
//! person = person.with_accessors(accessors);
//!
//! assert_eq!(person.get("full_name"), AttrValue::from("Ada Lovelace"));
//! assert_eq!(person.call("getFullName", []).unwrap(), AttrValue::from("Ada Lovelace"));
//!
//! person.call("setFirst", args!["Augusta"]).unwrap();
//! assert_eq!(person["first"], AttrValue::from("Augusta"));
//! ```
//!
//! ## Operations
//!
//! ```
//! use attrbag::{args, AttrBag, AttrValue};
//!
//! let mut bag: AttrBag = [("a", 3), ("b", 1), ("c", 2)].into_iter().collect();
//! assert_eq!(bag.call("in", args![2]).unwrap(), AttrValue::Bool(true));
//!
//! bag.call("asort", []).unwrap();
//! assert_eq!(bag.keys().collect::<Vec<_>>(), vec!["b", "c", "a"]);
//!
//! let values = bag.call("values", []).unwrap().into_bag().unwrap();
//! assert_eq!(values.to_list(), Some(vec![1.into(), 2.into(), 3.into()]));
//! ```
//!
//! Failures inside an operation surface as [`BagError::Operation`], naming
//! the operation and the source location of the `call`.

mod accessors;
mod bag;
pub mod catalog;
pub mod config;
mod dispatch;
pub mod error;
pub mod naming;
mod value;

pub use accessors::{Accessors, Getter, Setter};
pub use bag::AttrBag;
pub use config::BagConfig;
pub use dispatch::{Arg, Callback};
pub use error::{BagError, OpError, Result};
pub use value::{AttrMap, AttrValue};
