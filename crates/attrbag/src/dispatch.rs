//! Name-based dispatch.
//!
//! [`AttrBag::call`] turns an arbitrary method name into behaviour:
//!
//! 1. `get<Upper><Rest>` / `set<Upper><Rest>` read or write the snake-cased
//!    attribute, honouring accessor overrides.
//! 2. Otherwise the name (or `array_<name>`, or the alias `in`) is looked up
//!    in the operation [`catalog`](crate::catalog). The store is handed to the
//!    operation in the position the operation expects, mutating operations
//!    update the store in place, and container results come back wrapped
//!    in a new bag of the same kind.
//! 3. Anything else, including catalog entries that cannot be expressed
//!    through this convention, is an undefined method.

use crate::bag::{indexed, AttrBag};
use crate::catalog::{self, Handler, OperationSpec};
use crate::error::{BagError, OpResult, Result};
use crate::naming::{parse_accessor, Verb};
use crate::value::{AttrMap, AttrValue};
use std::fmt;
use std::panic::Location;
use std::sync::Arc;
use tracing::debug;

/// A callback handed to a catalog operation (filter predicates, map
/// transforms, sort comparators, reducers).
pub type Callback = Arc<dyn Fn(&[AttrValue]) -> AttrValue + Send + Sync>;

/// One positional argument of a dispatched call.
#[derive(Clone)]
pub enum Arg {
    Value(AttrValue),
    Callback(Callback),
}

impl Arg {
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(&[AttrValue]) -> AttrValue + Send + Sync + 'static,
    {
        Arg::Callback(Arc::new(f))
    }

    pub fn as_value(&self) -> Option<&AttrValue> {
        match self {
            Arg::Value(v) => Some(v),
            Arg::Callback(_) => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Arg::Value(v) => v.type_name(),
            Arg::Callback(_) => "callable",
        }
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Arg::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

macro_rules! value_arg {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Arg {
                fn from(v: $ty) -> Self {
                    Arg::Value(v.into())
                }
            }
        )*
    };
}

value_arg!(AttrValue, bool, i64, i32, usize, f64, &str, String, AttrMap, AttrBag);

impl<T: Into<AttrValue>> From<Vec<T>> for Arg {
    fn from(v: Vec<T>) -> Self {
        Arg::Value(v.into())
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for Arg {
    fn from(v: Option<T>) -> Self {
        Arg::Value(v.into())
    }
}

/// Shorthand for building an argument list from mixed values.
///
/// ```
/// use attrbag::{args, Arg};
/// let list: Vec<Arg> = args![1, "two", 3.0];
/// assert_eq!(list.len(), 3);
/// ```
#[macro_export]
macro_rules! args {
    ($($arg:expr),* $(,)?) => {
        vec![$($crate::Arg::from($arg)),*]
    };
}

impl AttrBag {
    /// Dispatch `method` with positional `args`.
    ///
    /// Errors raised by a catalog operation carry the location of this
    /// call, not of the dispatcher internals.
    #[track_caller]
    pub fn call(&mut self, method: &str, args: impl IntoIterator<Item = Arg>) -> Result<AttrValue> {
        let location = Location::caller();
        let args: Vec<Arg> = args.into_iter().collect();

        if self.config().accessor_dispatch {
            if let Some((verb, attribute)) = parse_accessor(method) {
                debug!(method, attribute = %attribute, ?verb, "accessor dispatch");
                return self.call_accessor(verb, &attribute, args, location);
            }
        }

        if self.config().catalog_dispatch {
            if let Some(spec) = catalog::resolve(method) {
                return self.call_operation(method, spec, args, location);
            }
        }

        debug!(method, "undefined method");
        Err(BagError::undefined(method))
    }

    fn call_accessor(
        &mut self,
        verb: Verb,
        attribute: &str,
        args: Vec<Arg>,
        location: &'static Location<'static>,
    ) -> Result<AttrValue> {
        match verb {
            Verb::Get => Ok(self.attribute(attribute).unwrap_or_default()),
            Verb::Set => {
                let given = args.len();
                let value = args.into_iter().next().ok_or(BagError::Operation {
                    operation: "set",
                    message: format!("expects exactly 1 argument, {} given", given),
                    location,
                })?;
                let Arg::Value(value) = value else {
                    return Err(BagError::Operation {
                        operation: "set",
                        message: "a callback cannot be stored as an attribute".into(),
                        location,
                    });
                };
                self.set_attribute(attribute, value);
                Ok(AttrValue::Null)
            }
        }
    }

    fn call_operation(
        &mut self,
        method: &str,
        spec: &'static OperationSpec,
        args: Vec<Arg>,
        location: &'static Location<'static>,
    ) -> Result<AttrValue> {
        let raised = |e: crate::error::OpError| BagError::Operation {
            operation: spec.name,
            message: e.0,
            location,
        };

        let raw: OpResult<AttrValue> = match spec.handler {
            Handler::Unsupported => {
                debug!(method, operation = spec.name, "unsupported operation");
                return Err(BagError::undefined(method));
            }
            Handler::Read(f) => {
                debug!(method, operation = spec.name, "read operation");
                f(self.attributes(), &args)
            }
            Handler::NeedleFirst(f) => {
                debug!(method, operation = spec.name, "needle-first operation");
                let mut args = args.into_iter();
                let needle = args.next().ok_or_else(|| {
                    raised(crate::error::OpError::new(
                        "expects at least 2 arguments, 1 given",
                    ))
                })?;
                let rest: Vec<Arg> = args.collect();
                f(&needle, self.attributes(), &rest)
            }
            Handler::Mutate(f) => {
                // Work on a scratch copy so a failing operation leaves the
                // store as it was.
                let mut scratch = self.attributes().clone();
                let outcome = f(&mut scratch, &args).map_err(raised)?;
                debug!(
                    method,
                    operation = spec.name,
                    changed = outcome.changed,
                    "mutating operation"
                );
                if outcome.changed {
                    *self.attributes_mut() = scratch;
                }
                Ok(outcome.result)
            }
        };

        Ok(self.wrap_result(raw.map_err(raised)?))
    }

    /// Containers come back as a bag of the same kind; everything else,
    /// including bags that were stored as values, is returned verbatim.
    fn wrap_result(&self, raw: AttrValue) -> AttrValue {
        match raw {
            AttrValue::Map(map) => AttrValue::Bag(Box::new(self.rewrap(map))),
            AttrValue::List(items) => AttrValue::Bag(Box::new(self.rewrap(indexed(items)))),
            other => other,
        }
    }
}
