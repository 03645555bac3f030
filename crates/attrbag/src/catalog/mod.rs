//! # Operation Catalog
//!
//! The fixed set of array operations a bag exposes through
//! [`AttrBag::call`](crate::AttrBag::call). Each entry pairs a canonical
//! name with a typed handler, and the handler variant decides how the
//! dispatcher marshals arguments:
//!
//! | Category | Call shape | Store access |
//! |----------|------------|--------------|
//! | `Read` | `op(store, args..)` | shared |
//! | `NeedleFirst` | `op(args[0], store, args[1..])` | shared |
//! | `Mutate` | `op(&mut store, args..)` | exclusive, committed on success |
//! | `Unsupported` | never invoked | none |
//!
//! Unsupported entries exist so those names are rejected as undefined
//! rather than misrouted: they need parameter shapes or scope access that a
//! single store argument cannot provide.
//!
//! Containers are treated with loose-typed array semantics: keys that are
//! canonical decimal integers (`"0"`, `"42"`, `"-3"`) behave as integer
//! keys and are renumbered by the operations that reindex.

mod mutate;
mod needle;
mod read;
pub(crate) mod support;

use crate::dispatch::Arg;
use crate::error::OpResult;
use crate::value::{AttrMap, AttrValue};

pub type ReadFn = fn(&AttrMap, &[Arg]) -> OpResult<AttrValue>;
pub type NeedleFn = fn(&Arg, &AttrMap, &[Arg]) -> OpResult<AttrValue>;
pub type MutateFn = fn(&mut AttrMap, &[Arg]) -> OpResult<Mutated>;

/// Outcome of a mutating operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutated {
    /// What the call returns to the caller.
    pub result: AttrValue,
    /// Whether the store was modified.
    pub changed: bool,
}

impl Mutated {
    pub fn new(result: impl Into<AttrValue>, changed: bool) -> Self {
        Self {
            result: result.into(),
            changed,
        }
    }
}

/// How an operation is called, carrying its implementation.
#[derive(Clone, Copy)]
pub enum Handler {
    Read(ReadFn),
    NeedleFirst(NeedleFn),
    Mutate(MutateFn),
    Unsupported,
}

/// Handler category without the function pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Read,
    NeedleFirst,
    Mutate,
    Unsupported,
}

/// A single catalog entry.
#[derive(Clone, Copy)]
pub struct OperationSpec {
    pub name: &'static str,
    pub handler: Handler,
}

impl OperationSpec {
    const fn read(name: &'static str, f: ReadFn) -> Self {
        Self {
            name,
            handler: Handler::Read(f),
        }
    }

    const fn needle(name: &'static str, f: NeedleFn) -> Self {
        Self {
            name,
            handler: Handler::NeedleFirst(f),
        }
    }

    const fn mutate(name: &'static str, f: MutateFn) -> Self {
        Self {
            name,
            handler: Handler::Mutate(f),
        }
    }

    const fn unsupported(name: &'static str) -> Self {
        Self {
            name,
            handler: Handler::Unsupported,
        }
    }

    pub fn kind(&self) -> OperationKind {
        match self.handler {
            Handler::Read(_) => OperationKind::Read,
            Handler::NeedleFirst(_) => OperationKind::NeedleFirst,
            Handler::Mutate(_) => OperationKind::Mutate,
            Handler::Unsupported => OperationKind::Unsupported,
        }
    }
}

impl std::fmt::Debug for OperationSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationSpec")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .finish()
    }
}

/// Registry of all array operations.
///
/// This is the single source of truth for what `call` can reach.
/// Adding an operation means adding an entry here.
pub const OPERATIONS: &[OperationSpec] = &[
    // Read-only, store first
    OperationSpec::read("count", read::count),
    OperationSpec::read("sizeof", read::count),
    OperationSpec::read("array_keys", read::keys),
    OperationSpec::read("array_values", read::values),
    OperationSpec::read("array_filter", read::filter),
    OperationSpec::read("array_reverse", read::reverse),
    OperationSpec::read("array_slice", read::slice),
    OperationSpec::read("array_sum", read::sum),
    OperationSpec::read("array_product", read::product),
    OperationSpec::read("array_unique", read::unique),
    OperationSpec::read("array_flip", read::flip),
    OperationSpec::read("array_diff", read::diff),
    OperationSpec::read("array_diff_key", read::diff_key),
    OperationSpec::read("array_diff_assoc", read::diff_assoc),
    OperationSpec::read("array_intersect", read::intersect),
    OperationSpec::read("array_intersect_key", read::intersect_key),
    OperationSpec::read("array_merge", read::merge),
    OperationSpec::read("array_replace", read::replace),
    OperationSpec::read("array_chunk", read::chunk),
    OperationSpec::read("array_pad", read::pad),
    OperationSpec::read("array_count_values", read::count_values),
    OperationSpec::read("array_key_first", read::key_first),
    OperationSpec::read("array_key_last", read::key_last),
    OperationSpec::read("array_is_list", read::is_list),
    OperationSpec::read("array_reduce", read::reduce),
    OperationSpec::read("array_change_key_case", read::change_key_case),
    OperationSpec::read("max", read::max),
    OperationSpec::read("min", read::min),
    // Needle (or callback) first, store second
    OperationSpec::needle("in_array", needle::in_array),
    OperationSpec::needle("array_search", needle::search),
    OperationSpec::needle("array_key_exists", needle::key_exists),
    OperationSpec::needle("key_exists", needle::key_exists),
    OperationSpec::needle("array_map", needle::map),
    // Mutate the store in place
    OperationSpec::mutate("sort", mutate::sort),
    OperationSpec::mutate("rsort", mutate::rsort),
    OperationSpec::mutate("asort", mutate::asort),
    OperationSpec::mutate("arsort", mutate::arsort),
    OperationSpec::mutate("ksort", mutate::ksort),
    OperationSpec::mutate("krsort", mutate::krsort),
    OperationSpec::mutate("usort", mutate::usort),
    OperationSpec::mutate("uasort", mutate::uasort),
    OperationSpec::mutate("uksort", mutate::uksort),
    OperationSpec::mutate("array_push", mutate::push),
    OperationSpec::mutate("array_pop", mutate::pop),
    OperationSpec::mutate("array_shift", mutate::shift),
    OperationSpec::mutate("array_unshift", mutate::unshift),
    OperationSpec::mutate("array_splice", mutate::splice),
    // Rejected
    OperationSpec::unsupported("array_combine"),
    OperationSpec::unsupported("array_fill"),
    OperationSpec::unsupported("array_fill_keys"),
    OperationSpec::unsupported("range"),
    OperationSpec::unsupported("list"),
    OperationSpec::unsupported("extract"),
    OperationSpec::unsupported("compact"),
    OperationSpec::unsupported("array_walk"),
    OperationSpec::unsupported("array_walk_recursive"),
];

/// Look up an operation by its canonical name.
pub fn get_operation(name: &str) -> Option<&'static OperationSpec> {
    OPERATIONS.iter().find(|op| op.name == name)
}

/// Resolve a dispatched method name: the alias `in` is membership search,
/// otherwise the name itself, otherwise `array_<name>`.
pub fn resolve(method: &str) -> Option<&'static OperationSpec> {
    if method == "in" {
        return get_operation("in_array");
    }
    get_operation(method).or_else(|| get_operation(&format!("array_{}", method)))
}

/// Names of every operation of one kind.
pub fn operations_of(kind: OperationKind) -> impl Iterator<Item = &'static str> {
    OPERATIONS
        .iter()
        .filter(move |op| op.kind() == kind)
        .map(|op| op.name)
}
