//! Shared helpers for catalog handlers: argument access, key handling and
//! loose-typed comparison.

use crate::bag::indexed;
use crate::dispatch::{Arg, Callback};
use crate::error::{OpError, OpResult};
use crate::value::{AttrMap, AttrValue};
use std::cmp::Ordering;

pub const SORT_REGULAR: i64 = 0;
pub const SORT_NUMERIC: i64 = 1;
pub const SORT_STRING: i64 = 2;
pub const SORT_FLAG_CASE: i64 = 8;

// --- Arguments ---

/// The caller-supplied arguments of a handler, numbered the way the full
/// call counts them (the store and the needle take the first positions).
pub struct Args<'a> {
    args: &'a [Arg],
    base: usize,
}

impl<'a> Args<'a> {
    /// Arguments that follow the store: `args[0]` is argument #2.
    pub fn after_store(args: &'a [Arg]) -> Self {
        Self { args, base: 2 }
    }

    /// Arguments that follow the needle and the store: `args[0]` is #3.
    pub fn after_needle(args: &'a [Arg]) -> Self {
        Self { args, base: 3 }
    }

    pub fn position(&self, i: usize) -> usize {
        self.base + i
    }

    /// Check the number of caller-supplied arguments.
    pub fn arity(&self, min: usize, max: Option<usize>) -> OpResult<()> {
        let implicit = self.base - 1;
        let given = self.args.len() + implicit;
        if self.args.len() < min {
            return Err(OpError::new(format!(
                "expects at least {} arguments, {} given",
                min + implicit,
                given
            )));
        }
        if let Some(max) = max.filter(|max| self.args.len() > *max) {
            return Err(OpError::new(format!(
                "expects at most {} arguments, {} given",
                max + implicit,
                given
            )));
        }
        Ok(())
    }

    /// Value at `i`, `None` when absent.
    pub fn value(&self, i: usize) -> OpResult<Option<&'a AttrValue>> {
        match self.args.get(i) {
            None => Ok(None),
            Some(Arg::Value(v)) => Ok(Some(v)),
            Some(Arg::Callback(_)) => Err(OpError::new(format!(
                "Argument #{} must be a value, callable given",
                self.position(i)
            ))),
        }
    }

    pub fn required(&self, i: usize) -> OpResult<&'a AttrValue> {
        self.value(i)?.ok_or_else(|| {
            OpError::new(format!("Argument #{} is required", self.position(i)))
        })
    }

    /// Array at `i`; sequences, mappings and bags all qualify.
    pub fn array(&self, i: usize) -> OpResult<AttrMap> {
        let value = self.required(i)?;
        array_of(value).ok_or_else(|| type_error(self.position(i), "array", value.type_name()))
    }

    /// Every argument from `from` on, as arrays.
    pub fn arrays_from(&self, from: usize) -> OpResult<Vec<AttrMap>> {
        (from..self.args.len()).map(|i| self.array(i)).collect()
    }

    pub fn int_or(&self, i: usize, default: i64) -> OpResult<i64> {
        Ok(self.opt_int(i)?.unwrap_or(default))
    }

    /// Integer at `i`; absent or null gives `None`.
    pub fn opt_int(&self, i: usize) -> OpResult<Option<i64>> {
        match self.value(i)? {
            None | Some(AttrValue::Null) => Ok(None),
            Some(v) => int_of(v)
                .map(Some)
                .ok_or_else(|| type_error(self.position(i), "int", v.type_name())),
        }
    }

    pub fn bool_or(&self, i: usize, default: bool) -> OpResult<bool> {
        match self.value(i)? {
            None => Ok(default),
            Some(v) if v.is_container() || v.as_bag().is_some() => {
                Err(type_error(self.position(i), "bool", v.type_name()))
            }
            Some(v) => Ok(v.is_truthy()),
        }
    }

    /// Callback at `i`; absent or null gives `None`.
    pub fn callback(&self, i: usize) -> OpResult<Option<&'a Callback>> {
        match self.args.get(i) {
            None | Some(Arg::Value(AttrValue::Null)) => Ok(None),
            Some(arg) => callback_of(arg, self.position(i)).map(Some),
        }
    }

    pub fn required_callback(&self, i: usize) -> OpResult<&'a Callback> {
        match self.args.get(i) {
            Some(arg) => callback_of(arg, self.position(i)),
            None => Err(OpError::new(format!(
                "Argument #{} must be a valid callback, none given",
                self.position(i)
            ))),
        }
    }

    /// Arguments from `from` on as plain values.
    pub fn values_from(&self, from: usize) -> OpResult<Vec<AttrValue>> {
        (from..self.args.len())
            .map(|i| self.required(i).cloned())
            .collect()
    }
}

pub fn callback_of(arg: &Arg, position: usize) -> OpResult<&Callback> {
    match arg {
        Arg::Callback(cb) => Ok(cb),
        Arg::Value(v) => Err(OpError::new(format!(
            "Argument #{} must be a valid callback, {} given",
            position,
            v.type_name()
        ))),
    }
}

pub fn type_error(position: usize, expected: &str, given: &str) -> OpError {
    OpError::new(format!(
        "Argument #{} must be of type {}, {} given",
        position, expected, given
    ))
}

// --- Values ---

/// View any container value as an array.
pub fn array_of(value: &AttrValue) -> Option<AttrMap> {
    match value {
        AttrValue::Map(map) => Some(map.clone()),
        AttrValue::List(items) => Some(indexed(items.clone())),
        AttrValue::Bag(bag) => Some(bag.attributes().clone()),
        _ => None,
    }
}

fn int_of(value: &AttrValue) -> Option<i64> {
    match value {
        AttrValue::Int(v) => Some(*v),
        AttrValue::Bool(v) => Some(i64::from(*v)),
        AttrValue::Float(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
        AttrValue::Str(s) => match numeric_str(s)? {
            Num::Int(v) => Some(v),
            Num::Float(_) => None,
        },
        _ => None,
    }
}

/// A numeric view of a value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    pub fn as_f64(self) -> f64 {
        match self {
            Num::Int(v) => v as f64,
            Num::Float(v) => v,
        }
    }

    pub fn into_value(self) -> AttrValue {
        match self {
            Num::Int(v) => AttrValue::Int(v),
            Num::Float(v) => AttrValue::Float(v),
        }
    }

    fn cmp(self, other: Num) -> Option<Ordering> {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }

    pub fn add(self, other: Num) -> Num {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) => a.checked_add(b).map_or(Num::Float(a as f64 + b as f64), Num::Int),
            (a, b) => Num::Float(a.as_f64() + b.as_f64()),
        }
    }

    pub fn mul(self, other: Num) -> Num {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) => a.checked_mul(b).map_or(Num::Float(a as f64 * b as f64), Num::Int),
            (a, b) => Num::Float(a.as_f64() * b.as_f64()),
        }
    }
}

/// Parse a numeric string: optional surrounding whitespace, optional sign,
/// digits with an optional fraction and exponent.
pub fn numeric_str(s: &str) -> Option<Num> {
    let t = s.trim_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c'));
    if t.is_empty()
        || !t.chars().any(|c| c.is_ascii_digit())
        || !t
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return None;
    }
    if !t.contains(['.', 'e', 'E']) {
        if let Ok(v) = t.parse::<i64>() {
            return Some(Num::Int(v));
        }
    }
    t.parse::<f64>().ok().map(Num::Float)
}

/// Numeric view for arithmetic and comparison; strings must be fully numeric.
pub fn number_of(value: &AttrValue) -> Option<Num> {
    match value {
        AttrValue::Int(v) => Some(Num::Int(*v)),
        AttrValue::Float(v) => Some(Num::Float(*v)),
        AttrValue::Str(s) => numeric_str(s),
        _ => None,
    }
}

/// Operand for `array_sum` / `array_product`.
pub fn arithmetic_operand(value: &AttrValue, op: &str) -> OpResult<Num> {
    match value {
        AttrValue::Null => Ok(Num::Int(0)),
        AttrValue::Bool(v) => Ok(Num::Int(i64::from(*v))),
        AttrValue::Str(s) => {
            numeric_str(s).ok_or_else(|| OpError::new("A non-numeric value encountered"))
        }
        AttrValue::List(_) | AttrValue::Map(_) | AttrValue::Bag(_) => Err(OpError::new(format!(
            "{} is not supported on type {}",
            op,
            value.type_name()
        ))),
        other => number_of(other).ok_or_else(|| OpError::new("A non-numeric value encountered")),
    }
}

/// Render a float the way loose-typed string conversion does.
pub fn float_to_string(v: f64) -> String {
    if v.is_nan() {
        "NAN".to_string()
    } else if v.is_infinite() {
        let sign = if v > 0.0 { "" } else { "-" };
        format!("{}INF", sign)
    } else if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

/// String conversion of a scalar. Containers cannot be converted.
pub fn string_of(value: &AttrValue) -> OpResult<String> {
    match value {
        AttrValue::Null => Ok(String::new()),
        AttrValue::Bool(true) => Ok("1".to_string()),
        AttrValue::Bool(false) => Ok(String::new()),
        AttrValue::Int(v) => Ok(v.to_string()),
        AttrValue::Float(v) => Ok(float_to_string(*v)),
        AttrValue::Str(s) => Ok(s.clone()),
        AttrValue::List(_) | AttrValue::Map(_) | AttrValue::Bag(_) => {
            Err(OpError::new("Array to string conversion"))
        }
    }
}

/// Fail when any value cannot be converted to a string.
pub fn ensure_stringable<'v>(values: impl IntoIterator<Item = &'v AttrValue>) -> OpResult<()> {
    values.into_iter().try_for_each(|v| string_of(v).map(drop))
}

// --- Keys ---

/// A key that is a canonical decimal integer (`"0"`, `"17"`, `"-3"`, but
/// not `"07"`, `"+1"` or `"-0"`).
pub fn int_key(key: &str) -> Option<i64> {
    let digits = key.strip_prefix('-').unwrap_or(key);
    let canonical = !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit())
        && (digits == "0" || !digits.starts_with('0'))
        && key != "-0";
    if canonical {
        key.parse().ok()
    } else {
        None
    }
}

/// A key as a value: integer keys become `Int`.
pub fn key_value(key: &str) -> AttrValue {
    match int_key(key) {
        Some(v) => AttrValue::Int(v),
        None => AttrValue::Str(key.to_string()),
    }
}

/// Normalize a value used as a key.
pub fn key_of(value: &AttrValue) -> OpResult<String> {
    match value {
        AttrValue::Int(v) => Ok(v.to_string()),
        AttrValue::Str(s) => Ok(s.clone()),
        AttrValue::Bool(v) => Ok(i64::from(*v).to_string()),
        AttrValue::Null => Ok(String::new()),
        AttrValue::Float(v) => Ok((v.trunc() as i64).to_string()),
        other => Err(OpError::new(format!(
            "Cannot access offset of type {} on array",
            other.type_name()
        ))),
    }
}

/// Renumber integer keys from 0, keeping string keys.
pub fn renumber(map: AttrMap) -> AttrMap {
    let mut next = 0i64;
    map.into_iter()
        .map(|(k, v)| {
            if int_key(&k).is_some() {
                let key = next.to_string();
                next += 1;
                (key, v)
            } else {
                (k, v)
            }
        })
        .collect()
}

/// The key an appended element receives.
pub fn next_index(map: &AttrMap) -> OpResult<i64> {
    match map.keys().filter_map(|k| int_key(k)).max() {
        None => Ok(0),
        Some(max) => max.checked_add(1).ok_or_else(|| {
            OpError::new("Cannot add element to the array as the next element is already occupied")
        }),
    }
}

/// Append with the next integer key.
pub fn append(map: &mut AttrMap, value: AttrValue) -> OpResult<()> {
    let key = next_index(map)?.to_string();
    map.insert(key, value);
    Ok(())
}

// --- Comparison ---

fn compare_strings(a: &str, b: &str) -> Ordering {
    match (numeric_str(a), numeric_str(b)) {
        (Some(x), Some(y)) => x.cmp(y).unwrap_or(Ordering::Greater),
        _ => a.cmp(b),
    }
}

fn compare_arrays(a: &AttrMap, b: &AttrMap) -> Ordering {
    if a.len() != b.len() {
        return a.len().cmp(&b.len());
    }
    for (k, va) in a {
        let Some(vb) = b.get(k) else {
            // Uncomparable
            return Ordering::Greater;
        };
        match compare(va, vb) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// Loose-typed three-way comparison.
///
/// - null vs string compares `""` with the string
/// - bool or null vs anything compares truthiness
/// - two numeric strings compare as numbers, other strings bytewise
/// - number vs numeric string compares numerically, vs any other string
///   compares the number's string form
/// - arrays compare by size, then value by value; an array is greater
///   than any scalar
pub fn compare(a: &AttrValue, b: &AttrValue) -> Ordering {
    use AttrValue::*;
    match (a, b) {
        (Null, Str(s)) => compare_strings("", s),
        (Str(s), Null) => compare_strings(s, ""),
        (Null | Bool(_), _) | (_, Null | Bool(_)) => a.is_truthy().cmp(&b.is_truthy()),
        (Str(x), Str(y)) => compare_strings(x, y),
        (Int(_) | Float(_), Str(s)) => match (number_of(a), numeric_str(s)) {
            (Some(x), Some(y)) => x.cmp(y).unwrap_or(Ordering::Greater),
            _ => string_of(a).map_or(Ordering::Greater, |x| x.as_str().cmp(s.as_str())),
        },
        (Str(_), Int(_) | Float(_)) => compare(b, a).reverse(),
        (Int(_) | Float(_), Int(_) | Float(_)) => match (number_of(a), number_of(b)) {
            (Some(x), Some(y)) => x.cmp(y).unwrap_or(Ordering::Greater),
            _ => Ordering::Greater,
        },
        _ => match (array_of(a), array_of(b)) {
            (Some(x), Some(y)) => compare_arrays(&x, &y),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        },
    }
}

/// Loose equality (`==`).
pub fn loose_eq(a: &AttrValue, b: &AttrValue) -> bool {
    let nan = |v: &AttrValue| matches!(v, AttrValue::Float(f) if f.is_nan());
    !nan(a) && !nan(b) && compare(a, b) == Ordering::Equal
}

/// Strict equality (`===`): same type and value; arrays must match
/// key by key in the same order.
pub fn strict_eq(a: &AttrValue, b: &AttrValue) -> bool {
    use AttrValue::*;
    match (a, b) {
        (Null, Null) => true,
        (Bool(x), Bool(y)) => x == y,
        (Int(x), Int(y)) => x == y,
        (Float(x), Float(y)) => x == y,
        (Str(x), Str(y)) => x == y,
        (List(_) | Map(_) | Bag(_), List(_) | Map(_) | Bag(_)) => {
            match (array_of(a), array_of(b)) {
                (Some(x), Some(y)) => {
                    x.len() == y.len()
                        && x.iter()
                            .zip(y.iter())
                            .all(|((ka, va), (kb, vb))| ka == kb && strict_eq(va, vb))
                }
                _ => false,
            }
        }
        _ => false,
    }
}

/// Comparator for the sort family's flags argument.
pub fn sort_comparator(flags: i64) -> fn(&AttrValue, &AttrValue) -> Ordering {
    match flags {
        SORT_NUMERIC => |a, b| {
            let x = number_of(a).map_or(0.0, Num::as_f64);
            let y = number_of(b).map_or(0.0, Num::as_f64);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        },
        SORT_STRING => |a, b| lossy_string(a).cmp(&lossy_string(b)),
        f if f == SORT_STRING | SORT_FLAG_CASE => {
            |a, b| lossy_string(a).to_lowercase().cmp(&lossy_string(b).to_lowercase())
        }
        _ => compare,
    }
}

/// Whether a sort flag compares values as strings.
pub fn is_string_sort(flags: i64) -> bool {
    flags & !SORT_FLAG_CASE == SORT_STRING
}

fn lossy_string(value: &AttrValue) -> String {
    string_of(value).unwrap_or_else(|_| "Array".to_string())
}

/// Stable merge sort.
///
/// Accepts comparators that are not a total order (loose comparison with
/// NaN or mixed strings, arbitrary user callbacks) and always returns a
/// permutation of `items`.
pub fn merge_sort_by<T, F>(mut items: Vec<T>, cmp: &F) -> Vec<T>
where
    F: Fn(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return items;
    }
    let right = items.split_off(items.len() / 2);
    let left = merge_sort_by(items, cmp);
    let right = merge_sort_by(right, cmp);

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    while let (Some(l), Some(r)) = (left.peek(), right.peek()) {
        let take_right = cmp(r, l) == Ordering::Less;
        if take_right {
            merged.extend(right.next());
        } else {
            merged.extend(left.next());
        }
    }
    merged.extend(left);
    merged.extend(right);
    merged
}

/// Interpret a comparator callback's return value.
pub fn ordering_of(value: &AttrValue) -> Ordering {
    match value {
        AttrValue::Int(v) => v.cmp(&0),
        AttrValue::Float(v) => v.partial_cmp(&0.0).unwrap_or(Ordering::Equal),
        AttrValue::Bool(true) => Ordering::Greater,
        AttrValue::Str(s) => match numeric_str(s) {
            Some(n) => n.as_f64().partial_cmp(&0.0).unwrap_or(Ordering::Equal),
            None => Ordering::Equal,
        },
        _ => Ordering::Equal,
    }
}
