//! Operations that modify the store in place.
//!
//! Each handler builds the next state of the store and reports whether it
//! differs from the current one.

use super::read::slice_bounds;
use super::support::{
    append, array_of, compare, ensure_stringable, int_key, is_string_sort, key_value,
    merge_sort_by, ordering_of, sort_comparator, Args, SORT_REGULAR,
};
use super::Mutated;
use crate::dispatch::{Arg, Callback};
use crate::error::OpResult;
use crate::value::{AttrMap, AttrValue};
use std::cmp::Ordering;

/// Replace the store with `next` when it differs.
fn apply(store: &mut AttrMap, next: AttrMap, result: impl Into<AttrValue>) -> Mutated {
    let changed = !store.iter().eq(next.iter());
    if changed {
        *store = next;
    }
    Mutated::new(result, changed)
}

/// Rebuild a store from slots: `Some(key)` keeps a string key, `None`
/// takes the next integer key.
fn from_slots(slots: impl IntoIterator<Item = (Option<String>, AttrValue)>) -> AttrMap {
    let mut next = 0i64;
    slots
        .into_iter()
        .map(|(key, value)| match key {
            Some(key) => (key, value),
            None => {
                let key = next.to_string();
                next += 1;
                (key, value)
            }
        })
        .collect()
}

fn slot(key: &str, value: AttrValue) -> (Option<String>, AttrValue) {
    match int_key(key) {
        Some(_) => (None, value),
        None => (Some(key.to_string()), value),
    }
}

fn entries(store: &AttrMap) -> Vec<(String, AttrValue)> {
    store
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn flagged_comparator(
    store: &AttrMap,
    args: &Args,
) -> OpResult<fn(&AttrValue, &AttrValue) -> Ordering> {
    args.arity(0, Some(1))?;
    let flags = args.int_or(0, SORT_REGULAR)?;
    if is_string_sort(flags) {
        ensure_stringable(store.values())?;
    }
    Ok(sort_comparator(flags))
}

fn user_comparator(cb: &Callback) -> impl Fn(&AttrValue, &AttrValue) -> Ordering + '_ {
    move |a, b| ordering_of(&cb(&[a.clone(), b.clone()][..]))
}

fn sorted_values(
    store: &AttrMap,
    cmp: impl Fn(&AttrValue, &AttrValue) -> Ordering,
) -> AttrMap {
    let values: Vec<AttrValue> = store.values().cloned().collect();
    merge_sort_by(values, &cmp)
        .into_iter()
        .enumerate()
        .map(|(i, v)| (i.to_string(), v))
        .collect()
}

fn sorted_entries(
    store: &AttrMap,
    cmp: impl Fn(&(String, AttrValue), &(String, AttrValue)) -> Ordering,
) -> AttrMap {
    merge_sort_by(entries(store), &cmp).into_iter().collect()
}

pub fn sort(store: &mut AttrMap, args: &[Arg]) -> OpResult<Mutated> {
    let cmp = flagged_comparator(store, &Args::after_store(args))?;
    let next = sorted_values(store, cmp);
    Ok(apply(store, next, true))
}

pub fn rsort(store: &mut AttrMap, args: &[Arg]) -> OpResult<Mutated> {
    let cmp = flagged_comparator(store, &Args::after_store(args))?;
    let next = sorted_values(store, |a, b| cmp(b, a));
    Ok(apply(store, next, true))
}

pub fn asort(store: &mut AttrMap, args: &[Arg]) -> OpResult<Mutated> {
    let cmp = flagged_comparator(store, &Args::after_store(args))?;
    let next = sorted_entries(store, |a, b| cmp(&a.1, &b.1));
    Ok(apply(store, next, true))
}

pub fn arsort(store: &mut AttrMap, args: &[Arg]) -> OpResult<Mutated> {
    let cmp = flagged_comparator(store, &Args::after_store(args))?;
    let next = sorted_entries(store, |a, b| cmp(&b.1, &a.1));
    Ok(apply(store, next, true))
}

pub fn ksort(store: &mut AttrMap, args: &[Arg]) -> OpResult<Mutated> {
    Args::after_store(args).arity(0, Some(1))?;
    let next = sorted_entries(store, |a, b| compare(&key_value(&a.0), &key_value(&b.0)));
    Ok(apply(store, next, true))
}

pub fn krsort(store: &mut AttrMap, args: &[Arg]) -> OpResult<Mutated> {
    Args::after_store(args).arity(0, Some(1))?;
    let next = sorted_entries(store, |a, b| compare(&key_value(&b.0), &key_value(&a.0)));
    Ok(apply(store, next, true))
}

pub fn usort(store: &mut AttrMap, args: &[Arg]) -> OpResult<Mutated> {
    let args = Args::after_store(args);
    args.arity(1, Some(1))?;
    let cmp = user_comparator(args.required_callback(0)?);
    let next = sorted_values(store, cmp);
    Ok(apply(store, next, true))
}

pub fn uasort(store: &mut AttrMap, args: &[Arg]) -> OpResult<Mutated> {
    let args = Args::after_store(args);
    args.arity(1, Some(1))?;
    let cmp = user_comparator(args.required_callback(0)?);
    let next = sorted_entries(store, |a, b| cmp(&a.1, &b.1));
    Ok(apply(store, next, true))
}

pub fn uksort(store: &mut AttrMap, args: &[Arg]) -> OpResult<Mutated> {
    let args = Args::after_store(args);
    args.arity(1, Some(1))?;
    let cmp = user_comparator(args.required_callback(0)?);
    let next = sorted_entries(store, |a, b| cmp(&key_value(&a.0), &key_value(&b.0)));
    Ok(apply(store, next, true))
}

/// Append values; returns the new element count.
pub fn push(store: &mut AttrMap, args: &[Arg]) -> OpResult<Mutated> {
    let values = Args::after_store(args).values_from(0)?;
    let changed = !values.is_empty();
    for value in values {
        append(store, value)?;
    }
    Ok(Mutated::new(store.len(), changed))
}

/// Remove and return the last value (null when empty).
pub fn pop(store: &mut AttrMap, args: &[Arg]) -> OpResult<Mutated> {
    Args::after_store(args).arity(0, Some(0))?;
    Ok(match store.pop() {
        Some((_, value)) => Mutated::new(value, true),
        None => Mutated::new(AttrValue::Null, false),
    })
}

/// Remove and return the first value, renumbering integer keys.
pub fn shift(store: &mut AttrMap, args: &[Arg]) -> OpResult<Mutated> {
    Args::after_store(args).arity(0, Some(0))?;
    if store.is_empty() {
        return Ok(Mutated::new(AttrValue::Null, false));
    }
    let mut rest = entries(store).into_iter();
    let first = rest.next().map(|(_, v)| v).unwrap_or_default();
    let next = from_slots(rest.map(|(k, v)| slot(&k, v)));
    *store = next;
    Ok(Mutated::new(first, true))
}

/// Prepend values; returns the new element count.
pub fn unshift(store: &mut AttrMap, args: &[Arg]) -> OpResult<Mutated> {
    let values = Args::after_store(args).values_from(0)?;
    let next = from_slots(
        values
            .into_iter()
            .map(|v| (None, v))
            .chain(store.iter().map(|(k, v)| slot(k, v.clone()))),
    );
    let count = next.len();
    Ok(apply(store, next, count))
}

/// Remove a range and insert replacements in its place; returns the
/// removed values.
pub fn splice(store: &mut AttrMap, args: &[Arg]) -> OpResult<Mutated> {
    let args = Args::after_store(args);
    args.arity(1, Some(3))?;
    let offset = args.int_or(0, 0)?;
    let length = args.opt_int(1)?;
    let replacement: Vec<AttrValue> = match args.value(2)? {
        None | Some(AttrValue::Null) => Vec::new(),
        Some(v) => match array_of(v) {
            Some(items) => items.into_values().collect(),
            None => vec![v.clone()],
        },
    };

    let (start, end) = slice_bounds(store.len(), offset, length);
    let all = entries(store);
    let mut removed = AttrMap::new();
    let mut slots = Vec::with_capacity(all.len() + replacement.len());
    for (i, (k, v)) in all.into_iter().enumerate() {
        if i == start {
            slots.extend(replacement.iter().cloned().map(|v| (None, v)));
        }
        if (start..end).contains(&i) {
            if int_key(&k).is_some() {
                append(&mut removed, v)?;
            } else {
                removed.insert(k, v);
            }
        } else {
            slots.push(slot(&k, v));
        }
    }
    if start >= store.len() {
        slots.extend(replacement.into_iter().map(|v| (None, v)));
    }

    let next = from_slots(slots);
    Ok(apply(store, next, AttrValue::Map(removed)))
}
