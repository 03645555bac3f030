//! Operations whose first argument is a needle or callback, with the store
//! second.

use super::support::{callback_of, key_of, key_value, loose_eq, strict_eq, Args};
use crate::dispatch::Arg;
use crate::error::{OpError, OpResult};
use crate::value::{AttrMap, AttrValue};

fn needle_value(needle: &Arg) -> OpResult<&AttrValue> {
    needle
        .as_value()
        .ok_or_else(|| OpError::new("Argument #1 must be a value, callable given"))
}

fn find_key<'a>(needle: &AttrValue, store: &'a AttrMap, strict: bool) -> Option<&'a String> {
    store
        .iter()
        .find(|(_, v)| {
            if strict {
                strict_eq(v, needle)
            } else {
                loose_eq(v, needle)
            }
        })
        .map(|(k, _)| k)
}

pub fn in_array(needle: &Arg, store: &AttrMap, args: &[Arg]) -> OpResult<AttrValue> {
    let args = Args::after_needle(args);
    args.arity(0, Some(1))?;
    let strict = args.bool_or(0, false)?;
    let found = find_key(needle_value(needle)?, store, strict).is_some();
    Ok(AttrValue::Bool(found))
}

/// Key of the first match, or `false`.
pub fn search(needle: &Arg, store: &AttrMap, args: &[Arg]) -> OpResult<AttrValue> {
    let args = Args::after_needle(args);
    args.arity(0, Some(1))?;
    let strict = args.bool_or(0, false)?;
    Ok(find_key(needle_value(needle)?, store, strict)
        .map_or(AttrValue::Bool(false), |k| key_value(k)))
}

pub fn key_exists(needle: &Arg, store: &AttrMap, args: &[Arg]) -> OpResult<AttrValue> {
    Args::after_needle(args).arity(0, Some(0))?;
    let key = key_of(needle_value(needle)?)?;
    Ok(AttrValue::Bool(store.contains_key(&key)))
}

/// Apply a callback to the store, or zip the store with further arrays.
///
/// With the store alone the keys are preserved; with several arrays the
/// result is a sequence whose elements combine the values at each position,
/// shorter arrays padded with null. A null callback zips without
/// transforming.
pub fn map(callback: &Arg, store: &AttrMap, args: &[Arg]) -> OpResult<AttrValue> {
    let callback = match callback {
        Arg::Value(AttrValue::Null) => None,
        other => Some(callback_of(other, 1)?),
    };
    let others = Args::after_needle(args).arrays_from(0)?;

    if others.is_empty() {
        let Some(cb) = callback else {
            return Ok(AttrValue::Map(store.clone()));
        };
        let mapped = store
            .iter()
            .map(|(k, v)| (k.clone(), cb(std::slice::from_ref(v))))
            .collect();
        return Ok(AttrValue::Map(mapped));
    }

    let arrays: Vec<Vec<&AttrValue>> = std::iter::once(store)
        .chain(others.iter())
        .map(|a| a.values().collect())
        .collect();
    let longest = arrays.iter().map(Vec::len).max().unwrap_or(0);
    let rows = (0..longest)
        .map(|i| {
            let row: Vec<AttrValue> = arrays
                .iter()
                .map(|a| a.get(i).map_or(AttrValue::Null, |v| (*v).clone()))
                .collect();
            match callback {
                Some(cb) => cb(&row),
                None => AttrValue::List(row),
            }
        })
        .collect();
    Ok(AttrValue::List(rows))
}
