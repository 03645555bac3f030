//! Operations that only read the store.

use super::support::{
    arithmetic_operand, compare, ensure_stringable, int_key, is_string_sort, key_of, key_value,
    loose_eq, renumber, sort_comparator, strict_eq, string_of, Args, Num, SORT_STRING,
};
use crate::dispatch::Arg;
use crate::error::{OpError, OpResult};
use crate::value::{AttrMap, AttrValue};
use std::cmp::Ordering;
use std::collections::HashSet;

const COUNT_RECURSIVE: i64 = 1;
const ARRAY_FILTER_USE_BOTH: i64 = 1;
const ARRAY_FILTER_USE_KEY: i64 = 2;
const CASE_UPPER: i64 = 1;
/// Most elements a single `array_pad` may add.
const MAX_PAD: usize = 1 << 20;

pub fn count(store: &AttrMap, args: &[Arg]) -> OpResult<AttrValue> {
    let args = Args::after_store(args);
    args.arity(0, Some(1))?;
    let mode = args.int_or(0, 0)?;
    let total = if mode == COUNT_RECURSIVE {
        count_recursive(store)
    } else {
        store.len()
    };
    Ok(total.into())
}

fn count_recursive(map: &AttrMap) -> usize {
    map.values()
        .map(|v| match super::support::array_of(v) {
            Some(inner) if !matches!(v, AttrValue::Bag(_)) => 1 + count_recursive(&inner),
            _ => 1,
        })
        .sum()
}

pub fn keys(store: &AttrMap, args: &[Arg]) -> OpResult<AttrValue> {
    let args = Args::after_store(args);
    args.arity(0, Some(2))?;
    let search = args.value(0)?;
    let strict = args.bool_or(1, false)?;
    let keys = store
        .iter()
        .filter(|(_, v)| match search {
            Some(needle) if strict => strict_eq(v, needle),
            Some(needle) => loose_eq(v, needle),
            None => true,
        })
        .map(|(k, _)| key_value(k))
        .collect();
    Ok(AttrValue::List(keys))
}

pub fn values(store: &AttrMap, args: &[Arg]) -> OpResult<AttrValue> {
    Args::after_store(args).arity(0, Some(0))?;
    Ok(AttrValue::List(store.values().cloned().collect()))
}

pub fn filter(store: &AttrMap, args: &[Arg]) -> OpResult<AttrValue> {
    let args = Args::after_store(args);
    args.arity(0, Some(2))?;
    let callback = args.callback(0)?;
    let mode = args.int_or(1, 0)?;

    let mut kept = AttrMap::new();
    for (k, v) in store {
        let keep = match callback {
            None => v.is_truthy(),
            Some(cb) => match mode {
                ARRAY_FILTER_USE_KEY => cb(&[key_value(k)]),
                ARRAY_FILTER_USE_BOTH => cb(&[v.clone(), key_value(k)]),
                _ => cb(std::slice::from_ref(v)),
            }
            .is_truthy(),
        };
        if keep {
            kept.insert(k.clone(), v.clone());
        }
    }
    Ok(AttrValue::Map(kept))
}

pub fn reverse(store: &AttrMap, args: &[Arg]) -> OpResult<AttrValue> {
    let args = Args::after_store(args);
    args.arity(0, Some(1))?;
    let preserve = args.bool_or(0, false)?;
    let reversed: AttrMap = store
        .iter()
        .rev()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    Ok(AttrValue::Map(if preserve {
        reversed
    } else {
        renumber(reversed)
    }))
}

/// Start and end positions of a slice with negative offsets counted from
/// the end.
pub(crate) fn slice_bounds(len: usize, offset: i64, length: Option<i64>) -> (usize, usize) {
    let n = len as i64;
    let start = if offset < 0 {
        n.saturating_add(offset).max(0)
    } else {
        offset.min(n)
    };
    let end = match length {
        None => n,
        Some(l) if l < 0 => n.saturating_add(l).max(start),
        Some(l) => start.saturating_add(l).min(n),
    };
    (start as usize, end.max(start) as usize)
}

pub fn slice(store: &AttrMap, args: &[Arg]) -> OpResult<AttrValue> {
    let args = Args::after_store(args);
    args.arity(1, Some(3))?;
    let offset = args.int_or(0, 0)?;
    let length = args.opt_int(1)?;
    let preserve = args.bool_or(2, false)?;

    let (start, end) = slice_bounds(store.len(), offset, length);
    let sliced: AttrMap = store
        .iter()
        .skip(start)
        .take(end - start)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    Ok(AttrValue::Map(if preserve {
        sliced
    } else {
        renumber(sliced)
    }))
}

pub fn sum(store: &AttrMap, args: &[Arg]) -> OpResult<AttrValue> {
    Args::after_store(args).arity(0, Some(0))?;
    store
        .values()
        .try_fold(Num::Int(0), |acc, v| -> OpResult<Num> {
            Ok(acc.add(arithmetic_operand(v, "Addition")?))
        })
        .map(Num::into_value)
}

pub fn product(store: &AttrMap, args: &[Arg]) -> OpResult<AttrValue> {
    Args::after_store(args).arity(0, Some(0))?;
    store
        .values()
        .try_fold(Num::Int(1), |acc, v| -> OpResult<Num> {
            Ok(acc.mul(arithmetic_operand(v, "Multiplication")?))
        })
        .map(Num::into_value)
}

pub fn unique(store: &AttrMap, args: &[Arg]) -> OpResult<AttrValue> {
    let args = Args::after_store(args);
    args.arity(0, Some(1))?;
    let flags = args.int_or(0, SORT_STRING)?;

    let mut kept = AttrMap::new();
    if is_string_sort(flags) {
        ensure_stringable(store.values())?;
        let mut seen = HashSet::new();
        for (k, v) in store {
            if seen.insert(string_of(v)?) {
                kept.insert(k.clone(), v.clone());
            }
        }
    } else {
        let cmp = sort_comparator(flags);
        for (k, v) in store {
            if !kept.values().any(|seen| cmp(seen, v) == Ordering::Equal) {
                kept.insert(k.clone(), v.clone());
            }
        }
    }
    Ok(AttrValue::Map(kept))
}

pub fn flip(store: &AttrMap, args: &[Arg]) -> OpResult<AttrValue> {
    Args::after_store(args).arity(0, Some(0))?;
    let mut flipped = AttrMap::new();
    for (k, v) in store {
        match v {
            AttrValue::Int(_) | AttrValue::Str(_) => {
                flipped.insert(key_of(v)?, key_value(k));
            }
            _ => return Err(OpError::new("Can only flip string and integer values")),
        }
    }
    Ok(AttrValue::Map(flipped))
}

/// String forms of every value of every array.
fn string_set(arrays: &[AttrMap]) -> OpResult<HashSet<String>> {
    arrays
        .iter()
        .flat_map(|a| a.values())
        .map(string_of)
        .collect()
}

pub fn diff(store: &AttrMap, args: &[Arg]) -> OpResult<AttrValue> {
    let others = Args::after_store(args).arrays_from(0)?;
    let excluded = string_set(&others)?;
    let mut kept = AttrMap::new();
    for (k, v) in store {
        if !excluded.contains(&string_of(v)?) {
            kept.insert(k.clone(), v.clone());
        }
    }
    Ok(AttrValue::Map(kept))
}

pub fn diff_key(store: &AttrMap, args: &[Arg]) -> OpResult<AttrValue> {
    let others = Args::after_store(args).arrays_from(0)?;
    let kept = store
        .iter()
        .filter(|(k, _)| !others.iter().any(|o| o.contains_key(*k)))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    Ok(AttrValue::Map(kept))
}

pub fn diff_assoc(store: &AttrMap, args: &[Arg]) -> OpResult<AttrValue> {
    let others = Args::after_store(args).arrays_from(0)?;
    let mut kept = AttrMap::new();
    for (k, v) in store {
        let text = string_of(v)?;
        let mut found = false;
        for other in &others {
            if let Some(ov) = other.get(k) {
                if string_of(ov)? == text {
                    found = true;
                    break;
                }
            }
        }
        if !found {
            kept.insert(k.clone(), v.clone());
        }
    }
    Ok(AttrValue::Map(kept))
}

pub fn intersect(store: &AttrMap, args: &[Arg]) -> OpResult<AttrValue> {
    let args = Args::after_store(args);
    args.arity(1, None)?;
    let others = args.arrays_from(0)?;
    let sets = others
        .iter()
        .map(|o| string_set(std::slice::from_ref(o)))
        .collect::<OpResult<Vec<_>>>()?;
    let mut kept = AttrMap::new();
    for (k, v) in store {
        let text = string_of(v)?;
        if sets.iter().all(|set| set.contains(&text)) {
            kept.insert(k.clone(), v.clone());
        }
    }
    Ok(AttrValue::Map(kept))
}

pub fn intersect_key(store: &AttrMap, args: &[Arg]) -> OpResult<AttrValue> {
    let args = Args::after_store(args);
    args.arity(1, None)?;
    let others = args.arrays_from(0)?;
    let kept = store
        .iter()
        .filter(|(k, _)| others.iter().all(|o| o.contains_key(*k)))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    Ok(AttrValue::Map(kept))
}

pub fn merge(store: &AttrMap, args: &[Arg]) -> OpResult<AttrValue> {
    let others = Args::after_store(args).arrays_from(0)?;
    let mut merged = renumber(store.clone());
    for other in others {
        for (k, v) in other {
            if int_key(&k).is_some() {
                super::support::append(&mut merged, v)?;
            } else {
                merged.insert(k, v);
            }
        }
    }
    Ok(AttrValue::Map(merged))
}

pub fn replace(store: &AttrMap, args: &[Arg]) -> OpResult<AttrValue> {
    let others = Args::after_store(args).arrays_from(0)?;
    let mut replaced = store.clone();
    for other in others {
        replaced.extend(other);
    }
    Ok(AttrValue::Map(replaced))
}

pub fn chunk(store: &AttrMap, args: &[Arg]) -> OpResult<AttrValue> {
    let args = Args::after_store(args);
    args.arity(1, Some(2))?;
    let length = args.int_or(0, 0)?;
    if length < 1 {
        return Err(OpError::new("Argument #2 must be greater than 0"));
    }
    let preserve = args.bool_or(1, false)?;

    let entries: Vec<(&String, &AttrValue)> = store.iter().collect();
    let chunks = entries
        .chunks(usize::try_from(length).unwrap_or(usize::MAX))
        .map(|chunk| {
            if preserve {
                AttrValue::Map(
                    chunk
                        .iter()
                        .map(|(k, v)| ((*k).clone(), (*v).clone()))
                        .collect(),
                )
            } else {
                AttrValue::List(chunk.iter().map(|(_, v)| (*v).clone()).collect())
            }
        })
        .collect();
    Ok(AttrValue::List(chunks))
}

pub fn pad(store: &AttrMap, args: &[Arg]) -> OpResult<AttrValue> {
    let args = Args::after_store(args);
    args.arity(2, Some(2))?;
    let length = args.int_or(0, 0)?;
    let value = args.required(1)?;

    let target = usize::try_from(length.unsigned_abs()).unwrap_or(usize::MAX);
    if target <= store.len() {
        return Ok(AttrValue::Map(store.clone()));
    }
    if target - store.len() > MAX_PAD {
        return Err(OpError::new(
            "Argument #2 must not exceed the maximum allowed array size",
        ));
    }
    let padding = std::iter::repeat(value.clone()).take(target - store.len());
    let padded: AttrMap = if length > 0 {
        let mut padded = renumber(store.clone());
        for v in padding {
            super::support::append(&mut padded, v)?;
        }
        padded
    } else {
        let mut front: AttrMap = padding
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect();
        // Temporary keys for the store's integer entries, renumbered below.
        let mut next = front.len();
        for (k, v) in store {
            if int_key(k).is_some() {
                front.insert(next.to_string(), v.clone());
                next += 1;
            } else {
                front.insert(k.clone(), v.clone());
            }
        }
        renumber(front)
    };
    Ok(AttrValue::Map(padded))
}

pub fn count_values(store: &AttrMap, args: &[Arg]) -> OpResult<AttrValue> {
    Args::after_store(args).arity(0, Some(0))?;
    let mut counts = AttrMap::new();
    for v in store.values() {
        match v {
            AttrValue::Int(_) | AttrValue::Str(_) => {
                let entry = counts.entry(key_of(v)?).or_insert(AttrValue::Int(0));
                if let AttrValue::Int(n) = entry {
                    *n += 1;
                }
            }
            _ => return Err(OpError::new("Can only count string and integer values")),
        }
    }
    Ok(AttrValue::Map(counts))
}

pub fn key_first(store: &AttrMap, args: &[Arg]) -> OpResult<AttrValue> {
    Args::after_store(args).arity(0, Some(0))?;
    Ok(store.keys().next().map_or(AttrValue::Null, |k| key_value(k)))
}

pub fn key_last(store: &AttrMap, args: &[Arg]) -> OpResult<AttrValue> {
    Args::after_store(args).arity(0, Some(0))?;
    Ok(store.keys().next_back().map_or(AttrValue::Null, |k| key_value(k)))
}

pub fn is_list(store: &AttrMap, args: &[Arg]) -> OpResult<AttrValue> {
    Args::after_store(args).arity(0, Some(0))?;
    let listed = store
        .keys()
        .enumerate()
        .all(|(i, k)| *k == i.to_string());
    Ok(AttrValue::Bool(listed))
}

pub fn reduce(store: &AttrMap, args: &[Arg]) -> OpResult<AttrValue> {
    let args = Args::after_store(args);
    args.arity(1, Some(2))?;
    let callback = args.required_callback(0)?;
    let initial = args.value(1)?.cloned().unwrap_or_default();
    Ok(store
        .values()
        .fold(initial, |carry, v| callback(&[carry, v.clone()])))
}

pub fn change_key_case(store: &AttrMap, args: &[Arg]) -> OpResult<AttrValue> {
    let args = Args::after_store(args);
    args.arity(0, Some(1))?;
    let upper = args.int_or(0, 0)? == CASE_UPPER;
    let changed = store
        .iter()
        .map(|(k, v)| {
            let key = match int_key(k) {
                Some(_) => k.clone(),
                None if upper => k.to_uppercase(),
                None => k.to_lowercase(),
            };
            (key, v.clone())
        })
        .collect();
    Ok(AttrValue::Map(changed))
}

fn extreme(store: &AttrMap, args: &[Arg], wanted: Ordering) -> OpResult<AttrValue> {
    Args::after_store(args).arity(0, Some(0))?;
    let mut values = store.values();
    let first = values
        .next()
        .ok_or_else(|| OpError::new("Argument #1 must contain at least one element"))?;
    let best = values.fold(first, |best, v| {
        if compare(v, best) == wanted {
            v
        } else {
            best
        }
    });
    Ok(best.clone())
}

pub fn max(store: &AttrMap, args: &[Arg]) -> OpResult<AttrValue> {
    extreme(store, args, Ordering::Greater)
}

pub fn min(store: &AttrMap, args: &[Arg]) -> OpResult<AttrValue> {
    extreme(store, args, Ordering::Less)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn map<V: Into<AttrValue>>(entries: Vec<(&str, V)>) -> AttrMap {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.into()))
            .collect()
    }

    fn list<V: Into<AttrValue>>(items: Vec<V>) -> AttrMap {
        items
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v.into()))
            .collect()
    }

    fn keys_of(value: &AttrValue) -> Vec<String> {
        value.as_map().unwrap().keys().cloned().collect()
    }

    #[test]
    fn test_count_plain_and_recursive() {
        let mut store = list(vec![1, 2]);
        store.insert("inner".into(), AttrValue::from(vec![1, 2, 3]));
        assert_eq!(count(&store, &[]).unwrap(), AttrValue::Int(3));
        assert_eq!(
            count(&store, &[Arg::from(COUNT_RECURSIVE)]).unwrap(),
            AttrValue::Int(6)
        );
    }

    #[test]
    fn test_keys_with_search_value() {
        let store = map(vec![("a", "1"), ("b", "2"), ("c", "1")]);
        let all = keys(&store, &[]).unwrap();
        assert_eq!(all, AttrValue::from(vec!["a", "b", "c"]));

        let loose = keys(&store, &[Arg::from(1)]).unwrap();
        assert_eq!(loose, AttrValue::from(vec!["a", "c"]));

        let strict = keys(&store, &[Arg::from(1), Arg::from(true)]).unwrap();
        assert_eq!(strict, AttrValue::List(vec![]));
    }

    #[test]
    fn test_keys_returns_integer_keys_as_ints() {
        let store = list(vec!["x", "y"]);
        assert_eq!(keys(&store, &[]).unwrap(), AttrValue::from(vec![0, 1]));
    }

    #[test]
    fn test_values_rejects_extra_arguments() {
        let err = values(&AttrMap::new(), &[Arg::from(1)]).unwrap_err();
        assert_eq!(err.0, "expects at most 1 arguments, 2 given");
    }

    #[test]
    fn test_filter_without_callback_drops_falsy() {
        let store = map(vec![
            ("a", AttrValue::Int(0)),
            ("b", AttrValue::from("x")),
            ("c", AttrValue::Null),
            ("d", AttrValue::from("0")),
        ]);
        let kept = filter(&store, &[]).unwrap();
        assert_eq!(keys_of(&kept), vec!["b"]);
    }

    #[test]
    fn test_filter_modes() {
        let store = map(vec![("a", 1), ("bb", 2), ("ccc", 3)]);
        let by_key = Arg::callback(|args| {
            AttrValue::Bool(args[0].as_str().map_or(false, |k| k.len() > 1))
        });
        let kept = filter(&store, &[by_key, Arg::from(ARRAY_FILTER_USE_KEY)]).unwrap();
        assert_eq!(keys_of(&kept), vec!["bb", "ccc"]);

        let both = Arg::callback(|args| {
            AttrValue::Bool(args[0].as_i64() == Some(1) || args[1].as_str() == Some("ccc"))
        });
        let kept = filter(&store, &[both, Arg::from(ARRAY_FILTER_USE_BOTH)]).unwrap();
        assert_eq!(keys_of(&kept), vec!["a", "ccc"]);
    }

    #[test]
    fn test_reverse_renumbers_unless_preserved() {
        let mut store = list(vec!["x", "y"]);
        store.insert("k".into(), "z".into());
        let reversed = reverse(&store, &[]).unwrap();
        assert_eq!(keys_of(&reversed), vec!["k", "0", "1"]);
        assert_eq!(reversed.as_map().unwrap()["0"], AttrValue::from("y"));

        let kept = reverse(&store, &[Arg::from(true)]).unwrap();
        assert_eq!(keys_of(&kept), vec!["k", "1", "0"]);
    }

    #[test]
    fn test_slice_bounds_follow_negative_rules() {
        assert_eq!(slice_bounds(5, 1, Some(2)), (1, 3));
        assert_eq!(slice_bounds(5, -2, None), (3, 5));
        assert_eq!(slice_bounds(5, 1, Some(-1)), (1, 4));
        assert_eq!(slice_bounds(5, 10, None), (5, 5));
        assert_eq!(slice_bounds(5, 3, Some(-4)), (3, 3));
    }

    #[test]
    fn test_slice_bounds_saturate_at_extremes() {
        assert_eq!(slice_bounds(2, 1, Some(i64::MAX)), (1, 2));
        assert_eq!(slice_bounds(2, i64::MIN, Some(i64::MIN)), (0, 0));
        assert_eq!(slice_bounds(2, i64::MIN, None), (0, 2));
        assert_eq!(slice_bounds(2, i64::MAX, Some(i64::MAX)), (2, 2));
        assert_eq!(slice_bounds(3, 1, Some(i64::MIN)), (1, 1));
    }

    #[test]
    fn test_slice_with_extreme_arguments() {
        let store = list(vec![1, 2, 3]);
        let tail = slice(&store, &[Arg::from(1), Arg::from(i64::MAX)]).unwrap();
        assert_eq!(tail, AttrValue::Map(list(vec![2, 3])));

        let empty = slice(&store, &[Arg::from(i64::MIN), Arg::from(i64::MIN)]).unwrap();
        assert_eq!(empty, AttrValue::Map(AttrMap::new()));
    }

    #[test]
    fn test_slice_keeps_string_keys() {
        let store = map(vec![("a", 1), ("5", 2), ("c", 3)]);
        let sliced = slice(&store, &[Arg::from(1)]).unwrap();
        assert_eq!(keys_of(&sliced), vec!["0", "c"]);
    }

    #[test]
    fn test_sum_and_product() {
        let store = list(vec![
            AttrValue::Int(2),
            AttrValue::from("3"),
            AttrValue::Float(0.5),
        ]);
        assert_eq!(sum(&store, &[]).unwrap(), AttrValue::Float(5.5));
        assert_eq!(product(&store, &[]).unwrap(), AttrValue::Float(3.0));
        assert_eq!(sum(&AttrMap::new(), &[]).unwrap(), AttrValue::Int(0));
        assert_eq!(product(&AttrMap::new(), &[]).unwrap(), AttrValue::Int(1));
    }

    #[test]
    fn test_sum_rejects_arrays_and_words() {
        let store = list(vec![AttrValue::Int(1), AttrValue::from(vec![1])]);
        let err = sum(&store, &[]).unwrap_err();
        assert_eq!(err.0, "Addition is not supported on type array");

        let store = list(vec!["apples"]);
        assert!(sum(&store, &[]).is_err());
    }

    #[test]
    fn test_unique_keeps_first_occurrence() {
        let store = map(vec![
            ("a", AttrValue::Int(1)),
            ("b", AttrValue::from("1")),
            ("c", AttrValue::Int(2)),
        ]);
        let kept = unique(&store, &[]).unwrap();
        assert_eq!(keys_of(&kept), vec!["a", "c"]);
    }

    #[test]
    fn test_flip_swaps_keys_and_values() {
        let store = map(vec![("a", 1), ("b", 2)]);
        let flipped = flip(&store, &[]).unwrap();
        let flipped = flipped.as_map().unwrap();
        assert_eq!(flipped["1"], AttrValue::from("a"));
        assert_eq!(flipped["2"], AttrValue::from("b"));

        let bad = map(vec![("a", 1.5)]);
        assert!(flip(&bad, &[]).is_err());
    }

    #[test]
    fn test_diff_family() {
        let store = map(vec![("a", 1), ("b", 2), ("c", 3)]);
        let other = Arg::from(map(vec![("a", 2), ("x", 3)]));

        let by_value = diff(&store, std::slice::from_ref(&other)).unwrap();
        assert_eq!(keys_of(&by_value), vec!["a"]);

        let by_key = diff_key(&store, std::slice::from_ref(&other)).unwrap();
        assert_eq!(keys_of(&by_key), vec!["b", "c"]);

        let by_pair = diff_assoc(&store, &[Arg::from(map(vec![("a", 1), ("b", 9)]))]).unwrap();
        assert_eq!(keys_of(&by_pair), vec!["b", "c"]);
    }

    #[test]
    fn test_diff_rejects_nested_arrays() {
        let store = map(vec![("a", AttrValue::from(vec![1]))]);
        let err = diff(&store, &[Arg::from(vec![1])]).unwrap_err();
        assert_eq!(err.0, "Array to string conversion");
    }

    #[test]
    fn test_diff_requires_arrays() {
        let store = map(vec![("a", 1)]);
        let err = diff(&store, &[Arg::from(5)]).unwrap_err();
        assert_eq!(err.0, "Argument #2 must be of type array, int given");
    }

    #[test]
    fn test_intersect_family() {
        let store = map(vec![("a", 1), ("b", 2), ("c", 3)]);
        let first = Arg::from(vec![3, 2]);
        let second = Arg::from(map(vec![("b", 2), ("c", 3), ("q", 1)]));

        let by_value = intersect(&store, &[first.clone(), second.clone()]).unwrap();
        assert_eq!(keys_of(&by_value), vec!["b", "c"]);

        let by_key = intersect_key(&store, &[second]).unwrap();
        assert_eq!(keys_of(&by_key), vec!["b", "c"]);

        assert!(intersect(&store, &[]).is_err());
    }

    #[test]
    fn test_merge_appends_ints_and_overwrites_strings() {
        let mut store = list(vec!["x"]);
        store.insert("name".into(), "old".into());
        let other = map(vec![("name", "new"), ("0", "y")]);
        let merged = merge(&store, &[Arg::from(other)]).unwrap();
        let merged = merged.as_map().unwrap();
        assert_eq!(merged.keys().collect::<Vec<_>>(), vec!["0", "name", "1"]);
        assert_eq!(merged["name"], AttrValue::from("new"));
        assert_eq!(merged["1"], AttrValue::from("y"));
    }

    #[test]
    fn test_replace_overwrites_by_key() {
        let store = list(vec!["a", "b"]);
        let replaced = replace(&store, &[Arg::from(map(vec![("1", "B"), ("5", "F")]))]).unwrap();
        let replaced = replaced.as_map().unwrap();
        assert_eq!(replaced.keys().collect::<Vec<_>>(), vec!["0", "1", "5"]);
        assert_eq!(replaced["1"], AttrValue::from("B"));
    }

    #[test]
    fn test_chunk_splits_into_sequences() {
        let store = map(vec![("a", 1), ("b", 2), ("c", 3)]);
        let chunks = chunk(&store, &[Arg::from(2)]).unwrap();
        assert_eq!(
            chunks,
            AttrValue::List(vec![AttrValue::from(vec![1, 2]), AttrValue::from(vec![3])])
        );

        let preserved = chunk(&store, &[Arg::from(2), Arg::from(true)]).unwrap();
        let second = &preserved.as_list().unwrap()[1];
        assert_eq!(keys_of(second), vec!["c"]);

        assert!(chunk(&store, &[Arg::from(0)]).is_err());
    }

    #[test]
    fn test_pad_both_directions() {
        let store = list(vec![1, 2]);
        let right = pad(&store, &[Arg::from(4), Arg::from(0)]).unwrap();
        assert_eq!(right, AttrValue::Map(list(vec![1, 2, 0, 0])));

        let left = pad(&store, &[Arg::from(-3), Arg::from(0)]).unwrap();
        assert_eq!(left, AttrValue::Map(list(vec![0, 1, 2])));

        let same = pad(&store, &[Arg::from(1), Arg::from(0)]).unwrap();
        assert_eq!(same, AttrValue::Map(store));
    }

    #[test]
    fn test_pad_refuses_oversized_targets() {
        let store = list(vec![1, 2]);
        for length in [i64::MAX, i64::MIN, -(1 << 21)] {
            let err = pad(&store, &[Arg::from(length), Arg::from(0)]).unwrap_err();
            assert_eq!(
                err.to_string(),
                "Argument #2 must not exceed the maximum allowed array size"
            );
        }

        let limit = i64::try_from(MAX_PAD + 2).unwrap();
        let padded = pad(&store, &[Arg::from(limit), Arg::from(0)]).unwrap();
        assert_eq!(padded.as_map().map(AttrMap::len), Some(MAX_PAD + 2));
    }

    #[test]
    fn test_count_values_tallies() {
        let store = list(vec![AttrValue::from("a"), AttrValue::Int(1), AttrValue::from("a")]);
        let counts = count_values(&store, &[]).unwrap();
        let counts = counts.as_map().unwrap();
        assert_eq!(counts["a"], AttrValue::Int(2));
        assert_eq!(counts["1"], AttrValue::Int(1));

        let bad = list(vec![AttrValue::Null]);
        assert!(count_values(&bad, &[]).is_err());
    }

    #[test]
    fn test_first_and_last_keys() {
        let store = map(vec![("x", 1), ("7", 2)]);
        assert_eq!(key_first(&store, &[]).unwrap(), AttrValue::from("x"));
        assert_eq!(key_last(&store, &[]).unwrap(), AttrValue::Int(7));
        assert_eq!(key_first(&AttrMap::new(), &[]).unwrap(), AttrValue::Null);
    }

    #[test]
    fn test_is_list_checks_sequence() {
        assert_eq!(is_list(&list(vec![1, 2]), &[]).unwrap(), AttrValue::Bool(true));
        let store = map(vec![("1", 1), ("0", 2)]);
        assert_eq!(is_list(&store, &[]).unwrap(), AttrValue::Bool(false));
    }

    #[test]
    fn test_reduce_folds_values() {
        let store = list(vec![1, 2, 3]);
        let add = Arg::callback(|args| {
            AttrValue::Int(args[0].as_i64().unwrap_or(0) + args[1].as_i64().unwrap_or(0))
        });
        let total = reduce(&store, &[add.clone(), Arg::from(10)]).unwrap();
        assert_eq!(total, AttrValue::Int(16));
        assert!(reduce(&store, &[Arg::from(1)]).is_err());
    }

    #[test]
    fn test_change_key_case_leaves_int_keys() {
        let store = map(vec![("Name", 1), ("0", 2)]);
        let upper = change_key_case(&store, &[Arg::from(CASE_UPPER)]).unwrap();
        assert_eq!(keys_of(&upper), vec!["NAME", "0"]);
        let lower = change_key_case(&store, &[]).unwrap();
        assert_eq!(keys_of(&lower), vec!["name", "0"]);
    }

    #[test]
    fn test_max_and_min() {
        let store = list(vec![AttrValue::Int(3), AttrValue::from("10"), AttrValue::Float(2.5)]);
        assert_eq!(max(&store, &[]).unwrap(), AttrValue::from("10"));
        assert_eq!(min(&store, &[]).unwrap(), AttrValue::Float(2.5));
        let err = max(&AttrMap::new(), &[]).unwrap_err();
        assert!(err.0.contains("at least one element"));
    }
}
