use attrbag::catalog::{operations_of, OperationKind};
use attrbag::{args, Accessors, Arg, AttrBag, AttrValue, BagConfig, BagError};
use pretty_assertions::assert_eq;

fn letters() -> AttrBag {
    [("a", 3), ("b", 1), ("c", 2)].into_iter().collect()
}

fn inventory() -> AttrBag {
    let accessors = Accessors::new()
        .getter("getTotal", |store| {
            let total: i64 = store.values().filter_map(AttrValue::as_i64).sum();
            AttrValue::Int(total)
        })
        .setter("setSku", |store, value| {
            let sku = value.as_str().unwrap_or_default().to_uppercase();
            store.insert("sku".into(), sku.into());
        });
    [("apples", 4), ("pears", 6)]
        .into_iter()
        .collect::<AttrBag>()
        .with_accessors(accessors)
}

fn keys(bag: &AttrBag) -> Vec<String> {
    bag.keys().cloned().collect()
}

#[test]
fn test_accessor_round_trip() {
    let mut bag: AttrBag = [("foo_bar", 5)].into_iter().collect();
    assert_eq!(bag.call("getFooBar", []).unwrap(), AttrValue::Int(5));

    bag.call("setFooBar", args![7]).unwrap();
    assert_eq!(bag.get("foo_bar"), AttrValue::Int(7));
}

#[test]
fn test_accessor_overrides_apply_through_every_path() {
    let mut bag = inventory();
    assert_eq!(bag.get("total"), AttrValue::Int(10));
    assert_eq!(bag.call("getTotal", []).unwrap(), AttrValue::Int(10));

    bag.call("setSku", args!["ab-12"]).unwrap();
    assert_eq!(bag["sku"], AttrValue::from("AB-12"));
    bag.set("sku", "cd-34");
    assert_eq!(bag["sku"], AttrValue::from("CD-34"));
}

#[test]
fn test_sort_mutates_and_returns_success() {
    let mut bag = letters();
    assert_eq!(bag.call("asort", []).unwrap(), AttrValue::Bool(true));
    assert_eq!(keys(&bag), vec!["b", "c", "a"]);

    assert_eq!(bag.call("sort", []).unwrap(), AttrValue::Bool(true));
    assert_eq!(keys(&bag), vec!["0", "1", "2"]);
    assert!(bag.is_list());
}

#[test]
fn test_values_returns_new_bag() {
    let mut bag: AttrBag = [("a", 1), ("b", 2), ("c", 3)].into_iter().collect();
    let values = bag.call("values", []).unwrap().into_bag().unwrap();
    assert_eq!(
        values.to_list(),
        Some(vec![AttrValue::Int(1), AttrValue::Int(2), AttrValue::Int(3)])
    );
    assert_eq!(keys(&bag), vec!["a", "b", "c"]);
}

#[test]
fn test_scalar_results_are_returned_verbatim() {
    let mut bag = letters();
    assert_eq!(bag.call("count", []).unwrap(), AttrValue::Int(3));
    assert_eq!(bag.call("sum", []).unwrap(), AttrValue::Int(6));
    assert_eq!(bag.call("max", []).unwrap(), AttrValue::Int(3));
    assert_eq!(bag.call("key_first", []).unwrap(), AttrValue::from("a"));
}

#[test]
fn test_chained_operations() {
    let mut bag: AttrBag = (1..=6).map(|i| (format!("n{i}"), i)).collect();
    let mut evens = bag
        .call(
            "filter",
            [Arg::callback(|v| AttrValue::Bool(v[0].as_i64().is_some_and(|n| n % 2 == 0)))],
        )
        .unwrap()
        .into_bag()
        .unwrap();
    assert_eq!(keys(&evens), vec!["n2", "n4", "n6"]);

    let doubled = evens
        .call("map", [Arg::callback(|v| AttrValue::Int(v[0].as_i64().unwrap_or(0) * 2))])
        .unwrap()
        .into_bag()
        .unwrap();
    assert_eq!(doubled["n6"], AttrValue::Int(12));

    evens.call("push", args![8]).unwrap();
    assert_eq!(evens.len(), 4);
    assert_eq!(evens["0"], AttrValue::Int(8));
}

#[test]
fn test_queue_operations() {
    let mut bag: AttrBag = AttrBag::new();
    bag.call("push", args!["x", "y"]).unwrap();
    assert_eq!(bag.call("unshift", args!["w"]).unwrap(), AttrValue::Int(3));
    assert_eq!(bag.call("shift", []).unwrap(), AttrValue::from("w"));
    assert_eq!(bag.call("pop", []).unwrap(), AttrValue::from("y"));
    assert_eq!(bag.to_list(), Some(vec![AttrValue::from("x")]));
}

#[test]
fn test_splice_returns_removed_entries() {
    let mut bag: AttrBag = AttrBag::new();
    bag.call("push", args!["a", "b", "c", "d"]).unwrap();
    let removed = bag
        .call("splice", args![1, 2, "z"])
        .unwrap()
        .into_bag()
        .unwrap();
    assert_eq!(
        removed.to_list(),
        Some(vec![AttrValue::from("b"), AttrValue::from("c")])
    );
    assert_eq!(
        bag.to_list(),
        Some(vec![AttrValue::from("a"), AttrValue::from("z"), AttrValue::from("d")])
    );
}

#[test]
fn test_needle_first_operations() {
    let mut bag = letters();
    assert_eq!(bag.call("in", args!["2"]).unwrap(), AttrValue::Bool(true));
    assert_eq!(bag.call("in", args!["2", true]).unwrap(), AttrValue::Bool(false));
    assert_eq!(bag.call("in_array", args![3]).unwrap(), AttrValue::Bool(true));
    assert_eq!(bag.call("search", args![2]).unwrap(), AttrValue::from("c"));
    assert_eq!(bag.call("key_exists", args!["b"]).unwrap(), AttrValue::Bool(true));
}

#[test]
fn test_every_unsupported_name_is_undefined() {
    for name in operations_of(OperationKind::Unsupported) {
        let mut bag = letters();
        let short = name.strip_prefix("array_").unwrap_or(name);
        for method in [name, short] {
            let err = bag.call(method, args![1, 2, 3]).unwrap_err();
            assert!(
                matches!(err, BagError::UndefinedOperation { method: ref undefined } if undefined == method),
                "{method} should be undefined"
            );
            assert_eq!(err.to_string(), format!("Undefined {method} method"));
        }
        assert_eq!(bag, letters());
    }
}

#[test]
fn test_operation_failure_is_attributed_to_caller() {
    let mut bag: AttrBag = [("a", AttrValue::from(vec![1]))].into_iter().collect();
    let line = line!() + 1;
    let err = bag.call("unique", []).unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("array_unique(): Array to string conversion"));
    assert!(message.ends_with(&format!("dispatch_behaviour.rs:{line}")));
}

#[test]
fn test_failed_mutation_is_all_or_nothing() {
    let mut bag = letters();
    assert!(bag.call("sort", args![2, 3]).is_err());
    assert!(bag.call("splice", args!["x"]).is_err());
    assert_eq!(keys(&bag), vec!["a", "b", "c"]);
}

#[test]
fn test_rewrapped_bags_keep_config() {
    let config = BagConfig {
        accessor_dispatch: false,
        ..Default::default()
    };
    let mut bag = letters().with_config(config);
    let mut values = bag.call("values", []).unwrap().into_bag().unwrap();
    assert_eq!(values.config(), &config);
    assert!(values.call("getFooBar", []).is_err());
}
