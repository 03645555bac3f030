//! Case conversion for the accessor naming convention.
//!
//! `full_name` is reachable as `getFullName` / `setFullName`. The two
//! conversions are not inverses of each other: `to_camel_case` only reacts
//! to underscores and `to_snake_case` only to uppercase letters.

/// Which side of an accessor pair a method name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Set,
}

impl Verb {
    pub fn prefix(self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::Set => "set",
        }
    }
}

/// `foo_bar` -> `FooBar`: uppercase the first character of every
/// underscore-separated part and join the parts.
pub fn to_camel_case(name: &str) -> String {
    name.split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect()
}

/// `FooBar` -> `foo_bar`: prefix every uppercase letter with `_`, lowercase
/// everything, then trim underscores from both ends.
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_uppercase() {
            out.push('_');
        }
        out.extend(c.to_lowercase());
    }
    out.trim_matches('_').to_string()
}

/// Method name of the accessor for an attribute, e.g. `getFullName`.
pub fn accessor_method(verb: Verb, attribute: &str) -> String {
    format!("{}{}", verb.prefix(), to_camel_case(attribute))
}

/// Split `getFooBar` / `setFooBar` into the verb and the snake-cased
/// attribute name.
///
/// The character after the verb must be uppercase and at least one more
/// character must follow it, so `getA` and `getter` are not accessors.
pub fn parse_accessor(method: &str) -> Option<(Verb, String)> {
    let (verb, rest) = if let Some(rest) = method.strip_prefix("get") {
        (Verb::Get, rest)
    } else if let Some(rest) = method.strip_prefix("set") {
        (Verb::Set, rest)
    } else {
        return None;
    };

    let mut chars = rest.chars();
    let first = chars.next()?;
    if !first.is_uppercase() || chars.next().is_none() {
        return None;
    }
    Some((verb, to_snake_case(rest)))
}
