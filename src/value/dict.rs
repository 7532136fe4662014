//! Serialization and parsing of the `dict` typed form: a mapping from key-value
//! pair sequence (§3), whose canonical string form is a list of alternating key
//! and value elements — the same list-quoting rules from [`super::list`] apply to
//! each key and each value independently.

use super::list;
use crate::EngineError;
use indexmap::IndexMap;

/// Parses a dict-formatted string into an insertion-ordered map from key string to
/// value string. Errors if the element count is odd (not a valid key/value list).
pub fn parse(s: &str) -> Result<IndexMap<String, String>, EngineError> {
    let elements = list::parse(s)?;
    if elements.len() % 2 != 0 {
        return Err(EngineError::SyntaxError {
            message: "dict value must have an even number of elements".into(),
            line: 0,
        });
    }
    let mut map = IndexMap::with_capacity(elements.len() / 2);
    let mut it = elements.into_iter();
    while let (Some(k), Some(v)) = (it.next(), it.next()) {
        map.insert(k, v);
    }
    Ok(map)
}

/// Formats a map back into dict (alternating key/value list) syntax, preserving
/// insertion order.
pub fn format(map: &IndexMap<String, String>) -> String {
    let mut flat = Vec::with_capacity(map.len() * 2);
    for (k, v) in map {
        flat.push(k.clone());
        flat.push(v.clone());
    }
    list::format(&flat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let mut map = IndexMap::new();
        map.insert("a".to_string(), "1".to_string());
        map.insert("b".to_string(), "two words".to_string());
        let s = format(&map);
        assert_eq!(parse(&s).unwrap(), map);
    }

    #[test]
    fn odd_elements_is_error() {
        assert!(parse("a b c").is_err());
    }
}
