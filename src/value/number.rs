//! Parsing of the numeric and boolean typed forms from a value's serialized bytes.
//!
//! These are pure functions over `&str` with no knowledge of `Value` so they can be
//! unit tested in isolation and reused by both shimmering (`Value::as_int`) and
//! builtins that need the same coercion rules (`incr`, `expr`-adjacent comparisons).

/// Parses an integer the way the language does: optional sign, then decimal, or
/// `0x`/`0X` hex, `0o`/`0O` octal, `0b`/`0B` binary. A bare leading `0` is decimal,
/// not legacy octal — matching modern Tcl rather than C.
pub fn parse_int(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let (neg, rest) = match s.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    if rest.is_empty() {
        return None;
    }
    let (radix, digits) = if let Some(d) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        (16, d)
    } else if let Some(d) = rest.strip_prefix("0o").or_else(|| rest.strip_prefix("0O")) {
        (8, d)
    } else if let Some(d) = rest.strip_prefix("0b").or_else(|| rest.strip_prefix("0B")) {
        (2, d)
    } else {
        (10, rest)
    };
    if digits.is_empty() {
        return None;
    }
    let cleaned: String = digits.chars().filter(|&c| c != '_').collect();
    if cleaned.is_empty() || cleaned.contains("__") {
        return None;
    }
    let magnitude = i64::from_str_radix(&cleaned, radix).ok()?;
    Some(if neg { -magnitude } else { magnitude })
}

/// Parses a double using the standard floating point grammar (the host's locale and
/// exotic forms like `Inf`/`NaN` are intentionally not special-cased here — callers
/// needing those can extend this function).
pub fn parse_double(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok()
}

/// Parses a boolean the way `string is boolean` does: case-insensitive
/// `true`/`yes`/`on`/`1` and `false`/`no`/`off`/`0`.
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_and_signs() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int("-42"), Some(-42));
        assert_eq!(parse_int("+7"), Some(7));
        assert_eq!(parse_int("  9 "), Some(9));
    }

    #[test]
    fn radix_prefixes() {
        assert_eq!(parse_int("0x2A"), Some(42));
        assert_eq!(parse_int("0o52"), Some(42));
        assert_eq!(parse_int("0b101010"), Some(42));
        assert_eq!(parse_int("-0x10"), Some(-16));
    }

    #[test]
    fn leading_zero_is_decimal() {
        assert_eq!(parse_int("042"), Some(42));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_int("abc"), None);
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("4.5"), None);
    }

    #[test]
    fn doubles_and_bools() {
        assert_eq!(parse_double("3.25"), Some(3.25));
        assert_eq!(parse_bool("Yes"), Some(true));
        assert_eq!(parse_bool("OFF"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
