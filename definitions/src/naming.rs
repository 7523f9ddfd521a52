//! Unique name generation.
//!
//! Names are unique across the whole tree, so every candidate is checked
//! against the complete name index rather than against siblings.

use std::cmp::Ordering;

/// Prefix used when neither a base name nor a declaration name is usable.
pub const DEFAULT_BASE_NAME: &str = "Definition";

/// Splits `name` into its prefix and trailing run of ASCII digits.
///
/// `"Fire12"` → `("Fire", Some(12))`, `"Fire"` → `("Fire", None)`.
/// A suffix too large for `u64` is treated as part of the prefix.
pub fn split_numeric_suffix(name: &str) -> (&str, Option<u64>) {
    let prefix_len = name.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    let (prefix, digits) = name.split_at(prefix_len);
    if digits.is_empty() {
        return (name, None);
    }
    match digits.parse::<u64>() {
        Ok(n) => (prefix, Some(n)),
        Err(_) => (name, None),
    }
}

/// Returns the first name of the form `prefix + n` that `is_taken` rejects.
///
/// If `base` ends in a number `n`, counting starts at `n + 1` with the
/// non-digit part as prefix. Otherwise counting starts at `1` with `base`
/// as prefix. An empty prefix falls back to `declaration`, then to
/// `fallback`.
pub fn generate_unique_name(
    base: &str,
    declaration: &str,
    fallback: &str,
    is_taken: impl Fn(&str) -> bool,
) -> String {
    let (prefix, suffix) = split_numeric_suffix(base);
    let (prefix, mut counter) = match (prefix, suffix) {
        ("", _) if !declaration.is_empty() => (declaration, 1),
        ("", _) => (fallback, 1),
        (prefix, Some(n)) => (prefix, n.saturating_add(1)),
        (prefix, None) => (prefix, 1),
    };

    loop {
        let candidate = format!("{prefix}{counter}");
        if !is_taken(&candidate) {
            return candidate;
        }
        match counter.checked_add(1) {
            Some(next) => counter = next,
            None => {
                // Every numbered form is taken; grow the prefix and start over.
                log::warn!("Name counter for \"{prefix}\" exhausted");
                return generate_unique_name(&format!("{prefix}_"), declaration, fallback, is_taken);
            }
        }
    }
}

/// Ordering used by "sort by name": case-insensitive, ties broken by the
/// exact bytes so the result is a total order.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
