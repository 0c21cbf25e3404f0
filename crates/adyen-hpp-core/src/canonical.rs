//! Canonical signing string for HPP field signatures.
//!
//! The layout is fixed by Adyen's reference implementation: all escaped
//! names in ordinal order, then all escaped values in the same order,
//! joined by `:`. Any deviation produces signatures the remote side
//! rejects.

use crate::fields::FieldSet;

/// Escape a name or value for the signing string.
///
/// `\` must be escaped before `:` so the backslashes introduced for `:`
/// are not doubled.
#[must_use]
pub fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace(':', "\\:")
}

/// Build the signing string for `fields` restricted to `keys`.
///
/// Fields outside `keys` and fields with an empty value are left out.
/// When `escape_values` is false names and values are joined verbatim.
#[must_use]
pub fn canonicalize(fields: &FieldSet, keys: &[&str], escape_values: bool) -> String {
    // FieldSet iterates in ordinal key order already.
    let signed: Vec<(&str, &str)> = fields
        .iter()
        .filter(|(k, v)| !v.is_empty() && keys.contains(k))
        .collect();

    let encode = |s: &str| {
        if escape_values {
            escape(s)
        } else {
            s.to_string()
        }
    };

    signed
        .iter()
        .map(|(k, _)| encode(k))
        .chain(signed.iter().map(|(_, v)| encode(v)))
        .collect::<Vec<_>>()
        .join(":")
}
