//! Helpers for MSBuild-style string values.
//!
//! MSBuild hands every property and metadata value over as a string. These
//! helpers give the list, boolean and blank-value conventions one home so the
//! extraction code never coerces values ad hoc.

/// Splits a `;` delimited MSBuild list, trimming entries and dropping empties.
pub fn split(value: Option<&str>) -> Vec<String> {
    split_on(value, &[';'])
}

/// Splits on any of the given separators, trimming entries and dropping empties.
pub fn split_on(value: Option<&str>, separators: &[char]) -> Vec<String> {
    match value {
        Some(value) => value
            .split(|c| separators.contains(&c))
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    }
}

/// Splits a list, returning `None` when the value is absent or holds no entries.
pub fn split_or_none(value: Option<&str>) -> Option<Vec<String>> {
    let parts = split(value);
    if parts.is_empty() {
        None
    } else {
        Some(parts)
    }
}

/// True when the value is `true` (ignoring case and surrounding whitespace).
pub fn is_true(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// True when the value is `false` (ignoring case and surrounding whitespace).
pub fn is_false(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("false"))
}

/// Like [`is_true`], but blank values fall back to `default`.
pub fn is_true_or(value: Option<&str>, default: bool) -> bool {
    match non_blank(value) {
        Some(v) => v.trim().eq_ignore_ascii_case("true"),
        None => default,
    }
}

/// Returns the value unless it is absent, empty, or whitespace.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parses `NU` log codes out of a `;` or `,` delimited list.
///
/// Anything that is not of the form `NU<digits>` is ignored, matching how
/// NuGet drops compiler codes like `CS1591` that share the `NoWarn` property.
pub fn nuget_log_codes(value: Option<&str>) -> Vec<String> {
    let mut codes: Vec<String> = Vec::new();
    for item in split_on(value, &[';', ',']) {
        let upper = item.to_ascii_uppercase();
        let is_code = upper.len() > 2
            && upper.starts_with("NU")
            && upper[2..].chars().all(|c| c.is_ascii_digit());
        if is_code && !codes.contains(&upper) {
            codes.push(upper);
        }
    }
    codes
}
