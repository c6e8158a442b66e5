//! OS/runtime version resolution.
//!
//! [`resolve_version`] is total: for a non-empty catalog it always returns a
//! member of that catalog, stepping down through exact, major-version and
//! nearest-numeric matches before settling on the first entry.

use indexmap::IndexSet;

/// Sentinel requesting the numerically highest version.
pub const LATEST: &str = "latest";
/// Sentinel requesting the numerically lowest version.
pub const OLDEST: &str = "oldest";

/// Picks the best available version for `requested`.
///
/// Order of preference:
/// 1. `latest` / `oldest`: numeric max/min, lexical max/min when nothing parses
/// 2. an exact string match
/// 3. the same major version, preferring `"<major>.0"`, then catalog order
/// 4. the numerically nearest value, ties broken by catalog order
/// 5. the first catalog entry
///
/// Duplicates are ignored. An empty catalog yields `requested` unchanged.
///
/// ```
/// use bstack_engine::resolve_version;
///
/// assert_eq!(resolve_version("14", &["13.0", "14.0", "14.1", "15.0"]), "14.0");
/// assert_eq!(resolve_version("latest", &["9", "10", "10.5"]), "10.5");
/// ```
pub fn resolve_version<S: AsRef<str>>(requested: &str, available: &[S]) -> String {
    let unique: IndexSet<&str> = available.iter().map(AsRef::as_ref).collect();
    let Some(first) = unique.first().copied() else {
        return requested.to_string();
    };

    let wanted = requested.trim();
    if wanted.eq_ignore_ascii_case(LATEST) {
        return extreme(&unique, Extreme::Max).unwrap_or(first).to_string();
    }
    if wanted.eq_ignore_ascii_case(OLDEST) {
        return extreme(&unique, Extreme::Min).unwrap_or(first).to_string();
    }

    if let Some(exact) = unique.iter().find(|candidate| **candidate == wanted) {
        return (*exact).to_string();
    }

    let Some(target) = parse_numeric(wanted) else {
        return first.to_string();
    };

    let major = target.floor();
    let same_major: Vec<&str> = unique
        .iter()
        .copied()
        .filter(|candidate| parse_numeric(candidate).is_some_and(|value| value.floor() == major))
        .collect();
    if !same_major.is_empty() {
        let dot_zero = format!("{major:.0}.0");
        return same_major
            .iter()
            .find(|candidate| **candidate == dot_zero)
            .or_else(|| same_major.first())
            .copied()
            .unwrap_or(first)
            .to_string();
    }

    nearest(&unique, target).unwrap_or(first).to_string()
}

#[derive(Clone, Copy)]
enum Extreme {
    Max,
    Min,
}

/// Numeric max/min with the earliest entry winning ties; lexical when nothing
/// in the set parses.
fn extreme<'a>(unique: &IndexSet<&'a str>, which: Extreme) -> Option<&'a str> {
    let mut best: Option<(&str, f64)> = None;
    for candidate in unique.iter().copied() {
        let Some(value) = parse_numeric(candidate) else { continue };
        let replace = match (best, which) {
            (None, _) => true,
            (Some((_, current)), Extreme::Max) => value > current,
            (Some((_, current)), Extreme::Min) => value < current,
        };
        if replace {
            best = Some((candidate, value));
        }
    }
    if let Some((candidate, _)) = best {
        return Some(candidate);
    }

    match which {
        Extreme::Max => unique.iter().copied().max(),
        Extreme::Min => unique.iter().copied().min(),
    }
}

fn nearest<'a>(unique: &IndexSet<&'a str>, target: f64) -> Option<&'a str> {
    let mut best: Option<(&str, f64)> = None;
    for candidate in unique.iter().copied() {
        let Some(value) = parse_numeric(candidate) else { continue };
        let distance = (value - target).abs();
        if best.is_none_or(|(_, current)| distance < current) {
            best = Some((candidate, distance));
        }
    }
    best.map(|(candidate, _)| candidate)
}

/// Reads the leading decimal number of `raw`, ignoring any trailing text.
///
/// `"16.4.1"` reads as `16.4`, `"11 beta"` as `11`, `"latest"` as nothing.
pub(crate) fn parse_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let integer_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - integer_start;
    if bytes.get(end) == Some(&b'.') {
        let fraction_start = end + 1;
        let mut fraction_end = fraction_start;
        while bytes.get(fraction_end).is_some_and(u8::is_ascii_digit) {
            fraction_end += 1;
        }
        if fraction_end > fraction_start || digits > 0 {
            digits += fraction_end - fraction_start;
            end = fraction_end;
        }
    }
    if digits == 0 {
        return None;
    }
    trimmed[..end].trim_end_matches('.').parse().ok()
}
