//! Slug helpers for listing identifiers.
//!
//! Slugs are trimmed, non-empty identifiers composed of lowercase ASCII
//! letters, digits, and hyphens.

/// Maximum length of a generated slug, including the timestamp suffix.
const SLUG_MAX_LEN: usize = 64;

/// Return `true` when `value` is a valid slug.
pub(crate) fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= SLUG_MAX_LEN
        && value
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
        && !value.starts_with('-')
        && !value.ends_with('-')
}

/// Derive a slug from free text and a disambiguating numeric suffix.
///
/// Runs of non-alphanumeric characters collapse into a single hyphen; the
/// text portion is truncated so the whole slug fits [`SLUG_MAX_LEN`].
pub(crate) fn slugify_with_suffix(text: &str, suffix: i64) -> String {
    let suffix = suffix.unsigned_abs().to_string();
    let budget = SLUG_MAX_LEN.saturating_sub(suffix.len() + 1);

    let mut stem = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            stem.push(ch.to_ascii_lowercase());
        } else if !stem.is_empty() && !stem.ends_with('-') {
            stem.push('-');
        }
    }
    stem.truncate(budget);
    let stem = stem.trim_end_matches('-');

    if stem.is_empty() {
        format!("listing-{suffix}")
    } else {
        format!("{stem}-{suffix}")
    }
}
