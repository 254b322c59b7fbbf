//! Slug derivation
//!
//! Turns a human readable value into a URL-safe identifier and builds the
//! `-2`, `-3`, ... variants used to resolve collisions. Checking which
//! variants are taken is the storage layer's job.

use once_cell::sync::Lazy;
use regex::Regex;

static SLUG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").unwrap());

/// Transliterates and lowercases `value`, joining words with `-`
///
/// # Examples
///
/// ```
/// use quillpress_core::slug::slugify;
///
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// assert_eq!(slugify("Привет мир"), "privet-mir");
/// ```
pub fn slugify(value: &str) -> String {
	slug::slugify(value)
}

/// Derives the collision-free base for a new slug
///
/// Falls back to `fallback` when `source` has nothing transliterable and
/// truncates to `max_length` without leaving a trailing separator.
pub fn base_slug(source: &str, fallback: &str, max_length: usize) -> String {
	let slug = slugify(source);
	let slug = if slug.is_empty() {
		slugify(fallback)
	} else {
		slug
	};
	truncate(&slug, max_length)
}

/// Returns the `n`th candidate for `base`: `base` itself for `n <= 1`,
/// `base-n` otherwise, shortened so the result fits `max_length`
///
/// # Examples
///
/// ```
/// use quillpress_core::slug::candidate;
///
/// assert_eq!(candidate("intro", 1, 200), "intro");
/// assert_eq!(candidate("intro", 3, 200), "intro-3");
/// assert_eq!(candidate("abcdef", 2, 6), "abcd-2");
/// ```
pub fn candidate(base: &str, n: usize, max_length: usize) -> String {
	if n <= 1 {
		return truncate(base, max_length);
	}
	let suffix = format!("-{}", n);
	let room = max_length.saturating_sub(suffix.len());
	let head = truncate(base, room);
	format!("{}{}", head, suffix)
}

/// Picks the first candidate of `base` that is not in `taken`
pub fn first_free<'a, I>(base: &str, taken: I, max_length: usize) -> String
where
	I: IntoIterator<Item = &'a str>,
{
	let taken: std::collections::HashSet<&str> = taken.into_iter().collect();
	let mut n = 1;
	loop {
		let slug = candidate(base, n, max_length);
		if !taken.contains(slug.as_str()) {
			return slug;
		}
		n += 1;
	}
}

/// Whether `value` is an acceptable explicit slug
pub fn is_valid(value: &str) -> bool {
	SLUG_RE.is_match(value)
}

fn truncate(slug: &str, max_length: usize) -> String {
	// slugify output is ASCII, so byte and char boundaries coincide
	let end = slug.len().min(max_length);
	slug[..end].trim_end_matches('-').to_string()
}
