//! Weighted full-text ranking
//!
//! Documents are split into weighted fields (title `A`, body `B`, ...).
//! For every distinct query term each field contributes a saturating
//! term-frequency score `tf / (tf + 0.5)` scaled by the field weight; the
//! contributions combine as `1 - Π(1 - wᵢ·sᵢ)` and the document rank is the
//! mean over query terms. Ranks fall in `[0, 1]` and a title hit always
//! outranks a body-only hit with the same frequency.
//!
//! # Examples
//!
//! ```
//! use quillpress_core::search::{SearchQuery, SearchVector, Weight};
//!
//! let query = SearchQuery::parse("rust");
//! let title_hit = SearchVector::new()
//! 	.field("Rust Basics", Weight::A)
//! 	.field("An introduction", Weight::B);
//! let body_hit = SearchVector::new()
//! 	.field("Systems programming", Weight::A)
//! 	.field("Rust is fast", Weight::B);
//!
//! assert!(title_hit.rank(&query) > body_hit.rank(&query));
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Minimum rank a document needs to appear in results
pub const DEFAULT_MIN_RANK: f64 = 0.3;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

/// Field weight classes, highest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weight {
	A,
	B,
	C,
	D,
}

impl Weight {
	pub fn value(self) -> f64 {
		match self {
			Weight::A => 1.0,
			Weight::B => 0.4,
			Weight::C => 0.2,
			Weight::D => 0.1,
		}
	}
}

/// Distinct lowercase terms of a user query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
	raw: String,
	terms: Vec<String>,
}

impl SearchQuery {
	pub fn parse(raw: &str) -> Self {
		let mut terms: Vec<String> = Vec::new();
		for term in tokenize(raw) {
			if !terms.contains(&term) {
				terms.push(term);
			}
		}
		Self {
			raw: raw.trim().to_string(),
			terms,
		}
	}

	pub fn raw(&self) -> &str {
		&self.raw
	}

	pub fn terms(&self) -> &[String] {
		&self.terms
	}

	pub fn is_empty(&self) -> bool {
		self.terms.is_empty()
	}
}

#[derive(Debug, Clone)]
struct WeightedField {
	weight: Weight,
	frequencies: HashMap<String, usize>,
}

/// Tokenized document fields with their weights
#[derive(Debug, Clone, Default)]
pub struct SearchVector {
	fields: Vec<WeightedField>,
}

impl SearchVector {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a plain-text field
	pub fn field(mut self, text: &str, weight: Weight) -> Self {
		let mut frequencies = HashMap::new();
		for term in tokenize(text) {
			*frequencies.entry(term).or_insert(0) += 1;
		}
		self.fields.push(WeightedField {
			weight,
			frequencies,
		});
		self
	}

	/// Adds a rich-text field, ignoring markup
	pub fn html_field(self, html: &str, weight: Weight) -> Self {
		self.field(&strip_tags(html), weight)
	}

	/// Rank of this document for `query`, `0.0` for an empty query
	pub fn rank(&self, query: &SearchQuery) -> f64 {
		if query.is_empty() {
			return 0.0;
		}
		let total: f64 = query
			.terms()
			.iter()
			.map(|term| self.term_score(term))
			.sum();
		total / query.terms().len() as f64
	}

	fn term_score(&self, term: &str) -> f64 {
		let miss: f64 = self
			.fields
			.iter()
			.map(|field| {
				let tf = field.frequencies.get(term).copied().unwrap_or(0) as f64;
				let saturated = tf / (tf + 0.5);
				1.0 - field.weight.value() * saturated
			})
			.product();
		1.0 - miss
	}
}

/// Lowercase alphanumeric terms of `text`
pub fn tokenize(text: &str) -> Vec<String> {
	text.split(|c: char| !c.is_alphanumeric())
		.filter(|word| !word.is_empty())
		.map(str::to_lowercase)
		.collect()
}

/// Removes markup and decodes the common entities
pub fn strip_tags(html: &str) -> String {
	TAG_RE
		.replace_all(html, " ")
		.replace("&nbsp;", " ")
		.replace("&lt;", "<")
		.replace("&gt;", ">")
		.replace("&quot;", "\"")
		.replace("&#39;", "'")
		.replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn post(title: &str, body: &str) -> SearchVector {
		SearchVector::new()
			.field(title, Weight::A)
			.html_field(body, Weight::B)
	}

	#[rstest]
	#[case("Rust, rust & RUST!", vec!["rust", "rust", "rust"])]
	#[case("Hello-world_2024", vec!["hello", "world", "2024"])]
	#[case("Ржавчина быстрая", vec!["ржавчина", "быстрая"])]
	#[case("   ", vec![])]
	fn test_tokenize(#[case] text: &str, #[case] expected: Vec<&str>) {
		assert_eq!(tokenize(text), expected);
	}

	#[test]
	fn test_strip_tags() {
		let text = strip_tags("<p>Fast &amp; <strong>safe</strong></p>");
		assert_eq!(tokenize(&text), vec!["fast", "safe"]);
	}

	#[test]
	fn test_query_terms_are_distinct() {
		let query = SearchQuery::parse("Rust rust tokio");
		assert_eq!(query.terms(), ["rust", "tokio"]);
	}

	#[test]
	fn test_empty_query_ranks_zero() {
		assert_eq!(post("Rust", "rust").rank(&SearchQuery::parse("  ")), 0.0);
	}

	#[test]
	fn test_title_match_outranks_body_match() {
		let query = SearchQuery::parse("rust");

		let title = post("Rust Basics", "<p>An introduction.</p>").rank(&query);
		let body = post("Systems", "<p>Rust and more rust.</p>").rank(&query);

		assert!(title > body);
		assert!(title >= DEFAULT_MIN_RANK);
	}

	#[rstest]
	#[case("<p>Rust once.</p>", false)]
	#[case("<p>Rust and rust again.</p>", true)]
	fn test_body_only_threshold(#[case] body: &str, #[case] passes: bool) {
		let rank = post("Unrelated", body).rank(&SearchQuery::parse("rust"));
		assert_eq!(rank >= DEFAULT_MIN_RANK, passes);
	}

	#[test]
	fn test_markup_does_not_match() {
		let rank = post("Title", "<span class=\"rust\">text</span>").rank(&SearchQuery::parse("rust"));
		assert_eq!(rank, 0.0);
	}

	#[test]
	fn test_rank_is_mean_over_terms() {
		let vector = post("Rust", "");
		let single = vector.rank(&SearchQuery::parse("rust"));
		let double = vector.rank(&SearchQuery::parse("rust missing"));

		assert!((double - single / 2.0).abs() < 1e-9);
	}
}
