//! Ranked post search
//!
//! SQLite has no weighted full-text ranking, so candidate rows are ranked
//! with [`SearchVector`]: title weighted A, body (tags stripped) weighted B.

use crate::models::SearchHit;
use crate::posts;
use quillpress_core::Result;
use quillpress_core::search::{SearchQuery, SearchVector, Weight};
use sqlx::SqliteConnection;
use std::cmp::Ordering;
use tracing::debug;

/// Posts ranked at least `min_rank` for `raw`, best first, newest first on ties
pub async fn search(conn: &mut SqliteConnection, raw: &str, min_rank: f64) -> Result<Vec<SearchHit>> {
	let query = SearchQuery::parse(raw);
	if query.is_empty() {
		return Ok(Vec::new());
	}

	let candidates = posts::all_summaries(conn).await?;
	let scanned = candidates.len();
	let mut hits: Vec<SearchHit> = candidates
		.into_iter()
		.filter_map(|post| {
			let rank = SearchVector::new()
				.field(&post.post.title, Weight::A)
				.html_field(&post.post.body, Weight::B)
				.rank(&query);
			(rank >= min_rank).then_some(SearchHit { post, rank })
		})
		.collect();

	// Stable sort keeps the newest-first order among equal ranks
	hits.sort_by(|a, b| b.rank.partial_cmp(&a.rank).unwrap_or(Ordering::Equal));
	debug!(query = %query.raw(), scanned, hits = hits.len(), "search ranked");
	Ok(hits)
}
