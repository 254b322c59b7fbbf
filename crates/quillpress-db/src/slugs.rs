//! Unique slug allocation against a table's `slug` column

use quillpress_core::slug::{base_slug, first_free};
use quillpress_core::validators::validate_slug;
use crate::query::build_sql;
use quillpress_core::{Error, FormErrors, Result};
use sea_query::{Alias, Expr, ExprTrait, LikeExpr, Query};
use sqlx::SqliteConnection;
use tracing::debug;

/// Attempts made before a racing slug insert gives up
pub const SLUG_RETRY_ATTEMPTS: usize = 3;

/// Longest suffix (`-n`) reserved when querying for taken candidates
const SUFFIX_ROOM: usize = 8;

/// A table whose rows carry a unique slug
pub trait SlugTable {
	/// Table name
	const TABLE: &'static str;
	/// Column length of `slug`
	const SLUG_MAX_LENGTH: usize;
	/// Used when the source value has nothing to transliterate
	const FALLBACK: &'static str;
}

/// Derives a slug from `source` that no other row of `T` uses
///
/// `exclude_id` skips the row being updated.
pub async fn unique_slug<T: SlugTable>(
	conn: &mut SqliteConnection,
	source: &str,
	exclude_id: Option<i64>,
) -> Result<String> {
	let base = base_slug(source, T::FALLBACK, T::SLUG_MAX_LENGTH);
	let head = base_slug(
		&base,
		T::FALLBACK,
		T::SLUG_MAX_LENGTH.saturating_sub(SUFFIX_ROOM),
	);

	let sql = build_sql(
		Query::select()
			.column(Alias::new("slug"))
			.from(Alias::new(T::TABLE))
			.and_where(
				Expr::col(Alias::new("slug"))
					.like(LikeExpr::new(format!("{}%", escape_like(&head))).escape('\\')),
			)
			.and_where(Expr::col(Alias::new("id")).ne(exclude_id.unwrap_or(0)))
			.to_owned(),
	);
	let taken: Vec<String> = sqlx::query_scalar(&sql).fetch_all(&mut *conn).await?;

	let slug = first_free(&base, taken.iter().map(String::as_str), T::SLUG_MAX_LENGTH);
	debug!(table = T::TABLE, %slug, taken = taken.len(), "slug resolved");
	Ok(slug)
}

/// Whether another row of `T` already uses `slug`
pub async fn slug_taken<T: SlugTable>(
	conn: &mut SqliteConnection,
	slug: &str,
	exclude_id: Option<i64>,
) -> Result<bool> {
	let sql = build_sql(
		Query::select()
			.expr(Expr::exists(
				Query::select()
					.expr(Expr::val(1))
					.from(Alias::new(T::TABLE))
					.and_where(Expr::col(Alias::new("slug")).eq(slug))
					.and_where(Expr::col(Alias::new("id")).ne(exclude_id.unwrap_or(0)))
					.to_owned(),
			))
			.to_owned(),
	);
	let exists: bool = sqlx::query_scalar(&sql).fetch_one(&mut *conn).await?;
	Ok(exists)
}

/// Validates an explicitly supplied slug
///
/// Produces a field error on `slug` when the value is malformed, too long,
/// or used by another row.
pub async fn check_explicit_slug<T: SlugTable>(
	conn: &mut SqliteConnection,
	slug: &str,
	exclude_id: Option<i64>,
) -> Result<String> {
	let slug = slug.trim();
	if let Err(error) = validate_slug(slug) {
		let message = error
			.message
			.map(|m| m.to_string())
			.unwrap_or_else(|| error.code.to_string());
		return Err(Error::invalid("slug", message));
	}
	if slug.len() > T::SLUG_MAX_LENGTH {
		return Err(Error::invalid(
			"slug",
			format!(
				"Ensure this value has at most {} characters (it has {}).",
				T::SLUG_MAX_LENGTH,
				slug.len()
			),
		));
	}
	if slug_taken::<T>(conn, slug, exclude_id).await? {
		return Err(Error::Validation(FormErrors::single(
			"slug",
			"An entry with this slug already exists.",
		)));
	}
	Ok(slug.to_string())
}

/// Explicit slug when given, otherwise one derived from `source`
pub async fn resolve_slug<T: SlugTable>(
	conn: &mut SqliteConnection,
	explicit: Option<&str>,
	source: &str,
	exclude_id: Option<i64>,
) -> Result<String> {
	match explicit.map(str::trim).filter(|s| !s.is_empty()) {
		Some(slug) => check_explicit_slug::<T>(conn, slug, exclude_id).await,
		None => unique_slug::<T>(conn, source, exclude_id).await,
	}
}

fn escape_like(value: &str) -> String {
	value
		.replace('\\', "\\\\")
		.replace('%', "\\%")
		.replace('_', "\\_")
}
