//! Maintenance of `blog_category.post_amount`
//!
//! Every function issues a single relative `UPDATE` on the caller's
//! connection. Post writers call them inside the transaction that inserts,
//! moves or deletes the post.

use quillpress_core::{CategoryId, Error, Result, UserId};
use quillpress_db::schema::{CATEGORIES, POSTS};
use quillpress_db::{build_sql, qualified};
use sea_query::{Alias, Asterisk, Expr, ExprTrait, Query, SelectStatement};
use sqlx::SqliteConnection;
use tracing::info;

/// `SELECT COUNT(*)` of the posts filed under the category row being updated
fn posts_in_category() -> SelectStatement {
	Query::select()
		.expr(Expr::col(Asterisk).count())
		.from_as(Alias::new(POSTS), Alias::new("p"))
		.and_where(Expr::col(qualified("p", "category_id")).equals(qualified(CATEGORIES, "id")))
		.to_owned()
}

/// Adds one post to `category`
pub async fn increment(conn: &mut SqliteConnection, category: CategoryId) -> Result<()> {
	adjust(conn, category, 1).await
}

/// Removes one post from `category`
pub async fn decrement(conn: &mut SqliteConnection, category: CategoryId) -> Result<()> {
	adjust(conn, category, -1).await
}

async fn adjust(conn: &mut SqliteConnection, category: CategoryId, delta: i64) -> Result<()> {
	let sql = build_sql(
		Query::update()
			.table(Alias::new(CATEGORIES))
			.value(Alias::new("post_amount"), Expr::col(Alias::new("post_amount")).add(delta))
			.and_where(Expr::col(Alias::new("id")).eq(category))
			.to_owned(),
	);
	let result = sqlx::query(&sql).execute(&mut *conn).await?;
	if result.rows_affected() == 0 {
		return Err(Error::not_found("category", category));
	}
	info!(category = %category, delta, "category post count adjusted");
	Ok(())
}

/// Moves one post from `from` to `to`; a no-op when they are equal
pub async fn move_post(conn: &mut SqliteConnection, from: CategoryId, to: CategoryId) -> Result<()> {
	if from == to {
		return Ok(());
	}
	decrement(&mut *conn, from).await?;
	increment(conn, to).await
}

/// Subtracts every post of `author` from its category
///
/// Run before deleting the user, since the cascade removes the posts
/// without going through [`decrement`].
pub async fn release_author_posts(conn: &mut SqliteConnection, author: UserId) -> Result<u64> {
	let authored = posts_in_category()
		.and_where(Expr::col(qualified("p", "author_id")).eq(author))
		.to_owned();
	let sql = build_sql(
		Query::update()
			.table(Alias::new(CATEGORIES))
			.value(Alias::new("post_amount"), Expr::col(Alias::new("post_amount")).sub(authored))
			.and_where(
				Expr::col(Alias::new("id")).in_subquery(
					Query::select()
						.column(Alias::new("category_id"))
						.from(Alias::new(POSTS))
						.and_where(Expr::col(Alias::new("author_id")).eq(author))
						.to_owned(),
				),
			)
			.to_owned(),
	);
	let result = sqlx::query(&sql).execute(&mut *conn).await?;
	info!(author = %author, categories = result.rows_affected(), "author posts released from categories");
	Ok(result.rows_affected())
}

/// Recomputes every count from the posts table
///
/// Returns the number of categories whose stored count was wrong.
pub async fn recount_post_amounts(conn: &mut SqliteConnection) -> Result<u64> {
	let sql = build_sql(
		Query::update()
			.table(Alias::new(CATEGORIES))
			.value(Alias::new("post_amount"), posts_in_category())
			.and_where(Expr::col(Alias::new("post_amount")).ne(posts_in_category()))
			.to_owned(),
	);
	let result = sqlx::query(&sql).execute(&mut *conn).await?;
	info!(corrected = result.rows_affected(), "category post counts recomputed");
	Ok(result.rows_affected())
}
