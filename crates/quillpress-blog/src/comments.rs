//! Comment store

use crate::forms::{CommentForm, field_errors};
use crate::models::{Comment, CommentView};
use chrono::Utc;
use quillpress_core::{CommentId, Error, PostId, Result, UserId};
use quillpress_db::schema::{COMMENTS, POSTS, USERS};
use quillpress_db::{build_sql, qualified, timestamp};
use sea_query::{Alias, Expr, ExprTrait, JoinType, Order, Query, SelectStatement};
use sqlx::SqliteConnection;
use tracing::info;

const COLUMNS: [&str; 5] = ["id", "post_id", "author_id", "text", "pub_date"];

/// Comments joined with their author's username and their post's title and slug
fn view_select() -> SelectStatement {
	Query::select()
		.columns(COLUMNS.map(|column| qualified("c", column)))
		.expr_as(Expr::col(qualified("u", "username")), Alias::new("author_username"))
		.expr_as(Expr::col(qualified("p", "title")), Alias::new("post_title"))
		.expr_as(Expr::col(qualified("p", "slug")), Alias::new("post_slug"))
		.from_as(Alias::new(COMMENTS), Alias::new("c"))
		.join_as(
			JoinType::InnerJoin,
			Alias::new(USERS),
			Alias::new("u"),
			Expr::col(qualified("u", "id")).equals(qualified("c", "author_id")),
		)
		.join_as(
			JoinType::InnerJoin,
			Alias::new(POSTS),
			Alias::new("p"),
			Expr::col(qualified("p", "id")).equals(qualified("c", "post_id")),
		)
		.to_owned()
}

pub async fn create(
	conn: &mut SqliteConnection,
	post: PostId,
	author: UserId,
	form: &CommentForm,
) -> Result<Comment> {
	field_errors(form).into_result()?;

	let sql = build_sql(
		Query::insert()
			.into_table(Alias::new(COMMENTS))
			.columns([
				Alias::new("post_id"),
				Alias::new("author_id"),
				Alias::new("text"),
				Alias::new("pub_date"),
			])
			.values_panic([
				post.into(),
				author.into(),
				form.text.trim().into(),
				timestamp(Utc::now()).into(),
			])
			.returning_col(Alias::new("id"))
			.to_owned(),
	);
	let id: i64 = sqlx::query_scalar(&sql).fetch_one(&mut *conn).await?;

	info!(comment_id = id, post_id = %post, "comment created");
	get(conn, CommentId(id)).await
}

pub async fn get(conn: &mut SqliteConnection, id: CommentId) -> Result<Comment> {
	let sql = build_sql(
		Query::select()
			.columns(COLUMNS.map(Alias::new))
			.from(Alias::new(COMMENTS))
			.and_where(Expr::col(Alias::new("id")).eq(id))
			.to_owned(),
	);
	sqlx::query_as::<_, Comment>(&sql)
		.fetch_optional(&mut *conn)
		.await?
		.ok_or_else(|| Error::not_found("comment", id))
}

/// Replaces the text; `pub_date` is kept
pub async fn update(conn: &mut SqliteConnection, comment: &Comment, form: &CommentForm) -> Result<Comment> {
	field_errors(form).into_result()?;

	let sql = build_sql(
		Query::update()
			.table(Alias::new(COMMENTS))
			.value(Alias::new("text"), form.text.trim())
			.and_where(Expr::col(Alias::new("id")).eq(comment.id))
			.to_owned(),
	);
	sqlx::query(&sql).execute(&mut *conn).await?;

	info!(comment_id = %comment.id, "comment updated");
	get(conn, comment.id).await
}

pub async fn delete(conn: &mut SqliteConnection, comment: &Comment) -> Result<()> {
	let sql = build_sql(
		Query::delete()
			.from_table(Alias::new(COMMENTS))
			.and_where(Expr::col(Alias::new("id")).eq(comment.id))
			.to_owned(),
	);
	let result = sqlx::query(&sql).execute(&mut *conn).await?;
	if result.rows_affected() == 0 {
		return Err(Error::not_found("comment", comment.id));
	}
	info!(comment_id = %comment.id, "comment deleted");
	Ok(())
}

/// Comments under `post`, oldest first
pub async fn for_post(conn: &mut SqliteConnection, post: PostId) -> Result<Vec<CommentView>> {
	let sql = build_sql(
		view_select()
			.and_where(Expr::col(qualified("c", "post_id")).eq(post))
			.order_by(qualified("c", "pub_date"), Order::Asc)
			.order_by(qualified("c", "id"), Order::Asc)
			.to_owned(),
	);
	Ok(sqlx::query_as::<_, CommentView>(&sql).fetch_all(&mut *conn).await?)
}

/// The `limit` most recent comments on the site
pub async fn latest(conn: &mut SqliteConnection, limit: usize) -> Result<Vec<CommentView>> {
	let sql = build_sql(
		view_select()
			.order_by(qualified("c", "pub_date"), Order::Desc)
			.order_by(qualified("c", "id"), Order::Desc)
			.limit(limit as u64)
			.to_owned(),
	);
	Ok(sqlx::query_as::<_, CommentView>(&sql).fetch_all(&mut *conn).await?)
}
