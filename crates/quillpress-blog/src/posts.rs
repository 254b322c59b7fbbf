//! Post store
//!
//! Writers keep `blog_category.post_amount` in step through [`counters`]
//! on the same connection, so a rolled back transaction also rolls back
//! the count.

use crate::counters;
use crate::forms::{PostForm, field_errors};
use crate::models::{Category, Post, PostSummary};
use crate::categories;
use chrono::Utc;
use quillpress_core::{CategoryId, Error, Page, Paginator, PostId, Result, UserId};
use quillpress_db::schema::{CATEGORIES, POSTS, USERS};
use quillpress_db::slugs::check_explicit_slug;
use quillpress_db::{build_sql, qualified, resolve_slug, timestamp, unique_slug};
use sea_query::{Alias, Asterisk, Expr, ExprTrait, JoinType, Order, Query, SelectStatement};
use sqlx::SqliteConnection;
use tracing::{debug, info};

const COLUMNS: [&str; 9] = [
	"id",
	"title",
	"author_id",
	"short_description",
	"body",
	"slug",
	"category_id",
	"post_date",
	"image",
];

fn select() -> SelectStatement {
	Query::select()
		.columns(COLUMNS.map(Alias::new))
		.from(Alias::new(POSTS))
		.to_owned()
}

/// Posts joined with their author's username and their category, newest first
fn summary_select() -> SelectStatement {
	Query::select()
		.columns(COLUMNS.map(|column| qualified("p", column)))
		.expr_as(Expr::col(qualified("u", "username")), Alias::new("author_username"))
		.expr_as(Expr::col(qualified("c", "name")), Alias::new("category_name"))
		.expr_as(Expr::col(qualified("c", "slug")), Alias::new("category_slug"))
		.from_as(Alias::new(POSTS), Alias::new("p"))
		.join_as(
			JoinType::InnerJoin,
			Alias::new(USERS),
			Alias::new("u"),
			Expr::col(qualified("u", "id")).equals(qualified("p", "author_id")),
		)
		.join_as(
			JoinType::InnerJoin,
			Alias::new(CATEGORIES),
			Alias::new("c"),
			Expr::col(qualified("c", "id")).equals(qualified("p", "category_id")),
		)
		.order_by(qualified("p", "post_date"), Order::Desc)
		.order_by(qualified("p", "id"), Order::Desc)
		.to_owned()
}

fn count_where(condition: Option<Expr>) -> String {
	let mut statement = Query::select()
		.expr(Expr::col(Asterisk).count())
		.from(Alias::new(POSTS))
		.to_owned();
	if let Some(condition) = condition {
		statement.and_where(condition);
	}
	build_sql(statement)
}

const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

async fn chosen_category(conn: &mut SqliteConnection, id: Option<CategoryId>) -> Result<Category> {
	let Some(id) = id else {
		return Err(Error::invalid("category", "This field is required."));
	};
	match categories::get(conn, id).await {
		Err(err) if err.is_not_found() => Err(Error::invalid("category", INVALID_CHOICE)),
		other => other,
	}
}

/// Inserts a post written by `author` and counts it in its category
pub async fn create(conn: &mut SqliteConnection, author: UserId, form: &PostForm) -> Result<Post> {
	field_errors(form).into_result()?;
	let category = chosen_category(&mut *conn, form.category).await?;
	let title = form.title.trim();
	let slug = resolve_slug::<Post>(&mut *conn, form.slug.as_deref(), title, None).await?;

	let sql = build_sql(
		Query::insert()
			.into_table(Alias::new(POSTS))
			.columns(COLUMNS[1..].iter().copied().map(Alias::new))
			.values_panic([
				title.into(),
				author.into(),
				form.short_description().into(),
				form.body.as_str().into(),
				slug.as_str().into(),
				category.id.into(),
				timestamp(Utc::now()).into(),
				form.image.as_deref().into(),
			])
			.returning_col(Alias::new("id"))
			.to_owned(),
	);
	let id: i64 = sqlx::query_scalar(&sql).fetch_one(&mut *conn).await?;

	counters::increment(&mut *conn, category.id).await?;
	info!(post_id = id, %slug, category = %category.slug, "post created");
	get(conn, PostId(id)).await
}

/// Applies `form` to `post`; `post_date` never changes
pub async fn update(conn: &mut SqliteConnection, post: &Post, form: &PostForm) -> Result<Post> {
	field_errors(form).into_result()?;
	let category = chosen_category(&mut *conn, form.category).await?;
	let title = form.title.trim();

	let slug = match form.slug.as_deref().map(str::trim) {
		None => post.slug.clone(),
		Some("") => unique_slug::<Post>(&mut *conn, title, Some(post.id.get())).await?,
		Some(explicit) if explicit == post.slug => post.slug.clone(),
		Some(explicit) => check_explicit_slug::<Post>(&mut *conn, explicit, Some(post.id.get())).await?,
	};
	let image = if form.clear_image {
		None
	} else {
		form.image.as_deref().or(post.image.as_deref())
	};

	let sql = build_sql(
		Query::update()
			.table(Alias::new(POSTS))
			.value(Alias::new("title"), title)
			.value(Alias::new("short_description"), form.short_description())
			.value(Alias::new("body"), form.body.as_str())
			.value(Alias::new("slug"), slug.as_str())
			.value(Alias::new("category_id"), category.id)
			.value(Alias::new("image"), image)
			.and_where(Expr::col(Alias::new("id")).eq(post.id))
			.to_owned(),
	);
	sqlx::query(&sql).execute(&mut *conn).await?;

	counters::move_post(&mut *conn, post.category_id, category.id).await?;
	info!(post_id = %post.id, %slug, "post updated");
	get(conn, post.id).await
}

/// Deletes `post` and takes it out of its category count
///
/// Likes and comments go with it by cascade.
pub async fn delete(conn: &mut SqliteConnection, post: &Post) -> Result<()> {
	let sql = build_sql(
		Query::delete()
			.from_table(Alias::new(POSTS))
			.and_where(Expr::col(Alias::new("id")).eq(post.id))
			.to_owned(),
	);
	let result = sqlx::query(&sql).execute(&mut *conn).await?;
	if result.rows_affected() == 0 {
		return Err(Error::not_found("post", post.id));
	}

	counters::decrement(conn, post.category_id).await?;
	info!(post_id = %post.id, slug = %post.slug, "post deleted");
	Ok(())
}

pub async fn get(conn: &mut SqliteConnection, id: PostId) -> Result<Post> {
	let sql = build_sql(select().and_where(Expr::col(Alias::new("id")).eq(id)).to_owned());
	sqlx::query_as::<_, Post>(&sql)
		.fetch_optional(&mut *conn)
		.await?
		.ok_or_else(|| Error::not_found("post", id))
}

pub async fn by_slug(conn: &mut SqliteConnection, slug: &str) -> Result<Post> {
	let sql = build_sql(select().and_where(Expr::col(Alias::new("slug")).eq(slug)).to_owned());
	sqlx::query_as::<_, Post>(&sql)
		.fetch_optional(&mut *conn)
		.await?
		.ok_or_else(|| Error::not_found("post", slug))
}

pub async fn summary_by_slug(conn: &mut SqliteConnection, slug: &str) -> Result<PostSummary> {
	let sql = build_sql(
		summary_select()
			.and_where(Expr::col(qualified("p", "slug")).eq(slug))
			.to_owned(),
	);
	sqlx::query_as::<_, PostSummary>(&sql)
		.fetch_optional(&mut *conn)
		.await?
		.ok_or_else(|| Error::not_found("post", slug))
}

/// Number of posts on the site
pub async fn total(conn: &mut SqliteConnection) -> Result<i64> {
	Ok(sqlx::query_scalar(&count_where(None)).fetch_one(&mut *conn).await?)
}

/// One page of all posts, newest first
pub async fn list_page(
	conn: &mut SqliteConnection,
	paginator: Paginator,
	page: Option<&str>,
) -> Result<Page<PostSummary>> {
	let count = total(&mut *conn).await? as usize;
	let number = paginator.validate_number(page, count)?;

	let sql = build_sql(
		summary_select()
			.limit(paginator.per_page() as u64)
			.offset(paginator.offset(number) as u64)
			.to_owned(),
	);
	let rows = sqlx::query_as::<_, PostSummary>(&sql).fetch_all(&mut *conn).await?;
	debug!(page = number, rows = rows.len(), "post page loaded");
	Ok(paginator.page(rows, number, count))
}

/// One page of the posts filed under `category`, newest first
pub async fn by_category_page(
	conn: &mut SqliteConnection,
	category: CategoryId,
	paginator: Paginator,
	page: Option<&str>,
) -> Result<Page<PostSummary>> {
	let count: i64 =
		sqlx::query_scalar(&count_where(Some(Expr::col(Alias::new("category_id")).eq(category))))
			.fetch_one(&mut *conn)
			.await?;
	let count = count as usize;
	let number = paginator.validate_number(page, count)?;

	let sql = build_sql(
		summary_select()
			.and_where(Expr::col(qualified("p", "category_id")).eq(category))
			.limit(paginator.per_page() as u64)
			.offset(paginator.offset(number) as u64)
			.to_owned(),
	);
	let rows = sqlx::query_as::<_, PostSummary>(&sql).fetch_all(&mut *conn).await?;
	Ok(paginator.page(rows, number, count))
}

/// Every post written by `author`, newest first
pub async fn by_author(conn: &mut SqliteConnection, author: UserId) -> Result<Vec<PostSummary>> {
	let sql = build_sql(
		summary_select()
			.and_where(Expr::col(qualified("p", "author_id")).eq(author))
			.to_owned(),
	);
	Ok(sqlx::query_as::<_, PostSummary>(&sql).fetch_all(&mut *conn).await?)
}

/// Every post, newest first
pub async fn all_summaries(conn: &mut SqliteConnection) -> Result<Vec<PostSummary>> {
	Ok(sqlx::query_as::<_, PostSummary>(&build_sql(summary_select()))
		.fetch_all(&mut *conn)
		.await?)
}
