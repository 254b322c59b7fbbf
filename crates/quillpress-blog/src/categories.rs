//! Category store

use crate::forms::{CategoryForm, field_errors};
use crate::models::Category;
use quillpress_core::{CategoryId, Error, Page, Paginator, Result};
use quillpress_db::schema::{CATEGORIES, POSTS};
use quillpress_db::{build_sql, resolve_slug};
use sea_query::{Alias, Asterisk, Expr, ExprTrait, Order, Query, SelectStatement};
use sqlx::SqliteConnection;
use tracing::{debug, info};

const COLUMNS: [&str; 5] = ["id", "name", "slug", "description", "post_amount"];

fn select() -> SelectStatement {
	Query::select()
		.columns(COLUMNS.map(Alias::new))
		.from(Alias::new(CATEGORIES))
		.to_owned()
}

/// Creates a category with a count of zero
pub async fn create(conn: &mut SqliteConnection, form: &CategoryForm) -> Result<Category> {
	field_errors(form).into_result()?;
	let name = form.name.trim();

	let slug = resolve_slug::<Category>(&mut *conn, form.slug.as_deref(), name, None).await?;
	let sql = build_sql(
		Query::insert()
			.into_table(Alias::new(CATEGORIES))
			.columns([
				Alias::new("name"),
				Alias::new("slug"),
				Alias::new("description"),
				Alias::new("post_amount"),
			])
			.values_panic([name.into(), slug.as_str().into(), form.description.trim().into(), 0.into()])
			.returning_col(Alias::new("id"))
			.to_owned(),
	);
	let id: i64 = sqlx::query_scalar(&sql).fetch_one(&mut *conn).await?;

	info!(category_id = id, %slug, "category created");
	get(conn, CategoryId(id)).await
}

pub async fn get(conn: &mut SqliteConnection, id: CategoryId) -> Result<Category> {
	let sql = build_sql(select().and_where(Expr::col(Alias::new("id")).eq(id)).to_owned());
	sqlx::query_as::<_, Category>(&sql)
		.fetch_optional(&mut *conn)
		.await?
		.ok_or_else(|| Error::not_found("category", id))
}

pub async fn by_slug(conn: &mut SqliteConnection, slug: &str) -> Result<Category> {
	let sql = build_sql(select().and_where(Expr::col(Alias::new("slug")).eq(slug)).to_owned());
	sqlx::query_as::<_, Category>(&sql)
		.fetch_optional(&mut *conn)
		.await?
		.ok_or_else(|| Error::not_found("category", slug))
}

/// Every category by name, for choice lists
pub async fn all(conn: &mut SqliteConnection) -> Result<Vec<Category>> {
	let sql = build_sql(
		select()
			.order_by(Alias::new("name"), Order::Asc)
			.order_by(Alias::new("id"), Order::Asc)
			.to_owned(),
	);
	Ok(sqlx::query_as::<_, Category>(&sql)
		.fetch_all(&mut *conn)
		.await?)
}

pub async fn count(conn: &mut SqliteConnection) -> Result<i64> {
	let sql = build_sql(
		Query::select()
			.expr(Expr::col(Asterisk).count())
			.from(Alias::new(CATEGORIES))
			.to_owned(),
	);
	Ok(sqlx::query_scalar(&sql).fetch_one(&mut *conn).await?)
}

/// One page of categories, busiest first
pub async fn list_page(
	conn: &mut SqliteConnection,
	paginator: Paginator,
	page: Option<&str>,
) -> Result<Page<Category>> {
	let total = count(&mut *conn).await? as usize;
	let number = paginator.validate_number(page, total)?;

	let sql = build_sql(
		select()
			.order_by(Alias::new("post_amount"), Order::Desc)
			.order_by(Alias::new("id"), Order::Asc)
			.limit(paginator.per_page() as u64)
			.offset(paginator.offset(number) as u64)
			.to_owned(),
	);
	let rows = sqlx::query_as::<_, Category>(&sql).fetch_all(&mut *conn).await?;
	debug!(page = number, rows = rows.len(), "category page loaded");
	Ok(paginator.page(rows, number, total))
}

/// Deletes an unused category
///
/// Fails with [`Error::ProtectedReference`] while any post is filed under it.
pub async fn delete(conn: &mut SqliteConnection, id: CategoryId) -> Result<()> {
	let category = get(&mut *conn, id).await?;
	let sql = build_sql(
		Query::select()
			.expr(Expr::col(Asterisk).count())
			.from(Alias::new(POSTS))
			.and_where(Expr::col(Alias::new("category_id")).eq(id))
			.to_owned(),
	);
	let posts: i64 = sqlx::query_scalar(&sql).fetch_one(&mut *conn).await?;
	if posts > 0 {
		return Err(protected(&category, posts));
	}

	let sql = build_sql(
		Query::delete()
			.from_table(Alias::new(CATEGORIES))
			.and_where(Expr::col(Alias::new("id")).eq(id))
			.to_owned(),
	);
	sqlx::query(&sql)
		.execute(&mut *conn)
		.await
		.map_err(|err| match Error::from(err) {
			Error::Integrity(_) => protected(&category, posts),
			other => other,
		})?;
	info!(category_id = %id, slug = %category.slug, "category deleted");
	Ok(())
}

fn protected(category: &Category, posts: i64) -> Error {
	Error::ProtectedReference {
		entity: "category",
		reason: format!("\"{}\" is still used by {} post(s)", category.name, posts),
	}
}
