//! Post likes

use quillpress_core::{PostId, Result, UserId};
use quillpress_db::build_sql;
use quillpress_db::schema::LIKES;
use sea_query::{Alias, Asterisk, Expr, ExprTrait, OnConflict, Query};
use sqlx::SqliteConnection;

/// Flips the like and returns whether `user` now likes `post`
pub async fn toggle(conn: &mut SqliteConnection, post: PostId, user: UserId) -> Result<bool> {
	if remove(&mut *conn, post, user).await? {
		return Ok(false);
	}
	add(conn, post, user).await?;
	Ok(true)
}

/// Makes the like present or absent; repeating the call changes nothing
pub async fn set(conn: &mut SqliteConnection, post: PostId, user: UserId, liked: bool) -> Result<bool> {
	if liked {
		add(conn, post, user).await?;
	} else {
		remove(conn, post, user).await?;
	}
	Ok(liked)
}

fn pair(post: PostId, user: UserId) -> Expr {
	Expr::col(Alias::new("post_id"))
		.eq(post)
		.and(Expr::col(Alias::new("user_id")).eq(user))
}

async fn add(conn: &mut SqliteConnection, post: PostId, user: UserId) -> Result<()> {
	let sql = build_sql(
		Query::insert()
			.into_table(Alias::new(LIKES))
			.columns([Alias::new("post_id"), Alias::new("user_id")])
			.values_panic([post.into(), user.into()])
			.on_conflict(
				OnConflict::columns([Alias::new("post_id"), Alias::new("user_id")])
					.do_nothing()
					.to_owned(),
			)
			.to_owned(),
	);
	sqlx::query(&sql).execute(&mut *conn).await?;
	Ok(())
}

async fn remove(conn: &mut SqliteConnection, post: PostId, user: UserId) -> Result<bool> {
	let sql = build_sql(
		Query::delete()
			.from_table(Alias::new(LIKES))
			.and_where(pair(post, user))
			.to_owned(),
	);
	let result = sqlx::query(&sql).execute(&mut *conn).await?;
	Ok(result.rows_affected() > 0)
}

pub async fn total(conn: &mut SqliteConnection, post: PostId) -> Result<i64> {
	let sql = build_sql(
		Query::select()
			.expr(Expr::col(Asterisk).count())
			.from(Alias::new(LIKES))
			.and_where(Expr::col(Alias::new("post_id")).eq(post))
			.to_owned(),
	);
	Ok(sqlx::query_scalar(&sql).fetch_one(&mut *conn).await?)
}

pub async fn liked(conn: &mut SqliteConnection, post: PostId, user: UserId) -> Result<bool> {
	let sql = build_sql(
		Query::select()
			.expr(Expr::exists(
				Query::select()
					.expr(Expr::val(1))
					.from(Alias::new(LIKES))
					.and_where(pair(post, user))
					.to_owned(),
			))
			.to_owned(),
	);
	let exists: bool = sqlx::query_scalar(&sql).fetch_one(&mut *conn).await?;
	Ok(exists)
}
