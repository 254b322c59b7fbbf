//! Asymmetric follow edges between profiles
//!
//! `toggle` flips membership with a conditional delete followed by an
//! insert that ignores duplicates, so two racing toggles never leave a
//! duplicate edge. Retry-prone callers should use [`set`] instead.

use crate::models::Profile;
use crate::store::PROFILE_COLUMNS;
use quillpress_core::{Error, ProfileId, Result};
use quillpress_db::schema::{FOLLOWS, PROFILES};
use quillpress_db::{build_sql, qualified};
use sea_query::{Alias, Asterisk, Expr, ExprTrait, JoinType, OnConflict, Order, Query};
use sqlx::SqliteConnection;

fn reject_self(follower: ProfileId, followee: ProfileId) -> Result<()> {
	if follower == followee {
		return Err(Error::invalid("follows", "You cannot follow yourself."));
	}
	Ok(())
}

fn edge(follower: ProfileId, followee: ProfileId) -> Expr {
	Expr::col(Alias::new("follower_id"))
		.eq(follower)
		.and(Expr::col(Alias::new("followee_id")).eq(followee))
}

async fn remove(conn: &mut SqliteConnection, follower: ProfileId, followee: ProfileId) -> Result<u64> {
	let sql = build_sql(
		Query::delete()
			.from_table(Alias::new(FOLLOWS))
			.and_where(edge(follower, followee))
			.to_owned(),
	);
	Ok(sqlx::query(&sql).execute(&mut *conn).await?.rows_affected())
}

/// Flips the edge and returns whether `follower` now follows `followee`
pub async fn toggle(conn: &mut SqliteConnection, follower: ProfileId, followee: ProfileId) -> Result<bool> {
	reject_self(follower, followee)?;

	if remove(&mut *conn, follower, followee).await? > 0 {
		return Ok(false);
	}

	insert(conn, follower, followee).await?;
	Ok(true)
}

/// Makes the edge present or absent; repeating the call changes nothing
pub async fn set(
	conn: &mut SqliteConnection,
	follower: ProfileId,
	followee: ProfileId,
	following: bool,
) -> Result<bool> {
	reject_self(follower, followee)?;

	if following {
		insert(conn, follower, followee).await?;
	} else {
		remove(conn, follower, followee).await?;
	}
	Ok(following)
}

async fn insert(conn: &mut SqliteConnection, follower: ProfileId, followee: ProfileId) -> Result<()> {
	let sql = build_sql(
		Query::insert()
			.into_table(Alias::new(FOLLOWS))
			.columns([Alias::new("follower_id"), Alias::new("followee_id")])
			.values_panic([follower.into(), followee.into()])
			.on_conflict(
				OnConflict::columns([Alias::new("follower_id"), Alias::new("followee_id")])
					.do_nothing()
					.to_owned(),
			)
			.to_owned(),
	);
	sqlx::query(&sql).execute(&mut *conn).await?;
	Ok(())
}

pub async fn is_following(
	conn: &mut SqliteConnection,
	follower: ProfileId,
	followee: ProfileId,
) -> Result<bool> {
	let sql = build_sql(
		Query::select()
			.expr(Expr::exists(
				Query::select()
					.expr(Expr::val(1))
					.from(Alias::new(FOLLOWS))
					.and_where(edge(follower, followee))
					.to_owned(),
			))
			.to_owned(),
	);
	let exists: bool = sqlx::query_scalar(&sql).fetch_one(&mut *conn).await?;
	Ok(exists)
}

async fn count_edges(conn: &mut SqliteConnection, column: &str, profile: ProfileId) -> Result<i64> {
	let sql = build_sql(
		Query::select()
			.expr(Expr::col(Asterisk).count())
			.from(Alias::new(FOLLOWS))
			.and_where(Expr::col(Alias::new(column)).eq(profile))
			.to_owned(),
	);
	Ok(sqlx::query_scalar(&sql).fetch_one(&mut *conn).await?)
}

pub async fn followers_count(conn: &mut SqliteConnection, profile: ProfileId) -> Result<i64> {
	count_edges(conn, "followee_id", profile).await
}

pub async fn following_count(conn: &mut SqliteConnection, profile: ProfileId) -> Result<i64> {
	count_edges(conn, "follower_id", profile).await
}

/// Profiles on the `joined` end of edges whose `matched` end is `profile`
async fn neighbours(
	conn: &mut SqliteConnection,
	joined: &str,
	matched: &str,
	profile: ProfileId,
) -> Result<Vec<Profile>> {
	let sql = build_sql(
		Query::select()
			.columns(PROFILE_COLUMNS.map(|column| qualified("p", column)))
			.from_as(Alias::new(PROFILES), Alias::new("p"))
			.join_as(
				JoinType::InnerJoin,
				Alias::new(FOLLOWS),
				Alias::new("f"),
				Expr::col(qualified("f", joined)).equals(qualified("p", "id")),
			)
			.and_where(Expr::col(qualified("f", matched)).eq(profile))
			.order_by(qualified("p", "slug"), Order::Asc)
			.to_owned(),
	);
	Ok(sqlx::query_as::<_, Profile>(&sql).fetch_all(&mut *conn).await?)
}

/// Profiles following `profile`, ordered by slug
pub async fn followers(conn: &mut SqliteConnection, profile: ProfileId) -> Result<Vec<Profile>> {
	neighbours(conn, "follower_id", "followee_id", profile).await
}

/// Profiles `profile` follows, ordered by slug
pub async fn following(conn: &mut SqliteConnection, profile: ProfileId) -> Result<Vec<Profile>> {
	neighbours(conn, "followee_id", "follower_id", profile).await
}
