//! Row-level access to `auth_user` and `user_profile`
//!
//! Every function runs on the caller's connection so several of them can
//! share one transaction.

use crate::models::{Profile, User};
use chrono::{NaiveDate, Utc};
use quillpress_core::{Error, ProfileId, Result, UserId};
use quillpress_db::schema::{PROFILES, USERS};
use quillpress_db::{build_sql, timestamp, unique_slug};
use sea_query::{Alias, Expr, ExprTrait, Func, Query, SelectStatement};
use sqlx::SqliteConnection;

const USER_COLUMNS: [&str; 9] = [
	"id",
	"username",
	"email",
	"first_name",
	"last_name",
	"password",
	"is_active",
	"date_joined",
	"last_login",
];

pub(crate) const PROFILE_COLUMNS: [&str; 6] = ["id", "user_id", "slug", "bio", "date_birthday", "profile_image"];

fn select_users() -> SelectStatement {
	Query::select()
		.columns(USER_COLUMNS.map(Alias::new))
		.from(Alias::new(USERS))
		.to_owned()
}

fn select_profiles() -> SelectStatement {
	Query::select()
		.columns(PROFILE_COLUMNS.map(Alias::new))
		.from(Alias::new(PROFILES))
		.to_owned()
}

fn exists(statement: SelectStatement) -> String {
	build_sql(Query::select().expr(Expr::exists(statement)).to_owned())
}

/// Values for a new `auth_user` row
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
	pub username: &'a str,
	pub email: &'a str,
	pub password_hash: &'a str,
}

pub async fn insert_user(conn: &mut SqliteConnection, new: NewUser<'_>) -> Result<User> {
	let sql = build_sql(
		Query::insert()
			.into_table(Alias::new(USERS))
			.columns([
				Alias::new("username"),
				Alias::new("email"),
				Alias::new("password"),
				Alias::new("is_active"),
				Alias::new("date_joined"),
			])
			.values_panic([
				new.username.into(),
				new.email.into(),
				new.password_hash.into(),
				true.into(),
				timestamp(Utc::now()).into(),
			])
			.returning_col(Alias::new("id"))
			.to_owned(),
	);
	let id: i64 = sqlx::query_scalar(&sql).fetch_one(&mut *conn).await?;

	get_user(conn, UserId(id)).await
}

pub async fn get_user(conn: &mut SqliteConnection, id: UserId) -> Result<User> {
	let sql = build_sql(select_users().and_where(Expr::col(Alias::new("id")).eq(id)).to_owned());
	sqlx::query_as::<_, User>(&sql)
		.fetch_optional(&mut *conn)
		.await?
		.ok_or_else(|| Error::not_found("user", id))
}

pub async fn find_by_username(conn: &mut SqliteConnection, username: &str) -> Result<Option<User>> {
	let sql = build_sql(
		select_users()
			.and_where(Expr::col(Alias::new("username")).eq(username))
			.to_owned(),
	);
	Ok(sqlx::query_as::<_, User>(&sql).fetch_optional(&mut *conn).await?)
}

pub async fn username_taken(
	conn: &mut SqliteConnection,
	username: &str,
	exclude: Option<UserId>,
) -> Result<bool> {
	let sql = exists(
		Query::select()
			.expr(Expr::val(1))
			.from(Alias::new(USERS))
			.and_where(Expr::col(Alias::new("username")).eq(username))
			.and_where(Expr::col(Alias::new("id")).ne(exclude.map(UserId::get).unwrap_or(0)))
			.to_owned(),
	);
	let taken: bool = sqlx::query_scalar(&sql).fetch_one(&mut *conn).await?;
	Ok(taken)
}

/// Whether another account with a different username already uses `email`
pub async fn email_taken(
	conn: &mut SqliteConnection,
	email: &str,
	exclude_username: &str,
) -> Result<bool> {
	if email.is_empty() {
		return Ok(false);
	}
	let sql = exists(
		Query::select()
			.expr(Expr::val(1))
			.from(Alias::new(USERS))
			.and_where(Func::lower(Expr::col(Alias::new("email"))).eq(Func::lower(Expr::val(email))))
			.and_where(Expr::col(Alias::new("username")).ne(exclude_username))
			.to_owned(),
	);
	let taken: bool = sqlx::query_scalar(&sql).fetch_one(&mut *conn).await?;
	Ok(taken)
}

/// Identity fields edited on the profile page
#[derive(Debug, Clone)]
pub struct UserFields<'a> {
	pub username: &'a str,
	pub email: &'a str,
	pub first_name: &'a str,
	pub last_name: &'a str,
}

pub async fn update_user(conn: &mut SqliteConnection, id: UserId, fields: UserFields<'_>) -> Result<()> {
	let sql = build_sql(
		Query::update()
			.table(Alias::new(USERS))
			.value(Alias::new("username"), fields.username)
			.value(Alias::new("email"), fields.email)
			.value(Alias::new("first_name"), fields.first_name)
			.value(Alias::new("last_name"), fields.last_name)
			.and_where(Expr::col(Alias::new("id")).eq(id))
			.to_owned(),
	);
	let result = sqlx::query(&sql).execute(&mut *conn).await?;
	if result.rows_affected() == 0 {
		return Err(Error::not_found("user", id));
	}
	Ok(())
}

pub async fn set_password_hash(conn: &mut SqliteConnection, id: UserId, hash: &str) -> Result<()> {
	let sql = build_sql(
		Query::update()
			.table(Alias::new(USERS))
			.value(Alias::new("password"), hash)
			.and_where(Expr::col(Alias::new("id")).eq(id))
			.to_owned(),
	);
	sqlx::query(&sql).execute(&mut *conn).await?;
	Ok(())
}

pub async fn touch_last_login(conn: &mut SqliteConnection, id: UserId) -> Result<()> {
	let sql = build_sql(
		Query::update()
			.table(Alias::new(USERS))
			.value(Alias::new("last_login"), timestamp(Utc::now()))
			.and_where(Expr::col(Alias::new("id")).eq(id))
			.to_owned(),
	);
	sqlx::query(&sql).execute(&mut *conn).await?;
	Ok(())
}

/// Deletes the account; profile, follows, posts, likes and comments cascade
///
/// Category counters are not touched here. Callers that own posts must
/// release them first.
pub async fn delete_user(conn: &mut SqliteConnection, id: UserId) -> Result<()> {
	let sql = build_sql(
		Query::delete()
			.from_table(Alias::new(USERS))
			.and_where(Expr::col(Alias::new("id")).eq(id))
			.to_owned(),
	);
	let result = sqlx::query(&sql).execute(&mut *conn).await?;
	if result.rows_affected() == 0 {
		return Err(Error::not_found("user", id));
	}
	Ok(())
}

/// Creates the profile of `user` with a slug derived from the username
pub async fn insert_profile(conn: &mut SqliteConnection, user: &User) -> Result<Profile> {
	let slug = unique_slug::<Profile>(conn, &user.username, None).await?;
	let sql = build_sql(
		Query::insert()
			.into_table(Alias::new(PROFILES))
			.columns([Alias::new("user_id"), Alias::new("slug"), Alias::new("bio")])
			.values_panic([user.id.into(), slug.as_str().into(), "".into()])
			.returning_col(Alias::new("id"))
			.to_owned(),
	);
	let id: i64 = sqlx::query_scalar(&sql).fetch_one(&mut *conn).await?;

	get_profile(conn, ProfileId(id)).await
}

pub async fn get_profile(conn: &mut SqliteConnection, id: ProfileId) -> Result<Profile> {
	let sql = build_sql(select_profiles().and_where(Expr::col(Alias::new("id")).eq(id)).to_owned());
	sqlx::query_as::<_, Profile>(&sql)
		.fetch_optional(&mut *conn)
		.await?
		.ok_or_else(|| Error::not_found("profile", id))
}

pub async fn profile_by_slug(conn: &mut SqliteConnection, slug: &str) -> Result<Profile> {
	let sql = build_sql(
		select_profiles()
			.and_where(Expr::col(Alias::new("slug")).eq(slug))
			.to_owned(),
	);
	sqlx::query_as::<_, Profile>(&sql)
		.fetch_optional(&mut *conn)
		.await?
		.ok_or_else(|| Error::not_found("profile", slug))
}

pub async fn profile_for_user(conn: &mut SqliteConnection, user_id: UserId) -> Result<Profile> {
	let sql = build_sql(
		select_profiles()
			.and_where(Expr::col(Alias::new("user_id")).eq(user_id))
			.to_owned(),
	);
	sqlx::query_as::<_, Profile>(&sql)
		.fetch_optional(&mut *conn)
		.await?
		.ok_or_else(|| Error::not_found("profile", format!("user {}", user_id)))
}

/// Profile fields edited on the profile page
#[derive(Debug, Clone)]
pub struct ProfileFields<'a> {
	pub bio: &'a str,
	pub profile_image: Option<&'a str>,
	pub date_birthday: Option<NaiveDate>,
}

pub async fn update_profile(
	conn: &mut SqliteConnection,
	id: ProfileId,
	fields: ProfileFields<'_>,
) -> Result<()> {
	let sql = build_sql(
		Query::update()
			.table(Alias::new(PROFILES))
			.value(Alias::new("bio"), fields.bio)
			.value(Alias::new("profile_image"), fields.profile_image)
			.value(Alias::new("date_birthday"), fields.date_birthday)
			.and_where(Expr::col(Alias::new("id")).eq(id))
			.to_owned(),
	);
	sqlx::query(&sql).execute(&mut *conn).await?;
	Ok(())
}
