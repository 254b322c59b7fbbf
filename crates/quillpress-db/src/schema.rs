//! Table definitions
//!
//! Every statement is built with sea-query and rendered for SQLite.
//! Relationship rules:
//!
//! | Column | References | On delete |
//! |--------|------------|-----------|
//! | `user_profile.user_id` | `auth_user` | cascade |
//! | `user_profile_follows.*` | `user_profile` | cascade |
//! | `blog_post.author_id` | `auth_user` | cascade |
//! | `blog_post.category_id` | `blog_category` | restrict |
//! | `blog_post_likes.*` | `blog_post`, `auth_user` | cascade |
//! | `blog_comment.post_id` | `blog_post` | cascade |
//! | `blog_comment.author_id` | `auth_user` | cascade |

use sea_query::{
	Alias, ColumnDef, Expr, ExprTrait, ForeignKey, ForeignKeyAction, Index, SqliteQueryBuilder,
	Table,
};

pub const USERS: &str = "auth_user";
pub const PROFILES: &str = "user_profile";
pub const FOLLOWS: &str = "user_profile_follows";
pub const CATEGORIES: &str = "blog_category";
pub const POSTS: &str = "blog_post";
pub const LIKES: &str = "blog_post_likes";
pub const COMMENTS: &str = "blog_comment";

/// Tables in creation order
pub const TABLES: [&str; 7] = [USERS, PROFILES, FOLLOWS, CATEGORIES, POSTS, LIKES, COMMENTS];

fn id_column() -> ColumnDef {
	ColumnDef::new(Alias::new("id"))
		.integer()
		.not_null()
		.auto_increment()
		.primary_key()
		.to_owned()
}

fn reference_column(name: &str) -> ColumnDef {
	ColumnDef::new(Alias::new(name)).integer().not_null().to_owned()
}

fn users() -> String {
	Table::create()
		.table(Alias::new(USERS))
		.if_not_exists()
		.col(id_column())
		.col(
			ColumnDef::new(Alias::new("username"))
				.string_len(150)
				.not_null()
				.unique_key(),
		)
		.col(
			ColumnDef::new(Alias::new("email"))
				.string_len(254)
				.not_null()
				.default(""),
		)
		.col(
			ColumnDef::new(Alias::new("first_name"))
				.string_len(150)
				.not_null()
				.default(""),
		)
		.col(
			ColumnDef::new(Alias::new("last_name"))
				.string_len(150)
				.not_null()
				.default(""),
		)
		.col(ColumnDef::new(Alias::new("password")).text().not_null())
		.col(
			ColumnDef::new(Alias::new("is_active"))
				.boolean()
				.not_null()
				.default(true),
		)
		.col(ColumnDef::new(Alias::new("date_joined")).date_time().not_null())
		.col(ColumnDef::new(Alias::new("last_login")).date_time().null())
		.to_string(SqliteQueryBuilder)
}

fn profiles() -> String {
	Table::create()
		.table(Alias::new(PROFILES))
		.if_not_exists()
		.col(id_column())
		.col(reference_column("user_id").unique_key())
		.col(
			ColumnDef::new(Alias::new("slug"))
				.string_len(255)
				.not_null()
				.unique_key(),
		)
		.col(
			ColumnDef::new(Alias::new("bio"))
				.string_len(500)
				.not_null()
				.default(""),
		)
		.col(ColumnDef::new(Alias::new("date_birthday")).date().null())
		.col(ColumnDef::new(Alias::new("profile_image")).string_len(255).null())
		.foreign_key(
			ForeignKey::create()
				.name("fk_user_profile_user")
				.from(Alias::new(PROFILES), Alias::new("user_id"))
				.to(Alias::new(USERS), Alias::new("id"))
				.on_delete(ForeignKeyAction::Cascade),
		)
		.to_string(SqliteQueryBuilder)
}

fn follows() -> String {
	Table::create()
		.table(Alias::new(FOLLOWS))
		.if_not_exists()
		.col(reference_column("follower_id"))
		.col(reference_column("followee_id"))
		.primary_key(
			Index::create()
				.col(Alias::new("follower_id"))
				.col(Alias::new("followee_id")),
		)
		.check(Expr::col(Alias::new("follower_id")).ne(Expr::col(Alias::new("followee_id"))))
		.foreign_key(
			ForeignKey::create()
				.name("fk_follows_follower")
				.from(Alias::new(FOLLOWS), Alias::new("follower_id"))
				.to(Alias::new(PROFILES), Alias::new("id"))
				.on_delete(ForeignKeyAction::Cascade),
		)
		.foreign_key(
			ForeignKey::create()
				.name("fk_follows_followee")
				.from(Alias::new(FOLLOWS), Alias::new("followee_id"))
				.to(Alias::new(PROFILES), Alias::new("id"))
				.on_delete(ForeignKeyAction::Cascade),
		)
		.to_string(SqliteQueryBuilder)
}

fn categories() -> String {
	Table::create()
		.table(Alias::new(CATEGORIES))
		.if_not_exists()
		.col(id_column())
		.col(ColumnDef::new(Alias::new("name")).string_len(100).not_null())
		.col(
			ColumnDef::new(Alias::new("slug"))
				.string_len(200)
				.not_null()
				.unique_key(),
		)
		.col(
			ColumnDef::new(Alias::new("description"))
				.string_len(300)
				.not_null()
				.default(""),
		)
		.col(
			ColumnDef::new(Alias::new("post_amount"))
				.integer()
				.not_null()
				.default(0),
		)
		.to_string(SqliteQueryBuilder)
}

fn posts() -> String {
	Table::create()
		.table(Alias::new(POSTS))
		.if_not_exists()
		.col(id_column())
		.col(ColumnDef::new(Alias::new("title")).string_len(150).not_null())
		.col(reference_column("author_id"))
		.col(
			ColumnDef::new(Alias::new("short_description"))
				.string_len(300)
				.null(),
		)
		.col(ColumnDef::new(Alias::new("body")).text().not_null())
		.col(
			ColumnDef::new(Alias::new("slug"))
				.string_len(200)
				.not_null()
				.unique_key(),
		)
		.col(reference_column("category_id"))
		.col(ColumnDef::new(Alias::new("post_date")).date_time().not_null())
		.col(ColumnDef::new(Alias::new("image")).string_len(255).null())
		.foreign_key(
			ForeignKey::create()
				.name("fk_blog_post_author")
				.from(Alias::new(POSTS), Alias::new("author_id"))
				.to(Alias::new(USERS), Alias::new("id"))
				.on_delete(ForeignKeyAction::Cascade),
		)
		.foreign_key(
			ForeignKey::create()
				.name("fk_blog_post_category")
				.from(Alias::new(POSTS), Alias::new("category_id"))
				.to(Alias::new(CATEGORIES), Alias::new("id"))
				.on_delete(ForeignKeyAction::Restrict),
		)
		.to_string(SqliteQueryBuilder)
}

fn likes() -> String {
	Table::create()
		.table(Alias::new(LIKES))
		.if_not_exists()
		.col(reference_column("post_id"))
		.col(reference_column("user_id"))
		.primary_key(
			Index::create()
				.col(Alias::new("post_id"))
				.col(Alias::new("user_id")),
		)
		.foreign_key(
			ForeignKey::create()
				.name("fk_likes_post")
				.from(Alias::new(LIKES), Alias::new("post_id"))
				.to(Alias::new(POSTS), Alias::new("id"))
				.on_delete(ForeignKeyAction::Cascade),
		)
		.foreign_key(
			ForeignKey::create()
				.name("fk_likes_user")
				.from(Alias::new(LIKES), Alias::new("user_id"))
				.to(Alias::new(USERS), Alias::new("id"))
				.on_delete(ForeignKeyAction::Cascade),
		)
		.to_string(SqliteQueryBuilder)
}

fn comments() -> String {
	Table::create()
		.table(Alias::new(COMMENTS))
		.if_not_exists()
		.col(id_column())
		.col(reference_column("post_id"))
		.col(reference_column("author_id"))
		.col(ColumnDef::new(Alias::new("text")).string_len(1500).not_null())
		.col(ColumnDef::new(Alias::new("pub_date")).date_time().not_null())
		.foreign_key(
			ForeignKey::create()
				.name("fk_blog_comment_post")
				.from(Alias::new(COMMENTS), Alias::new("post_id"))
				.to(Alias::new(POSTS), Alias::new("id"))
				.on_delete(ForeignKeyAction::Cascade),
		)
		.foreign_key(
			ForeignKey::create()
				.name("fk_blog_comment_author")
				.from(Alias::new(COMMENTS), Alias::new("author_id"))
				.to(Alias::new(USERS), Alias::new("id"))
				.on_delete(ForeignKeyAction::Cascade),
		)
		.to_string(SqliteQueryBuilder)
}

fn index(name: &str, table: &str, column: &str) -> String {
	Index::create()
		.if_not_exists()
		.name(name)
		.table(Alias::new(table))
		.col(Alias::new(column))
		.to_string(SqliteQueryBuilder)
}

/// DDL for the whole schema, tables first, then secondary indexes
pub fn statements() -> Vec<String> {
	vec![
		users(),
		profiles(),
		follows(),
		categories(),
		posts(),
		likes(),
		comments(),
		index("idx_blog_post_post_date", POSTS, "post_date"),
		index("idx_blog_post_category", POSTS, "category_id"),
		index("idx_blog_post_author", POSTS, "author_id"),
		index("idx_blog_comment_post", COMMENTS, "post_id"),
		index("idx_follows_followee", FOLLOWS, "followee_id"),
	]
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_statements_cover_every_table() {
		let sql = statements();

		for table in TABLES {
			assert!(
				sql.iter().any(|s| s.starts_with("CREATE TABLE") && s.contains(&format!("\"{}\"", table))),
				"missing table {}",
				table
			);
		}
	}

	#[test]
	fn test_category_reference_is_restricted() {
		let sql = posts();
		assert!(sql.contains("ON DELETE RESTRICT"));
		assert!(sql.contains("ON DELETE CASCADE"));
	}

	#[test]
	fn test_follows_rejects_self_edges() {
		assert!(follows().contains("CHECK"));
	}
}
