//! Blog rows and read projections

use chrono::{DateTime, Utc};
use quillpress_core::media::image_url;
use quillpress_core::policy::Authored;
use quillpress_core::{CategoryId, CommentId, PostId, UserId};
use quillpress_db::SlugTable;
use quillpress_db::schema::{CATEGORIES, POSTS};
use serde::Serialize;
use sqlx::FromRow;

/// Row of `blog_category`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Category {
	pub id: CategoryId,
	pub name: String,
	pub slug: String,
	pub description: String,
	/// Number of posts filed under this category
	pub post_amount: i64,
}

impl SlugTable for Category {
	const TABLE: &'static str = CATEGORIES;
	const SLUG_MAX_LENGTH: usize = 200;
	const FALLBACK: &'static str = "category";
}

/// Row of `blog_post`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Post {
	pub id: PostId,
	pub title: String,
	pub author_id: UserId,
	pub short_description: Option<String>,
	/// Rich text, may contain HTML
	pub body: String,
	pub slug: String,
	pub category_id: CategoryId,
	pub post_date: DateTime<Utc>,
	pub image: Option<String>,
}

impl Post {
	/// Image URL, or the post placeholder
	pub fn thumbnail_url(&self, media_url: &str, placeholder: &str) -> String {
		image_url(self.image.as_deref(), media_url, placeholder)
	}
}

impl Authored for Post {
	fn author_id(&self) -> UserId {
		self.author_id
	}
}

impl SlugTable for Post {
	const TABLE: &'static str = POSTS;
	const SLUG_MAX_LENGTH: usize = 200;
	const FALLBACK: &'static str = "post";
}

/// Row of `blog_comment`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Comment {
	pub id: CommentId,
	pub post_id: PostId,
	pub author_id: UserId,
	pub text: String,
	pub pub_date: DateTime<Utc>,
}

impl Authored for Comment {
	fn author_id(&self) -> UserId {
		self.author_id
	}
}

/// Post joined with its author and category names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct PostSummary {
	#[sqlx(flatten)]
	#[serde(flatten)]
	pub post: Post,
	pub author_username: String,
	pub category_name: String,
	pub category_slug: String,
}

impl Authored for PostSummary {
	fn author_id(&self) -> UserId {
		self.post.author_id
	}
}

/// Comment joined with its author and post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct CommentView {
	#[sqlx(flatten)]
	#[serde(flatten)]
	pub comment: Comment,
	pub author_username: String,
	pub post_title: String,
	pub post_slug: String,
}

/// Everything the post page shows
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
	pub post: PostSummary,
	pub thumbnail_url: String,
	pub comments: Vec<CommentView>,
	pub total_likes: i64,
	/// Whether the viewing user likes the post; `false` when anonymous
	pub liked: bool,
}

/// Site-wide sidebar data
#[derive(Debug, Clone, Serialize)]
pub struct Sidebar {
	pub total_posts: i64,
	pub latest_comments: Vec<CommentView>,
}

/// A search hit with its rank
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
	pub post: PostSummary,
	pub rank: f64,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_thumbnail_falls_back_to_placeholder() {
		let mut post = Post {
			id: PostId(1),
			title: "Intro".to_string(),
			author_id: UserId(1),
			short_description: None,
			body: String::new(),
			slug: "intro".to_string(),
			category_id: CategoryId(1),
			post_date: Utc::now(),
			image: None,
		};

		assert_eq!(
			post.thumbnail_url("/media/", "/static/img/placeholder.png"),
			"/static/img/placeholder.png"
		);

		post.image = Some("blog/media/post_image/cover.webp".to_string());
		assert_eq!(
			post.thumbnail_url("/media/", "/static/img/placeholder.png"),
			"/media/blog/media/post_image/cover.webp"
		);
	}
}
