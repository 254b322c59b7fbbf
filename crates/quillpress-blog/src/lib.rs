//! # quillpress-blog
//!
//! Content side of Quillpress.
//!
//! ## Modules
//!
//! - `categories`: Category store and the busiest-first listing
//! - `posts`: Post store and list projections
//! - `likes`: Like membership per user and post
//! - `comments`: Comment store and the latest-comments feed
//! - `counters`: `post_amount` maintenance called by post writers
//! - `search`: Weighted ranking over titles and bodies
//! - `service`: The [`Blog`] service used by request handlers
//!
//! ## Example
//!
//! ```rust,no_run
//! use quillpress_blog::Blog;
//! use quillpress_conf::Settings;
//! use quillpress_core::Actor;
//! use quillpress_db::Database;
//!
//! # async fn example() -> quillpress_core::Result<()> {
//! let db = Database::in_memory_migrated().await?;
//! let blog = Blog::new(db, &Settings::default());
//!
//! let page = blog.post_page(None).await?;
//! assert_eq!(page.number, 1);
//! let hits = blog.search(&Actor::Anonymous, "rust").await;
//! assert!(hits.is_err());
//! # Ok(())
//! # }
//! ```

pub mod categories;
pub mod comments;
pub mod counters;
pub mod forms;
pub mod likes;
pub mod models;
pub mod posts;
pub mod search;
pub mod service;

pub use forms::{CategoryForm, CommentForm, PostForm};
pub use models::{Category, Comment, CommentView, Post, PostDetail, PostSummary, SearchHit, Sidebar};
pub use service::Blog;

/// Prelude module for convenient imports
pub mod prelude {
	pub use crate::forms::{CategoryForm, CommentForm, PostForm};
	pub use crate::models::*;
	pub use crate::service::Blog;
}
