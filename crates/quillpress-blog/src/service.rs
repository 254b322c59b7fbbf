//! Blog operations as seen by a request
//!
//! Writes run in one transaction each. Post writes that derive a slug are
//! retried when a concurrent insert wins the slug.

use crate::forms::{CategoryForm, CommentForm, PostForm};
use crate::models::{Category, Comment, Post, PostDetail, PostSummary, SearchHit, Sidebar};
use crate::{categories, comments, counters, likes, posts, search};
use quillpress_accounts::store as accounts_store;
use quillpress_conf::Settings;
use quillpress_core::policy::{Actor, Policy};
use quillpress_core::{CategoryId, CommentId, Error, Page, Paginator, PostId, Result, UserId};
use quillpress_db::{Database, SLUG_RETRY_ATTEMPTS, retry_on_slug_conflict};
use tracing::{debug, info};

/// Blog service shared by request handlers
#[derive(Debug, Clone)]
pub struct Blog {
	db: Database,
	policy: Policy,
	posts_per_page: usize,
	categories_per_page: usize,
	min_rank: f64,
	latest_comments: usize,
	media_url: String,
	post_placeholder: String,
}

impl Blog {
	pub fn new(db: Database, settings: &Settings) -> Self {
		Self {
			db,
			policy: Policy::new(settings.auth.login_url.clone()),
			posts_per_page: settings.pagination.posts_per_page,
			categories_per_page: settings.pagination.categories_per_page,
			min_rank: settings.search.min_rank,
			latest_comments: settings.sidebar.latest_comments,
			media_url: settings.media.media_url.clone(),
			post_placeholder: settings.media.post_placeholder.clone(),
		}
	}

	pub fn policy(&self) -> &Policy {
		&self.policy
	}

	pub fn database(&self) -> &Database {
		&self.db
	}

	// Categories

	pub async fn create_category(&self, form: &CategoryForm) -> Result<Category> {
		let db = &self.db;
		retry_on_slug_conflict(SLUG_RETRY_ATTEMPTS, |_| async move {
			let mut tx = db.begin().await?;
			let category = categories::create(&mut tx, form).await?;
			tx.commit().await?;
			Ok::<_, Error>(category)
		})
		.await
	}

	pub async fn delete_category(&self, id: CategoryId) -> Result<()> {
		let mut tx = self.db.begin().await?;
		categories::delete(&mut tx, id).await?;
		tx.commit().await?;
		Ok(())
	}

	pub async fn category(&self, id: CategoryId) -> Result<Category> {
		let mut conn = self.db.pool().acquire().await?;
		categories::get(&mut conn, id).await
	}

	pub async fn categories(&self) -> Result<Vec<Category>> {
		let mut conn = self.db.pool().acquire().await?;
		categories::all(&mut conn).await
	}

	/// Category list page, busiest first
	pub async fn category_page(&self, page: Option<&str>) -> Result<Page<Category>> {
		let mut conn = self.db.pool().acquire().await?;
		categories::list_page(&mut conn, Paginator::new(self.categories_per_page), page).await
	}

	// Posts

	/// Home page posts, newest first
	pub async fn post_page(&self, page: Option<&str>) -> Result<Page<PostSummary>> {
		let mut conn = self.db.pool().acquire().await?;
		posts::list_page(&mut conn, Paginator::new(self.posts_per_page), page).await
	}

	/// Posts of the category with primary key `id`
	pub async fn posts_by_category(
		&self,
		id: CategoryId,
		page: Option<&str>,
	) -> Result<(Category, Page<PostSummary>)> {
		let mut conn = self.db.pool().acquire().await?;
		let category = categories::get(&mut conn, id).await?;
		let page =
			posts::by_category_page(&mut conn, category.id, Paginator::new(self.posts_per_page), page)
				.await?;
		Ok((category, page))
	}

	/// Every post written by `author`
	pub async fn posts_by_author(&self, author: UserId) -> Result<Vec<PostSummary>> {
		let mut conn = self.db.pool().acquire().await?;
		posts::by_author(&mut conn, author).await
	}

	pub async fn post(&self, slug: &str) -> Result<Post> {
		let mut conn = self.db.pool().acquire().await?;
		posts::by_slug(&mut conn, slug).await
	}

	pub async fn post_by_id(&self, id: PostId) -> Result<Post> {
		let mut conn = self.db.pool().acquire().await?;
		posts::get(&mut conn, id).await
	}

	/// Post page with comments and like state for `actor`
	pub async fn post_detail(&self, actor: &Actor, slug: &str) -> Result<PostDetail> {
		let mut conn = self.db.pool().acquire().await?;
		let post = posts::summary_by_slug(&mut conn, slug).await?;
		let comments = comments::for_post(&mut conn, post.post.id).await?;
		let total_likes = likes::total(&mut conn, post.post.id).await?;
		let liked = match actor.user_id() {
			Some(user) => likes::liked(&mut conn, post.post.id, user).await?,
			None => false,
		};
		debug!(%slug, comments = comments.len(), total_likes, "post detail loaded");

		Ok(PostDetail {
			thumbnail_url: post
				.post
				.thumbnail_url(&self.media_url, &self.post_placeholder),
			post,
			comments,
			total_likes,
			liked,
		})
	}

	/// Publishes a post by the acting user
	pub async fn create_post(&self, actor: &Actor, form: &PostForm) -> Result<Post> {
		self.policy.login_required(actor).into_result()?;
		let author = actor.require()?.id;

		let db = &self.db;
		retry_on_slug_conflict(SLUG_RETRY_ATTEMPTS, |_| async move {
			let mut tx = db.begin().await?;
			let post = posts::create(&mut tx, author, form).await?;
			tx.commit().await?;
			Ok::<_, Error>(post)
		})
		.await
	}

	/// Edits the post at `slug`; only its author may
	pub async fn update_post(&self, actor: &Actor, slug: &str, form: &PostForm) -> Result<Post> {
		self.policy.login_required(actor).into_result()?;
		let db = &self.db;
		let policy = &self.policy;
		retry_on_slug_conflict(SLUG_RETRY_ATTEMPTS, |_| async move {
			let mut tx = db.begin().await?;
			let post = posts::by_slug(&mut tx, slug).await?;
			policy.authorize(actor, &post).into_result()?;
			let updated = posts::update(&mut tx, &post, form).await?;
			tx.commit().await?;
			Ok::<_, Error>(updated)
		})
		.await
	}

	/// Deletes the post at `slug`; only its author may
	pub async fn delete_post(&self, actor: &Actor, slug: &str) -> Result<Post> {
		self.policy.login_required(actor).into_result()?;
		let mut tx = self.db.begin().await?;
		let post = posts::by_slug(&mut tx, slug).await?;
		self.policy.authorize(actor, &post).into_result()?;
		posts::delete(&mut tx, &post).await?;
		tx.commit().await?;
		Ok(post)
	}

	pub async fn total_posts(&self) -> Result<i64> {
		let mut conn = self.db.pool().acquire().await?;
		posts::total(&mut conn).await
	}

	// Likes

	/// Flips the acting user's like on the post at `slug`
	pub async fn toggle_like(&self, actor: &Actor, slug: &str) -> Result<bool> {
		self.policy.login_required(actor).into_result()?;
		let user = actor.require()?.id;

		let mut tx = self.db.begin().await?;
		let post = posts::by_slug(&mut tx, slug).await?;
		let liked = likes::toggle(&mut tx, post.id, user).await?;
		tx.commit().await?;

		info!(post_id = %post.id, user_id = %user, liked, "like toggled");
		Ok(liked)
	}

	pub async fn set_like(&self, actor: &Actor, slug: &str, liked: bool) -> Result<bool> {
		self.policy.login_required(actor).into_result()?;
		let user = actor.require()?.id;

		let mut tx = self.db.begin().await?;
		let post = posts::by_slug(&mut tx, slug).await?;
		let liked = likes::set(&mut tx, post.id, user, liked).await?;
		tx.commit().await?;

		info!(post_id = %post.id, user_id = %user, liked, "like set");
		Ok(liked)
	}

	// Comments

	pub async fn comment(&self, id: CommentId) -> Result<Comment> {
		let mut conn = self.db.pool().acquire().await?;
		comments::get(&mut conn, id).await
	}

	/// Adds a comment by the acting user to the post at `post_slug`
	pub async fn create_comment(&self, actor: &Actor, post_slug: &str, form: &CommentForm) -> Result<Comment> {
		self.policy.login_required(actor).into_result()?;
		let author = actor.require()?.id;

		let mut tx = self.db.begin().await?;
		let post = posts::by_slug(&mut tx, post_slug).await?;
		let comment = comments::create(&mut tx, post.id, author, form).await?;
		tx.commit().await?;
		Ok(comment)
	}

	pub async fn update_comment(&self, actor: &Actor, id: CommentId, form: &CommentForm) -> Result<Comment> {
		self.policy.login_required(actor).into_result()?;
		let mut tx = self.db.begin().await?;
		let comment = comments::get(&mut tx, id).await?;
		self.policy.authorize(actor, &comment).into_result()?;
		let updated = comments::update(&mut tx, &comment, form).await?;
		tx.commit().await?;
		Ok(updated)
	}

	pub async fn delete_comment(&self, actor: &Actor, id: CommentId) -> Result<Comment> {
		self.policy.login_required(actor).into_result()?;
		let mut tx = self.db.begin().await?;
		let comment = comments::get(&mut tx, id).await?;
		self.policy.authorize(actor, &comment).into_result()?;
		comments::delete(&mut tx, &comment).await?;
		tx.commit().await?;
		Ok(comment)
	}

	// Search and sidebar

	/// Ranked search; requires login
	pub async fn search(&self, actor: &Actor, query: &str) -> Result<Vec<SearchHit>> {
		self.policy.login_required(actor).into_result()?;
		let mut conn = self.db.pool().acquire().await?;
		search::search(&mut conn, query, self.min_rank).await
	}

	pub async fn sidebar(&self) -> Result<Sidebar> {
		let mut conn = self.db.pool().acquire().await?;
		Ok(Sidebar {
			total_posts: posts::total(&mut conn).await?,
			latest_comments: comments::latest(&mut conn, self.latest_comments).await?,
		})
	}

	// Maintenance

	/// Deletes a user after taking their posts out of the category counts
	pub async fn delete_user(&self, user: UserId) -> Result<()> {
		let mut tx = self.db.begin().await?;
		counters::release_author_posts(&mut tx, user).await?;
		accounts_store::delete_user(&mut tx, user).await?;
		tx.commit().await?;
		info!(user_id = %user, "user deleted");
		Ok(())
	}

	/// Recomputes every category count; returns how many were wrong
	pub async fn recount_post_amounts(&self) -> Result<u64> {
		let mut tx = self.db.begin().await?;
		let corrected = counters::recount_post_amounts(&mut tx).await?;
		tx.commit().await?;
		Ok(corrected)
	}
}
