//! Post, category, comment, like and search handlers

use crate::outcome::{Outcome, RequestContext, author_required, login_required, recover, settle};
use crate::routes::Route;
use crate::site::Site;
use quillpress_blog::forms::{CommentForm, PostForm};
use quillpress_blog::{Category, Comment, Post, PostDetail, PostSummary, SearchHit};
use quillpress_core::{CategoryId, CommentId, Page, Result};
use serde::Serialize;

const POST_UPDATED: &str = "You have successfully updated the post.";

/// Posts filed under one category
#[derive(Debug, Clone, Serialize)]
pub struct CategoryPosts {
	pub category: Category,
	pub posts: Page<PostSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
	pub query: String,
	pub hits: Vec<SearchHit>,
}

/// Data for the post create and edit forms
#[derive(Debug, Clone, Serialize)]
pub struct PostFormPage {
	pub post: Option<Post>,
	pub categories: Vec<Category>,
}

/// `blog:home`
pub async fn home(
	site: &Site,
	ctx: &mut RequestContext,
	page: Option<&str>,
) -> Result<Outcome<Page<PostSummary>>> {
	let result = site.blog.post_page(page).await;
	settle(site.policy(), ctx, result, |_, posts| {
		Outcome::render("Home page", posts)
	})
}

/// `blog:post_detail`
pub async fn post_detail(site: &Site, ctx: &mut RequestContext, slug: &str) -> Result<Outcome<PostDetail>> {
	let result = site.blog.post_detail(&ctx.actor, slug).await;
	settle(site.policy(), ctx, result, |_, detail| {
		Outcome::render(detail.post.post.title.clone(), detail)
	})
}

/// `blog:category_list`
pub async fn category_list(
	site: &Site,
	ctx: &mut RequestContext,
	page: Option<&str>,
) -> Result<Outcome<Page<Category>>> {
	let result = site.blog.category_page(page).await;
	settle(site.policy(), ctx, result, |_, categories| {
		Outcome::render("Categories", categories)
	})
}

/// `blog:category_detail`; the slug segment is decorative
pub async fn category_detail(
	site: &Site,
	ctx: &mut RequestContext,
	pk: CategoryId,
	page: Option<&str>,
) -> Result<Outcome<CategoryPosts>> {
	let result = site.blog.posts_by_category(pk, page).await;
	settle(site.policy(), ctx, result, |_, (category, posts)| {
		Outcome::render(category.name.clone(), CategoryPosts { category, posts })
	})
}

/// `blog:search`, login required
pub async fn search(site: &Site, ctx: &mut RequestContext, query: &str) -> Result<Outcome<SearchResults>> {
	if let Some(outcome) = login_required(site.policy(), ctx) {
		return Ok(outcome);
	}
	let result = site.blog.search(&ctx.actor, query).await;
	settle(site.policy(), ctx, result, |_, hits| {
		Outcome::render(
			"Search results",
			SearchResults {
				query: query.to_string(),
				hits,
			},
		)
	})
}

/// `blog:like`, flips the like and returns to the post
pub async fn like(site: &Site, ctx: &mut RequestContext, post_slug: &str) -> Result<Outcome<()>> {
	let result = site.blog.toggle_like(&ctx.actor, post_slug).await;
	settle(site.policy(), ctx, result, |ctx, _| {
		ctx.redirect(Route::PostDetail {
			slug: post_slug.to_string(),
		})
	})
}

/// `blog:post_create` form
pub async fn post_create_form(site: &Site, ctx: &mut RequestContext) -> Result<Outcome<PostFormPage>> {
	if let Some(outcome) = login_required(site.policy(), ctx) {
		return Ok(outcome);
	}
	let categories = site.blog.categories().await?;
	Ok(Outcome::render(
		"Add post",
		PostFormPage {
			post: None,
			categories,
		},
	))
}

/// `blog:post_create` submission
pub async fn post_create(site: &Site, ctx: &mut RequestContext, form: &PostForm) -> Result<Outcome<()>> {
	let result = site.blog.create_post(&ctx.actor, form).await;
	settle(site.policy(), ctx, result, |ctx, post| {
		ctx.redirect(Route::PostDetail { slug: post.slug })
	})
}

/// `blog:post_update` form, author only
pub async fn post_update_form(
	site: &Site,
	ctx: &mut RequestContext,
	slug: &str,
) -> Result<Outcome<PostFormPage>> {
	if let Some(outcome) = login_required(site.policy(), ctx) {
		return Ok(outcome);
	}
	let post = match site.blog.post(slug).await {
		Ok(post) => post,
		Err(err) => return recover(site.policy(), ctx, err),
	};
	if let Some(outcome) = author_required(site.policy(), ctx, &post) {
		return Ok(outcome);
	}
	let categories = site.blog.categories().await?;
	Ok(Outcome::render(
		format!("Updating post: {}", post.title),
		PostFormPage {
			post: Some(post),
			categories,
		},
	))
}

/// `blog:post_update` submission, author only
pub async fn post_update(
	site: &Site,
	ctx: &mut RequestContext,
	slug: &str,
	form: &PostForm,
) -> Result<Outcome<()>> {
	let result = site.blog.update_post(&ctx.actor, slug, form).await;
	settle(site.policy(), ctx, result, |ctx, post| {
		ctx.messages.success(POST_UPDATED);
		ctx.redirect(Route::PostDetail { slug: post.slug })
	})
}

/// `blog:post_delete` confirmation, author only
pub async fn post_delete_confirm(site: &Site, ctx: &mut RequestContext, slug: &str) -> Result<Outcome<Post>> {
	if let Some(outcome) = login_required(site.policy(), ctx) {
		return Ok(outcome);
	}
	let post = match site.blog.post(slug).await {
		Ok(post) => post,
		Err(err) => return recover(site.policy(), ctx, err),
	};
	if let Some(outcome) = author_required(site.policy(), ctx, &post) {
		return Ok(outcome);
	}
	Ok(Outcome::render(format!("Deleting post: {}", post.title), post))
}

/// `blog:post_delete` submission, author only
pub async fn post_delete(site: &Site, ctx: &mut RequestContext, slug: &str) -> Result<Outcome<()>> {
	let result = site.blog.delete_post(&ctx.actor, slug).await;
	settle(site.policy(), ctx, result, |ctx, _| ctx.redirect(Route::Home))
}

/// `blog:comment_create` form
pub fn comment_create_form(site: &Site, ctx: &mut RequestContext) -> Outcome<()> {
	login_required(site.policy(), ctx).unwrap_or_else(|| Outcome::render("Add comment", ()))
}

/// `blog:comment_create` submission
pub async fn comment_create(
	site: &Site,
	ctx: &mut RequestContext,
	post_slug: &str,
	form: &CommentForm,
) -> Result<Outcome<()>> {
	let result = site.blog.create_comment(&ctx.actor, post_slug, form).await;
	settle(site.policy(), ctx, result, |ctx, _| {
		ctx.redirect(Route::PostDetail {
			slug: post_slug.to_string(),
		})
	})
}

/// `blog:comment_update` form, author only
pub async fn comment_update_form(
	site: &Site,
	ctx: &mut RequestContext,
	pk: CommentId,
) -> Result<Outcome<Comment>> {
	if let Some(outcome) = login_required(site.policy(), ctx) {
		return Ok(outcome);
	}
	let comment = match site.blog.comment(pk).await {
		Ok(comment) => comment,
		Err(err) => return recover(site.policy(), ctx, err),
	};
	if let Some(outcome) = author_required(site.policy(), ctx, &comment) {
		return Ok(outcome);
	}
	Ok(Outcome::render(format!("Updating comment: {}", comment.text), comment))
}

/// `blog:comment_update` submission, author only; returns to the post
pub async fn comment_update(
	site: &Site,
	ctx: &mut RequestContext,
	pk: CommentId,
	form: &CommentForm,
) -> Result<Outcome<()>> {
	let comment = match site.blog.update_comment(&ctx.actor, pk, form).await {
		Ok(comment) => comment,
		Err(err) => return recover(site.policy(), ctx, err),
	};
	let result = site.blog.post_by_id(comment.post_id).await;
	settle(site.policy(), ctx, result, |ctx, post| {
		ctx.redirect(Route::PostDetail { slug: post.slug })
	})
}

/// `blog:comment_delete` confirmation, author only
pub async fn comment_delete_confirm(
	site: &Site,
	ctx: &mut RequestContext,
	pk: CommentId,
) -> Result<Outcome<Comment>> {
	if let Some(outcome) = login_required(site.policy(), ctx) {
		return Ok(outcome);
	}
	let comment = match site.blog.comment(pk).await {
		Ok(comment) => comment,
		Err(err) => return recover(site.policy(), ctx, err),
	};
	if let Some(outcome) = author_required(site.policy(), ctx, &comment) {
		return Ok(outcome);
	}
	Ok(Outcome::render(format!("Deleting comment: {}", comment.text), comment))
}

/// `blog:comment_delete` submission, author only
pub async fn comment_delete(site: &Site, ctx: &mut RequestContext, pk: CommentId) -> Result<Outcome<()>> {
	let result = site.blog.delete_comment(&ctx.actor, pk).await;
	settle(site.policy(), ctx, result, |ctx, _| ctx.redirect(Route::Home))
}
