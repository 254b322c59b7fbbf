//! Blog flows against an in-memory database

use quillpress_accounts::store::{self as accounts_store, NewUser};
use quillpress_blog::forms::{CategoryForm, CommentForm, PostForm};
use quillpress_blog::{Blog, Category};
use quillpress_conf::Settings;
use quillpress_core::policy::AUTHOR_ONLY_NOTICE;
use quillpress_core::{Actor, CategoryId, CommentId, Error};
use quillpress_db::Database;
use rstest::*;

struct Harness {
	db: Database,
	blog: Blog,
}

#[fixture]
async fn harness() -> Harness {
	let db = Database::in_memory_migrated().await.unwrap();
	let blog = Blog::new(db.clone(), &Settings::default());
	Harness { db, blog }
}

impl Harness {
	async fn user(&self, username: &str) -> Actor {
		let mut conn = self.db.pool().acquire().await.unwrap();
		let user = accounts_store::insert_user(
			&mut conn,
			NewUser {
				username,
				email: "",
				password_hash: "unused",
			},
		)
		.await
		.unwrap();
		accounts_store::insert_profile(&mut conn, &user).await.unwrap();
		Actor::User(user.to_current())
	}

	async fn category(&self, name: &str) -> Category {
		self.blog
			.create_category(&CategoryForm {
				name: name.to_string(),
				..Default::default()
			})
			.await
			.unwrap()
	}

	async fn post_amount(&self, id: CategoryId) -> i64 {
		self.blog.category(id).await.unwrap().post_amount
	}
}

fn post_form(title: &str, category: &Category, body: &str) -> PostForm {
	PostForm {
		title: title.to_string(),
		category: Some(category.id),
		body: body.to_string(),
		..Default::default()
	}
}

#[rstest]
#[tokio::test]
async fn test_post_amount_follows_create_and_delete(#[future] harness: Harness) {
	// Arrange
	let h = harness.await;
	let alice = h.user("alice").await;
	let tech = h.category("Tech").await;
	assert_eq!(tech.post_amount, 0);

	// Act
	let post = h
		.blog
		.create_post(&alice, &post_form("Intro", &tech, "<p>Hello</p>"))
		.await
		.unwrap();
	let after_create = h.post_amount(tech.id).await;
	h.blog.delete_post(&alice, &post.slug).await.unwrap();

	// Assert
	assert_eq!(after_create, 1);
	assert_eq!(h.post_amount(tech.id).await, 0);
}

#[rstest]
#[tokio::test]
async fn test_non_author_update_is_denied(#[future] harness: Harness) {
	// Arrange
	let h = harness.await;
	let alice = h.user("alice").await;
	let bob = h.user("bob").await;
	let tech = h.category("Tech").await;
	let post = h
		.blog
		.create_post(&alice, &post_form("Intro", &tech, "body"))
		.await
		.unwrap();

	// Act
	let err = h
		.blog
		.update_post(&bob, &post.slug, &post_form("Hijacked", &tech, "body"))
		.await
		.unwrap_err();

	// Assert
	match err {
		Error::PermissionDenied(notice) => assert_eq!(notice, AUTHOR_ONLY_NOTICE),
		other => panic!("unexpected error: {:?}", other),
	}
	assert_eq!(h.blog.post(&post.slug).await.unwrap().title, "Intro");
}

#[rstest]
#[tokio::test]
async fn test_non_author_delete_is_denied(#[future] harness: Harness) {
	let h = harness.await;
	let alice = h.user("alice").await;
	let bob = h.user("bob").await;
	let tech = h.category("Tech").await;
	let post = h
		.blog
		.create_post(&alice, &post_form("Intro", &tech, "body"))
		.await
		.unwrap();

	let err = h.blog.delete_post(&bob, &post.slug).await.unwrap_err();

	assert!(matches!(err, Error::PermissionDenied(_)));
	assert_eq!(h.post_amount(tech.id).await, 1);
	assert!(h.blog.post(&post.slug).await.is_ok());
}

#[rstest]
#[tokio::test]
async fn test_anonymous_cannot_post(#[future] harness: Harness) {
	let h = harness.await;
	let tech = h.category("Tech").await;

	let err = h
		.blog
		.create_post(&Actor::Anonymous, &post_form("Intro", &tech, "body"))
		.await
		.unwrap_err();

	assert!(matches!(err, Error::AuthenticationRequired));
	assert_eq!(h.post_amount(tech.id).await, 0);
}

#[rstest]
#[tokio::test]
async fn test_anonymous_owner_actions_fail_before_lookup(#[future] harness: Harness) {
	// Arrange: neither the slug nor the comment exists
	let h = harness.await;
	let tech = h.category("Tech").await;
	let form = post_form("Ghost", &tech, "body");
	let comment = CommentForm {
		text: "Boo".to_string(),
	};
	let anonymous = Actor::Anonymous;

	// Act
	let update_post = h.blog.update_post(&anonymous, "ghost", &form).await;
	let delete_post = h.blog.delete_post(&anonymous, "ghost").await;
	let update_comment = h.blog.update_comment(&anonymous, CommentId(404), &comment).await;
	let delete_comment = h.blog.delete_comment(&anonymous, CommentId(404)).await;

	// Assert
	assert!(matches!(update_post, Err(Error::AuthenticationRequired)));
	assert!(matches!(delete_post, Err(Error::AuthenticationRequired)));
	assert!(matches!(update_comment, Err(Error::AuthenticationRequired)));
	assert!(matches!(delete_comment, Err(Error::AuthenticationRequired)));
}

#[rstest]
#[tokio::test]
async fn test_colliding_titles_get_distinct_slugs(#[future] harness: Harness) {
	// Arrange
	let h = harness.await;
	let alice = h.user("alice").await;
	let tech = h.category("Tech").await;

	// Act
	let first = h.blog.create_post(&alice, &post_form("Intro", &tech, "a")).await.unwrap();
	let second = h.blog.create_post(&alice, &post_form("Intro", &tech, "b")).await.unwrap();
	let symbols = h.blog.create_post(&alice, &post_form("???", &tech, "c")).await.unwrap();

	// Assert
	assert_eq!(first.slug, "intro");
	assert_eq!(second.slug, "intro-2");
	assert_eq!(symbols.slug, "post");
	assert_eq!(h.post_amount(tech.id).await, 3);
}

#[rstest]
#[tokio::test]
async fn test_explicit_slug_is_checked(#[future] harness: Harness) {
	let h = harness.await;
	let alice = h.user("alice").await;
	let tech = h.category("Tech").await;
	h.blog.create_post(&alice, &post_form("Intro", &tech, "a")).await.unwrap();

	let mut taken = post_form("Another", &tech, "b");
	taken.slug = Some("intro".to_string());
	let mut malformed = post_form("Another", &tech, "b");
	malformed.slug = Some("not a slug!".to_string());

	let taken_err = h.blog.create_post(&alice, &taken).await.unwrap_err();
	let malformed_err = h.blog.create_post(&alice, &malformed).await.unwrap_err();

	assert!(taken_err.form_errors().unwrap().has("slug"));
	assert!(malformed_err.form_errors().unwrap().has("slug"));
	assert_eq!(h.post_amount(tech.id).await, 1);
}

#[rstest]
#[tokio::test]
async fn test_update_slug_rules(#[future] harness: Harness) {
	// Arrange
	let h = harness.await;
	let alice = h.user("alice").await;
	let tech = h.category("Tech").await;
	let post = h.blog.create_post(&alice, &post_form("Intro", &tech, "a")).await.unwrap();

	// Act: omitted slug keeps the current one
	let kept = h
		.blog
		.update_post(&alice, &post.slug, &post_form("Renamed", &tech, "a"))
		.await
		.unwrap();

	// Act: cleared slug is derived again from the title
	let mut cleared = post_form("Renamed", &tech, "a");
	cleared.slug = Some(String::new());
	let derived = h.blog.update_post(&alice, &kept.slug, &cleared).await.unwrap();

	// Act: explicit slug is stored
	let mut explicit = post_form("Renamed", &tech, "a");
	explicit.slug = Some("custom_slug".to_string());
	let custom = h.blog.update_post(&alice, &derived.slug, &explicit).await.unwrap();

	// Assert
	assert_eq!(kept.slug, "intro");
	assert_eq!(kept.title, "Renamed");
	assert_eq!(derived.slug, "renamed");
	assert_eq!(custom.slug, "custom_slug");
	assert_eq!(custom.post_date, post.post_date);
}

#[rstest]
#[tokio::test]
async fn test_category_reassignment_moves_count(#[future] harness: Harness) {
	// Arrange
	let h = harness.await;
	let alice = h.user("alice").await;
	let tech = h.category("Tech").await;
	let life = h.category("Life").await;
	let post = h.blog.create_post(&alice, &post_form("Intro", &tech, "a")).await.unwrap();

	// Act
	h.blog
		.update_post(&alice, &post.slug, &post_form("Intro", &life, "a"))
		.await
		.unwrap();

	// Assert
	assert_eq!(h.post_amount(tech.id).await, 0);
	assert_eq!(h.post_amount(life.id).await, 1);
}

#[rstest]
#[tokio::test]
async fn test_unknown_category_is_a_field_error(#[future] harness: Harness) {
	let h = harness.await;
	let alice = h.user("alice").await;
	let form = PostForm {
		title: "Intro".to_string(),
		category: Some(CategoryId(999)),
		body: "a".to_string(),
		..Default::default()
	};

	let err = h.blog.create_post(&alice, &form).await.unwrap_err();

	assert!(err.form_errors().unwrap().has("category"));
}

#[rstest]
#[tokio::test]
async fn test_like_toggled_twice_restores_state(#[future] harness: Harness) {
	// Arrange
	let h = harness.await;
	let alice = h.user("alice").await;
	let bob = h.user("bob").await;
	let tech = h.category("Tech").await;
	let post = h.blog.create_post(&alice, &post_form("Intro", &tech, "a")).await.unwrap();

	// Act
	let first = h.blog.toggle_like(&bob, &post.slug).await.unwrap();
	let detail = h.blog.post_detail(&bob, &post.slug).await.unwrap();
	let second = h.blog.toggle_like(&bob, &post.slug).await.unwrap();

	// Assert
	assert!(first);
	assert!(detail.liked);
	assert_eq!(detail.total_likes, 1);
	assert!(!second);
	let detail = h.blog.post_detail(&bob, &post.slug).await.unwrap();
	assert!(!detail.liked);
	assert_eq!(detail.total_likes, 0);
}

#[rstest]
#[tokio::test]
async fn test_set_like_is_idempotent(#[future] harness: Harness) {
	let h = harness.await;
	let alice = h.user("alice").await;
	let tech = h.category("Tech").await;
	let post = h.blog.create_post(&alice, &post_form("Intro", &tech, "a")).await.unwrap();

	h.blog.set_like(&alice, &post.slug, true).await.unwrap();
	h.blog.set_like(&alice, &post.slug, true).await.unwrap();

	let detail = h.blog.post_detail(&Actor::Anonymous, &post.slug).await.unwrap();
	assert_eq!(detail.total_likes, 1);
	assert!(!detail.liked);
}

#[rstest]
#[tokio::test]
async fn test_search_ranks_title_match_first(#[future] harness: Harness) {
	// Arrange
	let h = harness.await;
	let alice = h.user("alice").await;
	let tech = h.category("Tech").await;
	h.blog
		.create_post(
			&alice,
			&post_form("Gardening", &tech, "<p>Rust on tools, rust on gates, rust everywhere</p>"),
		)
		.await
		.unwrap();
	h.blog
		.create_post(&alice, &post_form("Rust Basics", &tech, "<p>Ownership first</p>"))
		.await
		.unwrap();
	h.blog
		.create_post(&alice, &post_form("Cooking", &tech, "<p>Soup</p>"))
		.await
		.unwrap();

	// Act
	let hits = h.blog.search(&alice, "rust").await.unwrap();

	// Assert
	let titles: Vec<&str> = hits.iter().map(|hit| hit.post.post.title.as_str()).collect();
	assert_eq!(titles, ["Rust Basics", "Gardening"]);
	assert!(hits[0].rank > hits[1].rank);
}

#[rstest]
#[tokio::test]
async fn test_search_empty_query_and_anonymous(#[future] harness: Harness) {
	let h = harness.await;
	let alice = h.user("alice").await;
	let tech = h.category("Tech").await;
	h.blog.create_post(&alice, &post_form("Rust", &tech, "a")).await.unwrap();

	assert!(h.blog.search(&alice, "   ").await.unwrap().is_empty());
	assert!(matches!(
		h.blog.search(&Actor::Anonymous, "rust").await,
		Err(Error::AuthenticationRequired)
	));
}

#[rstest]
#[tokio::test]
async fn test_category_with_posts_is_protected(#[future] harness: Harness) {
	// Arrange
	let h = harness.await;
	let alice = h.user("alice").await;
	let tech = h.category("Tech").await;
	let empty = h.category("Empty").await;
	h.blog.create_post(&alice, &post_form("Intro", &tech, "a")).await.unwrap();

	// Act
	let err = h.blog.delete_category(tech.id).await.unwrap_err();

	// Assert
	assert!(matches!(err, Error::ProtectedReference { .. }));
	assert!(h.blog.delete_category(empty.id).await.is_ok());
	assert!(h.blog.category(empty.id).await.unwrap_err().is_not_found());
}

#[rstest]
#[tokio::test]
async fn test_user_deletion_releases_category_counts(#[future] harness: Harness) {
	// Arrange
	let h = harness.await;
	let alice = h.user("alice").await;
	let bob = h.user("bob").await;
	let tech = h.category("Tech").await;
	let life = h.category("Life").await;
	h.blog.create_post(&alice, &post_form("One", &tech, "a")).await.unwrap();
	h.blog.create_post(&alice, &post_form("Two", &tech, "a")).await.unwrap();
	h.blog.create_post(&alice, &post_form("Three", &life, "a")).await.unwrap();
	h.blog.create_post(&bob, &post_form("Four", &tech, "a")).await.unwrap();

	// Act
	h.blog.delete_user(alice.user_id().unwrap()).await.unwrap();

	// Assert
	assert_eq!(h.post_amount(tech.id).await, 1);
	assert_eq!(h.post_amount(life.id).await, 0);
	assert_eq!(h.blog.total_posts().await.unwrap(), 1);
	assert_eq!(h.blog.recount_post_amounts().await.unwrap(), 0);
}

#[rstest]
#[tokio::test]
async fn test_recount_repairs_drift(#[future] harness: Harness) {
	let h = harness.await;
	let alice = h.user("alice").await;
	let tech = h.category("Tech").await;
	h.blog.create_post(&alice, &post_form("One", &tech, "a")).await.unwrap();
	sqlx::query("UPDATE blog_category SET post_amount = 7")
		.execute(h.db.pool())
		.await
		.unwrap();

	let corrected = h.blog.recount_post_amounts().await.unwrap();

	assert_eq!(corrected, 1);
	assert_eq!(h.post_amount(tech.id).await, 1);
}

#[rstest]
#[tokio::test]
async fn test_comment_lifecycle(#[future] harness: Harness) {
	// Arrange
	let h = harness.await;
	let alice = h.user("alice").await;
	let bob = h.user("bob").await;
	let tech = h.category("Tech").await;
	let post = h.blog.create_post(&alice, &post_form("Intro", &tech, "a")).await.unwrap();
	let form = CommentForm {
		text: "Nice post".to_string(),
	};

	// Act
	let comment = h.blog.create_comment(&bob, &post.slug, &form).await.unwrap();
	let denied = h
		.blog
		.update_comment(
			&alice,
			comment.id,
			&CommentForm {
				text: "Edited by someone else".to_string(),
			},
		)
		.await;
	let edited = h
		.blog
		.update_comment(
			&bob,
			comment.id,
			&CommentForm {
				text: "Great post".to_string(),
			},
		)
		.await
		.unwrap();

	// Assert
	assert!(matches!(denied, Err(Error::PermissionDenied(_))));
	assert_eq!(edited.text, "Great post");
	assert_eq!(edited.pub_date, comment.pub_date);
	let detail = h.blog.post_detail(&Actor::Anonymous, &post.slug).await.unwrap();
	assert_eq!(detail.comments.len(), 1);
	assert_eq!(detail.comments[0].author_username, "bob");

	h.blog.delete_comment(&bob, comment.id).await.unwrap();
	assert!(h.blog.comment(comment.id).await.unwrap_err().is_not_found());
}

#[rstest]
#[tokio::test]
async fn test_sidebar_lists_latest_comments(#[future] harness: Harness) {
	// Arrange
	let h = harness.await;
	let alice = h.user("alice").await;
	let tech = h.category("Tech").await;
	let post = h.blog.create_post(&alice, &post_form("Intro", &tech, "a")).await.unwrap();
	for n in 0..7 {
		let form = CommentForm {
			text: format!("comment {}", n),
		};
		h.blog.create_comment(&alice, &post.slug, &form).await.unwrap();
	}

	// Act
	let sidebar = h.blog.sidebar().await.unwrap();

	// Assert
	assert_eq!(sidebar.total_posts, 1);
	assert_eq!(sidebar.latest_comments.len(), 5);
	assert_eq!(sidebar.latest_comments[0].comment.text, "comment 6");
	assert_eq!(sidebar.latest_comments[0].post_slug, "intro");
}

#[rstest]
#[tokio::test]
async fn test_post_pages_newest_first(#[future] harness: Harness) {
	// Arrange
	let h = harness.await;
	let alice = h.user("alice").await;
	let tech = h.category("Tech").await;
	for n in 1..=12 {
		h.blog
			.create_post(&alice, &post_form(&format!("Post {}", n), &tech, "a"))
			.await
			.unwrap();
	}

	// Act
	let first = h.blog.post_page(None).await.unwrap();
	let second = h.blog.post_page(Some("2")).await.unwrap();
	let missing = h.blog.post_page(Some("3")).await;

	// Assert
	assert_eq!(first.object_list.len(), 10);
	assert_eq!(first.object_list[0].post.title, "Post 12");
	assert_eq!(first.object_list[0].author_username, "alice");
	assert_eq!(second.object_list.len(), 2);
	assert_eq!(second.num_pages, 2);
	assert!(missing.unwrap_err().is_not_found());
}

#[rstest]
#[tokio::test]
async fn test_category_page_busiest_first(#[future] harness: Harness) {
	// Arrange
	let h = harness.await;
	let alice = h.user("alice").await;
	let quiet = h.category("Quiet").await;
	let busy = h.category("Busy").await;
	for n in 0..3 {
		h.blog
			.create_post(&alice, &post_form(&format!("Busy {}", n), &busy, "a"))
			.await
			.unwrap();
	}
	h.blog.create_post(&alice, &post_form("Quiet", &quiet, "a")).await.unwrap();

	// Act
	let page = h.blog.category_page(None).await.unwrap();
	let (category, posts) = h.blog.posts_by_category(busy.id, None).await.unwrap();

	// Assert
	assert_eq!(page.object_list[0].name, "Busy");
	assert_eq!(page.object_list[0].post_amount, 3);
	assert_eq!(category.slug, "busy");
	assert_eq!(posts.count, 3);
}
