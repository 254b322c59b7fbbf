//! Two authors using the site end to end through the handler layer

use quillpress::App;
use quillpress_accounts::forms::LoginForm;
use quillpress_blog::forms::{CategoryForm, CommentForm, PostForm};
use quillpress_blog::{Category, PostDetail};
use quillpress_core::Actor;
use quillpress_integration_tests::{PASSWORD, register_form, test_app};
use quillpress_views::handlers::{accounts, blog};
use quillpress_views::{Outcome, RequestContext};
use rstest::*;

#[fixture]
async fn app() -> App {
	test_app().await
}

async fn sign_up_and_log_in(app: &App, username: &str) -> Actor {
	let mut ctx = RequestContext::anonymous("/profile/register/");
	let registered = accounts::register(&app.site, &mut ctx, &register_form(username))
		.await
		.unwrap();
	assert_eq!(registered.location(), Some("/profile/login/"));

	let form = LoginForm {
		username: username.to_string(),
		password: PASSWORD.to_string(),
	};
	let logged_in = accounts::login(&app.site, &mut ctx, &form, None).await.unwrap();
	assert_eq!(logged_in.location(), Some("/"));
	ctx.actor
}

async fn category(app: &App, name: &str) -> Category {
	app.blog
		.create_category(&CategoryForm {
			name: name.to_string(),
			..Default::default()
		})
		.await
		.unwrap()
}

fn post_form(title: &str, category: &Category, body: &str) -> PostForm {
	PostForm {
		title: title.to_string(),
		category: Some(category.id),
		body: body.to_string(),
		..Default::default()
	}
}

async fn detail(app: &App, actor: &Actor, slug: &str) -> PostDetail {
	let mut ctx = RequestContext::new(actor.clone(), format!("/post/{}/", slug));
	match blog::post_detail(&app.site, &mut ctx, slug).await.unwrap() {
		Outcome::Render { context, .. } => context,
		other => panic!("unexpected outcome: {:?}", other),
	}
}

async fn post_amounts(app: &App) -> Vec<(String, i64)> {
	app.blog
		.categories()
		.await
		.unwrap()
		.into_iter()
		.map(|c| (c.name, c.post_amount))
		.collect()
}

#[rstest]
#[tokio::test]
async fn test_two_author_journey(#[future] app: App) {
	let app = app.await;

	// Arrange: two signed-in users and two categories
	let alice = sign_up_and_log_in(&app, "alice").await;
	let bob = sign_up_and_log_in(&app, "bob").await;
	let tech = category(&app, "Tech").await;
	let garden = category(&app, "Garden").await;

	// Act: both publish
	let mut alice_ctx = RequestContext::new(alice.clone(), "/post_create/");
	let created = blog::post_create(
		&app.site,
		&mut alice_ctx,
		&post_form(
			"Rust Basics",
			&tech,
			"<p>Rust ownership. <em>rust</em> borrowing. More rust.</p>",
		),
	)
	.await
	.unwrap();
	let mut bob_ctx = RequestContext::new(bob.clone(), "/post_create/");
	blog::post_create(
		&app.site,
		&mut bob_ctx,
		&post_form("Gardening", &garden, "<p>No rust on these tools.</p>"),
	)
	.await
	.unwrap();

	// Assert
	assert_eq!(created.location(), Some("/post/rust-basics/"));
	assert_eq!(
		post_amounts(&app).await,
		vec![("Garden".to_string(), 1), ("Tech".to_string(), 1)]
	);

	// Act: bob engages with alice's post and profile
	let comment = CommentForm {
		text: "Great intro".to_string(),
	};
	blog::comment_create(&app.site, &mut bob_ctx, "rust-basics", &comment)
		.await
		.unwrap();
	blog::like(&app.site, &mut bob_ctx, "rust-basics").await.unwrap();
	accounts::follow(&app.site, &mut bob_ctx, "alice").await.unwrap();

	// Assert
	let seen_by_bob = detail(&app, &bob, "rust-basics").await;
	assert!(seen_by_bob.liked);
	assert_eq!(seen_by_bob.total_likes, 1);
	assert_eq!(seen_by_bob.comments.len(), 1);
	assert_eq!(seen_by_bob.comments[0].author_username, "bob");
	assert!(!detail(&app, &alice, "rust-basics").await.liked);
	assert_eq!(app.accounts.profile_card("alice").await.unwrap().followers, 1);

	// Act: search
	let mut search_ctx = RequestContext::new(bob.clone(), "/search/");
	let results = blog::search(&app.site, &mut search_ctx, "rust").await.unwrap();

	// Assert: the single body mention in "Gardening" stays under the threshold
	match results {
		Outcome::Render { context, .. } => {
			let titles: Vec<_> = context.hits.iter().map(|h| h.post.post.title.as_str()).collect();
			assert_eq!(titles, vec!["Rust Basics"]);
		}
		other => panic!("unexpected outcome: {:?}", other),
	}

	// Act: alice refiles her post
	let moved = blog::post_update(
		&app.site,
		&mut alice_ctx,
		"rust-basics",
		&post_form("Rust Basics", &garden, "<p>Moved.</p>"),
	)
	.await
	.unwrap();

	// Assert
	assert_eq!(moved.location(), Some("/post/rust-basics/"));
	assert_eq!(
		post_amounts(&app).await,
		vec![("Garden".to_string(), 2), ("Tech".to_string(), 0)]
	);

	// Act: bob's account goes away
	app.blog.delete_user(bob.user_id().unwrap()).await.unwrap();

	// Assert: his post, comment, like and follow go with him
	assert_eq!(
		post_amounts(&app).await,
		vec![("Garden".to_string(), 1), ("Tech".to_string(), 0)]
	);
	let seen_by_alice = detail(&app, &alice, "rust-basics").await;
	assert_eq!(seen_by_alice.total_likes, 0);
	assert!(seen_by_alice.comments.is_empty());
	assert_eq!(app.accounts.profile_card("alice").await.unwrap().followers, 0);
	let sidebar = app.site.sidebar().await.unwrap();
	assert_eq!(sidebar.total_posts, 1);
	assert!(sidebar.latest_comments.is_empty());
	assert_eq!(app.blog.recount_post_amounts().await.unwrap(), 0);
}

#[rstest]
#[tokio::test]
async fn test_stale_session_after_password_change(#[future] app: App) {
	// Arrange
	let app = app.await;
	let alice = sign_up_and_log_in(&app, "alice").await;
	let tech = category(&app, "Tech").await;
	let mut ctx = RequestContext::new(alice, "/profile/change_pass/");
	let change = quillpress_accounts::forms::PasswordChangeForm {
		old_password: PASSWORD.to_string(),
		new_password1: "green-meadow-17".to_string(),
		new_password2: "green-meadow-17".to_string(),
	};

	// Act
	accounts::password_change(&app.site, &mut ctx, &change).await.unwrap();
	ctx.path = "/post_create/".to_string();
	let outcome = blog::post_create(&app.site, &mut ctx, &post_form("Late", &tech, "<p>x</p>"))
		.await
		.unwrap();

	// Assert
	assert_eq!(outcome.location(), Some("/profile/login/?next=/post_create/"));
	assert_eq!(app.blog.total_posts().await.unwrap(), 0);
}
