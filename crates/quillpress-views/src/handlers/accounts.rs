//! Profile, follow and authentication handlers

use crate::outcome::{Outcome, RequestContext, login_required, recover, settle};
use crate::routes::Route;
use crate::site::Site;
use quillpress_accounts::forms::{
	LoginForm, PasswordChangeForm, ProfileUpdateForm, RegisterForm, UserUpdateForm,
};
use quillpress_accounts::{Profile, ProfileCard, User};
use quillpress_blog::PostSummary;
use quillpress_core::{Actor, Result};
use serde::Serialize;
use tracing::debug;

const REGISTERED: &str = "Registration completed successfully!";
const WELCOME: &str = "Welcome!";
const PASSWORD_CHANGED: &str = "Your password has been changed";

/// Public profile page
#[derive(Debug, Clone, Serialize)]
pub struct ProfilePage {
	pub card: ProfileCard,
	pub posts: Vec<PostSummary>,
	/// Whether the viewer follows this profile
	pub is_following: bool,
}

/// Data for the profile edit form
#[derive(Debug, Clone, Serialize)]
pub struct ProfileEditPage {
	pub user: User,
	pub profile: Profile,
}

/// `profile:profile_detail`
pub async fn profile_detail(site: &Site, ctx: &mut RequestContext, slug: &str) -> Result<Outcome<ProfilePage>> {
	let card = match site.accounts.profile_card(slug).await {
		Ok(card) => card,
		Err(err) => return recover(site.policy(), ctx, err),
	};
	let posts = site.blog.posts_by_author(card.user.id).await?;
	let is_following = site.accounts.is_following(&ctx.actor, slug).await?;

	Ok(Outcome::render(
		format!("User page: {}", card.user.username),
		ProfilePage {
			card,
			posts,
			is_following,
		},
	))
}

/// `profile:follow`, flips the follow and returns to the profile
pub async fn follow(site: &Site, ctx: &mut RequestContext, slug: &str) -> Result<Outcome<()>> {
	let result = site.accounts.toggle_follow(&ctx.actor, slug).await;
	settle(site.policy(), ctx, result, |ctx, _| {
		ctx.redirect(Route::ProfileDetail {
			slug: slug.to_string(),
		})
	})
}

/// `profile:update_profile` form
pub async fn profile_update_form(site: &Site, ctx: &mut RequestContext) -> Result<Outcome<ProfileEditPage>> {
	if let Some(outcome) = login_required(site.policy(), ctx) {
		return Ok(outcome);
	}
	let result = site.accounts.own_profile(&ctx.actor).await;
	settle(site.policy(), ctx, result, |_, (user, profile)| {
		Outcome::render(
			format!("Editing profile: {}", user.username),
			ProfileEditPage { user, profile },
		)
	})
}

/// `profile:update_profile` submission; both forms are saved or neither
pub async fn profile_update(
	site: &Site,
	ctx: &mut RequestContext,
	user_form: &UserUpdateForm,
	profile_form: &ProfileUpdateForm,
) -> Result<Outcome<()>> {
	let result = site
		.accounts
		.update_profile(&ctx.actor, user_form, profile_form)
		.await;
	settle(site.policy(), ctx, result, |ctx, (user, profile)| {
		ctx.actor = Actor::User(user.to_current());
		ctx.redirect(Route::ProfileDetail { slug: profile.slug })
	})
}

/// `profile:register`
pub async fn register(site: &Site, ctx: &mut RequestContext, form: &RegisterForm) -> Result<Outcome<()>> {
	let result = site.accounts.register(form).await;
	settle(site.policy(), ctx, result, |ctx, _| {
		ctx.messages.success(REGISTERED);
		ctx.redirect(Route::Login)
	})
}

/// `profile:login`; goes to `next` when it is a local path
pub async fn login(
	site: &Site,
	ctx: &mut RequestContext,
	form: &LoginForm,
	next: Option<&str>,
) -> Result<Outcome<()>> {
	let result = site.accounts.login(form).await;
	settle(site.policy(), ctx, result, |ctx, actor| {
		ctx.actor = actor;
		ctx.messages.success(WELCOME);
		match next.filter(|path| is_local_path(path)) {
			Some(path) => ctx.redirect_to(path),
			None => ctx.redirect(Route::Home),
		}
	})
}

/// `profile:logout`
pub fn logout(site: &Site, ctx: &mut RequestContext) -> Outcome<()> {
	ctx.actor = site.accounts.logout(&ctx.actor);
	ctx.redirect(Route::Home)
}

/// `profile:password_change`; a successful change ends the session
pub async fn password_change(
	site: &Site,
	ctx: &mut RequestContext,
	form: &PasswordChangeForm,
) -> Result<Outcome<()>> {
	let result = site.accounts.change_password(&ctx.actor, form).await;
	settle(site.policy(), ctx, result, |ctx, actor| {
		ctx.actor = actor;
		ctx.messages.success(PASSWORD_CHANGED);
		ctx.redirect(Route::Login)
	})
}

fn is_local_path(path: &str) -> bool {
	let local = path.starts_with('/') && !path.starts_with("//") && !path.contains('\\');
	if !local {
		debug!(%path, "ignoring non-local next");
	}
	local
}
