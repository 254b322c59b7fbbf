//! Account operations as seen by a request
//!
//! Each operation opens one transaction, checks the acting user through
//! the [`Policy`], and commits only when every step succeeded.

use crate::follows;
use crate::forms::{
	LoginForm, PasswordChangeForm, ProfileUpdateForm, RegisterForm, UserUpdateForm, field_errors,
	password_problems,
};
use crate::hasher::{Argon2Hasher, PasswordHasher};
use crate::models::{Profile, ProfileCard, User};
use crate::store::{self, NewUser, ProfileFields, UserFields};
use chrono::Utc;
use quillpress_conf::{AuthSettings, MediaSettings};
use quillpress_core::policy::{Actor, Policy};
use quillpress_core::{Error, FormErrors, Result, UserId};
use quillpress_db::Database;
use std::sync::Arc;
use tracing::{debug, info, warn};

const INVALID_LOGIN: &str =
	"Please enter a correct username and password. Note that both fields may be case-sensitive.";
const EMAIL_NOT_UNIQUE: &str = "Email address must be unique.";
const USERNAME_TAKEN: &str = "A user with that username already exists.";
const PASSWORDS_DIFFER: &str = "The two password fields didn't match.";

/// Account service shared by request handlers
#[derive(Clone)]
pub struct Accounts {
	db: Database,
	hasher: Arc<dyn PasswordHasher>,
	policy: Policy,
	min_password_length: usize,
	media: MediaSettings,
}

impl std::fmt::Debug for Accounts {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Accounts")
			.field("policy", &self.policy)
			.field("min_password_length", &self.min_password_length)
			.finish_non_exhaustive()
	}
}

impl Accounts {
	pub fn new(db: Database, auth: &AuthSettings, media: &MediaSettings) -> Self {
		Self {
			db,
			hasher: Arc::new(Argon2Hasher::new()),
			policy: Policy::new(auth.login_url.clone()),
			min_password_length: auth.min_password_length,
			media: media.clone(),
		}
	}

	/// Replaces the password hasher
	pub fn with_hasher(mut self, hasher: impl PasswordHasher + 'static) -> Self {
		self.hasher = Arc::new(hasher);
		self
	}

	pub fn policy(&self) -> &Policy {
		&self.policy
	}

	/// Creates a user and its profile together
	pub async fn register(&self, form: &RegisterForm) -> Result<(User, Profile)> {
		let mut errors = field_errors(form);
		let username = form.username.trim();
		let email = form.email.trim();

		if form.password1 != form.password2 {
			errors.add("password2", PASSWORDS_DIFFER);
		} else {
			for problem in password_problems(&form.password1, username, self.min_password_length) {
				errors.add("password2", problem);
			}
		}

		let mut tx = self.db.begin().await?;
		if !errors.has("username") && store::username_taken(&mut tx, username, None).await? {
			errors.add("username", USERNAME_TAKEN);
		}
		if !errors.has("email") && store::email_taken(&mut tx, email, username).await? {
			errors.add("email", EMAIL_NOT_UNIQUE);
		}
		errors.into_result()?;

		let hash = self.hasher.hash(&form.password1)?;
		let user = store::insert_user(
			&mut tx,
			NewUser {
				username,
				email,
				password_hash: &hash,
			},
		)
		.await?;
		let profile = store::insert_profile(&mut tx, &user).await?;
		tx.commit().await?;

		info!(user_id = %user.id, username = %user.username, "user registered");
		Ok((user, profile))
	}

	/// Verifies credentials and returns the authenticated actor
	pub async fn login(&self, form: &LoginForm) -> Result<Actor> {
		field_errors(form).into_result()?;

		let mut conn = self.db.pool().acquire().await?;
		let user = match store::find_by_username(&mut conn, form.username.trim()).await? {
			Some(user) => user,
			None => {
				// Burn the same time as a real verification
				let _ = self.hasher.hash(&form.password);
				return Err(invalid_login());
			}
		};
		if !self.hasher.verify(&form.password, &user.password)? || !user.is_active {
			warn!(username = %user.username, "failed login");
			return Err(invalid_login());
		}

		store::touch_last_login(&mut conn, user.id).await?;
		info!(user_id = %user.id, "user logged in");
		Ok(Actor::User(user.to_current()))
	}

	/// Ends the session of `actor`
	pub fn logout(&self, actor: &Actor) -> Actor {
		if let Some(user) = actor.current() {
			info!(user_id = %user.id, "user logged out");
		}
		Actor::Anonymous
	}

	/// Changes the actor's password and logs them out
	pub async fn change_password(&self, actor: &Actor, form: &PasswordChangeForm) -> Result<Actor> {
		self.policy.login_required(actor).into_result()?;
		let current = actor.require()?;

		let mut errors = field_errors(form);
		let mut tx = self.db.begin().await?;
		let user = store::get_user(&mut tx, current.id).await?;

		if !errors.has("old_password") && !self.hasher.verify(&form.old_password, &user.password)? {
			errors.add(
				"old_password",
				"Your old password was entered incorrectly. Please enter it again.",
			);
		}
		if form.new_password1 != form.new_password2 {
			errors.add("new_password2", PASSWORDS_DIFFER);
		} else {
			for problem in
				password_problems(&form.new_password1, &user.username, self.min_password_length)
			{
				errors.add("new_password2", problem);
			}
		}
		if errors.is_empty() && self.hasher.verify(&form.new_password1, &user.password)? {
			errors.add_non_field("The new password matches the old one.");
		}
		errors.into_result()?;

		let hash = self.hasher.hash(&form.new_password1)?;
		store::set_password_hash(&mut tx, user.id, &hash).await?;
		tx.commit().await?;

		info!(user_id = %user.id, "password changed");
		Ok(self.logout(actor))
	}

	/// Saves the identity and profile forms together or not at all
	pub async fn update_profile(
		&self,
		actor: &Actor,
		user_form: &UserUpdateForm,
		profile_form: &ProfileUpdateForm,
	) -> Result<(User, Profile)> {
		self.policy.login_required(actor).into_result()?;
		let current = actor.require()?;

		let mut errors = field_errors(user_form);
		errors.merge(field_errors(profile_form));
		let username = user_form.username.trim();
		let email = user_form.email.trim();

		let mut tx = self.db.begin().await?;
		let profile = store::profile_for_user(&mut tx, current.id).await?;
		self.policy.authorize(actor, &profile).into_result()?;

		if !errors.has("username") && store::username_taken(&mut tx, username, Some(current.id)).await? {
			errors.add("username", USERNAME_TAKEN);
		}
		if !errors.has("email") && store::email_taken(&mut tx, email, username).await? {
			errors.add("email", EMAIL_NOT_UNIQUE);
		}
		errors.into_result()?;

		store::update_user(
			&mut tx,
			current.id,
			UserFields {
				username,
				email,
				first_name: user_form.first_name.trim(),
				last_name: user_form.last_name.trim(),
			},
		)
		.await?;

		let image = if profile_form.clear_profile_image {
			None
		} else {
			profile_form
				.profile_image
				.as_deref()
				.or(profile.profile_image.as_deref())
		};
		store::update_profile(
			&mut tx,
			profile.id,
			ProfileFields {
				bio: profile_form.bio.trim(),
				profile_image: image,
				date_birthday: profile_form.date_birthday,
			},
		)
		.await?;

		let user = store::get_user(&mut tx, current.id).await?;
		let profile = store::get_profile(&mut tx, profile.id).await?;
		tx.commit().await?;

		info!(user_id = %user.id, "profile updated");
		Ok((user, profile))
	}

	pub async fn user(&self, id: UserId) -> Result<User> {
		let mut conn = self.db.pool().acquire().await?;
		store::get_user(&mut conn, id).await
	}

	/// The profile of the acting user
	pub async fn own_profile(&self, actor: &Actor) -> Result<(User, Profile)> {
		self.policy.login_required(actor).into_result()?;
		let current = actor.require()?;
		let mut conn = self.db.pool().acquire().await?;
		let user = store::get_user(&mut conn, current.id).await?;
		let profile = store::profile_for_user(&mut conn, current.id).await?;
		Ok((user, profile))
	}

	/// Profile page data for `slug`
	pub async fn profile_card(&self, slug: &str) -> Result<ProfileCard> {
		let mut conn = self.db.pool().acquire().await?;
		let profile = store::profile_by_slug(&mut conn, slug).await?;
		let user = store::get_user(&mut conn, profile.user_id).await?;
		let followers = follows::followers_count(&mut conn, profile.id).await?;
		let following = follows::following_count(&mut conn, profile.id).await?;
		debug!(%slug, followers, following, "profile loaded");

		Ok(ProfileCard {
			image_url: profile.image_url(&self.media.media_url, &self.media.avatar_placeholder),
			age: profile.age(Utc::now().date_naive()),
			profile,
			user,
			followers,
			following,
		})
	}

	/// Flips whether the actor follows the profile at `slug`
	pub async fn toggle_follow(&self, actor: &Actor, slug: &str) -> Result<bool> {
		self.policy.login_required(actor).into_result()?;
		let current = actor.require()?;

		let mut tx = self.db.begin().await?;
		let follower = store::profile_for_user(&mut tx, current.id).await?;
		let followee = store::profile_by_slug(&mut tx, slug).await?;
		let following = follows::toggle(&mut tx, follower.id, followee.id).await?;
		tx.commit().await?;

		info!(follower = %follower.slug, followee = %followee.slug, following, "follow toggled");
		Ok(following)
	}

	/// Makes the actor follow or unfollow the profile at `slug`
	pub async fn set_follow(&self, actor: &Actor, slug: &str, following: bool) -> Result<bool> {
		self.policy.login_required(actor).into_result()?;
		let current = actor.require()?;

		let mut tx = self.db.begin().await?;
		let follower = store::profile_for_user(&mut tx, current.id).await?;
		let followee = store::profile_by_slug(&mut tx, slug).await?;
		let following = follows::set(&mut tx, follower.id, followee.id, following).await?;
		tx.commit().await?;

		info!(follower = %follower.slug, followee = %followee.slug, following, "follow set");
		Ok(following)
	}

	/// Whether the actor follows the profile at `slug`; `false` when anonymous
	pub async fn is_following(&self, actor: &Actor, slug: &str) -> Result<bool> {
		let Some(current) = actor.current() else {
			return Ok(false);
		};
		let mut conn = self.db.pool().acquire().await?;
		let follower = store::profile_for_user(&mut conn, current.id).await?;
		let followee = store::profile_by_slug(&mut conn, slug).await?;
		follows::is_following(&mut conn, follower.id, followee.id).await
	}

	pub async fn followers(&self, slug: &str) -> Result<Vec<Profile>> {
		let mut conn = self.db.pool().acquire().await?;
		let profile = store::profile_by_slug(&mut conn, slug).await?;
		follows::followers(&mut conn, profile.id).await
	}

	pub async fn following(&self, slug: &str) -> Result<Vec<Profile>> {
		let mut conn = self.db.pool().acquire().await?;
		let profile = store::profile_by_slug(&mut conn, slug).await?;
		follows::following(&mut conn, profile.id).await
	}
}

fn invalid_login() -> Error {
	let mut errors = FormErrors::new();
	errors.add_non_field(INVALID_LOGIN);
	Error::Validation(errors)
}
