//! # quillpress-accounts
//!
//! Users, their public profiles and the follow graph between profiles.
//!
//! ## Modules
//!
//! - `hasher`: Argon2 password hashing
//! - `models`: `auth_user` and `user_profile` rows
//! - `forms`: Sign-up, login, password change and profile edit forms
//! - `store`: Row-level queries that run inside a caller's transaction
//! - `follows`: Follow edges between profiles
//! - `service`: The [`Accounts`] service used by request handlers
//!
//! A profile is created in the same transaction as its user and is removed
//! with it by cascade.

pub mod follows;
pub mod forms;
pub mod hasher;
pub mod models;
pub mod service;
pub mod store;

pub use forms::{LoginForm, PasswordChangeForm, ProfileUpdateForm, RegisterForm, UserUpdateForm};
pub use hasher::{Argon2Hasher, PasswordHasher};
pub use models::{Profile, ProfileCard, User};
pub use service::Accounts;

/// Prelude module for convenient imports
pub mod prelude {
	pub use crate::forms::*;
	pub use crate::models::{Profile, ProfileCard, User};
	pub use crate::service::Accounts;
}
