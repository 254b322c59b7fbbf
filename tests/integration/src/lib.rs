//! Shared setup for cross-crate integration tests

use quillpress::{App, Settings};
use quillpress_accounts::PasswordHasher;
use quillpress_accounts::forms::RegisterForm;
use quillpress_core::{Actor, Result};
use quillpress_db::Database;
use quillpress_views::Site;

/// Password every test user registers with
pub const PASSWORD: &str = "blue-harbour-42";

/// Stores passwords as `plain$<password>` so tests skip Argon2
pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
	fn hash(&self, password: &str) -> Result<String> {
		Ok(format!("plain${}", password))
	}

	fn verify(&self, password: &str, hash: &str) -> Result<bool> {
		Ok(hash.strip_prefix("plain$") == Some(password))
	}
}

/// Migrated in-memory app using [`PlainHasher`]
pub async fn test_app() -> App {
	let db = Database::in_memory_migrated()
		.await
		.expect("Failed to open in-memory database");
	let mut app = App::with_database(Settings::in_memory(), db);
	app.accounts = app.accounts.clone().with_hasher(PlainHasher);
	app.site = Site::from_parts(app.accounts.clone(), app.blog.clone());
	app
}

pub fn register_form(username: &str) -> RegisterForm {
	RegisterForm {
		username: username.to_string(),
		email: format!("{}@example.com", username),
		password1: PASSWORD.to_string(),
		password2: PASSWORD.to_string(),
	}
}

/// Registers `username` and returns it as a signed-in actor
pub async fn signed_in(app: &App, username: &str) -> Actor {
	let (user, _) = app
		.accounts
		.register(&register_form(username))
		.await
		.expect("Failed to register test user");
	Actor::User(user.to_current())
}
