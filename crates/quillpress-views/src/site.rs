//! Services shared by every handler

use quillpress_accounts::Accounts;
use quillpress_blog::{Blog, Sidebar};
use quillpress_conf::Settings;
use quillpress_core::policy::Policy;
use quillpress_core::Result;
use quillpress_db::Database;

#[derive(Debug, Clone)]
pub struct Site {
	pub accounts: Accounts,
	pub blog: Blog,
	policy: Policy,
}

impl Site {
	pub fn new(db: Database, settings: &Settings) -> Self {
		Self {
			accounts: Accounts::new(db.clone(), &settings.auth, &settings.media),
			blog: Blog::new(db, settings),
			policy: Policy::new(settings.auth.login_url.clone()),
		}
	}

	/// Builds a site from already configured services
	pub fn from_parts(accounts: Accounts, blog: Blog) -> Self {
		let policy = blog.policy().clone();
		Self {
			accounts,
			blog,
			policy,
		}
	}

	pub fn policy(&self) -> &Policy {
		&self.policy
	}

	/// Post total and latest comments shown beside every page
	pub async fn sidebar(&self) -> Result<Sidebar> {
		self.blog.sidebar().await
	}
}
