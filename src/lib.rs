//! # Quillpress
//!
//! The data and behaviour core of a multi-author blog: categories with a
//! stored post count, posts with likes and comments, user profiles that
//! follow each other, and the request handlers that tie them together.
//!
//! ## Crates
//!
//! - `quillpress-core`: ids, errors, slugs, pagination, messages, access policy, ranking
//! - `quillpress-conf`: layered settings and logging bootstrap
//! - `quillpress-db`: SQLite pool, schema and unique slug allocation
//! - `quillpress-accounts`: users, profiles, follows, password flows
//! - `quillpress-blog`: categories, posts, likes, comments, search, counters
//! - `quillpress-views`: request handlers returning an `Outcome` (feature `views`)
//!
//! ## Feature Flags
//!
//! - `full` (default): everything, including the handler layer
//! - `minimal`: stores only
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use quillpress::prelude::*;
//!
//! # async fn example() -> std::result::Result<(), quillpress::AppError> {
//! let app = App::open(Settings::in_memory()).await?;
//! app.migrate().await?;
//!
//! let tech = app
//! 	.blog
//! 	.create_category(&CategoryForm {
//! 		name: "Tech".to_string(),
//! 		..Default::default()
//! 	})
//! 	.await?;
//! assert_eq!(tech.post_amount, 0);
//! # Ok(())
//! # }
//! ```

use tracing::info;

pub use quillpress_accounts as accounts;
pub use quillpress_blog as blog;
pub use quillpress_conf as conf;
pub use quillpress_core as core;
pub use quillpress_db as db;
#[cfg(feature = "views")]
pub use quillpress_views as views;

pub use quillpress_accounts::Accounts;
pub use quillpress_blog::Blog;
pub use quillpress_conf::{Settings, SettingsError};
pub use quillpress_core::{Actor, Error, Result};
pub use quillpress_db::Database;
#[cfg(feature = "views")]
pub use quillpress_views::{Outcome, RequestContext, Route, Site};

/// Failures while bringing an [`App`] up
#[derive(Debug, thiserror::Error)]
pub enum AppError {
	#[error(transparent)]
	Settings(#[from] SettingsError),

	#[error(transparent)]
	Core(#[from] Error),
}

/// Every store wired to one database
#[derive(Debug, Clone)]
pub struct App {
	pub settings: Settings,
	pub db: Database,
	pub accounts: Accounts,
	pub blog: Blog,
	#[cfg(feature = "views")]
	pub site: Site,
}

impl App {
	/// Validates `settings` and connects; the schema is left untouched
	pub async fn open(settings: Settings) -> std::result::Result<Self, AppError> {
		settings.validate()?;
		let db = Database::connect(&settings.database).await?;
		Ok(Self::with_database(settings, db))
	}

	/// Wires the stores over an already opened database
	pub fn with_database(settings: Settings, db: Database) -> Self {
		let accounts = Accounts::new(db.clone(), &settings.auth, &settings.media);
		let blog = Blog::new(db.clone(), &settings);
		Self {
			#[cfg(feature = "views")]
			site: Site::from_parts(accounts.clone(), blog.clone()),
			settings,
			db,
			accounts,
			blog,
		}
	}

	/// Creates any missing tables
	pub async fn migrate(&self) -> Result<()> {
		self.db.migrate().await?;
		info!(url = %self.settings.database.url, "schema up to date");
		Ok(())
	}

	pub async fn close(&self) {
		self.db.close().await;
	}
}

pub mod prelude {
	pub use crate::{App, AppError};

	pub use quillpress_accounts::prelude::*;
	pub use quillpress_blog::prelude::*;
	pub use quillpress_conf::Settings;
	pub use quillpress_core::prelude::*;
	pub use quillpress_db::Database;

	#[cfg(feature = "views")]
	pub use quillpress_views::{Outcome, RequestContext, Route, Site};
}
