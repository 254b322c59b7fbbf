//! # quillpress-views
//!
//! Request handlers without a server. Each handler takes the [`Site`], a
//! [`RequestContext`] and the parsed input, and returns an [`Outcome`]
//! telling the caller what to show or where to go.
//!
//! ## Access gates
//!
//! - [`login_required`]: anonymous actors go to the login page with `next`
//! - [`author_required`]: other users go home with a notice
//!
//! ```rust,no_run
//! use quillpress_conf::Settings;
//! use quillpress_db::Database;
//! use quillpress_views::{handlers, RequestContext, Site};
//!
//! # async fn example() -> quillpress_core::Result<()> {
//! let db = Database::in_memory_migrated().await?;
//! let site = Site::new(db, &Settings::default());
//!
//! let mut ctx = RequestContext::anonymous("/");
//! let outcome = handlers::blog::home(&site, &mut ctx, None).await?;
//! assert!(outcome.context().is_some());
//! # Ok(())
//! # }
//! ```

pub mod handlers;
pub mod outcome;
pub mod routes;
pub mod site;

pub use outcome::{Outcome, RequestContext, author_required, login_required, recover, settle};
pub use routes::Route;
pub use site::Site;
