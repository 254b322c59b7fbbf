//! # quillpress-core
//!
//! Shared kernel for the Quillpress blogging platform.
//!
//! ## Modules
//!
//! - `error`: The workspace-wide [`Error`] type and field-level [`FormErrors`]
//! - `types`: Strongly typed primary keys
//! - `slug`: Slug derivation and collision suffixes
//! - `pagination`: Page-number pagination
//! - `messages`: One-time notices shown to the acting user
//! - `validators`: File extension and slug validators
//! - `policy`: The authorization gate for author-owned content
//! - `search`: Weighted full-text ranking
//! - `media`: Upload paths and placeholder URLs
//!
//! ## Quick Start
//!
//! ```rust
//! use quillpress_core::slug::base_slug;
//!
//! assert_eq!(base_slug("Rust Basics", "post", 200), "rust-basics");
//! assert_eq!(base_slug("???", "post", 200), "post");
//! ```

pub mod error;
pub mod media;
pub mod messages;
pub mod pagination;
pub mod policy;
pub mod search;
pub mod slug;
pub mod types;
pub mod validators;

pub use error::{Error, FormErrors, Result};
pub use messages::{Level, Message, Messages};
pub use pagination::{Page, Paginator};
pub use policy::{Actor, Authored, CurrentUser, Decision, Policy};
pub use types::{CategoryId, CommentId, PostId, ProfileId, UserId};

/// Prelude module for convenient imports
pub mod prelude {
	pub use crate::error::{Error, FormErrors, Result};
	pub use crate::messages::{Level, Message, Messages};
	pub use crate::pagination::{Page, Paginator};
	pub use crate::policy::{Actor, Authored, CurrentUser, Decision, Policy};
	pub use crate::types::*;
}
