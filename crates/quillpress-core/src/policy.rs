//! Authorization gate for author-owned content
//!
//! Content stores never look at sessions. They receive an [`Actor`] and ask
//! the [`Policy`] whether it may act on an [`Authored`] entity. A denied
//! author check is not a hard error: the caller shows a notice and
//! redirects home.

use crate::error::{Error, Result};
use crate::messages::Message;
use crate::types::UserId;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Notice shown when someone other than the author tries to edit or delete
pub const AUTHOR_ONLY_NOTICE: &str = "Editing and deletion are available only to the author.";

/// Default login entry point
pub const DEFAULT_LOGIN_URL: &str = "/profile/login/";

/// Authenticated identity of a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
	pub id: UserId,
	pub username: String,
}

impl CurrentUser {
	pub fn new(id: UserId, username: impl Into<String>) -> Self {
		Self {
			id,
			username: username.into(),
		}
	}
}

/// Who is performing a request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Actor {
	#[default]
	Anonymous,
	User(CurrentUser),
}

impl Actor {
	pub fn user(id: UserId, username: impl Into<String>) -> Self {
		Actor::User(CurrentUser::new(id, username))
	}

	pub fn is_authenticated(&self) -> bool {
		matches!(self, Actor::User(_))
	}

	pub fn user_id(&self) -> Option<UserId> {
		self.current().map(|user| user.id)
	}

	pub fn current(&self) -> Option<&CurrentUser> {
		match self {
			Actor::User(user) => Some(user),
			Actor::Anonymous => None,
		}
	}

	/// The authenticated user, or [`Error::AuthenticationRequired`]
	pub fn require(&self) -> Result<&CurrentUser> {
		self.current().ok_or(Error::AuthenticationRequired)
	}
}

/// Entities that belong to a single user
pub trait Authored {
	fn author_id(&self) -> UserId;
}

/// Result of an authorization check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
	Allow,
	/// Authenticated but not the author: show the notice, redirect home
	DenyWithNotice(Message),
	/// Anonymous: redirect to the login entry point
	RequireAuth { login_url: String },
}

impl Decision {
	pub fn is_allowed(&self) -> bool {
		matches!(self, Decision::Allow)
	}

	/// Converts a refusal into the matching [`Error`]
	pub fn into_result(self) -> Result<()> {
		match self {
			Decision::Allow => Ok(()),
			Decision::DenyWithNotice(message) => Err(Error::PermissionDenied(message.text)),
			Decision::RequireAuth { .. } => Err(Error::AuthenticationRequired),
		}
	}
}

/// Login and authorship checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
	login_url: String,
}

impl Default for Policy {
	fn default() -> Self {
		Self::new(DEFAULT_LOGIN_URL)
	}
}

impl Policy {
	pub fn new(login_url: impl Into<String>) -> Self {
		Self {
			login_url: login_url.into(),
		}
	}

	pub fn login_url(&self) -> &str {
		&self.login_url
	}

	/// Allows any authenticated actor
	pub fn login_required(&self, actor: &Actor) -> Decision {
		if actor.is_authenticated() {
			Decision::Allow
		} else {
			Decision::RequireAuth {
				login_url: self.login_url.clone(),
			}
		}
	}

	/// Allows only the author of `entity`
	///
	/// # Examples
	///
	/// ```
	/// use quillpress_core::policy::{Actor, Authored, Decision, Policy};
	/// use quillpress_core::UserId;
	///
	/// struct Note(UserId);
	/// impl Authored for Note {
	/// 	fn author_id(&self) -> UserId {
	/// 		self.0
	/// 	}
	/// }
	///
	/// let policy = Policy::default();
	/// let note = Note(UserId(1));
	/// assert!(policy.authorize(&Actor::user(UserId(1), "alice"), &note).is_allowed());
	/// assert!(!policy.authorize(&Actor::user(UserId(2), "bob"), &note).is_allowed());
	/// ```
	pub fn authorize<E: Authored + ?Sized>(&self, actor: &Actor, entity: &E) -> Decision {
		match actor {
			Actor::Anonymous => self.login_required(actor),
			Actor::User(user) if user.id == entity.author_id() => Decision::Allow,
			Actor::User(user) => {
				warn!(
					user_id = %user.id,
					author_id = %entity.author_id(),
					"author-only action denied"
				);
				Decision::DenyWithNotice(Message::info(AUTHOR_ONLY_NOTICE))
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::messages::Level;

	struct Owned(UserId);

	impl Authored for Owned {
		fn author_id(&self) -> UserId {
			self.0
		}
	}

	#[test]
	fn test_anonymous_requires_auth() {
		let decision = Policy::default().authorize(&Actor::Anonymous, &Owned(UserId(1)));

		assert_eq!(
			decision,
			Decision::RequireAuth {
				login_url: "/profile/login/".to_string()
			}
		);
		assert!(matches!(
			decision.into_result(),
			Err(Error::AuthenticationRequired)
		));
	}

	#[test]
	fn test_other_user_gets_notice() {
		let decision = Policy::default().authorize(&Actor::user(UserId(2), "bob"), &Owned(UserId(1)));

		match decision {
			Decision::DenyWithNotice(message) => {
				assert_eq!(message.level, Level::Info);
				assert_eq!(message.text, AUTHOR_ONLY_NOTICE);
			}
			other => panic!("unexpected decision: {:?}", other),
		}
	}

	#[test]
	fn test_author_allowed() {
		let decision = Policy::default().authorize(&Actor::user(UserId(1), "alice"), &Owned(UserId(1)));
		assert!(decision.into_result().is_ok());
	}

	#[test]
	fn test_login_required_uses_configured_url() {
		let policy = Policy::new("/accounts/login/");

		assert!(policy.login_required(&Actor::user(UserId(1), "alice")).is_allowed());
		assert_eq!(
			policy.login_required(&Actor::Anonymous),
			Decision::RequireAuth {
				login_url: "/accounts/login/".to_string()
			}
		);
	}
}
