//! Strongly typed primary keys
//!
//! Every table uses an auto-incrementing integer key. Wrapping each one in
//! its own type keeps a `PostId` from being passed where a `UserId` is
//! expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
	($(#[$meta:meta])* $name:ident) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
		#[cfg_attr(feature = "database", derive(sqlx::Type))]
		#[cfg_attr(feature = "database", sqlx(transparent))]
		#[serde(transparent)]
		pub struct $name(pub i64);

		impl $name {
			pub fn get(self) -> i64 {
				self.0
			}
		}

		impl From<i64> for $name {
			fn from(value: i64) -> Self {
				Self(value)
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		#[cfg(feature = "database")]
		impl From<$name> for sea_query::Value {
			fn from(id: $name) -> Self {
				id.0.into()
			}
		}
	};
}

define_id!(
	/// Primary key of `auth_user`
	UserId
);
define_id!(
	/// Primary key of `user_profile`
	ProfileId
);
define_id!(
	/// Primary key of `blog_category`
	CategoryId
);
define_id!(
	/// Primary key of `blog_post`
	PostId
);
define_id!(
	/// Primary key of `blog_comment`
	CommentId
);

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_id_display_and_conversion() {
		let id = PostId::from(42);
		assert_eq!(id.get(), 42);
		assert_eq!(id.to_string(), "42");
	}

	#[test]
	fn test_id_serializes_transparently() {
		let json = serde_json::to_string(&UserId(7)).unwrap();
		assert_eq!(json, "7");
	}
}
