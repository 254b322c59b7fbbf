//! Named routes and their paths
//!
//! ```
//! use quillpress_views::Route;
//!
//! assert_eq!(Route::PostDetail { slug: "intro".into() }.path(), "/post/intro/");
//! assert_eq!(Route::Login.path(), "/profile/login/");
//! ```

use quillpress_core::{CategoryId, CommentId};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
	Home,
	PostDetail { slug: String },
	CategoryList,
	CategoryDetail { pk: CategoryId, slug: String },
	Search,
	Like,
	PostCreate,
	PostUpdate { slug: String },
	PostDelete { slug: String },
	CommentCreate { slug: String },
	CommentUpdate { pk: CommentId },
	CommentDelete { pk: CommentId },
	ProfileDetail { slug: String },
	ProfileUpdate,
	Follow { slug: String },
	Register,
	Login,
	Logout,
	PasswordChange,
}

impl Route {
	/// Reverses the route to its path
	pub fn path(&self) -> String {
		match self {
			Route::Home => "/".to_string(),
			Route::PostDetail { slug } => format!("/post/{}/", slug),
			Route::CategoryList => "/category_list/".to_string(),
			Route::CategoryDetail { pk, slug } => format!("/category/{}/{}/", pk, slug),
			Route::Search => "/search/".to_string(),
			Route::Like => "/like/".to_string(),
			Route::PostCreate => "/post_create/".to_string(),
			Route::PostUpdate { slug } => format!("/post/{}/update/", slug),
			Route::PostDelete { slug } => format!("/post/{}/delete/", slug),
			Route::CommentCreate { slug } => format!("/post/{}/comment/", slug),
			Route::CommentUpdate { pk } => format!("/comment/{}/update/", pk),
			Route::CommentDelete { pk } => format!("/comment/{}/delete/", pk),
			Route::ProfileDetail { slug } => format!("/profile/profile_detail/{}/", slug),
			Route::ProfileUpdate => "/profile/update_profile/".to_string(),
			Route::Follow { slug } => format!("/profile/follow/{}/", slug),
			Route::Register => "/profile/register/".to_string(),
			Route::Login => "/profile/login/".to_string(),
			Route::Logout => "/profile/logout/".to_string(),
			Route::PasswordChange => "/profile/change_pass/".to_string(),
		}
	}

	/// Route name as `app:name`
	pub fn name(&self) -> &'static str {
		match self {
			Route::Home => "blog:home",
			Route::PostDetail { .. } => "blog:post_detail",
			Route::CategoryList => "blog:category_list",
			Route::CategoryDetail { .. } => "blog:category_detail",
			Route::Search => "blog:search",
			Route::Like => "blog:like",
			Route::PostCreate => "blog:post_create",
			Route::PostUpdate { .. } => "blog:post_update",
			Route::PostDelete { .. } => "blog:post_delete",
			Route::CommentCreate { .. } => "blog:comment_create",
			Route::CommentUpdate { .. } => "blog:comment_update",
			Route::CommentDelete { .. } => "blog:comment_delete",
			Route::ProfileDetail { .. } => "profile:profile_detail",
			Route::ProfileUpdate => "profile:update_profile",
			Route::Follow { .. } => "profile:follow",
			Route::Register => "profile:register",
			Route::Login => "profile:login",
			Route::Logout => "profile:logout",
			Route::PasswordChange => "profile:password_change",
		}
	}
}

impl fmt::Display for Route {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.path())
	}
}
