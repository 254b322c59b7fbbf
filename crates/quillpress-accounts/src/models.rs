//! Account rows

use chrono::{DateTime, NaiveDate, Utc};
use quillpress_core::media::image_url;
use quillpress_core::policy::{Authored, CurrentUser};
use quillpress_core::{ProfileId, UserId};
use quillpress_db::SlugTable;
use quillpress_db::schema::PROFILES;
use serde::Serialize;
use sqlx::FromRow;

/// Row of `auth_user`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct User {
	pub id: UserId,
	pub username: String,
	pub email: String,
	pub first_name: String,
	pub last_name: String,
	#[serde(skip_serializing)]
	pub password: String,
	pub is_active: bool,
	pub date_joined: DateTime<Utc>,
	pub last_login: Option<DateTime<Utc>>,
}

impl User {
	/// First and last name joined, or the username when both are empty
	pub fn display_name(&self) -> String {
		let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
		let full = full.trim();
		if full.is_empty() {
			self.username.clone()
		} else {
			full.to_string()
		}
	}

	/// Identity to carry in a request once logged in
	pub fn to_current(&self) -> CurrentUser {
		CurrentUser::new(self.id, self.username.clone())
	}
}

impl Authored for User {
	fn author_id(&self) -> UserId {
		self.id
	}
}

/// Row of `user_profile`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Profile {
	pub id: ProfileId,
	pub user_id: UserId,
	pub slug: String,
	pub bio: String,
	pub date_birthday: Option<NaiveDate>,
	pub profile_image: Option<String>,
}

impl Profile {
	/// Picture URL, or the avatar placeholder
	pub fn image_url(&self, media_url: &str, placeholder: &str) -> String {
		image_url(self.profile_image.as_deref(), media_url, placeholder)
	}

	/// Whole years since `date_birthday`
	///
	/// ```
	/// use chrono::NaiveDate;
	/// # use quillpress_accounts::Profile;
	/// # use quillpress_core::{ProfileId, UserId};
	/// let profile = Profile {
	/// 	id: ProfileId(1),
	/// 	user_id: UserId(1),
	/// 	slug: "alice".into(),
	/// 	bio: String::new(),
	/// 	date_birthday: NaiveDate::from_ymd_opt(2000, 6, 15),
	/// 	profile_image: None,
	/// };
	///
	/// let today = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap();
	/// assert_eq!(profile.age(today), Some(23));
	/// ```
	pub fn age(&self, today: NaiveDate) -> Option<u32> {
		let born = self.date_birthday?;
		let days = today.signed_duration_since(born).num_days();
		if days < 0 {
			return Some(0);
		}
		Some((days as f64 / 365.2425).floor() as u32)
	}
}

impl Authored for Profile {
	fn author_id(&self) -> UserId {
		self.user_id
	}
}

impl SlugTable for Profile {
	const TABLE: &'static str = PROFILES;
	const SLUG_MAX_LENGTH: usize = 255;
	const FALLBACK: &'static str = "profile";
}

/// Profile page projection
#[derive(Debug, Clone, Serialize)]
pub struct ProfileCard {
	pub profile: Profile,
	pub user: User,
	pub image_url: String,
	pub age: Option<u32>,
	pub followers: i64,
	pub following: i64,
}
