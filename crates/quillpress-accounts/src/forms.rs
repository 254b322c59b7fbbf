//! Account forms
//!
//! Field rules are declared with `validator`; cross-field and
//! database-dependent checks live in the service.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use quillpress_core::FormErrors;
use quillpress_core::validators::{validate_image_path, validate_not_blank};
use regex::Regex;
use serde::Deserialize;
use std::borrow::Cow;
use validator::{Validate, ValidateEmail, ValidationError};

static USERNAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w.@+-]+$").unwrap());

/// Sign-up form
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RegisterForm {
	#[validate(
		length(min = 1, max = 150, message = "Required. 150 characters or fewer."),
		regex(path = *USERNAME_RE, message = "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.")
	)]
	pub username: String,

	#[validate(email(message = "Enter a valid email address."))]
	#[validate(custom(function = "validate_not_blank"))]
	pub email: String,

	#[validate(custom(function = "validate_not_blank"))]
	pub password1: String,

	#[validate(custom(function = "validate_not_blank"))]
	pub password2: String,
}

/// Login form
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LoginForm {
	#[validate(custom(function = "validate_not_blank"))]
	pub username: String,

	#[validate(custom(function = "validate_not_blank"))]
	pub password: String,
}

/// Password change form
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PasswordChangeForm {
	#[validate(custom(function = "validate_not_blank"))]
	pub old_password: String,

	#[validate(custom(function = "validate_not_blank"))]
	pub new_password1: String,

	#[validate(custom(function = "validate_not_blank"))]
	pub new_password2: String,
}

/// Identity part of the profile edit page
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserUpdateForm {
	#[validate(
		length(min = 1, max = 150, message = "Required. 150 characters or fewer."),
		regex(path = *USERNAME_RE, message = "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.")
	)]
	pub username: String,

	#[validate(custom(function = "validate_email_or_empty"))]
	pub email: String,

	#[validate(length(max = 150))]
	pub first_name: String,

	#[validate(length(max = 150))]
	pub last_name: String,
}

/// Profile part of the profile edit page
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProfileUpdateForm {
	#[validate(length(max = 500, message = "Ensure this value has at most 500 characters."))]
	pub bio: String,

	/// Stored path of a newly uploaded picture; `None` keeps the current one
	#[validate(custom(function = "validate_image_path"))]
	pub profile_image: Option<String>,

	/// Drop the current picture
	#[serde(default)]
	pub clear_profile_image: bool,

	pub date_birthday: Option<NaiveDate>,
}

/// Legacy accounts may have no email, so an empty value passes
fn validate_email_or_empty(value: &str) -> Result<(), ValidationError> {
	if value.is_empty() || value.validate_email() {
		return Ok(());
	}
	let mut error = ValidationError::new("email");
	error.message = Some(Cow::Borrowed("Enter a valid email address."));
	Err(error)
}

/// Runs the derived rules and returns every field message
pub fn field_errors<F: Validate>(form: &F) -> FormErrors {
	match form.validate() {
		Ok(()) => FormErrors::new(),
		Err(errors) => errors.into(),
	}
}

/// Password strength rules
///
/// ```
/// use quillpress_accounts::forms::password_problems;
///
/// assert!(password_problems("tr0ub4dor&3", "alice", 8).is_empty());
/// assert_eq!(password_problems("12345678", "alice", 8).len(), 1);
/// ```
pub fn password_problems(password: &str, username: &str, min_length: usize) -> Vec<String> {
	let mut problems = Vec::new();

	if password.chars().count() < min_length {
		problems.push(format!(
			"This password is too short. It must contain at least {} characters.",
			min_length
		));
	}
	if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
		problems.push("This password is entirely numeric.".to_string());
	}
	let lowered = password.to_lowercase();
	let name = username.trim().to_lowercase();
	if !name.is_empty() && (lowered == name || (name.len() >= 3 && lowered.contains(&name))) {
		problems.push("The password is too similar to the username.".to_string());
	}

	problems
}
