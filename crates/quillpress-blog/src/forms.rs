//! Blog forms

use quillpress_core::validators::{validate_image_path, validate_not_blank};
use quillpress_core::{CategoryId, FormErrors};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CategoryForm {
	#[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
	#[validate(custom(function = "validate_not_blank"))]
	pub name: String,

	/// Derived from `name` when empty
	#[serde(default)]
	pub slug: Option<String>,

	#[validate(length(max = 300, message = "Ensure this value has at most 300 characters."))]
	#[serde(default)]
	pub description: String,
}

/// Post create and edit form
///
/// `slug` on edit: `None` keeps the current slug, an empty string derives a
/// new one from the title, anything else is checked and stored.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PostForm {
	#[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
	#[validate(custom(function = "validate_not_blank"))]
	pub title: String,

	#[validate(required(message = "This field is required."))]
	pub category: Option<CategoryId>,

	#[validate(length(max = 300, message = "Ensure this value has at most 300 characters."))]
	#[serde(default)]
	pub short_description: Option<String>,

	#[validate(custom(function = "validate_not_blank"))]
	pub body: String,

	#[serde(default)]
	pub slug: Option<String>,

	/// Stored path of a newly uploaded image; `None` keeps the current one
	#[validate(custom(function = "validate_image_path"))]
	#[serde(default)]
	pub image: Option<String>,

	#[serde(default)]
	pub clear_image: bool,
}

impl PostForm {
	/// Short description with surrounding whitespace removed, `None` when blank
	pub fn short_description(&self) -> Option<&str> {
		self.short_description
			.as_deref()
			.map(str::trim)
			.filter(|s| !s.is_empty())
	}
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CommentForm {
	#[validate(length(max = 1500, message = "Ensure this value has at most 1500 characters."))]
	#[validate(custom(function = "validate_not_blank"))]
	pub text: String,
}

/// Runs the derived rules and returns every field message
pub fn field_errors<F: Validate>(form: &F) -> FormErrors {
	match form.validate() {
		Ok(()) => FormErrors::new(),
		Err(errors) => errors.into(),
	}
}
