//! Field validators that plug into `validator` derives
//!
//! # Examples
//!
//! ```
//! use quillpress_core::validators::FileExtensionValidator;
//!
//! let validator = FileExtensionValidator::images();
//! assert!(validator.validate_filename("photo.JPG").is_ok());
//! assert!(validator.validate_filename("document.pdf").is_err());
//! ```

use crate::slug;
use std::borrow::Cow;
use validator::ValidationError;

/// Whitelist of file extensions, compared case-insensitively
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileExtensionValidator {
	allowed_extensions: Vec<String>,
}

impl FileExtensionValidator {
	/// Creates a validator that only allows the given extensions (without dot)
	pub fn with_extensions<I, S>(extensions: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			allowed_extensions: extensions
				.into_iter()
				.map(|ext| ext.into().to_lowercase())
				.collect(),
		}
	}

	/// Extensions accepted for post images and profile pictures
	pub fn images() -> Self {
		Self::with_extensions(["png", "jpg", "webp", "jpeg"])
	}

	pub fn allowed_extensions(&self) -> &[String] {
		&self.allowed_extensions
	}

	/// Checks the extension of `filename`
	pub fn validate_filename(&self, filename: &str) -> Result<(), ValidationError> {
		let extension = match filename.rsplit_once('.') {
			Some((_, ext)) if !ext.is_empty() => ext.to_lowercase(),
			_ => return Err(self.rejection("(none)")),
		};
		if self.allowed_extensions.iter().any(|ext| *ext == extension) {
			Ok(())
		} else {
			Err(self.rejection(&extension))
		}
	}

	fn rejection(&self, extension: &str) -> ValidationError {
		let message = format!(
			"File extension \"{}\" is not allowed. Allowed extensions are: {}.",
			extension,
			self.allowed_extensions.join(", ")
		);
		let mut error = ValidationError::new("invalid_extension");
		error.message = Some(Cow::Owned(message));
		error.add_param(Cow::Borrowed("extension"), &extension);
		error
	}
}

/// `validator` custom function for image upload fields
pub fn validate_image_path(value: &str) -> Result<(), ValidationError> {
	FileExtensionValidator::images().validate_filename(value)
}

/// `validator` custom function for explicitly supplied slugs
pub fn validate_slug(value: &str) -> Result<(), ValidationError> {
	if slug::is_valid(value) {
		return Ok(());
	}
	let mut error = ValidationError::new("invalid_slug");
	error.message = Some(Cow::Borrowed(
		"Enter a valid \"slug\" consisting of letters, numbers, underscores or hyphens.",
	));
	Err(error)
}

/// `validator` custom function rejecting whitespace-only text
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
	if value.trim().is_empty() {
		let mut error = ValidationError::new("required");
		error.message = Some(Cow::Borrowed("This field is required."));
		return Err(error);
	}
	Ok(())
}
