//! Error types shared by every Quillpress crate

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors that can occur in Quillpress operations
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
	/// Lookup by slug or primary key found nothing
	#[error("{entity} not found: {lookup}")]
	NotFound { entity: &'static str, lookup: String },

	/// Submitted input failed validation
	#[error("Validation failed: {0}")]
	Validation(FormErrors),

	/// The operation needs an authenticated actor
	#[error("Authentication required")]
	AuthenticationRequired,

	/// The actor is authenticated but not allowed to perform the operation
	#[error("Permission denied: {0}")]
	PermissionDenied(String),

	/// Credentials could not be verified or hashed
	#[error("Authentication failed: {0}")]
	Authentication(String),

	/// Delete blocked by rows that still reference the target
	#[error("Cannot delete {entity}: {reason}")]
	ProtectedReference { entity: &'static str, reason: String },

	/// Unique constraint violation
	#[error("Conflict: {0}")]
	Conflict(String),

	/// Any other constraint violation (foreign key, check, not null)
	#[error("Integrity error: {0}")]
	Integrity(String),

	/// Storage failure
	#[error("Database error: {0}")]
	Database(String),

	/// Invalid or missing settings
	#[error("Configuration error: {0}")]
	Configuration(String),
}

impl Error {
	/// Creates a [`Error::NotFound`] for the given entity and lookup value
	pub fn not_found(entity: &'static str, lookup: impl fmt::Display) -> Self {
		Error::NotFound {
			entity,
			lookup: lookup.to_string(),
		}
	}

	/// Creates a [`Error::Validation`] holding a single field message
	///
	/// # Examples
	///
	/// ```
	/// use quillpress_core::Error;
	///
	/// let err = Error::invalid("email", "Email address must be unique");
	/// assert!(err.is_validation());
	/// ```
	pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
		Error::Validation(FormErrors::single(field, message))
	}

	pub fn is_not_found(&self) -> bool {
		matches!(self, Error::NotFound { .. })
	}

	pub fn is_validation(&self) -> bool {
		matches!(self, Error::Validation(_))
	}

	pub fn is_conflict(&self) -> bool {
		matches!(self, Error::Conflict(_))
	}

	/// Returns the field errors when this is a validation failure
	pub fn form_errors(&self) -> Option<&FormErrors> {
		match self {
			Error::Validation(errors) => Some(errors),
			_ => None,
		}
	}
}

#[cfg(feature = "database")]
impl From<sqlx::Error> for Error {
	fn from(error: sqlx::Error) -> Self {
		use sqlx::error::ErrorKind;

		match error {
			sqlx::Error::RowNotFound => Error::not_found("row", "query returned no rows"),
			sqlx::Error::Database(db_error) => match db_error.kind() {
				ErrorKind::UniqueViolation => Error::Conflict(db_error.message().to_string()),
				ErrorKind::ForeignKeyViolation
				| ErrorKind::CheckViolation
				| ErrorKind::NotNullViolation => Error::Integrity(db_error.message().to_string()),
				_ => Error::Database(db_error.message().to_string()),
			},
			other => Error::Database(other.to_string()),
		}
	}
}

/// Result type for Quillpress operations
pub type Result<T> = std::result::Result<T, Error>;

/// Field-level validation messages, keyed by field name
///
/// Form-wide messages live under [`FormErrors::NON_FIELD`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors {
	fields: IndexMap<String, Vec<String>>,
}

impl FormErrors {
	/// Key used for errors that are not tied to a single field
	pub const NON_FIELD: &'static str = "__all__";

	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a collection holding one message for one field
	pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
		let mut errors = Self::new();
		errors.add(field, message);
		errors
	}

	/// Appends a message to a field
	pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
		self.fields
			.entry(field.into())
			.or_default()
			.push(message.into());
	}

	/// Appends a form-wide message
	pub fn add_non_field(&mut self, message: impl Into<String>) {
		self.add(Self::NON_FIELD, message);
	}

	/// Moves every message of `other` into this collection
	pub fn merge(&mut self, other: FormErrors) {
		for (field, messages) in other.fields {
			self.fields.entry(field).or_default().extend(messages);
		}
	}

	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}

	pub fn has(&self, field: &str) -> bool {
		self.fields.contains_key(field)
	}

	/// Messages recorded for `field`, empty when none
	pub fn get(&self, field: &str) -> &[String] {
		self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
		self.fields
			.iter()
			.map(|(field, messages)| (field.as_str(), messages.as_slice()))
	}

	/// `Ok(())` when no message was recorded, otherwise [`Error::Validation`]
	pub fn into_result(self) -> Result<()> {
		if self.is_empty() {
			Ok(())
		} else {
			Err(Error::Validation(self))
		}
	}
}

impl fmt::Display for FormErrors {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut first = true;
		for (field, messages) in &self.fields {
			for message in messages {
				if !first {
					write!(f, "; ")?;
				}
				write!(f, "{}: {}", field, message)?;
				first = false;
			}
		}
		Ok(())
	}
}

impl From<validator::ValidationErrors> for FormErrors {
	fn from(errors: validator::ValidationErrors) -> Self {
		let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
		fields.sort_by(|a, b| a.0.cmp(&b.0));

		let mut form_errors = FormErrors::new();
		for (field, field_errors) in fields {
			for error in field_errors.iter() {
				let message = error
					.message
					.as_ref()
					.map(|m| m.to_string())
					.unwrap_or_else(|| error.code.to_string());
				form_errors.add(field.to_string(), message);
			}
		}
		form_errors
	}
}

impl From<validator::ValidationErrors> for Error {
	fn from(errors: validator::ValidationErrors) -> Self {
		Error::Validation(errors.into())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use validator::Validate;

	#[derive(Validate)]
	struct Sample {
		#[validate(length(min = 1, message = "This field is required."))]
		title: String,
		#[validate(length(max = 3))]
		code: String,
	}

	#[test]
	fn test_form_errors_collects_messages_per_field() {
		let mut errors = FormErrors::new();
		errors.add("title", "too long");
		errors.add("title", "contains markup");
		errors.add_non_field("passwords differ");

		assert_eq!(errors.get("title").len(), 2);
		assert_eq!(errors.get(FormErrors::NON_FIELD), ["passwords differ"]);
		assert!(errors.get("body").is_empty());
		assert!(errors.into_result().is_err());
	}

	#[test]
	fn test_empty_form_errors_is_ok() {
		assert!(FormErrors::new().into_result().is_ok());
	}

	#[test]
	fn test_from_validator_uses_message_then_code() {
		let sample = Sample {
			title: String::new(),
			code: "abcd".to_string(),
		};

		let errors: FormErrors = sample.validate().unwrap_err().into();

		assert_eq!(errors.get("title"), ["This field is required."]);
		assert_eq!(errors.get("code"), ["length"]);
	}

	#[test]
	fn test_display_joins_fields() {
		let mut errors = FormErrors::new();
		errors.add("email", "taken");
		errors.add("slug", "invalid");

		assert_eq!(errors.to_string(), "email: taken; slug: invalid");
	}
}
