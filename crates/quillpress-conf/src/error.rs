//! Settings and logging bootstrap errors

use crate::sources::SourceError;
use std::path::PathBuf;
use thiserror::Error;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SettingsError {
	#[error("Config file not found: {}", .0.display())]
	MissingFile(PathBuf),

	#[error(transparent)]
	Source(#[from] SourceError),

	#[error("Invalid settings value: {0}")]
	Deserialize(#[from] serde_json::Error),

	#[error("Invalid settings: {}", .0.join("; "))]
	Invalid(Vec<String>),

	#[error("Logging setup failed: {0}")]
	Logging(String),
}

impl From<SettingsError> for quillpress_core::Error {
	fn from(error: SettingsError) -> Self {
		quillpress_core::Error::Configuration(error.to_string())
	}
}
