//! Typed Quillpress settings
//!
//! ```
//! use quillpress_conf::Settings;
//!
//! let settings = Settings::default();
//! assert_eq!(settings.pagination.posts_per_page, 10);
//! assert_eq!(settings.pagination.categories_per_page, 5);
//! assert!(settings.validate().is_ok());
//! ```

use crate::error::SettingsError;
use crate::sources::{merge_sources, ConfigSource, DefaultSource, EnvSource, TomlFileSource};
use quillpress_core::media::{AVATAR_PLACEHOLDER, POST_PLACEHOLDER};
use quillpress_core::policy::DEFAULT_LOGIN_URL;
use quillpress_core::search::DEFAULT_MIN_RANK;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file read when no explicit path is given
pub const DEFAULT_CONFIG_FILE: &str = "quillpress.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	pub debug: bool,
	pub database: DatabaseSettings,
	pub pagination: PaginationSettings,
	pub search: SearchSettings,
	pub media: MediaSettings,
	pub auth: AuthSettings,
	pub sidebar: SidebarSettings,
	pub logging: LoggingSettings,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			debug: false,
			database: DatabaseSettings::default(),
			pagination: PaginationSettings::default(),
			search: SearchSettings::default(),
			media: MediaSettings::default(),
			auth: AuthSettings::default(),
			sidebar: SidebarSettings::default(),
			logging: LoggingSettings::default(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
	/// sqlx connection URL
	pub url: String,
	pub max_connections: u32,
}

impl Default for DatabaseSettings {
	fn default() -> Self {
		Self {
			url: "sqlite://quillpress.db?mode=rwc".to_string(),
			max_connections: 5,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationSettings {
	pub posts_per_page: usize,
	pub categories_per_page: usize,
}

impl Default for PaginationSettings {
	fn default() -> Self {
		Self {
			posts_per_page: 10,
			categories_per_page: 5,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
	/// Results ranked below this are dropped
	pub min_rank: f64,
}

impl Default for SearchSettings {
	fn default() -> Self {
		Self {
			min_rank: DEFAULT_MIN_RANK,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaSettings {
	pub media_url: String,
	pub post_placeholder: String,
	pub avatar_placeholder: String,
}

impl Default for MediaSettings {
	fn default() -> Self {
		Self {
			media_url: "/media/".to_string(),
			post_placeholder: POST_PLACEHOLDER.to_string(),
			avatar_placeholder: AVATAR_PLACEHOLDER.to_string(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
	pub login_url: String,
	pub min_password_length: usize,
}

impl Default for AuthSettings {
	fn default() -> Self {
		Self {
			login_url: DEFAULT_LOGIN_URL.to_string(),
			min_password_length: 8,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SidebarSettings {
	pub latest_comments: usize,
}

impl Default for SidebarSettings {
	fn default() -> Self {
		Self { latest_comments: 5 }
	}
}

/// Output format of the fmt subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	#[default]
	Pretty,
	Compact,
	Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
	/// `EnvFilter` directive used when `RUST_LOG` is unset
	pub level: String,
	pub format: LogFormat,
}

impl Default for LoggingSettings {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			format: LogFormat::Pretty,
		}
	}
}

impl Settings {
	/// Loads defaults, then `quillpress.toml` (or `config_path`), then
	/// `QUILLPRESS_*` variables, and validates the result
	pub fn load(config_path: Option<&Path>) -> Result<Self, SettingsError> {
		let path = config_path
			.map(Path::to_path_buf)
			.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
		if config_path.is_some() && !path.exists() {
			return Err(SettingsError::MissingFile(path));
		}

		let sources: Vec<Box<dyn ConfigSource>> = vec![
			Box::new(DefaultSource::from_serialized(&Settings::default())?),
			Box::new(TomlFileSource::new(path)),
			Box::new(EnvSource::default()),
		];
		Self::from_sources(&sources)
	}

	/// Merges arbitrary sources by priority and validates the result
	pub fn from_sources(sources: &[Box<dyn ConfigSource>]) -> Result<Self, SettingsError> {
		let merged = merge_sources(sources)?;
		let settings: Settings = serde_json::from_value(merged)?;
		settings.validate()?;
		Ok(settings)
	}

	/// Settings for tests: in-memory database, everything else default
	pub fn in_memory() -> Self {
		Self {
			database: DatabaseSettings {
				url: "sqlite::memory:".to_string(),
				max_connections: 1,
			},
			..Self::default()
		}
	}

	/// Rejects values the stores cannot work with
	pub fn validate(&self) -> Result<(), SettingsError> {
		let mut problems = Vec::new();

		if self.database.url.trim().is_empty() {
			problems.push("database.url must not be empty".to_string());
		}
		if self.database.max_connections == 0 {
			problems.push("database.max_connections must be at least 1".to_string());
		}
		if self.pagination.posts_per_page == 0 {
			problems.push("pagination.posts_per_page must be at least 1".to_string());
		}
		if self.pagination.categories_per_page == 0 {
			problems.push("pagination.categories_per_page must be at least 1".to_string());
		}
		if !(0.0..=1.0).contains(&self.search.min_rank) {
			problems.push(format!(
				"search.min_rank must be between 0 and 1, got {}",
				self.search.min_rank
			));
		}
		if self.auth.min_password_length == 0 {
			problems.push("auth.min_password_length must be at least 1".to_string());
		}

		if problems.is_empty() {
			Ok(())
		} else {
			Err(SettingsError::Invalid(problems))
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;
	use serial_test::serial;
	use std::env;
	use std::io::Write;
	use tempfile::TempDir;

	#[test]
	fn test_defaults_are_valid() {
		let settings = Settings::default();

		assert_eq!(settings.search.min_rank, 0.3);
		assert_eq!(settings.auth.login_url, "/profile/login/");
		assert_eq!(settings.media.post_placeholder, "/static/img/placeholder.png");
		assert!(settings.validate().is_ok());
	}

	#[test]
	fn test_validate_collects_every_problem() {
		let mut settings = Settings::default();
		settings.pagination.posts_per_page = 0;
		settings.search.min_rank = 1.5;
		settings.database.url = String::new();

		match settings.validate() {
			Err(SettingsError::Invalid(problems)) => assert_eq!(problems.len(), 3),
			other => panic!("unexpected result: {:?}", other),
		}
	}

	#[test]
	fn test_from_sources_fills_missing_keys_with_defaults() {
		let sources: Vec<Box<dyn ConfigSource>> = vec![
			Box::new(DefaultSource::from_serialized(&Settings::default()).unwrap()),
			Box::new(
				DefaultSource::new()
					.with_value("pagination", json!({ "posts_per_page": 20 }))
					.with_value("logging", json!({ "format": "json" })),
			),
		];

		let settings = Settings::from_sources(&sources).unwrap();

		assert_eq!(settings.pagination.posts_per_page, 20);
		assert_eq!(settings.pagination.categories_per_page, 5);
		assert_eq!(settings.logging.format, LogFormat::Json);
	}

	#[test]
	#[serial]
	fn test_load_layers_file_and_env() {
		let temp_dir = TempDir::new().unwrap();
		let config_path = temp_dir.path().join("quillpress.toml");
		let mut file = std::fs::File::create(&config_path).unwrap();
		writeln!(
			file,
			r#"
[database]
url = "sqlite://from-file.db"

[sidebar]
latest_comments = 3
"#
		)
		.unwrap();
		// SAFETY: Setting environment variables is unsafe in multi-threaded programs.
		// This test uses #[serial] to ensure exclusive access to environment variables.
		unsafe {
			env::set_var("QUILLPRESS_DATABASE__URL", "sqlite::memory:");
		}

		let settings = Settings::load(Some(&config_path));

		// SAFETY: Removing environment variables is unsafe in multi-threaded programs.
		// This test uses #[serial] to ensure exclusive access to environment variables.
		unsafe {
			env::remove_var("QUILLPRESS_DATABASE__URL");
		}
		let settings = settings.unwrap();
		assert_eq!(settings.database.url, "sqlite::memory:");
		assert_eq!(settings.sidebar.latest_comments, 3);
		assert_eq!(settings.pagination.posts_per_page, 10);
	}

	#[test]
	fn test_explicit_missing_file_is_an_error() {
		let result = Settings::load(Some(Path::new("/nonexistent/quillpress.toml")));
		assert!(matches!(result, Err(SettingsError::MissingFile(_))));
	}
}
