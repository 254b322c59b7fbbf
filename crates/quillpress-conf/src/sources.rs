//! Configuration sources for the layered settings system
//!
//! Sources are merged in priority order (environment variables > config
//! file > defaults). Nested sections are plain JSON objects, so a file
//! section `[database]` and the variable `QUILLPRESS_DATABASE__URL` land in
//! the same place.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fs;
use std::path::PathBuf;

/// Trait for configuration sources
pub trait ConfigSource: Send + Sync {
	/// Load configuration from this source
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError>;

	/// Get the priority of this source (higher = more important)
	fn priority(&self) -> u8;

	/// Get a description of this source
	fn description(&self) -> String;
}

/// Error type for configuration sources
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Parse error: {0}")]
	Parse(String),

	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

/// Environment variable configuration source
///
/// `__` in a variable name separates nesting levels and names are
/// lowercased, so `QUILLPRESS_PAGINATION__POSTS_PER_PAGE=20` becomes
/// `pagination.posts_per_page = 20`.
pub struct EnvSource {
	prefix: String,
}

impl EnvSource {
	/// Environment variable prefix used by Quillpress
	pub const DEFAULT_PREFIX: &'static str = "QUILLPRESS_";

	/// Create a source reading variables that start with `prefix`
	///
	/// # Examples
	///
	/// ```
	/// use quillpress_conf::sources::EnvSource;
	///
	/// let source = EnvSource::new("MYBLOG_");
	/// ```
	pub fn new(prefix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
		}
	}

	/// Splits a prefixed variable name into its lowercase key path
	fn key_path(&self, name: &str) -> Option<Vec<String>> {
		let rest = name.strip_prefix(&self.prefix)?;
		let path: Vec<String> = rest.split("__").map(str::to_lowercase).collect();
		if path.iter().any(String::is_empty) {
			return None;
		}
		Some(path)
	}
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::new(Self::DEFAULT_PREFIX)
	}
}

impl ConfigSource for EnvSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		let mut root = Map::new();

		for (name, raw) in std::env::vars() {
			let Some(path) = self.key_path(&name) else {
				continue;
			};
			insert_path(&mut root, &path, parse_scalar(&raw));
		}

		Ok(root.into_iter().collect())
	}

	fn priority(&self) -> u8 {
		100 // Highest priority
	}

	fn description(&self) -> String {
		format!("Environment variables (prefix: {})", self.prefix)
	}
}

/// TOML file configuration source; a missing file loads as empty
pub struct TomlFileSource {
	path: PathBuf,
}

impl TomlFileSource {
	/// Create a new TOML file configuration source
	///
	/// # Examples
	///
	/// ```
	/// use quillpress_conf::sources::TomlFileSource;
	///
	/// let source = TomlFileSource::new("quillpress.toml");
	/// ```
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}
}

impl ConfigSource for TomlFileSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		if !self.path.exists() {
			return Ok(IndexMap::new());
		}

		let content = fs::read_to_string(&self.path)?;
		let toml_value: toml::Value = toml::from_str(&content)?;
		let json_value = serde_json::to_value(toml_value)?;

		match json_value {
			Value::Object(map) => Ok(map.into_iter().collect()),
			_ => Err(SourceError::Parse("Expected table at root".to_string())),
		}
	}

	fn priority(&self) -> u8 {
		50 // Medium priority
	}

	fn description(&self) -> String {
		format!("TOML file: {}", self.path.display())
	}
}

/// Default values configuration source
pub struct DefaultSource {
	values: IndexMap<String, Value>,
}

impl DefaultSource {
	pub fn new() -> Self {
		Self {
			values: IndexMap::new(),
		}
	}

	/// Add a default value for a top-level key
	pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
		self.values.insert(key.into(), value);
		self
	}

	/// Use every field of a serialized settings value as a default
	pub fn from_serialized<T: serde::Serialize>(value: &T) -> Result<Self, SourceError> {
		match serde_json::to_value(value)? {
			Value::Object(map) => Ok(Self {
				values: map.into_iter().collect(),
			}),
			_ => Err(SourceError::Parse("Defaults must serialize to a map".to_string())),
		}
	}
}

impl Default for DefaultSource {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigSource for DefaultSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		Ok(self.values.clone())
	}

	fn priority(&self) -> u8 {
		0 // Lowest priority
	}

	fn description(&self) -> String {
		"Default values".to_string()
	}
}

/// Loads `sources` lowest priority first and deep-merges them into one object
pub fn merge_sources(sources: &[Box<dyn ConfigSource>]) -> Result<Value, SourceError> {
	let mut ordered: Vec<&Box<dyn ConfigSource>> = sources.iter().collect();
	ordered.sort_by_key(|source| source.priority());

	let mut merged = Value::Object(Map::new());
	for source in ordered {
		let layer = source.load()?;
		tracing::debug!(source = %source.description(), keys = layer.len(), "loaded settings layer");
		merge_value(&mut merged, Value::Object(layer.into_iter().collect()));
	}
	Ok(merged)
}

/// Overlays `overlay` onto `base`, recursing into objects
pub fn merge_value(base: &mut Value, overlay: Value) {
	match (base, overlay) {
		(Value::Object(base_map), Value::Object(overlay_map)) => {
			for (key, value) in overlay_map {
				match base_map.get_mut(&key) {
					Some(existing) => merge_value(existing, value),
					None => {
						base_map.insert(key, value);
					}
				}
			}
		}
		(base, overlay) => *base = overlay,
	}
}

/// Numbers and booleans become JSON scalars, anything else stays a string
fn parse_scalar(raw: &str) -> Value {
	match serde_json::from_str::<Value>(raw.trim()) {
		Ok(value @ (Value::Bool(_) | Value::Number(_))) => value,
		_ => Value::String(raw.to_string()),
	}
}

fn insert_path(root: &mut Map<String, Value>, path: &[String], value: Value) {
	let Some((last, parents)) = path.split_last() else {
		return;
	};
	let mut current = root;
	for key in parents {
		let entry = current
			.entry(key.clone())
			.or_insert_with(|| Value::Object(Map::new()));
		if !entry.is_object() {
			*entry = Value::Object(Map::new());
		}
		let Value::Object(map) = entry else {
			return;
		};
		current = map;
	}
	current.insert(last.clone(), value);
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;
	use serial_test::serial;
	use std::env;
	use std::io::Write;
	use tempfile::TempDir;

	#[rstest]
	#[case("20", json!(20))]
	#[case("0.5", json!(0.5))]
	#[case("true", json!(true))]
	#[case("sqlite::memory:", json!("sqlite::memory:"))]
	#[case("null", json!("null"))]
	#[case("info,sqlx=warn", json!("info,sqlx=warn"))]
	fn test_parse_scalar(#[case] raw: &str, #[case] expected: Value) {
		assert_eq!(parse_scalar(raw), expected);
	}

	#[test]
	#[serial]
	fn test_env_source_nests_on_double_underscore() {
		// SAFETY: Setting environment variables is unsafe in multi-threaded programs.
		// This test uses #[serial] to ensure exclusive access to environment variables.
		unsafe {
			env::set_var("QPTEST_DATABASE__URL", "sqlite::memory:");
			env::set_var("QPTEST_PAGINATION__POSTS_PER_PAGE", "20");
			env::set_var("QPTEST_DEBUG", "true");
		}

		let config = EnvSource::new("QPTEST_").load().unwrap();

		assert_eq!(config["database"], json!({ "url": "sqlite::memory:" }));
		assert_eq!(config["pagination"]["posts_per_page"], json!(20));
		assert_eq!(config["debug"], json!(true));

		// SAFETY: Removing environment variables is unsafe in multi-threaded programs.
		// This test uses #[serial] to ensure exclusive access to environment variables.
		unsafe {
			env::remove_var("QPTEST_DATABASE__URL");
			env::remove_var("QPTEST_PAGINATION__POSTS_PER_PAGE");
			env::remove_var("QPTEST_DEBUG");
		}
	}

	#[test]
	fn test_toml_source() {
		let temp_dir = TempDir::new().unwrap();
		let config_path = temp_dir.path().join("quillpress.toml");
		let mut file = fs::File::create(&config_path).unwrap();
		writeln!(
			file,
			r#"
debug = true

[search]
min_rank = 0.5
"#
		)
		.unwrap();

		let config = TomlFileSource::new(&config_path).load().unwrap();

		assert_eq!(config["debug"], json!(true));
		assert_eq!(config["search"]["min_rank"], json!(0.5));
	}

	#[test]
	fn test_missing_toml_file_is_empty() {
		let config = TomlFileSource::new("/nonexistent/quillpress.toml").load().unwrap();
		assert!(config.is_empty());
	}

	#[test]
	fn test_merge_respects_priority() {
		let sources: Vec<Box<dyn ConfigSource>> = vec![
			Box::new(
				DefaultSource::new()
					.with_value("pagination", json!({ "posts_per_page": 10 }))
					.with_value("debug", json!(true)),
			),
			Box::new(
				DefaultSource::new()
					.with_value("pagination", json!({ "categories_per_page": 5 })),
			),
		];

		let merged = merge_sources(&sources).unwrap();

		assert_eq!(merged["pagination"]["posts_per_page"], json!(10));
		assert_eq!(merged["pagination"]["categories_per_page"], json!(5));
		assert_eq!(merged["debug"], json!(true));
	}

	#[test]
	fn test_merge_value_overrides_nested_keys() {
		let mut base = json!({ "database": { "url": "a", "max_connections": 5 } });
		merge_value(&mut base, json!({ "database": { "url": "b" } }));

		assert_eq!(base, json!({ "database": { "url": "b", "max_connections": 5 } }));
	}

	#[test]
	fn test_source_priority() {
		assert_eq!(EnvSource::default().priority(), 100);
		assert_eq!(TomlFileSource::new("test.toml").priority(), 50);
		assert_eq!(DefaultSource::new().priority(), 0);
	}
}
