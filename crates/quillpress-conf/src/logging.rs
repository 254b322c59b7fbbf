//! Tracing subscriber bootstrap

use crate::error::SettingsError;
use crate::settings::{LogFormat, LoggingSettings};
use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber
///
/// `RUST_LOG` wins over `settings.level`. A second call leaves the first
/// subscriber in place and returns `Ok`.
pub fn init(settings: &LoggingSettings) -> Result<(), SettingsError> {
	let filter = build_filter(settings)?;
	let builder = tracing_subscriber::fmt().with_env_filter(filter);

	let installed = match settings.format {
		LogFormat::Pretty => builder.pretty().try_init(),
		LogFormat::Compact => builder.compact().try_init(),
		LogFormat::Json => builder.json().try_init(),
	};

	if installed.is_err() {
		tracing::debug!("global subscriber already installed");
	}
	Ok(())
}

fn build_filter(settings: &LoggingSettings) -> Result<EnvFilter, SettingsError> {
	if let Ok(filter) = EnvFilter::try_from_default_env() {
		return Ok(filter);
	}
	EnvFilter::try_new(&settings.level).map_err(|e| SettingsError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use serial_test::serial;

	#[test]
	#[serial]
	fn test_init_twice_is_ok() {
		let settings = LoggingSettings {
			level: "debug".to_string(),
			format: LogFormat::Compact,
		};

		assert!(init(&settings).is_ok());
		assert!(init(&settings).is_ok());
	}

	#[test]
	#[serial]
	fn test_invalid_level_is_rejected() {
		// SAFETY: Removing environment variables is unsafe in multi-threaded programs.
		// This test uses #[serial] to ensure exclusive access to environment variables.
		unsafe {
			std::env::remove_var("RUST_LOG");
		}
		let settings = LoggingSettings {
			level: "quillpress=loudest".to_string(),
			format: LogFormat::Pretty,
		};

		assert!(matches!(build_filter(&settings), Err(SettingsError::Logging(_))));
	}
}
