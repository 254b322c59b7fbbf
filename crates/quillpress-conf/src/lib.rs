//! # quillpress-conf
//!
//! Layered settings (defaults < `quillpress.toml` < `QUILLPRESS_*`
//! environment variables) and the tracing bootstrap.
//!
//! ```no_run
//! use quillpress_conf::{logging, Settings};
//!
//! let settings = Settings::load(None).unwrap();
//! logging::init(&settings.logging).unwrap();
//! ```

pub mod error;
pub mod logging;
pub mod settings;
pub mod sources;

pub use error::SettingsError;
pub use settings::{
	AuthSettings, DatabaseSettings, LogFormat, LoggingSettings, MediaSettings, PaginationSettings,
	SearchSettings, Settings, SidebarSettings,
};
pub use sources::{ConfigSource, DefaultSource, EnvSource, TomlFileSource};
