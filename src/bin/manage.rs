//! Quillpress management commands
//!
//! ```bash
//! manage migrate
//! manage --config site.toml recount
//! manage -vv check
//! ```

use clap::{Parser, Subcommand};
use quillpress::{App, AppError, Settings};
use quillpress_conf::logging;
use std::path::PathBuf;
use std::process;
use tracing::info;

#[derive(Parser)]
#[command(name = "manage")]
#[command(about = "Quillpress administration commands", long_about = None)]
#[command(version)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Settings file (defaults to ./quillpress.toml when present)
	#[arg(long, global = true, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Verbosity level (can be repeated)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	verbosity: u8,
}

#[derive(Subcommand)]
enum Commands {
	/// Create any missing tables
	Migrate,

	/// Recompute every category's post count from the posts table
	Recount,

	/// Load and validate settings without touching the database
	Check,
}

#[tokio::main]
async fn main() {
	let cli = Cli::parse();

	if let Err(e) = run(cli).await {
		eprintln!("Error: {}", e);
		process::exit(1);
	}
}

async fn run(cli: Cli) -> Result<(), AppError> {
	let mut settings = Settings::load(cli.config.as_deref())?;
	if let Some(level) = level_for(cli.verbosity) {
		settings.logging.level = level.to_string();
	}
	logging::init(&settings.logging)?;

	match cli.command {
		Commands::Migrate => {
			let app = App::open(settings).await?;
			app.migrate().await?;
			app.close().await;
		}
		Commands::Recount => {
			let app = App::open(settings).await?;
			let corrected = app.blog.recount_post_amounts().await?;
			println!("{} categories corrected", corrected);
			app.close().await;
		}
		Commands::Check => {
			info!(url = %settings.database.url, "settings loaded");
			println!("Settings OK (database: {})", settings.database.url);
		}
	}
	Ok(())
}

fn level_for(verbosity: u8) -> Option<&'static str> {
	match verbosity {
		0 => None,
		1 => Some("debug"),
		_ => Some("trace"),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(&["manage", "migrate"], 0, None)]
	#[case(&["manage", "-vv", "recount"], 2, None)]
	#[case(&["manage", "check", "--config", "site.toml"], 0, Some("site.toml"))]
	fn test_parse(#[case] args: &[&str], #[case] verbosity: u8, #[case] config: Option<&str>) {
		let cli = Cli::try_parse_from(args).unwrap();

		assert_eq!(cli.verbosity, verbosity);
		assert_eq!(cli.config, config.map(PathBuf::from));
	}

	#[rstest]
	#[case(0, None)]
	#[case(1, Some("debug"))]
	#[case(3, Some("trace"))]
	fn test_level_for(#[case] verbosity: u8, #[case] expected: Option<&str>) {
		assert_eq!(level_for(verbosity), expected);
	}
}
