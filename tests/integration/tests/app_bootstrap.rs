//! Loading settings from disk and the environment, then opening a file database

use quillpress::{App, AppError, Settings};
use quillpress_blog::forms::CategoryForm;
use serial_test::serial;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_config(dir: &Path, body: &str) -> std::path::PathBuf {
	let path = dir.join("quillpress.toml");
	fs::write(&path, body).unwrap();
	path
}

#[tokio::test]
#[serial]
async fn test_file_database_survives_reopen() {
	// Arrange
	let dir = TempDir::new().unwrap();
	let db_path = dir.path().join("blog.db");
	let config = write_config(
		dir.path(),
		&format!(
			"[database]\nurl = \"sqlite://{}\"\n\n[pagination]\nposts_per_page = 3\n",
			db_path.display()
		),
	);
	let settings = Settings::load(Some(&config)).unwrap();

	// Act
	let app = App::open(settings.clone()).await.unwrap();
	app.migrate().await.unwrap();
	app.blog
		.create_category(&CategoryForm {
			name: "Tech".to_string(),
			..Default::default()
		})
		.await
		.unwrap();
	app.close().await;

	let reopened = App::open(settings).await.unwrap();
	reopened.migrate().await.unwrap();

	// Assert
	assert_eq!(reopened.settings.pagination.posts_per_page, 3);
	assert_eq!(reopened.blog.categories().await.unwrap().len(), 1);
	assert!(db_path.exists());
	reopened.close().await;
}

#[test]
#[serial]
fn test_environment_overrides_file() {
	let dir = TempDir::new().unwrap();
	let config = write_config(dir.path(), "[search]\nmin_rank = 0.5\n");

	// SAFETY: Modifying environment variables is unsafe in multi-threaded programs.
	// This test uses #[serial] to ensure exclusive access to environment variables.
	unsafe {
		std::env::set_var("QUILLPRESS_SEARCH__MIN_RANK", "0.1");
	}
	let settings = Settings::load(Some(&config));
	unsafe {
		std::env::remove_var("QUILLPRESS_SEARCH__MIN_RANK");
	}

	assert_eq!(settings.unwrap().search.min_rank, 0.1);
}

#[tokio::test]
#[serial]
async fn test_missing_config_file_is_an_error() {
	let dir = TempDir::new().unwrap();

	let result = Settings::load(Some(&dir.path().join("absent.toml")));

	assert!(result.is_err());
	let opened = App::open(Settings {
		database: quillpress_conf::DatabaseSettings {
			url: String::new(),
			max_connections: 1,
		},
		..Settings::in_memory()
	})
	.await;
	assert!(matches!(opened, Err(AppError::Settings(_))));
}
