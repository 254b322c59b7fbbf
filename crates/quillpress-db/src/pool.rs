//! Connection pool and transactions

use quillpress_conf::DatabaseSettings;
use quillpress_core::{Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// How long a writer waits for another connection's write lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// Transaction handle passed to every store operation
pub type Tx = Transaction<'static, Sqlite>;

/// Shared SQLite pool with foreign keys enforced
#[derive(Debug, Clone)]
pub struct Database {
	pool: SqlitePool,
}

impl Database {
	/// Opens the database described by `settings`
	///
	/// An in-memory URL always gets a single connection so every query sees
	/// the same database.
	pub async fn connect(settings: &DatabaseSettings) -> Result<Self> {
		let options = SqliteConnectOptions::from_str(&settings.url)?
			.foreign_keys(true)
			.create_if_missing(true)
			.busy_timeout(BUSY_TIMEOUT);

		let in_memory = settings.url.contains(":memory:") || settings.url.contains("mode=memory");
		let max_connections = if in_memory {
			1
		} else {
			settings.max_connections.max(1)
		};

		let pool = Self::pool_options(max_connections)
			.connect_with(options)
			.await?;
		debug!(url = %settings.url, max_connections, "database pool opened");
		Ok(Self { pool })
	}

	/// Private in-memory database, schema not yet created
	pub async fn in_memory() -> Result<Self> {
		Self::connect(&DatabaseSettings {
			url: "sqlite::memory:".to_string(),
			max_connections: 1,
		})
		.await
	}

	/// In-memory database with the schema applied
	///
	/// # Examples
	///
	/// ```
	/// use quillpress_db::Database;
	///
	/// # async fn example() {
	/// let db = Database::in_memory_migrated().await.unwrap();
	/// let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM blog_post")
	/// 	.fetch_one(db.pool())
	/// 	.await
	/// 	.unwrap();
	/// assert_eq!(count, 0);
	/// # }
	/// # tokio::runtime::Runtime::new().unwrap().block_on(example());
	/// ```
	pub async fn in_memory_migrated() -> Result<Self> {
		let db = Self::in_memory().await?;
		db.migrate().await?;
		Ok(db)
	}

	fn pool_options(max_connections: u32) -> SqlitePoolOptions {
		SqlitePoolOptions::new()
			.min_connections(max_connections.min(1))
			.max_connections(max_connections)
			.idle_timeout(None)
			.max_lifetime(None)
	}

	pub fn pool(&self) -> &SqlitePool {
		&self.pool
	}

	/// Starts a transaction; dropping it without `commit` rolls back
	///
	/// The write lock is taken up front. A deferred transaction that reads
	/// first fails with `SQLITE_BUSY` when another connection commits before
	/// it writes, and the busy timeout cannot help it.
	pub async fn begin(&self) -> Result<Tx> {
		Ok(self.pool.begin_with("BEGIN IMMEDIATE").await?)
	}

	/// Creates every table and index that does not exist yet
	pub async fn migrate(&self) -> Result<()> {
		let mut tx = self.begin().await?;
		for sql in crate::schema::statements() {
			sqlx::query(&sql).execute(&mut *tx).await?;
		}
		tx.commit().await?;
		info!(tables = crate::schema::TABLES.len(), "schema up to date");
		Ok(())
	}

	pub async fn close(&self) {
		self.pool.close().await;
	}
}

impl From<SqlitePool> for Database {
	fn from(pool: SqlitePool) -> Self {
		Self { pool }
	}
}

/// Runs `op` up to `attempts` times while it fails with a slug conflict
///
/// Each attempt should open its own transaction so the losing insert of a
/// race is rolled back before the slug is derived again.
pub async fn retry_on_slug_conflict<T, F, Fut>(attempts: usize, mut op: F) -> Result<T>
where
	F: FnMut(usize) -> Fut,
	Fut: std::future::Future<Output = Result<T>>,
{
	let attempts = attempts.max(1);
	let mut attempt = 1;
	loop {
		match op(attempt).await {
			Err(err) if is_slug_conflict(&err) && attempt < attempts => {
				tracing::warn!(attempt, error = %err, "slug collision, retrying");
				attempt += 1;
			}
			Err(err) if is_slug_conflict(&err) => {
				return Err(Error::Integrity(format!(
					"could not allocate a unique slug after {} attempts: {}",
					attempts, err
				)));
			}
			other => return other,
		}
	}
}

/// Whether `err` is a unique violation on a `slug` column
pub fn is_slug_conflict(err: &Error) -> bool {
	matches!(err, Error::Conflict(message) if message.contains(".slug"))
}
