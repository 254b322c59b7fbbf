//! Rendering sea-query statements for SQLite
//!
//! Stores build every statement with [`sea_query::Query`] and hand the
//! rendered text to sqlx. Values are inlined by the SQLite builder, which
//! only doubles single quotes, so text round-trips unchanged.

use chrono::{DateTime, SecondsFormat, Utc};
use sea_query::{Alias, QueryStatementWriter, SqliteQueryBuilder};

/// Renders `statement` as SQLite SQL
pub fn build_sql<T>(statement: T) -> String
where
	T: QueryStatementWriter,
{
	statement.to_string(SqliteQueryBuilder)
}

/// `table.column` reference
pub fn qualified(table: &str, column: &str) -> (Alias, Alias) {
	(Alias::new(table), Alias::new(column))
}

/// Stored form of a timestamp
///
/// Fixed microsecond precision keeps text order equal to time order.
pub fn timestamp(at: DateTime<Utc>) -> String {
	at.to_rfc3339_opts(SecondsFormat::Micros, true)
}
