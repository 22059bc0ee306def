use async_trait::async_trait;
use rusqlite::params_from_iter;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::Result;
use crate::error::DbError;
use crate::udbc::column::ColumnMeta;
use crate::udbc::connection::{Connection, RowSet};
use crate::udbc::dialect::Dialect;
use crate::udbc::sqlite::value_codec::{from_sqlite_value, to_sqlite_value};
use crate::udbc::value::Value;

enum SqliteTarget {
    Memory,
    Path(String),
}

/// SQLite connection speaking the positional dialect.
///
/// rusqlite is blocking, so every call runs on the blocking thread pool.
pub struct SqliteConnection {
    conn: Arc<Mutex<rusqlite::Connection>>,
}

impl SqliteConnection {
    pub fn new(conn: rusqlite::Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Opens a connection from a `sqlite:`/`sqlite://` URL or a plain path.
    /// `:memory:` opens a private in-memory database.
    pub async fn open(url: &str) -> Result<Self> {
        let target = Self::parse_target(url)?;
        tokio::task::spawn_blocking(move || {
            let conn = match target {
                SqliteTarget::Memory => rusqlite::Connection::open_in_memory()?,
                SqliteTarget::Path(p) => rusqlite::Connection::open(p)?,
            };
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            Ok::<_, DbError>(Self::new(conn))
        })
        .await
        .map_err(|e| DbError::Database(e.to_string()))?
    }

    fn parse_target(url: &str) -> Result<SqliteTarget> {
        let trimmed = url.trim();
        let stripped = trimmed
            .strip_prefix("sqlite://")
            .or_else(|| trimmed.strip_prefix("sqlite:"))
            .unwrap_or(trimmed)
            .trim();

        if stripped.is_empty() {
            return Err(DbError::InvalidDatabaseUrl(url.to_string()));
        }

        if stripped == ":memory:" {
            return Ok(SqliteTarget::Memory);
        }

        Ok(SqliteTarget::Path(stripped.to_string()))
    }
}

#[async_trait]
impl Connection for SqliteConnection {
    fn dialect(&self) -> Dialect {
        Dialect::Positional
    }

    async fn query(&mut self, sql: &str, args: &[Value]) -> Result<RowSet> {
        let sql = sql.to_string();
        let params = args.iter().map(to_sqlite_value).collect::<Vec<_>>();
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let mut stmt = conn.prepare(&sql)?;
            let column_count = stmt.column_count();
            let columns = (0..column_count)
                .map(|i| {
                    let name = stmt
                        .column_name(i)
                        .map(|s| s.to_string())
                        .unwrap_or_else(|_| i.to_string());
                    ColumnMeta::new(name)
                })
                .collect::<Vec<_>>();

            let mut rows = stmt.query(params_from_iter(params))?;
            let mut out = Vec::new();

            while let Some(row) = rows.next()? {
                let mut cells = Vec::with_capacity(column_count);
                for i in 0..column_count {
                    cells.push(from_sqlite_value(row.get_ref(i)?));
                }
                out.push(cells);
            }

            Ok::<_, DbError>(RowSet { columns, rows: out })
        })
        .await
        .map_err(|e| DbError::Database(e.to_string()))?
    }

    async fn execute(&mut self, sql: &str, args: &[Value]) -> Result<u64> {
        let sql = sql.to_string();
        let params = args.iter().map(to_sqlite_value).collect::<Vec<_>>();
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let affected = conn.execute(&sql, params_from_iter(params))?;
            Ok::<_, DbError>(affected as u64)
        })
        .await
        .map_err(|e| DbError::Database(e.to_string()))?
    }

    async fn last_insert_id(&mut self) -> Result<u64> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            Ok::<_, DbError>(conn.last_insert_rowid().max(0) as u64)
        })
        .await
        .map_err(|e| DbError::Database(e.to_string()))?
    }
}
