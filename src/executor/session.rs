use crate::Result;
use crate::error::DbError;
use crate::executor::exec::{execute_conn, map_rows, query_conn};
use crate::registry::{Model, Registry};
use crate::scan::coerce::FromCell;
use crate::scan::record::{ColumnBinding, Record};
use crate::scan::select::select_list;
use crate::udbc::column::ColumnMeta;
use crate::udbc::connection::{Connection, RowSet};
use crate::udbc::dialect::Dialect;
use crate::udbc::value::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A connection paired with the registry its templates are rendered against.
///
/// Every call renders the template for the connection's dialect, binds the
/// arguments and maps the rows. Calls on one session are serialized.
pub struct Session {
    conn: Mutex<Box<dyn Connection>>,
    registry: Arc<Registry>,
}

impl Session {
    pub fn new(conn: Box<dyn Connection>, registry: Arc<Registry>) -> Self {
        Self {
            conn: Mutex::new(conn),
            registry,
        }
    }

    /// Opens a connection chosen by URL scheme (`sqlite:` or `mysql://`).
    pub async fn connect(url: &str, registry: Arc<Registry>) -> Result<Self> {
        let scheme = url.split(':').next().unwrap_or_default();
        let conn: Box<dyn Connection> = match scheme {
            #[cfg(feature = "sqlite")]
            "sqlite" => Box::new(crate::udbc::sqlite::connection::SqliteConnection::open(url).await?),
            #[cfg(feature = "mysql")]
            "mysql" => Box::new(
                crate::udbc::mysql::connection::MysqlConnection::connect(
                    url,
                    std::time::Duration::from_secs(10),
                )
                .await?,
            ),
            _ => return Err(DbError::InvalidDatabaseUrl(url.to_string())),
        };
        Ok(Self::new(conn, registry))
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub async fn dialect(&self) -> Dialect {
        self.conn.lock().await.dialect()
    }

    /// Executes a statement (e.g., INSERT, UPDATE, DELETE) and returns the
    /// number of rows affected.
    pub async fn execute(&self, template: &str, args: &[Value]) -> Result<u64> {
        let mut conn = self.conn.lock().await;
        execute_conn(conn.as_mut(), &self.registry, template, args.to_vec()).await
    }

    /// Executes a query and returns the unmapped result set.
    pub async fn query_raw(&self, template: &str, args: &[Value]) -> Result<RowSet> {
        let mut conn = self.conn.lock().await;
        query_conn(conn.as_mut(), &self.registry, template, args.to_vec()).await
    }

    /// Executes a query and maps each row into `R`, matching columns to
    /// fields by normalized name.
    pub async fn query<R: Record>(&self, template: &str, args: &[Value]) -> Result<Vec<R>> {
        let rs = self.query_raw(template, args).await?;
        let layout = self.registry.layout::<R>();
        let binding = ColumnBinding::by_name(&layout, &rs.columns);
        map_rows(&binding, rs)
    }

    /// Like [`query`](Self::query) but returns only the first row.
    ///
    /// # Errors
    /// Returns `DbError::EmptyResult` when the query yields no rows.
    pub async fn query_first<R: Record>(&self, template: &str, args: &[Value]) -> Result<R> {
        self.query(template, args)
            .await?
            .into_iter()
            .next()
            .ok_or(DbError::EmptyResult)
    }

    /// Selects every field of model `M`. `tail` follows the generated
    /// projection, typically `FROM [M] WHERE ...`.
    pub async fn query_model<M: Model>(&self, tail: &str, args: &[Value]) -> Result<Vec<M>> {
        let model = self.registry.model_of::<M>().ok_or_else(|| {
            DbError::Registry(format!("model '{}' is not registered", M::record_name()))
        })?;
        let template = format!("SELECT {} {}", select_list(model, None, 0).join(", "), tail);

        let rs = self.query_raw(&template, args).await?;
        let layout = self.registry.layout::<M>();
        let binding = ColumnBinding::by_model(&layout, model, 0);
        map_rows(&binding, rs)
    }

    /// Returns the first column of the first row.
    pub async fn query_scalar<T: FromCell>(&self, template: &str, args: &[Value]) -> Result<T> {
        let RowSet { columns, rows } = self.query_raw(template, args).await?;
        let cell = rows
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
            .ok_or(DbError::EmptyResult)?;
        let column = columns.into_iter().next().unwrap_or_default();
        T::from_cell(cell, &column).map_err(|e| DbError::Field {
            field: column_label(&column),
            source: Box::new(e),
        })
    }

    /// Retrieves the ID of the last inserted row.
    pub async fn last_insert_id(&self) -> Result<u64> {
        self.conn.lock().await.last_insert_id().await
    }
}

fn column_label(column: &ColumnMeta) -> String {
    if column.name.is_empty() {
        "column 0".to_string()
    } else {
        column.name.clone()
    }
}
