use crate::Result;
use crate::udbc::column::ColumnMeta;
use crate::udbc::dialect::Dialect;
use crate::udbc::value::Value;
use async_trait::async_trait;

/// A fully fetched result set: column metadata plus raw cells in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub columns: Vec<ColumnMeta>,
    pub rows: Vec<Vec<Value>>,
}

impl RowSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the column named `name`, compared case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }
}

/// An abstract database connection trait that defines the basic operations
/// for interacting with a database.
///
/// Statements handed to a connection are already rewritten for its
/// [`Dialect`]; arguments are bound strictly by position.
#[async_trait]
pub trait Connection: Send {
    /// The SQL convention this connection expects.
    fn dialect(&self) -> Dialect;

    /// Execute a query statement and return the result set.
    async fn query(&mut self, sql: &str, args: &[Value]) -> Result<RowSet>;

    /// Execute a non-query statement (INSERT, UPDATE, DELETE) and return the number of affected rows.
    async fn execute(&mut self, sql: &str, args: &[Value]) -> Result<u64>;

    /// Get the ID of the last inserted row.
    async fn last_insert_id(&mut self) -> Result<u64>;
}
