use crate::Result;
use crate::registry::Registry;
use crate::scan::record::{ColumnBinding, Record, materialize};
use crate::tpl::engine;
use crate::udbc::connection::{Connection, RowSet};
use crate::udbc::value::Value;
use log::debug;
use std::time::Instant;

/// Executes a statement template (INSERT, UPDATE, DELETE) on the given connection.
pub async fn execute_conn(
    conn: &mut dyn Connection,
    registry: &Registry,
    template: &str,
    args: Vec<Value>,
) -> Result<u64> {
    let start = Instant::now();
    let prepared = engine::prepare(template, args, conn.dialect(), registry)?;
    let result = conn.execute(&prepared.sql, &prepared.args).await;
    let elapsed = start.elapsed().as_millis();

    match &result {
        Ok(affected) => debug!(
            "Execute: sql=\n{}, params={:?}, elapsed={}ms, affected={}",
            &prepared.sql, &prepared.args, elapsed, affected
        ),
        Err(e) => debug!(
            "Execute: sql=\n{}, params={:?}, elapsed={}ms, error={:?}",
            &prepared.sql, &prepared.args, elapsed, e
        ),
    }

    result
}

/// Executes a query template on the given connection and returns the raw result set.
pub async fn query_conn(
    conn: &mut dyn Connection,
    registry: &Registry,
    template: &str,
    args: Vec<Value>,
) -> Result<RowSet> {
    let start = Instant::now();
    let prepared = engine::prepare(template, args, conn.dialect(), registry)?;
    let result = conn.query(&prepared.sql, &prepared.args).await;
    let elapsed = start.elapsed().as_millis();

    match &result {
        Ok(rs) => debug!(
            "Query: sql=\n{}, params={:?}, elapsed={}ms, rows={}",
            &prepared.sql,
            &prepared.args,
            elapsed,
            rs.len()
        ),
        Err(e) => debug!(
            "Query: sql=\n{}, params={:?}, elapsed={}ms, error={:?}",
            &prepared.sql, &prepared.args, elapsed, e
        ),
    }

    result
}

/// Maps raw rows to the record type `R`.
pub fn map_rows<R: Record>(binding: &ColumnBinding, rs: RowSet) -> Result<Vec<R>> {
    let RowSet { columns, rows } = rs;
    rows.into_iter()
        .map(|row| materialize::<R>(binding, row, &columns))
        .collect()
}
