/// Query Execution Module
///
/// This module provides single-statement execution and the by-column result
/// mapping. Statements are executed directly, without parameter binding or
/// prepared-statement reuse, and the full result set is fetched eagerly.
use std::collections::BTreeMap;

use odbc_sys::{SqlReturn, USmallInt};
use tracing::debug;

use crate::core::db::buffer::WideBuffer;
use crate::core::db::connection::Database;
use crate::core::db::handles::Statement;
use crate::core::error::{succeeded, OdbqlError, Result};

/// Query results keyed by column display name.
///
/// Each key maps to one cell value per fetched row, in fetch order. All
/// sequences have the same length. A statement producing no rows or no
/// columns yields an empty mapping.
///
/// NULL cells are represented as empty strings. Values and names longer
/// than [`CELL_CHARS`](crate::core::db::buffer::CELL_CHARS) characters
/// arrive truncated to that bound.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnarResult {
    columns: BTreeMap<String, Vec<String>>,
}

impl ColumnarResult {
    /// Creates an empty result.
    pub fn new() -> Self {
        ColumnarResult::default()
    }

    /// Appends `value` to the column named `name`, creating the column on
    /// first encounter.
    pub fn push_cell(&mut self, name: &str, value: String) {
        self.columns.entry(name.to_string()).or_default().push(value);
    }

    /// True when no cell has been collected.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Number of distinct columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of fetched rows, i.e. the length shared by all column
    /// sequences. Zero for an empty result.
    pub fn row_count(&self) -> usize {
        self.columns.values().next().map(Vec::len).unwrap_or(0)
    }

    /// Values of the column named `name`, in fetch order.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Iterates over column names.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Iterates over `(column name, values)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.columns
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Consumes the result, yielding the underlying mapping.
    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.columns
    }
}

impl Database {
    /// Executes `statement` and collects the full result set.
    ///
    /// Every step (statement allocation, execution, column count, fetching,
    /// cell and name reads) is a hard stop on failure: the failing native
    /// status is returned together with an empty mapping. Statements that
    /// produce no rows or no columns return `SUCCESS` with an empty
    /// mapping. Success-with-info logs the driver diagnostics and
    /// continues.
    ///
    /// The statement handle allocated for this call is released before the
    /// method returns, whichever exit path is taken.
    pub fn execute(&mut self, statement: &str) -> (SqlReturn, ColumnarResult) {
        let mut data = ColumnarResult::new();

        let (mut stmt, status) = Statement::allocate(self.connection());
        if !succeeded(status) {
            return (status, data);
        }

        let status = stmt.exec_direct(statement);
        if !succeeded(status) {
            return (status, data);
        }

        let (status, columns) = stmt.num_result_cols();
        if !succeeded(status) {
            return (status, data);
        }
        if columns <= 0 {
            // Row-count-only statements (INSERT, UPDATE, DDL) have no
            // result set to fetch.
            return (SqlReturn::SUCCESS, data);
        }

        let mut value_buf = WideBuffer::cell();
        let mut name_buf = WideBuffer::cell();
        loop {
            let fetched = stmt.fetch();
            if fetched == SqlReturn::NO_DATA {
                break;
            }
            if !succeeded(fetched) {
                return (fetched, ColumnarResult::new());
            }
            for col in 1..=columns {
                let col = col as USmallInt;
                let (status, is_null) = stmt.get_data_wide(col, &mut value_buf);
                if !succeeded(status) {
                    return (status, ColumnarResult::new());
                }
                let status = stmt.describe_col_name(col, &mut name_buf);
                if !succeeded(status) {
                    return (status, ColumnarResult::new());
                }
                let value = if is_null {
                    String::new()
                } else {
                    value_buf.to_string_lossy()
                };
                data.push_cell(&name_buf.to_string_lossy(), value);
            }
        }

        debug!(
            "fetched {} rows across {} columns",
            data.row_count(),
            data.column_count()
        );
        (SqlReturn::SUCCESS, data)
    }

    /// `Result`-shaped variant of [`Database::execute`].
    ///
    /// # Errors
    ///
    /// Returns `OdbqlError::Statement` carrying the raw status when any
    /// execution step fails.
    pub fn execute_checked(&mut self, statement: &str) -> Result<ColumnarResult> {
        let (status, data) = self.execute(statement);
        if succeeded(status) {
            Ok(data)
        } else {
            Err(OdbqlError::Statement(status))
        }
    }
}
