/// Database Module
///
/// This module provides the driver-facing functionality of odbql, organized
/// into focused submodules:
///
/// - **Handle Ownership** (`handles.rs`): RAII wrappers over the raw ODBC
///   environment, connection and statement handles
/// - **Wide Buffers** (`buffer.rs`): fixed-size UTF-16 buffers used to read
///   cell values and column names from the driver
/// - **Connection Management** (`connection.rs`): the `Database` manager,
///   connection string construction and connect/disconnect
/// - **Query Execution** (`query.rs`): statement execution and the
///   by-column result mapping
///
/// ## Error Handling
///
/// Driver-facing operations return the native status code unchanged. The
/// `_checked` variants translate non-success statuses into `OdbqlError`.
pub mod buffer;
pub mod connection;
pub mod handles;
pub mod query;

pub use buffer::*;
pub use connection::*;
pub use query::*;
