/// Connection Management Module
///
/// This module provides the `Database` manager owning the driver-level
/// environment and connection handles, connection string construction and
/// the connect/disconnect lifecycle.
use odbc_sys::SqlReturn;
use tracing::debug;

use crate::config::ConnectionConfig;
use crate::core::db::handles::{Connection, Environment};
use crate::core::error::{succeeded, OdbqlError, Result};

/// Manager for one ODBC connection.
///
/// Owns the environment and connection handles for its whole lifetime and
/// allocates one statement handle per executed statement. The manager is
/// synchronous and blocking, and holds at most one in-flight statement at a
/// time; the `&mut self` receivers on the execution methods enforce that
/// contract at compile time.
///
/// # Examples
///
/// ```no_run
/// use odbql::core::db::Database;
/// use odbql::core::succeeded;
///
/// let mut db = Database::new();
/// assert!(succeeded(db.allocation_status()));
///
/// let status = db.connect("db.example.com", 1433, "inventory", "reader", "secret");
/// assert!(succeeded(status));
///
/// let (status, data) = db.execute("SELECT id, name FROM parts");
/// assert!(succeeded(status));
/// for (column, values) in data.iter() {
///     println!("{}: {} values", column, values.len());
/// }
/// ```
#[derive(Debug)]
pub struct Database {
    // Field order is drop order: the connection handle must be released
    // before the environment handle that issued it.
    conn: Connection,
    env: Environment,
    alloc_status: SqlReturn,
}

impl Database {
    /// Allocates the environment and connection handles, in that order.
    ///
    /// Construction always completes. A failed allocation is recorded and
    /// observable through [`Database::allocation_status`]; on such a
    /// degraded manager, `connect` and `execute` return `INVALID_HANDLE`
    /// without calling into the driver, and teardown releases only what
    /// was actually allocated.
    pub fn new() -> Self {
        let (env, env_status) = Environment::allocate();
        let (conn, conn_status) = Connection::allocate(&env);
        let alloc_status = if !succeeded(env_status) {
            env_status
        } else if !succeeded(conn_status) {
            conn_status
        } else {
            SqlReturn::SUCCESS
        };
        Database {
            conn,
            env,
            alloc_status,
        }
    }

    /// Status recorded while allocating handles at construction.
    ///
    /// `SUCCESS` when both handles were allocated; otherwise the first
    /// failing native status.
    pub fn allocation_status(&self) -> SqlReturn {
        self.alloc_status
    }

    /// Connects to `server` on `port` using the given credentials.
    ///
    /// Builds the driver connection string and passes it to the driver with
    /// prompting suppressed, so a driver that would interactively ask for
    /// missing connection data fails instead. Returns the native status
    /// unchanged.
    pub fn connect(
        &mut self,
        server: &str,
        port: u16,
        database: &str,
        username: &str,
        password: &str,
    ) -> SqlReturn {
        debug!("connecting to {}:{} database {}", server, port, database);
        let conn_string = connection_string(server, port, database, username, password);
        self.conn.driver_connect(&conn_string)
    }

    /// Connects using parameters loaded from a configuration file.
    pub fn connect_with(&mut self, config: &ConnectionConfig) -> SqlReturn {
        self.connect(
            &config.server,
            config.port,
            &config.database,
            &config.username,
            &config.password,
        )
    }

    /// `Result`-shaped variant of [`Database::connect`].
    ///
    /// # Errors
    ///
    /// Returns `OdbqlError::Allocation` when construction had recorded a
    /// failed handle allocation, and `OdbqlError::Connection` carrying the
    /// raw status when the driver refuses the connection.
    pub fn connect_checked(
        &mut self,
        server: &str,
        port: u16,
        database: &str,
        username: &str,
        password: &str,
    ) -> Result<()> {
        if !succeeded(self.alloc_status) {
            return Err(OdbqlError::Allocation(self.alloc_status));
        }
        let status = self.connect(server, port, database, username, password);
        if succeeded(status) {
            Ok(())
        } else {
            Err(OdbqlError::Connection(status))
        }
    }

    /// True while connected to a server.
    pub fn is_connected(&self) -> bool {
        self.conn.is_connected()
    }

    /// Disconnects from the server.
    ///
    /// Idempotent: repeated calls, or calls on a manager that never
    /// connected (including after failed construction), return `SUCCESS`
    /// without touching the driver. Teardown on drop performs the same
    /// release, so calling this explicitly is optional.
    pub fn disconnect(&mut self) -> SqlReturn {
        self.conn.disconnect()
    }

    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the driver connection string for the SQL Server ODBC driver.
///
/// The shape, including the space between server and port, is:
/// `DRIVER={SQL Server};SERVER=host, 1433;DATABASE=db;UID=user;PWD=secret;`
pub fn connection_string(
    server: &str,
    port: u16,
    database: &str,
    username: &str,
    password: &str,
) -> String {
    format!(
        "DRIVER={{SQL Server}};SERVER={}, {};DATABASE={};UID={};PWD={};",
        server, port, database, username, password
    )
}
