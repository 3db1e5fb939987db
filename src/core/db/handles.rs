//! RAII ownership of the raw ODBC handles.
//!
//! All FFI calls into the driver manager live in this module. Each wrapper
//! releases its native handle on drop regardless of which exit path was
//! taken, and tolerates holding a null handle when the allocation it wraps
//! never succeeded. Warnings (success-with-info) are surfaced by logging
//! the driver diagnostic records.

use std::marker::PhantomData;
use std::ptr::null_mut;

use odbc_sys::{
    AttrOdbcVersion, CDataType, DriverConnectOption, EnvironmentAttribute, HDbc, HEnv, HStmt,
    Handle, HandleType, Integer, Len, Pointer, SQLAllocHandle, SQLDescribeColW, SQLDisconnect,
    SQLDriverConnectW, SQLExecDirectW, SQLFetch, SQLFreeHandle, SQLGetData, SQLGetDiagRecW,
    SQLNumResultCols, SQLSetEnvAttr, SmallInt, SqlReturn, USmallInt, WChar,
};
use tracing::{debug, warn};

use crate::core::db::buffer::{to_wide, WideBuffer};
use crate::core::error::succeeded;

/// Capacity of the out-buffer receiving the completed connection string
/// echoed back by `SQLDriverConnectW`.
const COMPLETED_STRING_CHARS: usize = 1024;

/// Capacity of the buffer receiving one diagnostic message text.
const DIAG_MESSAGE_CHARS: usize = 512;

/// Indicator value reported by `SQLGetData` for NULL cells (SQL_NULL_DATA).
const NULL_DATA: Len = -1;

fn wide_len(text: &[WChar]) -> Integer {
    text.len().min(Integer::MAX as usize) as Integer
}

fn wide_len_small(text: &[WChar]) -> SmallInt {
    text.len().min(SmallInt::MAX as usize) as SmallInt
}

/// Owns the driver environment handle for the lifetime of a manager.
#[derive(Debug)]
pub struct Environment {
    handle: HEnv,
}

impl Environment {
    /// Allocates the environment handle and selects ODBC 3 behavior.
    ///
    /// The wrapper is returned even when allocation fails so teardown stays
    /// uniform; a failed wrapper holds a null handle and releases nothing.
    /// The second element is the first non-success status, or `SUCCESS`.
    pub fn allocate() -> (Self, SqlReturn) {
        let mut handle: Handle = null_mut();
        let status = unsafe { SQLAllocHandle(HandleType::Env, null_mut(), &mut handle) };
        if !succeeded(status) {
            return (Environment { handle: null_mut() }, status);
        }
        debug!("allocated environment handle");

        let env = Environment { handle: handle as HEnv };
        let status = unsafe {
            SQLSetEnvAttr(
                handle as HEnv,
                EnvironmentAttribute::OdbcVersion,
                AttrOdbcVersion::Odbc3.into(),
                0,
            )
        };
        if !succeeded(status) {
            return (env, status);
        }
        (env, SqlReturn::SUCCESS)
    }

    /// True when the underlying handle was successfully allocated.
    pub fn is_allocated(&self) -> bool {
        !self.handle.is_null()
    }

    pub(crate) fn raw(&self) -> HEnv {
        self.handle
    }
}

impl Drop for Environment {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            let _ = unsafe { SQLFreeHandle(HandleType::Env, self.handle as Handle) };
            debug!("released environment handle");
        }
    }
}

/// Owns the driver connection handle, disconnecting on drop when connected.
#[derive(Debug)]
pub struct Connection {
    handle: HDbc,
    connected: bool,
}

impl Connection {
    /// Allocates a connection handle against `env`.
    ///
    /// A degraded environment short-circuits to `INVALID_HANDLE` without
    /// calling into the driver.
    pub fn allocate(env: &Environment) -> (Self, SqlReturn) {
        if !env.is_allocated() {
            return (Connection::unallocated(), SqlReturn::INVALID_HANDLE);
        }
        let mut handle: Handle = null_mut();
        let status = unsafe { SQLAllocHandle(HandleType::Dbc, env.raw() as Handle, &mut handle) };
        if !succeeded(status) {
            return (Connection::unallocated(), status);
        }
        debug!("allocated connection handle");
        (
            Connection {
                handle: handle as HDbc,
                connected: false,
            },
            SqlReturn::SUCCESS,
        )
    }

    fn unallocated() -> Self {
        Connection {
            handle: null_mut(),
            connected: false,
        }
    }

    /// True when the underlying handle was successfully allocated.
    pub fn is_allocated(&self) -> bool {
        !self.handle.is_null()
    }

    /// True after a successful `driver_connect` and before disconnect.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Issues `SQLDriverConnectW` with prompting suppressed.
    ///
    /// The completed connection string echoed by the driver is discarded;
    /// only the native status is surfaced.
    pub fn driver_connect(&mut self, connection_string: &str) -> SqlReturn {
        if !self.is_allocated() {
            return SqlReturn::INVALID_HANDLE;
        }
        let in_string = to_wide(connection_string);
        let mut completed = WideBuffer::new(COMPLETED_STRING_CHARS);
        let mut completed_len: SmallInt = 0;
        let status = unsafe {
            SQLDriverConnectW(
                self.handle,
                null_mut(),
                in_string.as_ptr(),
                wide_len_small(&in_string),
                completed.as_mut_ptr(),
                completed.char_len(),
                &mut completed_len,
                DriverConnectOption::NoPrompt,
            )
        };
        if succeeded(status) {
            self.connected = true;
        }
        if status == SqlReturn::SUCCESS_WITH_INFO {
            log_diagnostics(HandleType::Dbc, self.handle as Handle);
        }
        status
    }

    /// Disconnects if connected. Safe to call any number of times and on a
    /// never-connected handle.
    pub fn disconnect(&mut self) -> SqlReturn {
        if !self.connected {
            return SqlReturn::SUCCESS;
        }
        self.connected = false;
        debug!("disconnecting");
        unsafe { SQLDisconnect(self.handle) }
    }

    pub(crate) fn raw(&self) -> HDbc {
        self.handle
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        let _ = self.disconnect();
        if !self.handle.is_null() {
            let _ = unsafe { SQLFreeHandle(HandleType::Dbc, self.handle as Handle) };
            debug!("released connection handle");
        }
    }
}

/// Owns one statement handle for the duration of a single execution.
///
/// A fresh statement is allocated per execution and freed when it goes out
/// of scope, so no handle outlives the call that used it.
#[derive(Debug)]
pub struct Statement<'c> {
    handle: HStmt,
    _conn: PhantomData<&'c Connection>,
}

impl<'c> Statement<'c> {
    /// Allocates a fresh statement handle against `conn`.
    pub fn allocate(conn: &'c Connection) -> (Self, SqlReturn) {
        if !conn.is_allocated() {
            return (Statement::unallocated(), SqlReturn::INVALID_HANDLE);
        }
        let mut handle: Handle = null_mut();
        let status = unsafe { SQLAllocHandle(HandleType::Stmt, conn.raw() as Handle, &mut handle) };
        if !succeeded(status) {
            return (Statement::unallocated(), status);
        }
        (
            Statement {
                handle: handle as HStmt,
                _conn: PhantomData,
            },
            SqlReturn::SUCCESS,
        )
    }

    fn unallocated() -> Self {
        Statement {
            handle: null_mut(),
            _conn: PhantomData,
        }
    }

    /// Executes `statement` directly, without parameter binding.
    pub fn exec_direct(&mut self, statement: &str) -> SqlReturn {
        let text = to_wide(statement);
        let status = unsafe { SQLExecDirectW(self.handle, text.as_ptr(), wide_len(&text)) };
        if status == SqlReturn::SUCCESS_WITH_INFO {
            log_diagnostics(HandleType::Stmt, self.handle as Handle);
        }
        status
    }

    /// Queries the number of columns in the active result set.
    pub fn num_result_cols(&mut self) -> (SqlReturn, SmallInt) {
        let mut columns: SmallInt = 0;
        let status = unsafe { SQLNumResultCols(self.handle, &mut columns) };
        (status, columns)
    }

    /// Advances the cursor to the next row.
    pub fn fetch(&mut self) -> SqlReturn {
        unsafe { SQLFetch(self.handle) }
    }

    /// Reads column `col` (1-based) of the current row as wide text.
    ///
    /// Returns the native status and whether the cell was NULL. Values
    /// longer than the buffer capacity are truncated by the driver.
    pub fn get_data_wide(&mut self, col: USmallInt, buf: &mut WideBuffer) -> (SqlReturn, bool) {
        buf.clear();
        let mut indicator: Len = 0;
        let status = unsafe {
            SQLGetData(
                self.handle,
                col,
                CDataType::WChar,
                buf.as_mut_ptr() as Pointer,
                buf.byte_len(),
                &mut indicator,
            )
        };
        (status, indicator == NULL_DATA)
    }

    /// Reads the display name of column `col` (1-based) into `buf`.
    ///
    /// Type, size and nullability outputs are not requested.
    pub fn describe_col_name(&mut self, col: USmallInt, buf: &mut WideBuffer) -> SqlReturn {
        buf.clear();
        let mut name_len: SmallInt = 0;
        unsafe {
            SQLDescribeColW(
                self.handle,
                col,
                buf.as_mut_ptr(),
                buf.char_len(),
                &mut name_len,
                null_mut(),
                null_mut(),
                null_mut(),
                null_mut(),
            )
        }
    }
}

impl Drop for Statement<'_> {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            let _ = unsafe { SQLFreeHandle(HandleType::Stmt, self.handle as Handle) };
        }
    }
}

/// Logs the driver diagnostic records for `handle` at warn level.
///
/// The driver keeps records until the next call on the same handle, so this
/// runs immediately after a success-with-info status.
fn log_diagnostics(handle_type: HandleType, handle: Handle) {
    let mut record: SmallInt = 1;
    loop {
        // Five-character SQLSTATE plus terminator
        let mut state = [0 as WChar; 6];
        let mut native_error: Integer = 0;
        let mut message = WideBuffer::new(DIAG_MESSAGE_CHARS);
        let mut message_len: SmallInt = 0;
        let status = unsafe {
            SQLGetDiagRecW(
                handle_type,
                handle,
                record,
                state.as_mut_ptr(),
                &mut native_error,
                message.as_mut_ptr(),
                message.char_len(),
                &mut message_len,
            )
        };
        if !succeeded(status) {
            break;
        }
        let state_end = state.iter().position(|&c| c == 0).unwrap_or(state.len());
        warn!(
            "driver diagnostic [{}] native={}: {}",
            String::from_utf16_lossy(&state[..state_end]),
            native_error,
            message.to_string_lossy()
        );
        record += 1;
    }
}
