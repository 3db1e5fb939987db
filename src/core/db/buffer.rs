//! Fixed-size wide-character buffers for exchanging strings with the driver.
//!
//! Cell values and column names cross the FFI boundary through fixed
//! capacity UTF-16 buffers. The capacity is a documented contract of this
//! crate: longer values are truncated deterministically, never grown.

use odbc_sys::{Len, SmallInt, WChar};

/// Maximum number of characters read for a single cell value or column name.
///
/// Values and names longer than this are silently truncated. Callers that
/// read wide result sets must account for this bound.
pub const CELL_CHARS: usize = 240;

/// A fixed-capacity UTF-16 buffer the driver writes NUL-terminated text into.
///
/// One extra code unit beyond the capacity is reserved for the terminator,
/// so a value of exactly `capacity` characters survives untruncated.
#[derive(Debug)]
pub struct WideBuffer {
    buf: Vec<WChar>,
    capacity: usize,
}

impl WideBuffer {
    /// Creates a zeroed buffer holding up to `capacity` characters.
    pub fn new(capacity: usize) -> Self {
        WideBuffer {
            buf: vec![0; capacity + 1],
            capacity,
        }
    }

    /// Creates a buffer sized to the per-cell contract of [`CELL_CHARS`].
    pub fn cell() -> Self {
        Self::new(CELL_CHARS)
    }

    /// Pointer for the driver to write into.
    pub fn as_mut_ptr(&mut self) -> *mut WChar {
        self.buf.as_mut_ptr()
    }

    /// Buffer length in bytes, as `SQLGetData` expects for wide data.
    pub fn byte_len(&self) -> Len {
        (self.buf.len() * std::mem::size_of::<WChar>()) as Len
    }

    /// Buffer length in characters, as `SQLDescribeColW` expects.
    pub fn char_len(&self) -> SmallInt {
        self.buf.len().min(SmallInt::MAX as usize) as SmallInt
    }

    /// Zeroes the buffer so a short read never exposes a previous value.
    pub fn clear(&mut self) {
        self.buf.fill(0);
    }

    /// Decodes the buffer up to the first NUL, bounded by the capacity.
    pub fn to_string_lossy(&self) -> String {
        let end = self
            .buf
            .iter()
            .position(|&c| c == 0)
            .unwrap_or(self.capacity)
            .min(self.capacity);
        String::from_utf16_lossy(&self.buf[..end])
    }
}

/// UTF-16 encodes `s` for driver input. Lengths are passed to the driver
/// explicitly, so no terminator is appended.
pub fn to_wide(s: &str) -> Vec<WChar> {
    s.encode_utf16().collect()
}
