//! Source locations, identifiers and source buffers for the `ace` compiler.
//!
//! Every diagnostic, symbol, syntax node and sema node carries a
//! [`SrcLocation`]: a half-open byte range into one of the buffers owned by
//! the compilation. Buffers are immutable once created; the reverse map from
//! byte offset to `(path, line, column)` is built eagerly per file.

mod buffer;

pub use buffer::{BufferId, CliArgBuffer, FileBuffer, SrcBuffer, SrcBufferStore};

use std::fmt;

use serde::{Deserialize, Serialize};

/// A half-open byte range into a source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SrcLocation {
    pub buffer: BufferId,
    pub start: usize,
    pub end: usize,
}

impl SrcLocation {
    pub fn new(buffer: BufferId, start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { buffer, start, end }
    }

    /// A location that points at nothing; used by diagnostics raised before
    /// any buffer exists.
    pub fn dummy() -> Self {
        Self {
            buffer: BufferId::DUMMY,
            start: 0,
            end: 0,
        }
    }

    #[inline]
    pub fn is_dummy(&self) -> bool {
        self.buffer == BufferId::DUMMY
    }

    /// The smallest location covering both `self` and `other`.
    /// Both must point into the same buffer.
    pub fn join(&self, other: &SrcLocation) -> SrcLocation {
        debug_assert_eq!(self.buffer, other.buffer);
        SrcLocation {
            buffer: self.buffer,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// The one-byte location at the start of `self`.
    pub fn first_char(&self) -> SrcLocation {
        SrcLocation {
            buffer: self.buffer,
            start: self.start,
            end: self.start + 1,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A resolved source position: filename, 1-based line, 0-based column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub filename: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line, self.column + 1)
    }
}

/// A name together with the location it was written at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ident {
    pub location: SrcLocation,
    pub name: String,
}

impl Ident {
    pub fn new(location: SrcLocation, name: impl Into<String>) -> Self {
        Self {
            location,
            name: name.into(),
        }
    }

    /// An identifier with no source position, for compiler-synthesized
    /// symbols (glue functions, anonymous scopes, error sentinels).
    pub fn synthesized(name: impl Into<String>) -> Self {
        Self {
            location: SrcLocation::dummy(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests;
