//! Error types for archive construction.

use std::io;

/// Errors raised while adding entries to an archive or writing it out.
///
/// [`ZipError::Io`] and [`ZipError::SinkFailed`] come from the output sink.
/// Every other variant is an input-validation failure reported by `add()`,
/// and the archive is left unchanged when one is returned.
#[derive(Debug, thiserror::Error)]
pub enum ZipError {
    /// The entry name is empty.
    #[error("entry name is empty")]
    EmptyName,

    /// The encoded entry name does not fit the 16-bit length field.
    #[error("entry name is {len} bytes, the maximum is 65535")]
    NameTooLong {
        /// Encoded name length in bytes.
        len: usize,
    },

    /// The entry content does not fit the 32-bit size fields.
    #[error("entry content is {len} bytes, the maximum is 4294967295")]
    ContentTooLarge {
        /// Content length in bytes.
        len: u64,
    },

    /// The archive already holds as many entries as the 16-bit count fields allow.
    #[error("archive already holds {count} entries, the maximum is 65535")]
    TooManyEntries {
        /// Number of entries already in the archive.
        count: usize,
    },

    /// Adding the entry would push an offset or size past 32 bits.
    #[error("archive would grow to {len} bytes, past the 32-bit offset limit")]
    ArchiveTooLarge {
        /// Archive length in bytes including the rejected entry.
        len: u64,
    },

    /// Writing to the output sink failed.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// An earlier write to the output sink failed, so the bytes already in
    /// the sink no longer match the writer's layout.
    #[error("an earlier write to the output failed, the archive is incomplete")]
    SinkFailed,
}

/// Result alias used by the archive writers.
pub type Result<T> = std::result::Result<T, ZipError>;
