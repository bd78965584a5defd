//! ZIP archive encoding.
//!
//! This module writes stored (uncompressed) ZIP archives that any standard
//! unzip tool can read.
//!
//! ## Architecture
//!
//! The module is organized into four main components:
//!
//! - [`crc32()`]: the CRC-32 checksum stored for every entry
//! - [`records`]: fixed-layout binary records (local header, central directory header, EOCD)
//! - [`ArchiveBuilder`]: collects entries in memory and serializes them in one pass
//! - [`StreamingZipWriter`]: writes entries to a sink as they arrive
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and raw data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! Readers locate the EOCD by scanning back from the end of the file and
//! trust its pointer to the Central Directory, so every offset written here
//! must be exact.
//!
//! ## Limitations
//!
//! - STORED method only, no compression
//! - No encryption
//! - No multi-disk archives
//! - No ZIP64: at most 65535 entries, and every size and offset must fit in 32 bits

mod builder;
mod checksum;
mod error;
pub mod records;
mod writer;

pub use builder::{
    ArchiveBuilder, Entry, MAX_CONTENT_LEN, MAX_ENTRIES, MAX_NAME_LEN, PlacedEntry,
};
pub use checksum::{crc32, crc32_bitwise};
pub use error::{Result, ZipError};
pub use writer::StreamingZipWriter;
