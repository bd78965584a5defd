//! # storezip
//!
//! A minimal ZIP archive writer for the stored (uncompressed) method.
//!
//! This library turns a sequence of named byte payloads into a ZIP archive
//! that any standard unzip tool can read, with no compression library
//! involved. Archives can be built in memory with [`ArchiveBuilder`] or
//! streamed to a sink with [`StreamingZipWriter`], which only keeps the
//! central directory metadata in memory.
//!
//! ## Features
//!
//! - CRC-32 checksum engine with a compile-time lookup table
//! - Typed record descriptions for the local header, central directory and EOCD
//! - Explicit rejection of names, sizes and entry counts the format cannot describe
//! - Directory walking with a testable exclusion policy
//! - Output to local files, stdout or memory
//!
//! ## Example
//!
//! ```
//! use storezip::ArchiveBuilder;
//!
//! let mut builder = ArchiveBuilder::new();
//! builder.add("a.txt", "hello")?;
//! builder.add("docs/b.txt", "")?;
//!
//! let archive = builder.generate();
//! assert_eq!(archive.len() as u64, builder.archive_len());
//! # Ok::<(), storezip::ZipError>(())
//! ```

pub mod cli;
pub mod io;
pub mod source;
pub mod zip;

pub use cli::Cli;
pub use io::{LocalFileWriter, StdoutWriter, WriteSink};
pub use source::{EntrySource, ExclusionPolicy, SourceEntry};
pub use zip::{ArchiveBuilder, Entry, PlacedEntry, StreamingZipWriter, ZipError, crc32};
