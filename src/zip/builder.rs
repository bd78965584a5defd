//! In-memory archive builder.
//!
//! [`ArchiveBuilder`] collects entries and serializes the whole archive in one
//! pass when [`ArchiveBuilder::generate`] is called. Every entry's content is
//! held in memory until then; see [`StreamingZipWriter`](super::StreamingZipWriter)
//! for archives that should not be buffered.

use super::checksum::crc32;
use super::error::{Result, ZipError};
use super::records::{
    CentralDirectoryHeader, EndOfCentralDirectory, FLAG_UTF8, LocalFileHeader, Record,
};
use crate::io::WriteSink;

/// Longest entry name, in bytes, the 16-bit length fields can describe.
pub const MAX_NAME_LEN: usize = u16::MAX as usize;

/// Largest entry content the 32-bit size fields can describe.
pub const MAX_CONTENT_LEN: u64 = u32::MAX as u64;

/// Most entries the 16-bit count fields of the EOCD can describe.
pub const MAX_ENTRIES: usize = u16::MAX as usize;

/// Largest offset or size the 32-bit archive fields can describe.
const MAX_OFFSET: u64 = u32::MAX as u64;

pub(crate) fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ZipError::EmptyName);
    }
    if name.len() > MAX_NAME_LEN {
        return Err(ZipError::NameTooLong { len: name.len() });
    }
    Ok(())
}

pub(crate) fn validate_size(len: u64) -> Result<u32> {
    u32::try_from(len).map_err(|_| ZipError::ContentTooLarge { len })
}

pub(crate) fn general_purpose_flags(utf8_names: bool) -> u16 {
    if utf8_names { FLAG_UTF8 } else { 0 }
}

/// Narrow a length already bounded by [`Footprint::admit`].
fn narrow(value: usize) -> u32 {
    assert!(
        value as u64 <= MAX_OFFSET,
        "archive offset {value} escaped the 32-bit bound checked at add time"
    );
    value as u32
}

/// Running byte totals of an archive, used to reject entries that would
/// overflow the 16- and 32-bit fields before anything is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Footprint {
    pub entries: usize,
    /// Length of all local headers plus content.
    pub local_len: u64,
    /// Length of all central directory headers.
    pub central_len: u64,
}

impl Footprint {
    /// Totals after one more entry, or the error that entry would cause.
    pub fn admit(&self, name_len: usize, size: u32) -> Result<Footprint> {
        if self.entries >= MAX_ENTRIES {
            return Err(ZipError::TooManyEntries {
                count: self.entries,
            });
        }

        let local_len =
            self.local_len + (LocalFileHeader::FIXED_SIZE + name_len) as u64 + size as u64;
        let central_len =
            self.central_len + (CentralDirectoryHeader::FIXED_SIZE + name_len) as u64;

        // The central directory starts at `local_len` and is `central_len` long;
        // both end up in 32-bit EOCD fields.
        if local_len > MAX_OFFSET || central_len > MAX_OFFSET {
            return Err(ZipError::ArchiveTooLarge {
                len: local_len + central_len + EndOfCentralDirectory::FIXED_SIZE as u64,
            });
        }

        Ok(Footprint {
            entries: self.entries + 1,
            local_len,
            central_len,
        })
    }

    pub fn archive_len(&self) -> u64 {
        self.local_len + self.central_len + EndOfCentralDirectory::FIXED_SIZE as u64
    }
}

/// A named payload with its checksum and size computed once at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    name: String,
    content: Vec<u8>,
    crc32: u32,
    size: u32,
}

impl Entry {
    /// Create an entry, validating the name and content length.
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Result<Self> {
        let name = name.into();
        let content = content.into();
        validate_name(&name)?;
        let size = validate_size(content.len() as u64)?;

        Ok(Self {
            crc32: crc32(&content),
            name,
            content,
            size,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn crc32(&self) -> u32 {
        self.crc32
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    fn local_header(&self, flags: u16) -> LocalFileHeader<'_> {
        LocalFileHeader {
            flags,
            crc32: self.crc32,
            size: self.size,
            file_name: self.name.as_bytes(),
        }
    }

    fn place(&self, offset: u32) -> PlacedEntry {
        PlacedEntry {
            name: self.name.clone(),
            crc32: self.crc32,
            size: self.size,
            offset,
        }
    }
}

/// Entry metadata together with the offset of its Local File Header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedEntry {
    name: String,
    crc32: u32,
    size: u32,
    offset: u32,
}

impl PlacedEntry {
    pub(crate) fn new(name: String, crc32: u32, size: u32, offset: u32) -> Self {
        Self {
            name,
            crc32,
            size,
            offset,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn crc32(&self) -> u32 {
        self.crc32
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Byte offset of the entry's Local File Header within the archive.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub(crate) fn central_header(&self, flags: u16) -> CentralDirectoryHeader<'_> {
        CentralDirectoryHeader {
            flags,
            crc32: self.crc32,
            size: self.size,
            file_name: self.name.as_bytes(),
            local_header_offset: self.offset,
        }
    }
}

/// Write the central directory and EOCD for `placed`, returning the bytes.
///
/// `cd_offset` is where the central directory begins, i.e. the length of the
/// local section that precedes it.
pub(crate) fn encode_trailer(placed: &[PlacedEntry], flags: u16, cd_offset: usize) -> Vec<u8> {
    let mut out = Vec::new();
    for entry in placed {
        out.extend_from_slice(&entry.central_header(flags).to_bytes());
    }

    let eocd = EndOfCentralDirectory {
        total_entries: placed.len() as u16,
        cd_size: narrow(out.len()),
        cd_offset: narrow(cd_offset),
    };
    out.extend_from_slice(&eocd.to_bytes());
    out
}

/// Accumulates entries and serializes them into a stored ZIP archive.
///
/// ## Example
///
/// ```
/// use storezip::zip::ArchiveBuilder;
///
/// let mut builder = ArchiveBuilder::new();
/// builder.add("a.txt", "hello")?;
/// builder.add("b.txt", "")?;
///
/// let archive = builder.generate();
/// assert_eq!(archive.len() as u64, builder.archive_len());
/// assert_eq!(&archive[..4], b"PK\x03\x04");
/// # Ok::<(), storezip::zip::ZipError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ArchiveBuilder {
    entries: Vec<Entry>,
    footprint: Footprint,
    utf8_names: bool,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the UTF-8 file name flag (general purpose bit 11) on every record.
    ///
    /// Off by default, which keeps output byte-compatible with archives that
    /// never carried the flag.
    pub fn with_utf8_names(mut self, enabled: bool) -> Self {
        self.utf8_names = enabled;
        self
    }

    /// Append an entry.
    ///
    /// The checksum and size are computed here. On error the builder is
    /// left unchanged.
    pub fn add(&mut self, name: impl Into<String>, content: impl Into<Vec<u8>>) -> Result<()> {
        self.push(Entry::new(name, content)?)
    }

    /// Append an entry that was created ahead of time.
    pub fn push(&mut self, entry: Entry) -> Result<()> {
        self.footprint = self.footprint.admit(entry.name.len(), entry.size)?;
        self.entries.push(entry);
        Ok(())
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact length of the buffer [`generate`](Self::generate) returns.
    pub fn archive_len(&self) -> u64 {
        self.footprint.archive_len()
    }

    /// Every entry with the offset its Local File Header will have.
    pub fn placements(&self) -> Vec<PlacedEntry> {
        let flags = self.flags();
        let mut offset = 0usize;
        self.entries
            .iter()
            .map(|entry| {
                let placed = entry.place(narrow(offset));
                offset += entry.local_header(flags).encoded_len() + entry.content.len();
                placed
            })
            .collect()
    }

    /// Serialize the archive.
    ///
    /// Output is local headers with content, then the central directory,
    /// then the EOCD record. Calling this again without adding entries
    /// returns identical bytes.
    pub fn generate(&self) -> Vec<u8> {
        let flags = self.flags();
        let expected = self.archive_len();
        let mut out = Vec::with_capacity(expected as usize);

        let mut placed = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let offset = narrow(out.len());
            out.extend_from_slice(&entry.local_header(flags).to_bytes());
            out.extend_from_slice(&entry.content);
            placed.push(entry.place(offset));
        }

        let cd_offset = out.len();
        out.extend_from_slice(&encode_trailer(&placed, flags, cd_offset));

        assert_eq!(
            out.len() as u64,
            expected,
            "generated archive length does not match its layout"
        );
        out
    }

    /// Generate the archive and write it to `sink`, returning its length.
    pub async fn write_to<S: WriteSink + ?Sized>(&self, sink: &mut S) -> Result<u64> {
        let archive = self.generate();
        sink.write_all(&archive).await?;
        sink.flush().await?;
        Ok(archive.len() as u64)
    }

    fn flags(&self) -> u16 {
        general_purpose_flags(self.utf8_names)
    }
}
