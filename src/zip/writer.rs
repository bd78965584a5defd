//! Streaming archive writer.
//!
//! [`StreamingZipWriter`] writes each entry's Local File Header and content
//! to a [`WriteSink`] as soon as it is added, keeping only the metadata the
//! central directory needs. Memory use grows with the number of entries, not
//! with their size.
//!
//! The bytes produced are identical to [`ArchiveBuilder::generate`] for the
//! same entries in the same order.
//!
//! [`ArchiveBuilder::generate`]: super::ArchiveBuilder::generate

use super::builder::{
    Footprint, PlacedEntry, encode_trailer, general_purpose_flags, validate_name, validate_size,
};
use super::checksum::crc32;
use super::error::{Result, ZipError};
use super::records::{LocalFileHeader, Record};
use crate::io::WriteSink;

/// Stored ZIP writer that streams the local section to a sink.
///
/// ## Example
///
/// ```
/// use storezip::zip::StreamingZipWriter;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), storezip::zip::ZipError> {
/// let mut writer = StreamingZipWriter::new(Vec::new());
/// writer.add("a.txt", b"hello").await?;
/// let archive = writer.finish().await?;
/// assert_eq!(&archive[archive.len() - 22..][..4], b"PK\x05\x06");
/// # Ok(())
/// # }
/// ```
pub struct StreamingZipWriter<S: WriteSink> {
    sink: S,
    placed: Vec<PlacedEntry>,
    footprint: Footprint,
    /// Bytes written by this writer, which is also the next header's offset.
    position: u64,
    utf8_names: bool,
    /// Set once a sink write fails. The sink may then hold bytes the layout
    /// does not account for, so no further entries or trailer are written.
    failed: bool,
}

impl<S: WriteSink> StreamingZipWriter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            placed: Vec::new(),
            footprint: Footprint::default(),
            position: 0,
            utf8_names: false,
            failed: false,
        }
    }

    /// Set the UTF-8 file name flag (general purpose bit 11) on every record.
    pub fn with_utf8_names(mut self, enabled: bool) -> Self {
        self.utf8_names = enabled;
        self
    }

    /// Validate an entry and write its Local File Header and content.
    ///
    /// Validation happens before any byte reaches the sink, so a rejected
    /// entry leaves the archive intact. A sink error does not: after one,
    /// every later `add` and `finish` returns [`ZipError::SinkFailed`].
    pub async fn add(&mut self, name: impl Into<String>, content: &[u8]) -> Result<()> {
        self.ensure_usable()?;
        let name = name.into();
        validate_name(&name)?;
        let size = validate_size(content.len() as u64)?;
        let footprint = self.footprint.admit(name.len(), size)?;

        let crc32 = crc32(content);
        let header = LocalFileHeader {
            flags: self.flags(),
            crc32,
            size,
            file_name: name.as_bytes(),
        }
        .to_bytes();

        // Bounded by `admit`, which caps the local section at 32 bits.
        let offset = self.position as u32;
        self.write(&header).await?;
        self.write(content).await?;

        self.position += (header.len() + content.len()) as u64;
        self.footprint = footprint;
        self.placed.push(PlacedEntry::new(name, crc32, size, offset));
        Ok(())
    }

    /// Entries written so far, with their local header offsets.
    pub fn entries(&self) -> &[PlacedEntry] {
        &self.placed
    }

    pub fn len(&self) -> usize {
        self.placed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }

    pub fn bytes_written(&self) -> u64 {
        self.position
    }

    /// Write the central directory and EOCD, flush, and hand back the sink.
    pub async fn finish(mut self) -> Result<S> {
        self.ensure_usable()?;
        debug_assert_eq!(self.position, self.footprint.local_len);

        let trailer = encode_trailer(&self.placed, self.flags(), self.position as usize);
        self.write(&trailer).await?;
        self.sink.flush().await?;
        self.position += trailer.len() as u64;

        assert_eq!(
            self.position,
            self.footprint.archive_len(),
            "streamed archive length does not match its layout"
        );
        Ok(self.sink)
    }

    /// Returns `true` once a sink write has failed.
    pub fn has_failed(&self) -> bool {
        self.failed
    }

    fn ensure_usable(&self) -> Result<()> {
        if self.failed {
            return Err(ZipError::SinkFailed);
        }
        Ok(())
    }

    async fn write(&mut self, buf: &[u8]) -> Result<()> {
        if let Err(err) = self.sink.write_all(buf).await {
            self.failed = true;
            return Err(err.into());
        }
        Ok(())
    }

    fn flags(&self) -> u16 {
        general_purpose_flags(self.utf8_names)
    }
}
