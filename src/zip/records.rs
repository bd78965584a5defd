//! Fixed-layout ZIP records.
//!
//! Each record is declared once as an ordered list of typed [`Field`]s.
//! The encoded length and the encoded bytes are both derived from that list,
//! so a record cannot be written with a different size than it reports.
//!
//! All integers are little-endian. Only the subset of the PKZIP format needed
//! for single-disk, stored (uncompressed) archives is described here:
//!
//! | Record | Signature | Fixed size |
//! |---|---|---|
//! | [`LocalFileHeader`] | `0x04034b50` | 30 bytes + name |
//! | [`CentralDirectoryHeader`] | `0x02014b50` | 46 bytes + name |
//! | [`EndOfCentralDirectory`] | `0x06054b50` | 22 bytes |

use byteorder::{ByteOrder, LittleEndian};

/// Version needed to extract (and version made by): 2.0.
pub const VERSION: u16 = 20;

/// Compression method 0, stored.
pub const METHOD_STORED: u16 = 0;

/// General purpose flag bit 11: file name is UTF-8.
pub const FLAG_UTF8: u16 = 0x0800;

/// A single typed field of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field<'a> {
    U16(u16),
    U32(u32),
    Bytes(&'a [u8]),
}

impl Field<'_> {
    /// Encoded width of the field in bytes.
    pub fn width(&self) -> usize {
        match self {
            Field::U16(_) => 2,
            Field::U32(_) => 4,
            Field::Bytes(bytes) => bytes.len(),
        }
    }

    /// Encode the field at the start of `out`, returning the bytes used.
    fn encode(&self, out: &mut [u8]) -> usize {
        match *self {
            Field::U16(value) => LittleEndian::write_u16(out, value),
            Field::U32(value) => LittleEndian::write_u32(out, value),
            Field::Bytes(bytes) => out[..bytes.len()].copy_from_slice(bytes),
        }
        self.width()
    }
}

/// A binary record described by its field list.
pub trait Record {
    /// Leading 4-byte magic number.
    const SIGNATURE: u32;

    /// Size of the record without its variable-length tail.
    const FIXED_SIZE: usize;

    /// Ordered fields of the record, signature first.
    fn fields(&self) -> Vec<Field<'_>>;

    /// Total encoded length in bytes.
    fn encoded_len(&self) -> usize {
        self.fields().iter().map(Field::width).sum()
    }

    /// Encode the record into a freshly allocated buffer.
    fn to_bytes(&self) -> Vec<u8> {
        let fields = self.fields();
        let len = fields.iter().map(Field::width).sum();
        let mut buf = vec![0u8; len];
        let mut pos = 0;
        for field in &fields {
            pos += field.encode(&mut buf[pos..]);
        }
        debug_assert_eq!(pos, len);
        buf
    }
}

/// Local File Header, written immediately before each entry's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalFileHeader<'a> {
    pub flags: u16,
    pub crc32: u32,
    pub size: u32,
    pub file_name: &'a [u8],
}

impl Record for LocalFileHeader<'_> {
    const SIGNATURE: u32 = 0x04034b50;
    const FIXED_SIZE: usize = 30;

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::U32(Self::SIGNATURE),
            Field::U16(VERSION), // version needed to extract
            Field::U16(self.flags), // general purpose bit flag
            Field::U16(METHOD_STORED), // compression method
            Field::U16(0), // last mod file time
            Field::U16(0), // last mod file date
            Field::U32(self.crc32), // crc-32
            Field::U32(self.size), // compressed size
            Field::U32(self.size), // uncompressed size
            Field::U16(self.file_name.len() as u16), // file name length
            Field::U16(0), // extra field length
            Field::Bytes(self.file_name),
        ]
    }
}

/// Central Directory File Header, one per entry after all local data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CentralDirectoryHeader<'a> {
    pub flags: u16,
    pub crc32: u32,
    pub size: u32,
    pub file_name: &'a [u8],
    /// Offset of the matching [`LocalFileHeader`] from the start of the archive.
    pub local_header_offset: u32,
}

impl Record for CentralDirectoryHeader<'_> {
    const SIGNATURE: u32 = 0x02014b50;
    const FIXED_SIZE: usize = 46;

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::U32(Self::SIGNATURE),
            Field::U16(VERSION), // version made by
            Field::U16(VERSION), // version needed to extract
            Field::U16(self.flags), // general purpose bit flag
            Field::U16(METHOD_STORED), // compression method
            Field::U16(0), // last mod file time
            Field::U16(0), // last mod file date
            Field::U32(self.crc32), // crc-32
            Field::U32(self.size), // compressed size
            Field::U32(self.size), // uncompressed size
            Field::U16(self.file_name.len() as u16), // file name length
            Field::U16(0), // extra field length
            Field::U16(0), // file comment length
            Field::U16(0), // disk number start
            Field::U16(0), // internal file attributes
            Field::U32(0), // external file attributes
            Field::U32(self.local_header_offset), // relative offset of local header
            Field::Bytes(self.file_name),
        ]
    }
}

/// End of Central Directory record, always the last 22 bytes of the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndOfCentralDirectory {
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
}

impl Record for EndOfCentralDirectory {
    const SIGNATURE: u32 = 0x06054b50;
    const FIXED_SIZE: usize = 22;

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::U32(Self::SIGNATURE),
            Field::U16(0), // number of this disk
            Field::U16(0), // disk with start of central directory
            Field::U16(self.total_entries), // entries on this disk
            Field::U16(self.total_entries), // total entries
            Field::U32(self.cd_size), // size of central directory
            Field::U32(self.cd_offset), // offset of start of central directory
            Field::U16(0), // comment length
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_sizes_match_field_lists() {
        let lfh = LocalFileHeader {
            flags: 0,
            crc32: 0,
            size: 0,
            file_name: b"",
        };
        assert_eq!(lfh.encoded_len(), LocalFileHeader::FIXED_SIZE);

        let cdh = CentralDirectoryHeader {
            flags: 0,
            crc32: 0,
            size: 0,
            file_name: b"",
            local_header_offset: 0,
        };
        assert_eq!(cdh.encoded_len(), CentralDirectoryHeader::FIXED_SIZE);

        let eocd = EndOfCentralDirectory {
            total_entries: 0,
            cd_size: 0,
            cd_offset: 0,
        };
        assert_eq!(eocd.encoded_len(), EndOfCentralDirectory::FIXED_SIZE);
    }

    #[test]
    fn local_file_header_layout() {
        let lfh = LocalFileHeader {
            flags: 0,
            crc32: 0x3610A686,
            size: 5,
            file_name: b"a.txt",
        };
        let bytes = lfh.to_bytes();

        assert_eq!(bytes.len(), 35);
        assert_eq!(&bytes[0..4], b"PK\x03\x04");
        assert_eq!(LittleEndian::read_u16(&bytes[4..]), 20);
        assert_eq!(LittleEndian::read_u16(&bytes[6..]), 0);
        assert_eq!(LittleEndian::read_u16(&bytes[8..]), 0);
        assert_eq!(LittleEndian::read_u32(&bytes[10..]), 0);
        assert_eq!(LittleEndian::read_u32(&bytes[14..]), 0x3610A686);
        assert_eq!(LittleEndian::read_u32(&bytes[18..]), 5);
        assert_eq!(LittleEndian::read_u32(&bytes[22..]), 5);
        assert_eq!(LittleEndian::read_u16(&bytes[26..]), 5);
        assert_eq!(LittleEndian::read_u16(&bytes[28..]), 0);
        assert_eq!(&bytes[30..], b"a.txt");
    }

    #[test]
    fn central_directory_header_layout() {
        let cdh = CentralDirectoryHeader {
            flags: FLAG_UTF8,
            crc32: 0xCBF43926,
            size: 9,
            file_name: b"dir/b.bin",
            local_header_offset: 0x0102_0304,
        };
        let bytes = cdh.to_bytes();

        assert_eq!(bytes.len(), 46 + 9);
        assert_eq!(&bytes[0..4], b"PK\x01\x02");
        assert_eq!(LittleEndian::read_u16(&bytes[4..]), 20);
        assert_eq!(LittleEndian::read_u16(&bytes[6..]), 20);
        assert_eq!(LittleEndian::read_u16(&bytes[8..]), FLAG_UTF8);
        assert_eq!(LittleEndian::read_u16(&bytes[10..]), 0);
        assert_eq!(LittleEndian::read_u32(&bytes[16..]), 0xCBF43926);
        assert_eq!(LittleEndian::read_u32(&bytes[20..]), 9);
        assert_eq!(LittleEndian::read_u32(&bytes[24..]), 9);
        assert_eq!(LittleEndian::read_u16(&bytes[28..]), 9);
        assert_eq!(&bytes[30..42], &[0u8; 12]);
        assert_eq!(LittleEndian::read_u32(&bytes[42..]), 0x0102_0304);
        assert_eq!(&bytes[46..], b"dir/b.bin");
    }

    #[test]
    fn end_of_central_directory_layout() {
        let eocd = EndOfCentralDirectory {
            total_entries: 2,
            cd_size: 101,
            cd_offset: 70,
        };
        let bytes = eocd.to_bytes();

        assert_eq!(
            bytes,
            [
                0x50, 0x4b, 0x05, 0x06, // signature
                0, 0, 0, 0, // disk numbers
                2, 0, 2, 0, // entry counts
                101, 0, 0, 0, // central directory size
                70, 0, 0, 0, // central directory offset
                0, 0, // comment length
            ]
        );
    }
}
