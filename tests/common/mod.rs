//! Minimal stored-ZIP reader used to check generated archives.
//!
//! Reads the archive the way unzip tools do: find the EOCD at the end,
//! follow it to the central directory, then follow each central directory
//! offset to its local header and data.

#![allow(dead_code)]

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

pub const EOCD_SIZE: usize = 22;

pub struct Eocd {
    pub disk_number: u16,
    pub disk_with_cd: u16,
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment_len: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CentralEntry {
    pub version_made_by: u16,
    pub version_needed: u16,
    pub flags: u16,
    pub method: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub lfh_offset: u32,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFile {
    pub name: String,
    pub content: Vec<u8>,
    pub stored_crc32: u32,
}

pub fn read_eocd(archive: &[u8]) -> Eocd {
    assert!(archive.len() >= EOCD_SIZE, "archive shorter than an EOCD");
    let tail = &archive[archive.len() - EOCD_SIZE..];
    assert_eq!(&tail[..4], b"PK\x05\x06", "missing EOCD signature");

    let mut cursor = Cursor::new(&tail[4..]);
    Eocd {
        disk_number: cursor.read_u16::<LittleEndian>().unwrap(),
        disk_with_cd: cursor.read_u16::<LittleEndian>().unwrap(),
        disk_entries: cursor.read_u16::<LittleEndian>().unwrap(),
        total_entries: cursor.read_u16::<LittleEndian>().unwrap(),
        cd_size: cursor.read_u32::<LittleEndian>().unwrap(),
        cd_offset: cursor.read_u32::<LittleEndian>().unwrap(),
        comment_len: cursor.read_u16::<LittleEndian>().unwrap(),
    }
}

pub fn read_central_directory(archive: &[u8]) -> Vec<CentralEntry> {
    let eocd = read_eocd(archive);
    let start = eocd.cd_offset as usize;
    let end = start + eocd.cd_size as usize;
    assert_eq!(end, archive.len() - EOCD_SIZE, "central directory does not end at the EOCD");

    let mut cursor = Cursor::new(&archive[start..end]);
    let mut entries = Vec::new();
    for _ in 0..eocd.total_entries {
        let mut sig = [0u8; 4];
        cursor.read_exact(&mut sig).unwrap();
        assert_eq!(&sig, b"PK\x01\x02", "bad central directory signature");

        let version_made_by = cursor.read_u16::<LittleEndian>().unwrap();
        let version_needed = cursor.read_u16::<LittleEndian>().unwrap();
        let flags = cursor.read_u16::<LittleEndian>().unwrap();
        let method = cursor.read_u16::<LittleEndian>().unwrap();
        let _mod_time = cursor.read_u16::<LittleEndian>().unwrap();
        let _mod_date = cursor.read_u16::<LittleEndian>().unwrap();
        let crc32 = cursor.read_u32::<LittleEndian>().unwrap();
        let compressed_size = cursor.read_u32::<LittleEndian>().unwrap();
        let uncompressed_size = cursor.read_u32::<LittleEndian>().unwrap();
        let name_len = cursor.read_u16::<LittleEndian>().unwrap();
        let extra_len = cursor.read_u16::<LittleEndian>().unwrap();
        let comment_len = cursor.read_u16::<LittleEndian>().unwrap();
        let _disk_start = cursor.read_u16::<LittleEndian>().unwrap();
        let _internal_attrs = cursor.read_u16::<LittleEndian>().unwrap();
        let _external_attrs = cursor.read_u32::<LittleEndian>().unwrap();
        let lfh_offset = cursor.read_u32::<LittleEndian>().unwrap();
        assert_eq!((extra_len, comment_len), (0, 0));

        let mut name = vec![0u8; name_len as usize];
        cursor.read_exact(&mut name).unwrap();

        entries.push(CentralEntry {
            version_made_by,
            version_needed,
            flags,
            method,
            crc32,
            compressed_size,
            uncompressed_size,
            lfh_offset,
            file_name: String::from_utf8(name).unwrap(),
        });
    }

    assert_eq!(cursor.position() as usize, end - start, "trailing central directory bytes");
    entries
}

/// Decode every file, checking each local header against its central entry.
pub fn decode(archive: &[u8]) -> Vec<DecodedFile> {
    read_central_directory(archive)
        .into_iter()
        .map(|entry| {
            let offset = entry.lfh_offset as usize;
            let mut cursor = Cursor::new(&archive[offset..]);

            let mut sig = [0u8; 4];
            cursor.read_exact(&mut sig).unwrap();
            assert_eq!(&sig, b"PK\x03\x04", "offset of {} is not a local header", entry.file_name);

            assert_eq!(cursor.read_u16::<LittleEndian>().unwrap(), entry.version_needed);
            assert_eq!(cursor.read_u16::<LittleEndian>().unwrap(), entry.flags);
            assert_eq!(cursor.read_u16::<LittleEndian>().unwrap(), entry.method);
            cursor.set_position(cursor.position() + 4);
            assert_eq!(cursor.read_u32::<LittleEndian>().unwrap(), entry.crc32);
            assert_eq!(cursor.read_u32::<LittleEndian>().unwrap(), entry.compressed_size);
            assert_eq!(cursor.read_u32::<LittleEndian>().unwrap(), entry.uncompressed_size);
            let name_len = cursor.read_u16::<LittleEndian>().unwrap() as usize;
            let extra_len = cursor.read_u16::<LittleEndian>().unwrap() as usize;

            let mut name = vec![0u8; name_len];
            cursor.read_exact(&mut name).unwrap();
            assert_eq!(name, entry.file_name.as_bytes());

            let data_start = offset + 30 + name_len + extra_len;
            let content = archive[data_start..data_start + entry.compressed_size as usize].to_vec();

            DecodedFile {
                name: entry.file_name,
                content,
                stored_crc32: entry.crc32,
            }
        })
        .collect()
}

pub fn reference_crc32(data: &[u8]) -> u32 {
    let mut crc = flate2::Crc::new();
    crc.update(data);
    crc.sum()
}
