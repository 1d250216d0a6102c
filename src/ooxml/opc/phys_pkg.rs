//! Provides a general interface to a physical OPC package (ZIP file).
//!
//! This module handles the low-level reading and writing of OPC packages as ZIP
//! archives held in memory. Part names are addressed with [`PackURI`]s and
//! translated to ZIP member names here.

use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use std::io::{Cursor, Read, Write};
use zip::result::ZipError;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::{CompressionMethod, ZipArchive};

/// Largest part, by uncompressed size, that [`PhysPkgReader::blob_for`] will inflate.
pub const MAX_PART_SIZE: u64 = 256 * 1024 * 1024;

/// Physical package reader that provides access to parts in a ZIP-based OPC package.
///
/// Borrows the archive bytes; members are decompressed on demand.
pub struct PhysPkgReader<'data> {
    /// The underlying ZIP archive reader
    archive: ZipArchive<Cursor<&'data [u8]>>,
    /// Length of the archive bytes, bounding the read-ahead for stored members
    data_len: u64,
}

impl<'data> PhysPkgReader<'data> {
    /// Create a new PhysPkgReader from a byte slice.
    ///
    /// # Arguments
    /// * `data` - The ZIP archive data as a byte slice
    ///
    /// # Errors
    /// Returns [`OpcError::NotAZip`] if the bytes cannot be opened as a ZIP archive.
    pub fn new(data: &'data [u8]) -> Result<Self> {
        let archive =
            ZipArchive::new(Cursor::new(data)).map_err(|e| OpcError::NotAZip(e.to_string()))?;
        Ok(Self {
            archive,
            data_len: data.len() as u64,
        })
    }

    /// Get the binary content for a part by its PackURI.
    ///
    /// # Arguments
    /// * `pack_uri` - The PackURI of the part to read
    ///
    /// The size declared in the archive is only a hint: parts declaring more
    /// than [`MAX_PART_SIZE`] are refused before anything is allocated, and
    /// the read itself stops at the same limit.
    ///
    /// # Returns
    /// The decompressed content of the part, [`OpcError::PartNotFound`], or
    /// [`OpcError::PartTooLarge`]
    pub fn blob_for(&mut self, pack_uri: &PackURI) -> Result<Vec<u8>> {
        let mut file = match self.archive.by_name(pack_uri.membername()) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => {
                return Err(OpcError::PartNotFound(pack_uri.to_string()));
            },
            Err(e) => return Err(e.into()),
        };

        let declared = file.size();
        if declared > MAX_PART_SIZE {
            return Err(OpcError::PartTooLarge {
                part: pack_uri.to_string(),
                size: declared,
            });
        }

        let mut blob = Vec::with_capacity(declared.min(self.data_len) as usize);
        file.by_ref().take(MAX_PART_SIZE + 1).read_to_end(&mut blob)?;
        if blob.len() as u64 > MAX_PART_SIZE {
            return Err(OpcError::PartTooLarge {
                part: pack_uri.to_string(),
                size: blob.len() as u64,
            });
        }
        Ok(blob)
    }

    /// Get the relationships XML for a specific source URI.
    ///
    /// Relationships files are stored in _rels directories and have a .rels extension.
    /// Returns None if the source has no relationships file.
    pub fn rels_xml_for(&mut self, source_uri: &PackURI) -> Result<Option<Vec<u8>>> {
        match self.blob_for(&source_uri.rels_uri()) {
            Ok(blob) => Ok(Some(blob)),
            Err(OpcError::PartNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Check if a specific member exists in the package.
    pub fn contains(&self, pack_uri: &PackURI) -> bool {
        self.archive.index_for_name(pack_uri.membername()).is_some()
    }

    /// List all member names in the package (archive order, no leading slash).
    pub fn member_names(&self) -> Vec<String> {
        self.archive.file_names().map(String::from).collect()
    }

    /// Get the number of members in the package.
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    /// Check if the package is empty.
    pub fn is_empty(&self) -> bool {
        self.archive.is_empty()
    }
}

/// Physical package writer for creating OPC packages in memory.
pub struct PhysPkgWriter {
    /// The underlying ZIP archive writer
    archive: ZipWriter<Cursor<Vec<u8>>>,
}

impl PhysPkgWriter {
    /// Create a new package writer that writes to memory.
    pub fn new() -> Self {
        Self {
            archive: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// Write a part to the package with Deflate compression.
    ///
    /// # Arguments
    /// * `pack_uri` - The PackURI for the part
    /// * `blob` - The binary content to write
    pub fn write(&mut self, pack_uri: &PackURI, blob: &[u8]) -> Result<()> {
        self.write_with(pack_uri, blob, CompressionMethod::Deflated)
    }

    /// Write a part to the package without compression (stored).
    ///
    /// Used for media that is already compressed (PNG, JPEG).
    pub fn write_stored(&mut self, pack_uri: &PackURI, blob: &[u8]) -> Result<()> {
        self.write_with(pack_uri, blob, CompressionMethod::Stored)
    }

    fn write_with(
        &mut self,
        pack_uri: &PackURI,
        blob: &[u8],
        method: CompressionMethod,
    ) -> Result<()> {
        let options = SimpleFileOptions::default().compression_method(method);
        self.archive.start_file(pack_uri.membername(), options)?;
        self.archive.write_all(blob)?;
        Ok(())
    }

    /// Finish writing and return the package bytes.
    ///
    /// Consumes the writer and returns the complete ZIP archive.
    pub fn finish(self) -> Result<Vec<u8>> {
        let cursor = self.archive.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Default for PhysPkgWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Overwrite the uncompressed size recorded for `member` in both its local
/// header and its central directory record.
#[cfg(test)]
pub(crate) fn declare_uncompressed_size(zip: &mut [u8], member: &str, size: u32) {
    const LOCAL: [u8; 4] = [0x50, 0x4b, 0x03, 0x04];
    const CENTRAL: [u8; 4] = [0x50, 0x4b, 0x01, 0x02];

    let mut patched = 0;
    let mut i = 0;
    while i + 4 <= zip.len() {
        let sig = &zip[i..i + 4];
        // (size offset, name length offset, name offset)
        let (size_at, name_len_at, name_at) = if sig == LOCAL {
            (22, 26, 30)
        } else if sig == CENTRAL {
            (24, 28, 46)
        } else {
            i += 1;
            continue;
        };
        let name_len = u16::from_le_bytes([zip[i + name_len_at], zip[i + name_len_at + 1]]) as usize;
        if zip.get(i + name_at..i + name_at + name_len) == Some(member.as_bytes()) {
            zip[i + size_at..i + size_at + 4].copy_from_slice(&size.to_le_bytes());
            patched += 1;
        }
        i += 4;
    }
    assert_eq!(patched, 2, "{member} not found in both headers");
}
