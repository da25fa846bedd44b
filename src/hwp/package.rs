//! HWP document package.
//!
//! A [`Package`] owns the container a document is stored in, parses its
//! FileHeader once and then turns `BodyText/Section{N}` streams into record
//! trees and tables on request.

use super::config::{ExtractOptions, SectionErrorPolicy};
use super::consts::{BODY_TEXT_STORAGE, FILE_HEADER_STREAM, SECTION_WINDOW_BITS, section_stream_name};
use super::header::FileHeader;
use super::record::RecordTree;
use super::stream::DeflateStream;
use super::table::{Table, extract_tables};
use crate::common::{Error, Result};
use tracing::{debug, warn};

#[cfg(feature = "ole")]
use crate::ole::OleFile;
#[cfg(feature = "ole")]
use std::{
    fs::File,
    io::{Read, Seek},
    path::Path,
};

/// Named stream access into a document container.
///
/// Paths are storage names followed by a stream name, e.g.
/// `["BodyText", "Section0"]`.
pub trait StreamSource {
    /// Whether a stream or storage exists at `path`.
    fn exists(&self, path: &[&str]) -> bool;

    /// Read the whole stream at `path`.
    fn read_stream(&mut self, path: &[&str]) -> Result<Vec<u8>>;
}

#[cfg(feature = "ole")]
impl<R: Read + Seek> StreamSource for OleFile<R> {
    fn exists(&self, path: &[&str]) -> bool {
        OleFile::exists(self, path)
    }

    fn read_stream(&mut self, path: &[&str]) -> Result<Vec<u8>> {
        Ok(self.open_stream(path)?)
    }
}

/// An opened HWP 5.x document.
pub struct Package<S: StreamSource> {
    source: S,
    header: FileHeader,
}

#[cfg(feature = "ole")]
impl Package<OleFile<File>> {
    /// Open a document from a file path.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use hwp_tables::hwp::Package;
    ///
    /// let mut pkg = Package::open("report.hwp")?;
    /// for table in pkg.tables()? {
    ///     println!("{} x {}", table.row_count(), table.column_count());
    /// }
    /// # Ok::<(), hwp_tables::Error>(())
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Package::from_reader(file)
    }
}

#[cfg(feature = "ole")]
impl<R: Read + Seek> Package<OleFile<R>> {
    /// Open a document from any seekable reader holding a compound file.
    pub fn from_reader(reader: R) -> Result<Self> {
        let ole = OleFile::open(reader)?;
        Package::from_source(ole)
    }
}

impl<S: StreamSource> Package<S> {
    /// Wrap an already opened container.
    ///
    /// Fails with [`Error::InvalidFormat`] when the FileHeader stream is
    /// missing or malformed, and with [`Error::Unsupported`] for password
    /// protected, DRM and distribution documents.
    pub fn from_source(mut source: S) -> Result<Self> {
        if !source.exists(&[FILE_HEADER_STREAM]) {
            return Err(Error::InvalidFormat(
                "Not a valid HWP document: FileHeader stream not found".to_string(),
            ));
        }
        let header = FileHeader::parse(&source.read_stream(&[FILE_HEADER_STREAM])?)?;
        if header.is_encrypted() {
            return Err(Error::Unsupported(format!(
                "encrypted or distribution document (properties {:#x})",
                header.properties.bits()
            )));
        }
        debug!(
            version = %header.version,
            compressed = header.is_compressed(),
            "opened document"
        );
        Ok(Self { source, header })
    }

    /// The parsed FileHeader.
    pub fn file_header(&self) -> &FileHeader {
        &self.header
    }

    /// Whether section streams are raw-deflate compressed.
    pub fn is_compressed(&self) -> bool {
        self.header.is_compressed()
    }

    pub fn has_section(&self, index: usize) -> bool {
        let name = section_stream_name(index);
        self.source.exists(&[BODY_TEXT_STORAGE, name.as_str()])
    }

    /// Number of consecutive sections starting at `Section0`.
    pub fn section_count(&self) -> usize {
        (0..).take_while(|&index| self.has_section(index)).count()
    }

    /// Decode the record tree of section `index`.
    pub fn record_tree(&mut self, index: usize) -> Result<RecordTree> {
        self.read_record_tree(index, ExtractOptions::default().chunk_size)
    }

    fn read_record_tree(&mut self, index: usize, chunk_size: usize) -> Result<RecordTree> {
        let name = section_stream_name(index);
        let path = [BODY_TEXT_STORAGE, name.as_str()];
        if !self.source.exists(&path) {
            return Err(Error::InvalidArgument(format!(
                "{name} does not exist"
            )));
        }

        let data = self.source.read_stream(&path)?;
        if self.is_compressed() {
            let stream = DeflateStream::with_chunk_size(data.as_slice(), SECTION_WINDOW_BITS, chunk_size)?;
            RecordTree::from_reader(stream)
        } else {
            RecordTree::from_reader(data.as_slice())
        }
    }

    /// Tables of section `index`, in document order.
    pub fn section_tables(&mut self, index: usize) -> Result<Vec<Table>> {
        self.extract_section(index, ExtractOptions::default().chunk_size)
    }

    fn extract_section(&mut self, index: usize, chunk_size: usize) -> Result<Vec<Table>> {
        let tree = self.read_record_tree(index, chunk_size)?;
        let tables = extract_tables(&tree)?;
        debug!(
            section = index,
            compressed = self.is_compressed(),
            records = tree.len() - 1,
            tables = tables.len(),
            "section decoded"
        );
        Ok(tables)
    }

    /// Tables of every section with default options.
    pub fn tables(&mut self) -> Result<Vec<Table>> {
        self.tables_with_options(&ExtractOptions::default())
    }

    /// Tables of every section, concatenated in section order.
    ///
    /// Sections are enumerated from `Section0` up to the first missing
    /// index. With [`SectionErrorPolicy::Skip`] a failing section is logged
    /// and contributes no tables.
    pub fn tables_with_options(&mut self, options: &ExtractOptions) -> Result<Vec<Table>> {
        let mut tables = Vec::new();
        for index in 0.. {
            if !self.has_section(index) {
                break;
            }
            match self.extract_section(index, options.chunk_size) {
                Ok(section) => tables.extend(section),
                Err(err) => match options.section_errors {
                    SectionErrorPolicy::Abort => return Err(err),
                    SectionErrorPolicy::Skip => {
                        warn!(section = index, error = %err, "skipping section");
                    },
                },
            }
        }
        Ok(tables)
    }

    /// Give back the underlying container.
    pub fn into_source(self) -> S {
        self.source
    }
}
