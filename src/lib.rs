//! hwp-tables - table extraction from HWP 5.x word processor documents
//!
//! HWP 5.x documents are OLE2 compound files. Their body text lives in one
//! stream per section as a flat sequence of tagged binary records, often
//! raw-deflate compressed. This crate rebuilds the record tree of each
//! section and recovers the tables in it, including merged cells.
//!
//! # Features
//!
//! - **OLE2 reader**: named stream access into compound files (feature `ole`)
//! - **Lazy inflate**: section streams are decompressed on demand
//! - **Record trees**: level-based nesting rebuilt into an arena
//! - **Control-aware text**: UTF-16 paragraph text with inline controls removed
//! - **Tables**: row buckets of cells carrying row and column spans
//! - **HTML output**: tables rendered as a page or as fragments
//!
//! # Example - Extracting tables
//!
//! ```no_run
//! use hwp_tables::hwp::Package;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut pkg = Package::open("report.hwp")?;
//! println!("HWP {}", pkg.file_header().version);
//!
//! for table in pkg.tables()? {
//!     println!("{} rows, {} columns", table.row_count(), table.column_count());
//!     for cell in table.cells() {
//!         println!("  ({}, {}) {}", cell.row, cell.col, cell.text());
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Rendering HTML
//!
//! ```no_run
//! use hwp_tables::hwp::Package;
//! use hwp_tables::render::ToHtml;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let tables = Package::open("report.hwp")?.tables()?;
//! std::fs::write("report.html", tables.to_html())?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Low-level access
//!
//! ```no_run
//! use std::fs::File;
//! use hwp_tables::hwp::{DeflateStream, HwpTag, RecordTree};
//! use hwp_tables::ole::OleFile;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut ole = OleFile::open(File::open("report.hwp")?)?;
//! let section = ole.open_stream(&["BodyText", "Section0"])?;
//!
//! let tree = RecordTree::from_reader(DeflateStream::new(section.as_slice(), -15)?)?;
//! for id in tree.descendants(tree.root()) {
//!     let record = tree.get(id);
//!     if record.tag() == HwpTag::Table {
//!         println!("table record, {} bytes", record.payload.len());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

/// Shared error type and binary helpers
pub mod common;

/// HWP 5.x format: records, text, tables and the document package
pub mod hwp;

/// OLE2 (Compound File Binary) container reader
#[cfg(feature = "ole")]
pub mod ole;

/// HTML rendering of tables
pub mod render;

pub use common::{Error, Result};
pub use hwp::{Cell, Package, Table};
