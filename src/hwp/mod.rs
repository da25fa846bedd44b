//! HWP 5.x table extraction.
//!
//! The pipeline for one section is:
//!
//! 1. read `BodyText/Section{N}` from the container ([`Package`])
//! 2. inflate it when the FileHeader says so ([`DeflateStream`])
//! 3. rebuild the record tree from the level field of each record
//!    ([`RecordTree`])
//! 4. walk the tree in document order and assemble tables
//!    ([`extract_tables`]), decoding cell text with [`decode_para_text`]
//!
//! # Example
//!
//! ```rust,no_run
//! use hwp_tables::hwp::{ExtractOptions, Package, SectionErrorPolicy};
//!
//! let mut pkg = Package::open("report.hwp")?;
//! let options = ExtractOptions::new().with_section_errors(SectionErrorPolicy::Skip);
//! for table in pkg.tables_with_options(&options)? {
//!     for row in table.rows() {
//!         for cell in row {
//!             println!("[{},{}] {}", cell.row, cell.col, cell.text());
//!         }
//!     }
//! }
//! # Ok::<(), hwp_tables::Error>(())
//! ```

pub mod config;
pub mod consts;
pub mod header;
pub mod package;
pub mod record;
pub mod stream;
pub mod table;
pub mod text;

pub use config::{ExtractOptions, SectionErrorPolicy};
pub use consts::{ControlCharKind, HwpTag};
pub use header::{FileHeader, FileProperties, Version};
pub use package::{Package, StreamSource};
pub use record::{Record, RecordHeader, RecordId, RecordTree};
pub use stream::DeflateStream;
pub use table::{Cell, Table, TableBuilder, extract_tables};
pub use text::decode_para_text;
