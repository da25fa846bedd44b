//! HTML rendering of extracted tables.
//!
//! Each row becomes a `<tr>` holding the cells that start in it. A cell is
//! written as `<td rowspan=".." colspan="..">` with its lines HTML-escaped
//! and joined by `<br>`, so the browser's table layout recreates merged
//! cells from the spans alone.
//!
//! - [`ToHtml`]: implemented for [`Table`](crate::hwp::Table) and slices of
//!   tables
//! - [`HtmlOptions`]: standalone document or fragment, indentation

pub mod config;
pub mod traits;
mod writer;

pub use config::HtmlOptions;
pub use traits::ToHtml;
pub use writer::escape_html;
