//! Conversion of tables into HTML.

use super::config::HtmlOptions;
use super::writer::HtmlWriter;
use crate::hwp::Table;

/// Types that render as HTML.
///
/// # Examples
///
/// ```rust,no_run
/// use hwp_tables::hwp::Package;
/// use hwp_tables::render::{HtmlOptions, ToHtml};
///
/// let mut pkg = Package::open("report.hwp")?;
/// let tables = pkg.tables()?;
///
/// // Complete page
/// std::fs::write("report.html", tables.to_html())?;
///
/// // First table only, as a fragment
/// if let Some(first) = tables.first() {
///     println!("{}", first.to_html_with_options(&HtmlOptions::new().with_standalone(false)));
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait ToHtml {
    /// Render with default options.
    fn to_html(&self) -> String {
        self.to_html_with_options(&HtmlOptions::default())
    }

    /// Render with custom options.
    fn to_html_with_options(&self, options: &HtmlOptions) -> String;
}

impl ToHtml for Table {
    fn to_html_with_options(&self, options: &HtmlOptions) -> String {
        let mut writer = HtmlWriter::new(options.clone());
        writer.write_tables(std::iter::once(self));
        writer.finish()
    }
}

impl ToHtml for [Table] {
    fn to_html_with_options(&self, options: &HtmlOptions) -> String {
        let mut writer = HtmlWriter::new(options.clone());
        writer.write_tables(self);
        writer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hwp::table::fixture::table_stream;
    use crate::hwp::{RecordTree, extract_tables};

    fn sample() -> Vec<Table> {
        let stream = table_stream(
            0,
            2,
            2,
            &[(0, 0, 1, 1, "a<b"), (0, 1, 2, 1, "x\ny"), (1, 0, 1, 1, "&")],
        );
        extract_tables(&RecordTree::from_reader(stream.as_slice()).unwrap()).unwrap()
    }

    #[test]
    fn test_fragment_carries_spans_and_escaped_lines() {
        let html = sample()[0].to_html_with_options(&HtmlOptions::new().with_standalone(false));
        assert!(html.starts_with("<table>\n  <tbody>\n    <tr>\n"));
        assert!(html.contains("      <td rowspan=\"1\" colspan=\"1\">a&lt;b</td>\n"));
        assert!(html.contains("<td rowspan=\"2\" colspan=\"1\">x<br>y</td>"));
        assert!(html.contains("<td rowspan=\"1\" colspan=\"1\">&amp;</td>"));
        assert!(!html.contains("<html>"));
        assert_eq!(html.matches("<tr>").count(), 2);
    }

    #[test]
    fn test_standalone_document() {
        let tables = sample();
        let html = tables.to_html();
        assert!(html.starts_with("<!doctype html>\n<html>\n"));
        assert!(html.contains("border-collapse: collapse;"));
        assert!(html.contains("<body>\n  <table>\n"));
        assert!(html.ends_with("</body>\n</html>\n"));
    }

    #[test]
    fn test_no_tables() {
        let none: &[Table] = &[];
        assert_eq!(none.to_html_with_options(&HtmlOptions::new().with_standalone(false)), "");
        assert!(none.to_html().contains("<body>\n</body>"));
    }
}
