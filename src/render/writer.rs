//! Low-level HTML writer.

use super::config::HtmlOptions;
use crate::hwp::Table;

/// Stylesheet of the standalone document.
const STYLESHEET: &[&str] = &[
    "body {",
    "  padding: 20px;",
    "}",
    "table {",
    "  width: 100%;",
    "  max-width: 1000px;",
    "  border-collapse: collapse;",
    "  margin: 0 auto;",
    "  margin-bottom: 30px;",
    "}",
    "td {",
    "  font-size: 13px;",
    "  border: 1px solid #aaa;",
    "  padding: 5px;",
    "  text-align: center;",
    "}",
];

/// Escape text for use in element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Buffered HTML output for tables.
pub(crate) struct HtmlWriter {
    buffer: String,
    options: HtmlOptions,
}

impl HtmlWriter {
    pub fn new(options: HtmlOptions) -> Self {
        Self {
            buffer: String::with_capacity(4096),
            options,
        }
    }

    fn line(&mut self, depth: usize, text: &str) {
        let width = depth * self.options.indent;
        self.buffer.extend(std::iter::repeat_n(' ', width));
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    /// Write `tables`, wrapped in a document when the options ask for one.
    pub fn write_tables<'a, I>(&mut self, tables: I)
    where
        I: IntoIterator<Item = &'a Table>,
    {
        if !self.options.standalone {
            for table in tables {
                self.write_table(table, 0);
            }
            return;
        }

        self.line(0, "<!doctype html>");
        self.line(0, "<html>");
        self.line(0, "<head>");
        self.line(1, "<meta charset=\"utf-8\">");
        self.line(1, "<style type=\"text/css\">");
        for rule in STYLESHEET {
            self.line(2, rule);
        }
        self.line(1, "</style>");
        self.line(0, "</head>");
        self.line(0, "<body>");
        for table in tables {
            self.write_table(table, 1);
        }
        self.line(0, "</body>");
        self.line(0, "</html>");
    }

    /// Write one table with its outer tag at `depth`.
    pub fn write_table(&mut self, table: &Table, depth: usize) {
        self.line(depth, "<table>");
        self.line(depth + 1, "<tbody>");
        for row in table.rows() {
            self.line(depth + 2, "<tr>");
            for cell in row {
                let content = cell
                    .lines
                    .iter()
                    .map(|line| escape_html(line))
                    .collect::<Vec<_>>()
                    .join("<br>");
                let td = format!(
                    "<td rowspan=\"{}\" colspan=\"{}\">{}</td>",
                    cell.row_span, cell.col_span, content
                );
                self.line(depth + 3, &td);
            }
            self.line(depth + 2, "</tr>");
        }
        self.line(depth + 1, "</tbody>");
        self.line(depth, "</table>");
    }

    pub fn finish(self) -> String {
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
        assert_eq!(escape_html("표 1"), "표 1");
    }

    #[test]
    fn test_empty_table_keeps_rows() {
        let mut writer = HtmlWriter::new(HtmlOptions::new().with_standalone(false).with_indent(1));
        writer.write_table(&Table::new(2, 3), 0);
        assert_eq!(
            writer.finish(),
            "<table>\n <tbody>\n  <tr>\n  </tr>\n  <tr>\n  </tr>\n </tbody>\n</table>\n"
        );
    }
}
