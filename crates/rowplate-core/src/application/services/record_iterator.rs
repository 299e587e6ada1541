//! Line mode: one rendered text line per table row.
//!
//! ```text
//! header   (named params only, once)
//! row 0    (named + _index* + _csvN) + delimiter
//! ...
//! row n-1  (no delimiter)
//! footer   (named params only, once)
//! ```

use std::io::{self, Write};

use crate::{
    application::services::ParamResolver,
    domain::{Encoding, LineSeparator, LineTemplate, Replacements, RowTable},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Header,
    Row(usize),
    Footer,
}

/// One rendered output line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineUnit<'a> {
    pub kind: LineKind,
    pub text: String,
    /// Appended after `text`; set on every row but the last.
    pub delimiter: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Start,
    Rows,
    Footer,
    Done,
}

/// Iterator over the lines a [`LineTemplate`] produces for a [`RowTable`].
///
/// Owns its working [`Replacements`]; volatile parameters are refreshed
/// before every unit. An empty table yields nothing, not even a header.
pub struct RecordIterator<'a> {
    template: &'a LineTemplate,
    table: &'a RowTable,
    resolver: &'a ParamResolver,
    values: Replacements,
    pattern: &'a str,
    footer: Option<String>,
    row: usize,
    len: usize,
    stage: Stage,
}

impl<'a> RecordIterator<'a> {
    pub fn new(template: &'a LineTemplate, table: &'a RowTable, resolver: &'a ParamResolver) -> Self {
        Self {
            template,
            table,
            resolver,
            values: resolver.resolve_constant_params(&template.params).values,
            pattern: template.pattern.trim(),
            footer: None,
            row: 0,
            len: table.effective_len(),
            stage: Stage::Start,
        }
    }

    /// Rows rendered so far.
    pub fn processed_rows(&self) -> usize {
        self.row
    }

    pub fn total_rows(&self) -> usize {
        self.len
    }

    fn start(&mut self) -> Option<LineUnit<'a>> {
        self.resolver.refresh(&self.template.params, &mut self.values);
        self.footer = self.template.footer_text().map(|f| self.values.render(f));
        self.template.header_text().map(|h| LineUnit {
            kind: LineKind::Header,
            text: self.values.render(h),
            delimiter: None,
        })
    }

    fn next_row(&mut self) -> LineUnit<'a> {
        let row = self.row;
        self.resolver.refresh(&self.template.params, &mut self.values);
        self.values.put_index(row);
        if let Some(cells) = self.table.row(row) {
            self.values.put_row(cells);
        }
        self.row += 1;

        LineUnit {
            kind: LineKind::Row(row),
            text: self.values.render(self.pattern),
            delimiter: if self.row < self.len {
                self.template.delimiter_text()
            } else {
                None
            },
        }
    }
}

impl<'a> Iterator for RecordIterator<'a> {
    type Item = LineUnit<'a>;

    fn next(&mut self) -> Option<LineUnit<'a>> {
        loop {
            match self.stage {
                Stage::Start => {
                    if self.len == 0 {
                        self.stage = Stage::Done;
                        continue;
                    }
                    self.stage = Stage::Rows;
                    if let Some(header) = self.start() {
                        return Some(header);
                    }
                }
                Stage::Rows => {
                    if self.row < self.len {
                        return Some(self.next_row());
                    }
                    self.stage = Stage::Footer;
                }
                Stage::Footer => {
                    self.stage = Stage::Done;
                    if let Some(text) = self.footer.take() {
                        return Some(LineUnit {
                            kind: LineKind::Footer,
                            text,
                            delimiter: None,
                        });
                    }
                }
                Stage::Done => return None,
            }
        }
    }
}

// ============================================================================
// LineWriter
// ============================================================================

/// Serializes [`LineUnit`]s into bytes.
///
/// Each unit is trimmed, embedded line breaks are normalized to the
/// configured separator, then the delimiter and one separator follow.
pub struct LineWriter<W: Write> {
    out: W,
    encoding: Encoding,
    separator: &'static str,
    bytes: u64,
}

impl<W: Write> LineWriter<W> {
    pub fn new(out: W, encoding: Encoding, separator: LineSeparator) -> Self {
        Self {
            out,
            encoding,
            separator: separator.chars(),
            bytes: 0,
        }
    }

    pub fn write_bom(&mut self) -> io::Result<()> {
        let bom = self.encoding.bom();
        self.out.write_all(bom)?;
        self.bytes += bom.len() as u64;
        Ok(())
    }

    pub fn write_unit(&mut self, unit: &LineUnit<'_>) -> io::Result<()> {
        let mut line = normalize_line_breaks(unit.text.trim(), self.separator);
        if let Some(delimiter) = unit.delimiter {
            line.push_str(delimiter);
        }
        line.push_str(self.separator);

        let encoded = self.encoding.encode(&line);
        self.out.write_all(&encoded)?;
        self.bytes += encoded.len() as u64;
        Ok(())
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

fn normalize_line_breaks(text: &str, separator: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str(separator);
            }
            '\n' => out.push_str(separator),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::application::ports::FakeDataProvider;
    use crate::domain::{CellDelimiter, Param, ParamType};
    use crate::error::RowplateResult;

    struct Counter(std::sync::atomic::AtomicUsize);

    impl FakeDataProvider for Counter {
        fn evaluate(&self, _: &str) -> RowplateResult<String> {
            let n = self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(format!("v{n}"))
        }
    }

    fn resolver() -> ParamResolver {
        ParamResolver::new(Arc::new(Counter(Default::default())))
    }

    fn texts(template: &LineTemplate, csv: &str) -> Vec<String> {
        let table = RowTable::parse(csv, CellDelimiter::Any);
        let resolver = resolver();
        RecordIterator::new(template, &table, &resolver)
            .map(|u| format!("{}{}", u.text, u.delimiter.unwrap_or_default()))
            .collect()
    }

    #[test]
    fn renders_header_rows_and_footer_in_order() {
        let template = LineTemplate::builder()
            .name("json")
            .header("[")
            .pattern("  {\"n\": \"${_csv0}\", \"i\": ${_index1}}  ")
            .delimiter(",")
            .footer("]")
            .build()
            .unwrap();

        assert_eq!(
            texts(&template, "a\nb"),
            vec!["[", "{\"n\": \"a\", \"i\": 1},", "{\"n\": \"b\", \"i\": 2}", "]"]
        );
    }

    #[test]
    fn header_and_footer_never_see_row_keys() {
        let template = LineTemplate::builder()
            .name("t")
            .header("h ${_index0} ${_csv0} ${table}")
            .pattern("${_csv0}")
            .footer("f ${_index1} ${table}")
            .param(Param::constant("table", "fruit").unwrap())
            .build()
            .unwrap();

        let lines = texts(&template, "x\ny");
        assert_eq!(lines.first().map(String::as_str), Some("h ${_index0} ${_csv0} fruit"));
        assert_eq!(lines.last().map(String::as_str), Some("f ${_index1} fruit"));
    }

    #[test]
    fn volatile_params_refresh_per_row() {
        let template = LineTemplate::builder()
            .name("t")
            .pattern("${color}")
            .param(Param::new("color", ParamType::Datafaker).unwrap())
            .build()
            .unwrap();

        let lines = texts(&template, "1\n2\n3");
        assert_eq!(lines.len(), 3);
        assert_ne!(lines[0], lines[1]);
        assert_ne!(lines[1], lines[2]);
    }

    #[test]
    fn empty_table_yields_nothing() {
        let template = LineTemplate::builder()
            .name("t")
            .header("h")
            .pattern("x")
            .footer("f")
            .build()
            .unwrap();
        assert!(texts(&template, "").is_empty());
    }

    #[test]
    fn writer_trims_normalizes_and_encodes() {
        let mut writer = LineWriter::new(Vec::new(), Encoding::Utf8, LineSeparator::Windows);
        writer
            .write_unit(&LineUnit {
                kind: LineKind::Row(0),
                text: "  a\nb\r\nc  ".into(),
                delimiter: Some(";"),
            })
            .unwrap();
        let bytes = writer.finish().unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "a\r\nb\r\nc;\r\n");
    }

    #[test]
    fn writer_counts_bom_and_utf16_bytes() {
        let mut writer = LineWriter::new(Vec::new(), Encoding::Utf16Le, LineSeparator::Unix);
        writer.write_bom().unwrap();
        writer
            .write_unit(&LineUnit {
                kind: LineKind::Header,
                text: "A".into(),
                delimiter: None,
            })
            .unwrap();
        assert_eq!(writer.bytes_written(), 6);
        assert_eq!(writer.finish().unwrap(), vec![0xFF, 0xFE, 0x41, 0x00, 0x0A, 0x00]);
    }
}
