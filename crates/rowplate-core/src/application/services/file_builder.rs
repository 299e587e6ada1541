//! File Builder - writes one rendered line per table row into a sink.

use std::io::Write;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{
    application::{
        ports::ByteSink,
        run::{CancellationToken, Outcome, Progress},
        services::{LineKind, LineWriter, ParamResolver, RecordIterator, Validator},
    },
    domain::{LineTemplate, RowTable, ValidationReport},
    error::{Context, RowplateResult},
};

/// Rows between two progress snapshots.
const PROGRESS_EVERY: usize = 250;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildSummary {
    pub lines: usize,
    pub rows: usize,
    pub bytes: u64,
}

#[derive(Debug, Clone)]
pub struct FileBuilder {
    resolver: ParamResolver,
}

impl FileBuilder {
    pub fn new(resolver: ParamResolver) -> Self {
        Self { resolver }
    }

    pub fn validate(&self, template: &LineTemplate, table: &RowTable) -> ValidationReport {
        Validator::new(&self.resolver).validate_lines(template, table)
    }

    /// Generate into `sink`, checking `cancel` between rows.
    ///
    /// Lines written before a cancellation or an I/O failure stay in the sink.
    #[instrument(skip_all, fields(template = %template.name, sink = %sink.describe()))]
    pub fn build(
        &self,
        template: &LineTemplate,
        table: &RowTable,
        sink: &dyn ByteSink,
        cancel: &CancellationToken,
        on_progress: impl FnMut(Progress),
    ) -> Outcome<BuildSummary> {
        if table.exceeds_max_rows() {
            warn!(rows = table.len(), max = table.effective_len(), "table truncated");
        }

        let out = match sink.open() {
            Ok(out) => out,
            Err(error) => return Outcome::Failed { error, partial: None },
        };

        let outcome = self.write(template, table, out, !sink.appends(), cancel, on_progress);
        if let Some(summary) = outcome.output() {
            info!(lines = summary.lines, rows = summary.rows, bytes = summary.bytes, "file built");
        }
        outcome
    }

    /// Generate into any writer, without cancellation.
    pub fn render_to<W: Write>(
        &self,
        template: &LineTemplate,
        table: &RowTable,
        out: W,
        fresh: bool,
    ) -> RowplateResult<BuildSummary> {
        match self.write(template, table, out, fresh, &CancellationToken::new(), |_| {}) {
            Outcome::Completed(summary) | Outcome::Cancelled(summary) => Ok(summary),
            Outcome::Failed { error, .. } => Err(error),
        }
    }

    fn write<W: Write>(
        &self,
        template: &LineTemplate,
        table: &RowTable,
        out: W,
        fresh: bool,
        cancel: &CancellationToken,
        mut on_progress: impl FnMut(Progress),
    ) -> Outcome<BuildSummary> {
        let mut writer = LineWriter::new(out, template.encoding, template.line_separator);
        let mut summary = BuildSummary::default();
        let total = table.effective_len();

        let result: RowplateResult<bool> = (|| {
            if fresh && template.bom {
                writer.write_bom().context("writing byte-order mark")?;
            }
            for unit in RecordIterator::new(template, table, &self.resolver) {
                if matches!(unit.kind, LineKind::Row(_)) {
                    if cancel.is_cancelled() {
                        return Ok(true);
                    }
                    summary.rows += 1;
                }
                writer.write_unit(&unit).context("writing output line")?;
                summary.lines += 1;

                if summary.rows % PROGRESS_EVERY == 0 || summary.rows == total {
                    on_progress(Progress::rows(summary.rows, total));
                }
            }
            Ok(false)
        })();

        summary.bytes = writer.bytes_written();
        let flushed = writer.finish().context("flushing output");

        match (result, flushed) {
            (Err(error), _) | (Ok(_), Err(error)) => Outcome::Failed {
                error,
                partial: Some(summary),
            },
            (Ok(true), Ok(_)) => {
                info!(rows = summary.rows, "file build cancelled");
                Outcome::Cancelled(summary)
            }
            (Ok(false), Ok(_)) => Outcome::Completed(summary),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::application::ports::FakeDataProvider;
    use crate::domain::{CellDelimiter, Encoding, LineSeparator, Param};

    struct Fixed;

    impl FakeDataProvider for Fixed {
        fn evaluate(&self, _: &str) -> RowplateResult<String> {
            Ok("red".into())
        }
    }

    fn builder() -> FileBuilder {
        FileBuilder::new(ParamResolver::new(Arc::new(Fixed)))
    }

    fn template() -> LineTemplate {
        LineTemplate::builder()
            .name("insert")
            .header("BEGIN;")
            .pattern("INSERT INTO ${table} VALUES ('${_csv0}');")
            .footer("COMMIT;")
            .param(Param::constant("table", "fruit").unwrap())
            .bom(true)
            .build()
            .unwrap()
    }

    #[test]
    fn writes_header_rows_footer_with_bom() {
        let table = RowTable::parse("apple\nbanana", CellDelimiter::Any);
        let mut out = Vec::new();
        let summary = builder().render_to(&template(), &table, &mut out, true).unwrap();

        assert_eq!(summary.rows, 2);
        assert_eq!(summary.lines, 4);
        assert_eq!(summary.bytes, out.len() as u64);
        assert_eq!(&out[..3], Encoding::Utf8.bom());
        assert_eq!(
            String::from_utf8(out[3..].to_vec()).unwrap(),
            "BEGIN;\nINSERT INTO fruit VALUES ('apple');\nINSERT INTO fruit VALUES ('banana');\nCOMMIT;\n"
        );
    }

    #[test]
    fn append_mode_skips_bom() {
        let table = RowTable::parse("apple", CellDelimiter::Any);
        let mut out = Vec::new();
        builder().render_to(&template(), &table, &mut out, false).unwrap();
        assert!(out.starts_with(b"BEGIN;"));
    }

    #[test]
    fn honours_line_separator() {
        let mut t = template();
        t.bom = false;
        t.line_separator = LineSeparator::Windows;
        let table = RowTable::parse("apple", CellDelimiter::Any);
        let mut out = Vec::new();
        builder().render_to(&t, &table, &mut out, true).unwrap();
        assert!(String::from_utf8(out).unwrap().ends_with("COMMIT;\r\n"));
    }

    #[test]
    fn cancelled_build_keeps_header_only() {
        let table = RowTable::parse("a\nb", CellDelimiter::Any);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut out = Vec::new();
        let outcome = builder().write(&template(), &table, &mut out, false, &cancel, |_| {});
        assert_eq!(
            outcome,
            Outcome::Cancelled(BuildSummary {
                lines: 1,
                rows: 0,
                bytes: 7
            })
        );
        assert_eq!(out, b"BEGIN;\n");
    }

    #[test]
    fn reports_final_progress() {
        let table = RowTable::parse("a\nb\nc", CellDelimiter::Any);
        let mut snapshots = Vec::new();
        let mut out = Vec::new();
        let outcome = builder().write(
            &template(),
            &table,
            &mut out,
            false,
            &CancellationToken::new(),
            |p| snapshots.push(p),
        );
        assert!(outcome.is_completed());
        assert_eq!(snapshots.last(), Some(&Progress::rows(3, 3)));
    }
}
