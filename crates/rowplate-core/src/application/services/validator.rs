//! Validator - simulates a run's substitution before any output.
//!
//! Renders what the first unit would look like and reports what a user
//! should know before committing to a run. Findings never block a run.

use tracing::{debug, instrument};

use crate::{
    application::services::ParamResolver,
    domain::{
        LineTemplate, MAX_ROWS, Replacements, RequestTemplate, RowTable, ValidationReport,
        placeholder, report::ValidationReportBuilder,
    },
};

pub struct Validator<'a> {
    resolver: &'a ParamResolver,
}

impl<'a> Validator<'a> {
    pub fn new(resolver: &'a ParamResolver) -> Self {
        Self { resolver }
    }

    /// Check header, footer and the first row of a line template.
    #[instrument(skip_all, fields(template = %template.name, rows = table.len()))]
    pub fn validate_lines(&self, template: &LineTemplate, table: &RowTable) -> ValidationReport {
        let resolved = self.resolver.resolve_all(&template.params);
        let mut report = table_checks(table).blank_values(resolved.any_blank);
        let mut values = resolved.values;

        for text in [template.header_text(), template.footer_text()].into_iter().flatten() {
            report = check(report, values.render(text));
        }

        if let Some(cells) = table.row(0) {
            bind_first_row(&mut values, cells);
            report = check(report, values.render(template.pattern.trim()));
        }

        finish(report)
    }

    /// Check uri, headers and body of the first request.
    ///
    /// In batch mode uri and headers only see named parameters, as they do
    /// in a real run.
    #[instrument(skip_all, fields(template = %template.name, rows = table.len()))]
    pub fn validate_requests(&self, template: &RequestTemplate, table: &RowTable) -> ValidationReport {
        let resolved = self.resolver.resolve_all(&template.params);
        let mut report = table_checks(table).blank_values(resolved.any_blank);

        let Some(cells) = table.row(0) else {
            return finish(report);
        };

        let named = resolved.values;
        let mut row_values = named.clone();
        bind_first_row(&mut row_values, cells);

        let outer = if template.is_batch_mode() { &named } else { &row_values };
        report = check(report, outer.render(&template.uri));
        if let Some(headers) = template.headers_text() {
            report = check(report, outer.render(headers));
        }
        report = check(report, row_values.render(template.body_text()));

        if template.is_batch_mode() {
            let batch = &template.batch;
            for text in [batch.start.as_deref(), batch.end.as_deref()].into_iter().flatten() {
                report = check(report, named.render(text));
            }
        }

        finish(report)
    }
}

fn table_checks(table: &RowTable) -> ValidationReportBuilder {
    let mut report = ValidationReport::builder().variable_row_length(table.has_variable_row_length());
    if table.exceeds_max_rows() {
        report = report.size_exceeded(table.len(), MAX_ROWS);
    }
    report
}

fn bind_first_row(values: &mut Replacements, cells: &[String]) {
    values.put_index(0);
    values.put_row(cells);
}

fn check(report: ValidationReportBuilder, rendered: String) -> ValidationReportBuilder {
    if placeholder::contains_placeholders(&rendered) {
        debug!(%rendered, "unresolved placeholders");
        report.unresolved(rendered)
    } else {
        report
    }
}

fn finish(report: ValidationReportBuilder) -> ValidationReport {
    let report = report.build();
    debug!(passed = report.passed(), warnings = report.warnings().len(), "validation finished");
    report
}
