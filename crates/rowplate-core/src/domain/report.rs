//! Pre-flight validation findings.

use serde::Serialize;

/// Row count above the processing cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SizeThreshold {
    pub actual: usize,
    pub max: usize,
}

/// Result of simulating a run before producing output.
///
/// Every finding is advisory: a run proceeds regardless.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    size_exceeded: Option<SizeThreshold>,
    blank_values: bool,
    variable_row_length: bool,
    unresolved: Vec<String>,
}

impl ValidationReport {
    pub fn builder() -> ValidationReportBuilder {
        ValidationReportBuilder::default()
    }

    /// True when no check fired.
    pub fn passed(&self) -> bool {
        self.size_exceeded.is_none()
            && !self.blank_values
            && !self.variable_row_length
            && self.unresolved.is_empty()
    }

    pub fn size_exceeded(&self) -> Option<SizeThreshold> {
        self.size_exceeded
    }

    pub fn contains_blank_values(&self) -> bool {
        self.blank_values
    }

    pub fn has_variable_row_length(&self) -> bool {
        self.variable_row_length
    }

    pub fn contains_placeholders(&self) -> bool {
        !self.unresolved.is_empty()
    }

    /// Rendered texts that still hold placeholders.
    pub fn unresolved_lines(&self) -> &[String] {
        &self.unresolved
    }

    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if let Some(SizeThreshold { actual, max }) = self.size_exceeded {
            warnings.push(format!(
                "The table has {actual} rows; only the first {max} will be processed"
            ));
        }
        if self.blank_values {
            warnings.push("Some parameters have blank values".to_string());
        }
        if self.variable_row_length {
            warnings.push("Rows have different numbers of cells".to_string());
        }
        for line in &self.unresolved {
            warnings.push(format!("Unresolved placeholders in: {line}"));
        }
        warnings
    }
}

#[derive(Debug, Default)]
pub struct ValidationReportBuilder {
    report: ValidationReport,
}

impl ValidationReportBuilder {
    pub fn size_exceeded(mut self, actual: usize, max: usize) -> Self {
        self.report.size_exceeded = Some(SizeThreshold { actual, max });
        self
    }

    pub fn blank_values(mut self, blank: bool) -> Self {
        self.report.blank_values = blank;
        self
    }

    pub fn variable_row_length(mut self, variable: bool) -> Self {
        self.report.variable_row_length = variable;
        self
    }

    pub fn unresolved(mut self, line: impl Into<String>) -> Self {
        self.report.unresolved.push(line.into());
        self
    }

    pub fn build(self) -> ValidationReport {
        self.report
    }
}
