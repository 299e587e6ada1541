//! `rowplate validate`: simulate a run and report findings.

use serde::Serialize;
use tracing::instrument;

use rowplate_adapters::{ReqwestTransport, TransportOptions};
use rowplate_core::application::{FileBuilder, HttpSender};
use rowplate_core::domain::ValidationReport;

use crate::{
    cli::{ValidateArgs, global::OutputFormat},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

use super::{AnyTemplate, apply_params, find_any, read_table, resolver, template_service};

#[derive(Serialize)]
struct Findings<'a> {
    template: &'a str,
    mode: &'static str,
    rows: usize,
    passed: bool,
    warnings: Vec<String>,
}

#[instrument(skip_all, fields(template = %args.run.template))]
pub fn execute(args: ValidateArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let service = template_service(&args.run.templates);
    let table = read_table(&args.run, &config)?;

    let (mode, report): (&'static str, ValidationReport) =
        match find_any(&service, &args.run.template)? {
            AnyTemplate::Line(mut template) => {
                apply_params(&mut template.params, &args.run.params)?;
                ("line", FileBuilder::new(resolver()).validate(&template, &table))
            }
            AnyTemplate::Request(mut template) => {
                apply_params(&mut template.params, &args.run.params)?;
                // Validation never sends; the transport stays unused.
                let transport = ReqwestTransport::new(&TransportOptions::default())?;
                let sender = HttpSender::new(resolver(), std::sync::Arc::new(transport));
                ("request", sender.validate(&template, &table))
            }
        };

    let warnings = report.warnings();
    if output.format() == OutputFormat::Json {
        output.json(&Findings {
            template: &args.run.template,
            mode,
            rows: table.len(),
            passed: report.passed(),
            warnings: warnings.clone(),
        })?;
    } else if warnings.is_empty() {
        output.success(&format!(
            "{mode} template '{}' passed validation over {} rows",
            args.run.template,
            table.len()
        ))?;
    } else {
        for warning in &warnings {
            output.warning(warning)?;
        }
    }

    if args.run.strict && !report.passed() {
        return Err(CliError::ValidationFailed {
            count: warnings.len(),
        });
    }
    Ok(())
}
