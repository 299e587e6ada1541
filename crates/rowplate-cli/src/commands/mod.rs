//! Command handlers, one module per subcommand.
//!
//! The helpers below are shared by `build`, `send` and `validate`: they load
//! templates, read the CSV input and review validation findings.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use rowplate_adapters::{BuiltinFaker, TomlTemplateRepository};
use rowplate_core::{
    application::{ApplicationError, ParamResolver, TemplateService},
    domain::{LineTemplate, ParamSet, RequestTemplate, RowTable, ValidationReport},
    error::RowplateError,
};

use crate::{
    cli::RunArgs,
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

pub mod build;
pub mod completions;
pub mod config;
pub mod init;
pub mod list;
pub mod send;
pub mod validate;

/// Resolver backed by the built-in fake data generators.
pub(crate) fn resolver() -> ParamResolver {
    ParamResolver::new(Arc::new(BuiltinFaker::new()))
}

pub(crate) fn template_service(templates: &Path) -> TemplateService {
    TemplateService::new(Box::new(TomlTemplateRepository::new(templates)), resolver())
}

/// A template looked up by name when the mode is not known up front.
pub(crate) enum AnyTemplate {
    Line(LineTemplate),
    Request(RequestTemplate),
}

/// Find `name` among both line and request templates.
pub(crate) fn find_any(service: &TemplateService, name: &str) -> CliResult<AnyTemplate> {
    let line = service.line_template(name);
    let request = service.request_template(name);
    match (line, request) {
        (Ok(_), Ok(_)) => Err(CliError::AmbiguousTemplate { name: name.into() }),
        (Ok(line), Err(e)) if is_not_found(&e) => Ok(AnyTemplate::Line(line)),
        (Err(e), Ok(request)) if is_not_found(&e) => Ok(AnyTemplate::Request(request)),
        (Ok(_), Err(e)) | (Err(e), Ok(_)) => Err(e.into()),
        (Err(line_err), Err(request_err)) => {
            let err = if is_not_found(&line_err) {
                request_err
            } else {
                line_err
            };
            Err(err.into())
        }
    }
}

fn is_not_found(err: &RowplateError) -> bool {
    matches!(
        err,
        RowplateError::Application(ApplicationError::TemplateNotFound { .. })
    )
}

/// Apply `--param NAME=VALUE` overrides.
pub(crate) fn apply_params(params: &mut ParamSet, overrides: &[(String, String)]) -> CliResult<()> {
    for (name, value) in overrides {
        params
            .set_value(name, value.as_str())
            .map_err(|e| CliError::InvalidInput {
                message: format!("--param {name}: {e}"),
                source: Some(Box::new(e)),
            })?;
        debug!(param = %name, "parameter overridden");
    }
    Ok(())
}

/// Read the CSV input named by `--csv`; `-` reads standard input.
pub(crate) fn read_table(args: &RunArgs, config: &AppConfig) -> CliResult<RowTable> {
    let text = if args.csv.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .with_cli_context(|| "reading CSV from stdin")?;
        text
    } else {
        std::fs::read_to_string(&args.csv)
            .with_cli_context(|| format!("reading CSV '{}'", args.csv.display()))?
    };
    let delimiter = args.delimiter.unwrap_or(config.generate.cell_delimiter);
    let table = RowTable::parse(&text, delimiter);
    info!(rows = table.len(), %delimiter, "CSV loaded");
    Ok(table)
}

/// Print the findings and decide whether the run may go ahead.
///
/// `--strict` turns warnings into an error; otherwise the user confirms
/// unless `--yes` was given.
pub(crate) fn review(
    report: &ValidationReport,
    args: &RunArgs,
    output: &OutputManager,
) -> CliResult<()> {
    let warnings = report.warnings();
    for warning in &warnings {
        output.warning(warning)?;
    }
    if warnings.is_empty() {
        return Ok(());
    }
    if args.strict {
        return Err(CliError::ValidationFailed {
            count: warnings.len(),
        });
    }
    if !args.yes && !output.confirm("Validation reported warnings. Continue?")? {
        return Err(CliError::Cancelled);
    }
    Ok(())
}
