//! `rowplate init`: create a default configuration file and, optionally, a
//! sample template document.

use std::path::{Path, PathBuf};

use rowplate_adapters::TemplateDocument;
use rowplate_core::{
    domain::{Batch, DomainError, HttpMethod, LineTemplate, Param, ParamType, RequestTemplate},
    error::RowplateError,
};

use crate::{
    cli::InitArgs,
    config::AppConfig,
    error::{CliResult, IntoCli},
    output::OutputManager,
};

/// Create a default rowplate configuration file.
pub fn execute(args: InitArgs, output: OutputManager) -> CliResult<()> {
    output.info("Initialising configuration...")?;

    let config_path = if args.local {
        PathBuf::from(AppConfig::LOCAL_FILE)
    } else {
        AppConfig::config_path()
    };

    if config_path.exists() && !args.force {
        output.warning(&format!(
            "Config already exists at {}  (use --force to overwrite)",
            config_path.display(),
        ))?;
    } else {
        AppConfig::default()
            .save(&config_path)
            .with_cli_context(|| "writing default config")?;
        output.success(&format!(
            "Configuration created at {}",
            config_path.display()
        ))?;
    }

    if let Some(path) = &args.templates {
        write_samples(path, args.force, &output)?;
    }

    Ok(())
}

fn write_samples(path: &Path, force: bool, output: &OutputManager) -> CliResult<()> {
    if path.exists() && !force {
        output.warning(&format!(
            "{} already exists  (use --force to overwrite)",
            path.display()
        ))?;
        return Ok(());
    }
    sample_document()
        .map_err(RowplateError::from)?
        .save(path)?;
    output.success(&format!("Sample templates written to {}", path.display()))?;
    Ok(())
}

/// One line template and one batched request template over a
/// `name,quantity` CSV.
fn sample_document() -> Result<TemplateDocument, DomainError> {
    let insert = LineTemplate::builder()
        .name("fruit-insert")
        .description("SQL inserts, one per row")
        .header("BEGIN;")
        .pattern("INSERT INTO ${table} (id, name, qty, color) VALUES (${_index1}, '${_csv0}', ${_csv1}, '${color}');")
        .footer("COMMIT;")
        .output_file_name("fruit.sql")
        .param(Param::constant("table", "fruit")?)
        .param(Param::new("color", ParamType::Datafaker)?.with_option("#{color.name}"))
        .build()?;

    let post = RequestTemplate::builder()
        .name("fruit-post")
        .description("JSON arrays of three rows per request")
        .uri("http://localhost:8080/fruit")
        .method(HttpMethod::Post)
        .headers("Content-Type: application/json")
        .body("{\"id\": \"${request_id}\", \"name\": \"${_csv0}\", \"qty\": ${_csv1}}")
        .batch(Batch::of(3).with_wrapper("[", "]").with_separator(","))
        .param(Param::new("request_id", ParamType::Uuid)?)
        .build()?;

    Ok(TemplateDocument {
        line_templates: vec![insert],
        request_templates: vec![post],
    })
}
