//! `rowplate build`: generate a file from a line template.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, instrument};

use rowplate_adapters::{FileSink, StdoutSink};
use rowplate_core::application::{ByteSink, FileBuilder, Outcome, Worker};

use crate::{
    cli::BuildArgs,
    cli::global::OutputFormat,
    config::AppConfig,
    error::{CliError, CliResult},
    output::{OutputManager, update_bar},
};

use super::{apply_params, read_table, resolver, review, template_service};

/// Where the generated lines go.
enum Target {
    Stdout,
    Create(PathBuf),
    Append(PathBuf),
}

impl Target {
    fn choose(args: &BuildArgs, template_file: Option<&str>) -> Self {
        if args.stdout {
            return Self::Stdout;
        }
        if let Some(path) = &args.out {
            return Self::Create(path.clone());
        }
        if let Some(path) = &args.append {
            return Self::Append(path.clone());
        }
        match template_file {
            Some(name) => Self::Create(PathBuf::from(name)),
            None => Self::Stdout,
        }
    }

    fn sink(&self) -> Arc<dyn ByteSink> {
        match self {
            Self::Stdout => Arc::new(StdoutSink),
            Self::Create(path) => Arc::new(FileSink::new(path)),
            Self::Append(path) => Arc::new(FileSink::append(path)),
        }
    }
}

#[instrument(skip_all, fields(template = %args.run.template))]
pub fn execute(args: BuildArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let service = template_service(&args.run.templates);
    let mut template = service.line_template(&args.run.template)?;
    apply_params(&mut template.params, &args.run.params)?;
    if let Some(encoding) = args.encoding.or(config.generate.encoding) {
        template.encoding = encoding;
    }

    let table = read_table(&args.run, &config)?;
    let builder = FileBuilder::new(resolver());
    review(&builder.validate(&template, &table), &args.run, &output)?;

    let target = Target::choose(&args, template.output_file_name.as_deref());
    let sink = target.sink();
    let destination = sink.describe();
    info!(%destination, encoding = %template.encoding, "building");

    let bar = output.progress_bar(table.effective_len());
    let handle = Worker::new().spawn_build(builder, &template, table, sink)?;
    let outcome = handle.wait_with(|progress| update_bar(&bar, progress));
    bar.finish_and_clear();

    match outcome {
        Outcome::Completed(summary) => {
            if output.format() == OutputFormat::Json && !matches!(target, Target::Stdout) {
                return output.json(&summary);
            }
            // Keep stdout clean when it carries the file itself.
            if !matches!(target, Target::Stdout) {
                output.success(&format!(
                    "Wrote {} lines ({} rows, {} bytes) to {destination}",
                    summary.lines, summary.rows, summary.bytes
                ))?;
            }
            Ok(())
        }
        Outcome::Cancelled(summary) => {
            output.warning(&format!(
                "Build cancelled after {} rows; {destination} is incomplete",
                summary.rows
            ))?;
            Err(CliError::Cancelled)
        }
        Outcome::Failed { error, .. } => Err(error.into()),
    }
}
