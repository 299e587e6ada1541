//! `rowplate send`: send one HTTP request per row or batch.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument};

use rowplate_adapters::{ReqwestTransport, TransportOptions};
use rowplate_core::{
    application::{Credentials, HttpSender, Outcome, SendOptions, SendReport, Worker},
    domain::{Request, RequestTemplate},
};

use crate::{
    cli::{SendArgs, global::OutputFormat},
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::{OutputManager, update_bar},
};

use super::{apply_params, read_table, resolver, review, template_service};

/// Timeout precedence: flag, config, then the template's own wait timeout.
fn transport_options(
    args: &SendArgs,
    config: &AppConfig,
    template: &RequestTemplate,
) -> TransportOptions {
    let secs = args
        .timeout_secs
        .or(config.http.timeout_secs)
        .unwrap_or(template.wait_timeout_secs);
    TransportOptions {
        timeout: Duration::from_secs(secs),
        proxy: args.proxy.clone().or_else(|| config.http.proxy.clone()),
        insecure: args.insecure || config.http.insecure,
    }
}

fn send_options(args: &SendArgs, config: &AppConfig) -> SendOptions {
    let pacing = args
        .pacing_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.http.pacing());
    let credentials = match (&args.user, &args.password) {
        (Some(user), Some(password)) => Some(Credentials::new(user, password)),
        _ => None,
    };
    SendOptions {
        pacing,
        credentials,
    }
}

#[instrument(skip_all, fields(template = %args.run.template))]
pub fn execute(args: SendArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let service = template_service(&args.run.templates);
    let mut template = service.request_template(&args.run.template)?;
    apply_params(&mut template.params, &args.run.params)?;
    let table = read_table(&args.run, &config)?;

    let transport = ReqwestTransport::new(&transport_options(&args, &config, &template))?;
    let sender = HttpSender::new(resolver(), Arc::new(transport));
    let options = send_options(&args, &config);

    review(&sender.validate(&template, &table), &args.run, &output)?;

    if args.dry_run {
        let requests = sender
            .preview(&template, &table, &options)
            .collect::<Result<Vec<_>, _>>()?;
        return print_requests(&requests, &output);
    }

    let planned = sender.plan(&template, &table);
    info!(planned, pacing_ms = options.pacing.as_millis() as u64, "sending");

    let bar = output.progress_bar(table.effective_len());
    let handle = Worker::new().spawn_send(sender, &template, table, options)?;
    let outcome = handle.wait_with(|progress| update_bar(&bar, progress));
    bar.finish_and_clear();

    if let (Some(path), Some(report)) = (&args.log, outcome.output()) {
        write_log(path, report)?;
        output.info(&format!("Request log written to {}", path.display()))?;
    }

    match outcome {
        Outcome::Completed(report) => {
            print_report(&report, &output)?;
            if report.failed() > 0 {
                output.warning(&format!("{} request(s) failed", report.failed()))?;
            }
            Ok(())
        }
        Outcome::Cancelled(report) => {
            print_report(&report, &output)?;
            Err(CliError::Cancelled)
        }
        Outcome::Failed { error, partial } => {
            if let Some(report) = partial {
                print_report(&report, &output)?;
            }
            Err(error.into())
        }
    }
}

fn print_requests(requests: &[Request], output: &OutputManager) -> CliResult<()> {
    if output.format() == OutputFormat::Json {
        return output.json(requests);
    }
    for (n, request) in requests.iter().enumerate() {
        output.header(&format!("# request {}", n + 1))?;
        output.data(&format!("{} {}", request.method, request.uri))?;
        for (name, value) in &request.headers {
            output.data(&format!("{name}: {value}"))?;
        }
        if !request.body.is_empty() {
            output.data("")?;
            output.data(&request.body)?;
        }
        output.data("")?;
    }
    Ok(())
}

fn print_report(report: &SendReport, output: &OutputManager) -> CliResult<()> {
    if output.format() == OutputFormat::Json {
        return output.json(report);
    }
    for record in &report.records {
        let line = format!("rows {:>9}  {}", record.processed_range(), record.summary());
        if record.is_success() {
            output.success(&line)?;
        } else {
            output.error(&line)?;
        }
    }
    output.print(&format!(
        "{} of {} planned requests sent: {} succeeded, {} failed",
        report.records.len(),
        report.planned,
        report.succeeded(),
        report.failed()
    ))?;
    Ok(())
}

fn write_log(path: &std::path::Path, report: &SendReport) -> CliResult<()> {
    let json = serde_json::to_string_pretty(report).map_err(|e| CliError::InvalidInput {
        message: format!("cannot serialise request log: {e}"),
        source: Some(Box::new(e)),
    })?;
    std::fs::write(path, json).with_cli_context(|| format!("writing log '{}'", path.display()))
}
