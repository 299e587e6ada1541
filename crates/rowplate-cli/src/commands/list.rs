//! Implementation of the `rowplate list` command.

use crate::{
    cli::{ListArgs, ListFormat},
    error::CliResult,
    output::OutputManager,
};

use super::template_service;

pub fn execute(args: ListArgs, output: OutputManager) -> CliResult<()> {
    let templates = template_service(&args.templates).list()?;

    match args.format {
        ListFormat::Table => {
            if templates.is_empty() {
                output.info(&format!("No templates in {}", args.templates.display()))?;
                return Ok(());
            }
            output.header("Available Templates:")?;
            let width = templates.iter().map(|t| t.name.len()).max().unwrap_or(0);
            for template in &templates {
                let mut line = format!(
                    "  {:<width$}  {:<15}  {} param(s)",
                    template.name, template.mode, template.params
                );
                if !template.description.is_empty() {
                    line.push_str("  ");
                    line.push_str(&template.description);
                }
                output.print(&line)?;
            }
        }

        // JSON must stay parseable in pipes, so it is written even with -q.
        ListFormat::Json => output.json(&templates)?,

        ListFormat::List => {
            for t in &templates {
                output.data(&t.name)?;
            }
        }
    }

    Ok(())
}
