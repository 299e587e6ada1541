//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use rowplate_core::domain::{CellDelimiter, Encoding};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "rowplate",
    bin_name = "rowplate",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Expand templates over CSV rows into files or HTTP requests",
    long_about = "rowplate renders one line (file builder) or one HTTP request \
                  (HTTP sender) per CSV row, substituting ${_csvN}, ${_index0}, \
                  ${_index1} and named parameters.",
    after_help = "EXAMPLES:\n\
        \x20 rowplate build templates.toml -t fruit-insert --csv fruit.csv --out fruit.sql\n\
        \x20 rowplate send  templates.toml -t fruit-post --csv fruit.csv --pacing-ms 500\n\
        \x20 rowplate validate templates.toml -t fruit-post --csv fruit.csv\n\
        \x20 rowplate list templates.toml",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a file from a line template.
    #[command(
        visible_alias = "b",
        about = "Generate a file, one line per CSV row",
        after_help = "EXAMPLES:\n\
            \x20 rowplate build templates.toml -t insert --csv rows.csv --out rows.sql\n\
            \x20 rowplate build templates.toml -t insert --csv rows.csv --append all.sql\n\
            \x20 cat rows.csv | rowplate build templates.toml -t insert --csv - > rows.sql"
    )]
    Build(BuildArgs),

    /// Send HTTP requests from a request template.
    #[command(
        visible_alias = "s",
        about = "Send one HTTP request per CSV row (or batch)",
        after_help = "EXAMPLES:\n\
            \x20 rowplate send templates.toml -t post --csv rows.csv\n\
            \x20 rowplate send templates.toml -t post --csv rows.csv --dry-run\n\
            \x20 rowplate send templates.toml -t post --csv rows.csv --user admin --log send.json"
    )]
    Send(SendArgs),

    /// Check a template against a CSV file without producing output.
    #[command(
        visible_alias = "v",
        about = "Validate a template against CSV input"
    )]
    Validate(ValidateArgs),

    /// List templates in a template file or directory.
    #[command(
        visible_alias = "ls",
        about = "List available templates",
        after_help = "EXAMPLES:\n\
            \x20 rowplate list templates.toml\n\
            \x20 rowplate list ./templates --format json"
    )]
    List(ListArgs),

    /// Initialise a rowplate configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 rowplate init                           # default location\n\
            \x20 rowplate init --local                   # .rowplate.toml in CWD\n\
            \x20 rowplate init --templates templates.toml # also write sample templates"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 rowplate completions bash > ~/.local/share/bash-completion/completions/rowplate\n\
            \x20 rowplate completions zsh  > ~/.zfunc/_rowplate\n\
            \x20 rowplate completions fish > ~/.config/fish/completions/rowplate.fish"
    )]
    Completions(CompletionsArgs),

    /// Manage the rowplate configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 rowplate config get http.pacing_ms\n\
            \x20 rowplate config set http.pacing_ms 500\n\
            \x20 rowplate config list"
    )]
    Config(ConfigCommands),
}

// ── shared run arguments ──────────────────────────────────────────────────────

/// Template and input selection shared by `build`, `send` and `validate`.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Template document (`*.toml`) or a directory of them.
    #[arg(value_name = "TEMPLATES", help = "Template file or directory")]
    pub templates: PathBuf,

    /// Template name.
    #[arg(
        short = 't',
        long = "template",
        value_name = "NAME",
        help = "Name of the template to use"
    )]
    pub template: String,

    /// CSV input; `-` reads standard input.
    #[arg(long = "csv", value_name = "FILE", help = "CSV input file ('-' for stdin)")]
    pub csv: PathBuf,

    /// Cell delimiter for the CSV input.
    #[arg(
        short = 'd',
        long = "delimiter",
        value_name = "DELIMITER",
        help = "Cell delimiter: comma, semicolon or any [default: from config]"
    )]
    pub delimiter: Option<CellDelimiter>,

    /// Set a constant or choice parameter.
    #[arg(
        short = 'p',
        long = "param",
        value_name = "NAME=VALUE",
        value_parser = parse_key_val,
        help = "Set a parameter value (repeatable)"
    )]
    pub params: Vec<(String, String)>,

    /// Treat validation warnings as errors.
    #[arg(long = "strict", help = "Fail when validation reports warnings")]
    pub strict: bool,

    /// Skip the confirmation prompt.
    #[arg(
        short = 'y',
        long = "yes",
        help = "Skip confirmation when validation reports warnings"
    )]
    pub yes: bool,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    if key.trim().is_empty() {
        return Err(format!("missing parameter name in '{s}'"));
    }
    Ok((key.trim().to_string(), value.to_string()))
}

// ── build ─────────────────────────────────────────────────────────────────────

/// Arguments for `rowplate build`.
#[derive(Debug, Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Output file, created or truncated.
    #[arg(
        short = 'o',
        long = "out",
        value_name = "FILE",
        conflicts_with = "append",
        help = "Write to FILE (default: the template's output file, else stdout)"
    )]
    pub out: Option<PathBuf>,

    /// Output file to append to.
    #[arg(long = "append", value_name = "FILE", help = "Append to FILE")]
    pub append: Option<PathBuf>,

    /// Force standard output even when the template names a file.
    #[arg(long = "stdout", conflicts_with_all = ["out", "append"], help = "Write to stdout")]
    pub stdout: bool,

    /// Override the template's encoding.
    #[arg(
        short = 'e',
        long = "encoding",
        value_name = "ENCODING",
        help = "Output encoding: UTF-8, UTF-16LE or UTF-16BE"
    )]
    pub encoding: Option<Encoding>,
}

// ── send ──────────────────────────────────────────────────────────────────────

/// Arguments for `rowplate send`.
#[derive(Debug, Args)]
pub struct SendArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Pause between requests in milliseconds.
    #[arg(long = "pacing-ms", value_name = "MS", help = "Pause between requests [default: from config]")]
    pub pacing_ms: Option<u64>,

    /// Request timeout in seconds.
    #[arg(
        long = "timeout-secs",
        value_name = "SECS",
        help = "Request timeout [default: config, else the template's wait timeout]"
    )]
    pub timeout_secs: Option<u64>,

    /// Basic-auth user name.
    #[arg(short = 'u', long = "user", value_name = "USER", requires = "password")]
    pub user: Option<String>,

    /// Basic-auth password.
    #[arg(
        long = "password",
        value_name = "PASSWORD",
        env = "ROWPLATE_PASSWORD",
        hide_env_values = true,
        requires = "user"
    )]
    pub password: Option<String>,

    /// Proxy URL for every request.
    #[arg(long = "proxy", value_name = "URL")]
    pub proxy: Option<String>,

    /// Accept invalid TLS certificates.
    #[arg(long = "insecure", help = "Accept invalid TLS certificates")]
    pub insecure: bool,

    /// Print the requests instead of sending them.
    #[arg(long = "dry-run", help = "Render requests without sending them")]
    pub dry_run: bool,

    /// Write the request log as JSON.
    #[arg(long = "log", value_name = "FILE", help = "Write the request log to FILE as JSON")]
    pub log: Option<PathBuf>,
}

// ── validate ──────────────────────────────────────────────────────────────────

/// Arguments for `rowplate validate`.
#[derive(Debug, Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub run: RunArgs,
}

// ── list ──────────────────────────────────────────────────────────────────────

/// Arguments for `rowplate list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Template document or directory.
    #[arg(value_name = "TEMPLATES", help = "Template file or directory")]
    pub templates: PathBuf,

    /// Output format.
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// Output format for the `list` command.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One name per line.
    List,
    /// JSON array.
    Json,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `rowplate init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write to `.rowplate.toml` in the current directory.
    #[arg(
        long = "local",
        help = "Create local configuration in current directory"
    )]
    pub local: bool,

    /// Overwrite existing files.
    #[arg(short = 'f', long = "force", help = "Overwrite existing files")]
    pub force: bool,

    /// Also write a sample template document.
    #[arg(long = "templates", value_name = "FILE", help = "Write sample templates to FILE")]
    pub templates: Option<PathBuf>,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `rowplate completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `rowplate config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `http.pacing_ms`.
        key: String,
    },
    /// Set a configuration key and save the file.
    Set {
        /// Dotted key path.
        key: String,
        /// New value.
        value: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the active configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_build_command() {
        let cli = Cli::parse_from([
            "rowplate",
            "build",
            "t.toml",
            "-t",
            "insert",
            "--csv",
            "rows.csv",
            "-p",
            "table=fruit",
            "--delimiter",
            "semicolon",
            "--out",
            "out.sql",
        ]);
        let Commands::Build(args) = cli.command else {
            panic!("expected Build command");
        };
        assert_eq!(args.run.template, "insert");
        assert_eq!(args.run.params, vec![("table".to_string(), "fruit".to_string())]);
        assert_eq!(args.run.delimiter, Some(CellDelimiter::Semicolon));
        assert_eq!(args.out, Some(PathBuf::from("out.sql")));
    }

    #[test]
    fn out_and_append_conflict() {
        let result = Cli::try_parse_from([
            "rowplate", "build", "t.toml", "-t", "x", "--csv", "r.csv", "--out", "a", "--append",
            "b",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn user_requires_password() {
        let result = Cli::try_parse_from([
            "rowplate", "send", "t.toml", "-t", "x", "--csv", "r.csv", "--user", "admin",
        ]);
        // ROWPLATE_PASSWORD may satisfy the requirement in some environments.
        if std::env::var_os("ROWPLATE_PASSWORD").is_none() {
            assert!(result.is_err());
        }
    }

    #[test]
    fn param_without_equals_is_rejected() {
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());
        assert_eq!(
            parse_key_val("k=a=b").unwrap(),
            ("k".to_string(), "a=b".to_string())
        );
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["rowplate", "--quiet", "--verbose", "list", "t.toml"]);
        assert!(result.is_err());
    }
}
