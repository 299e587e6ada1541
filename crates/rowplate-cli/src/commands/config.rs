//! `rowplate config`: read and write configuration values.

use std::path::PathBuf;

use crate::{
    cli::{ConfigCommands, global::OutputFormat},
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

/// Dispatch to the correct config subcommand.
///
/// `explicit` is the `--config` path; `set` writes there, else to the file
/// currently in effect, else to the platform default.
pub fn execute(
    cmd: ConfigCommands,
    explicit: Option<PathBuf>,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    match cmd {
        ConfigCommands::Get { key } => {
            let value = config.get(&key).map_err(unknown_key)?;
            output.data(&value)?;
        }

        ConfigCommands::Set { key, value } => {
            let path = target_path(explicit);
            // Start from the file alone so environment overrides are not
            // written back.
            let mut stored = if path.is_file() {
                AppConfig::load_file(&path).with_cli_context(|| "reading config")?
            } else {
                AppConfig::default()
            };
            stored.set(&key, &value).map_err(|e| CliError::InvalidInput {
                message: format!("{key}: {e:#}"),
                source: Some(e.into()),
            })?;
            stored.save(&path).with_cli_context(|| "writing config")?;
            let saved = stored.get(&key).map_err(unknown_key)?;
            output.success(&format!("{key} = {saved} ({})", path.display()))?;
        }

        ConfigCommands::List => {
            if output.format() == OutputFormat::Json {
                return output.json(&config);
            }
            output.header("Current Configuration:")?;
            for key in AppConfig::KEYS {
                let value = config.get(key).map_err(unknown_key)?;
                output.print(&format!("{key} = {value}"))?;
            }
        }

        ConfigCommands::Path => {
            output.data(&target_path(explicit).display().to_string())?;
        }
    }

    Ok(())
}

fn target_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(AppConfig::active_path)
        .unwrap_or_else(AppConfig::config_path)
}

fn unknown_key(e: anyhow::Error) -> CliError {
    CliError::ConfigError {
        message: e.to_string(),
        source: None,
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        let path = PathBuf::from("/tmp/explicit.toml");
        assert_eq!(target_path(Some(path.clone())), path);
    }

    #[test]
    fn unknown_key_is_a_config_error() {
        let err = AppConfig::default().get("does.not.exist").map_err(unknown_key);
        assert!(matches!(err, Err(CliError::ConfigError { .. })));
        assert_eq!(err.unwrap_err().exit_code(), 4);
    }
}
