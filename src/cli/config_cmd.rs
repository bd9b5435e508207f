//! Config CLI subcommands: show, defaults, validate.
//!
//! Read configuration locally; no registry access needed except the root
//! check in `validate`.

use crate::cli::{EXIT_OK, EXIT_USAGE};
use crate::config::{self, EffectiveConfig, EnvConfig};

/// Print effective config as key-value pairs to stdout.
pub fn run_show() -> u8 {
    match config::load() {
        Ok(cfg) => {
            print_config(&cfg.effective_config());
            EXIT_OK
        }
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            EXIT_USAGE
        }
    }
}

/// Print built-in defaults, ignoring env and config file.
pub fn run_defaults() -> u8 {
    print_config(&EnvConfig::default().effective_config());
    EXIT_OK
}

/// Load and check configuration. Returns 0 if valid, 2 otherwise.
pub fn run_validate() -> u8 {
    let result = config::load().and_then(|cfg| cfg.validate());
    match result {
        Ok(()) => {
            println!("Configuration is valid.");
            EXIT_OK
        }
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            EXIT_USAGE
        }
    }
}

fn print_config(cfg: &EffectiveConfig) {
    print!("{}", format_config(cfg));
}

/// Render `ENV=value` lines, one per setting. Unset values are empty.
fn format_config(cfg: &EffectiveConfig) -> String {
    let lines = [
        (config::ENV_ROOT, cfg.root.clone()),
        (config::ENV_NOTIFY_COMMAND, cfg.notify_command.clone().unwrap_or_default()),
        (config::ENV_NOTIFY_TIMEOUT, cfg.notify_timeout_secs.to_string()),
        (config::ENV_LOG_FORMAT, cfg.log_format.clone()),
        (config::ENV_LOG_LEVEL, cfg.log_level.clone()),
        (config::ENV_LOG_FILE, cfg.log_file.clone().unwrap_or_default()),
        (config::ENV_CONFIG_FILE, cfg.config_file.clone().unwrap_or_default()),
    ];
    lines.iter().map(|(key, value)| format!("{}={}\n", key, value)).collect()
}
