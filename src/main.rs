//! `model-registry` entry point.
//!
//! ## CLI Subcommands
//!
//! - `model-registry models list [--json]` - List models (default)
//! - `model-registry models apply NAME` - Switch the active model
//! - `model-registry models delete NAME` - Delete an inactive model
//! - `model-registry config show|defaults|validate` - Inspect configuration

use std::process::ExitCode;

use model_registry::cli::{config_cmd, models_cmd, EXIT_USAGE};
use model_registry::config as registry_config;
use model_registry::telemetry::{init_logging, init_metrics};
use model_registry::{Registry, RegistryConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match command {
        "models" => ExitCode::from(run_models(&args).await),
        "config" => {
            let subcommand = args.get(2).map(|s| s.as_str()).unwrap_or("show");
            let code = match subcommand {
                "show" => config_cmd::run_show(),
                "defaults" => config_cmd::run_defaults(),
                "validate" => config_cmd::run_validate(),
                _ => {
                    eprintln!("Unknown config subcommand: {}", subcommand);
                    print_command_help("config");
                    EXIT_USAGE
                }
            };
            ExitCode::from(code)
        }
        "help" | "--help" | "-h" => {
            match args.get(2) {
                Some(subcommand) => print_command_help(subcommand),
                None => print_usage(),
            }
            ExitCode::SUCCESS
        }
        "version" | "--version" | "-V" => {
            println!("model-registry {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            ExitCode::from(EXIT_USAGE)
        }
    }
}

async fn run_models(args: &[String]) -> u8 {
    let subcommand = args.get(2).map(|s| s.as_str()).unwrap_or("list");

    let env = match registry_config::load() {
        Ok(env) => env,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return EXIT_USAGE;
        }
    };
    if let Err(e) = init_logging(&env.log) {
        eprintln!("Logging setup failed: {}", e);
        return EXIT_USAGE;
    }
    init_metrics();

    let registry = Registry::new(&RegistryConfig::from(&env));

    match (subcommand, args.get(3).map(|s| s.as_str())) {
        ("list", flag) => match flag {
            None => models_cmd::run_list(&registry, false).await,
            Some("--json") => models_cmd::run_list(&registry, true).await,
            Some(other) => {
                eprintln!("Unknown option for models list: {}", other);
                EXIT_USAGE
            }
        },
        ("apply", Some(name)) => models_cmd::run_apply(&registry, name).await,
        ("delete", Some(name)) => models_cmd::run_delete(&registry, name).await,
        ("apply" | "delete", None) => {
            eprintln!("Missing model name for models {}", subcommand);
            print_command_help("models");
            EXIT_USAGE
        }
        _ => {
            eprintln!("Unknown models subcommand: {}", subcommand);
            print_command_help("models");
            EXIT_USAGE
        }
    }
}

fn print_usage() {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        "model-registry v{}

USAGE:
    model-registry <COMMAND> [OPTIONS]

COMMANDS:
    models       List, apply or delete models (default: list)
    config       Inspect configuration (show, defaults, validate)
    version      Show version information
    help         Show this help message

EXAMPLES:
    model-registry models list
    model-registry models list --json
    model-registry models apply mnist-cnn-v3
    model-registry models delete mnist-cnn-v1
    model-registry config validate

ENVIRONMENT:
    MODEL_REGISTRY_ROOT            Registry root (default: /models)
    MODEL_REGISTRY_NOTIFY_COMMAND  Executable run with the model name after a switch
    MODEL_REGISTRY_NOTIFY_TIMEOUT_SECS
                                   Kill the notify command after this long (default: 30)
    MODEL_REGISTRY_LOG_FORMAT      json or pretty (default: json)
    MODEL_REGISTRY_LOG_LEVEL       Log filter (default: info)
    MODEL_REGISTRY_LOG_FILE        Append logs to this file instead of stderr
    MODEL_REGISTRY_CONFIG          TOML config file

EXIT CODES:
    0  Success
    1  Failure
    2  Usage or configuration error
    4  Model not found
    5  Model is active and cannot be deleted
",
        version
    );
}

/// Print detailed help for a specific command.
fn print_command_help(command: &str) {
    match command {
        "models" => {
            eprintln!(
                "model-registry models - Manage registered models

USAGE:
    model-registry models list [--json]
    model-registry models apply NAME
    model-registry models delete NAME

DESCRIPTION:
    list    Print every model newest first. The active model is marked with
            '*'. Missing identifiers and trained-at timestamps are generated
            and saved on first listing.
    apply   Make NAME the active model and notify the serving runtime. A
            failed notification is reported as a warning; the switch stands.
    delete  Remove NAME's directory. The active model cannot be deleted.

EXIT CODES:
    0  Success
    1  Filesystem or lock failure
    2  Usage error
    4  Model not found
    5  Model is active
"
            );
        }
        "config" => {
            eprintln!(
                "model-registry config - Inspect configuration

USAGE:
    model-registry config [show|defaults|validate]

DESCRIPTION:
    show      Print effective values (env over config file over defaults)
    defaults  Print built-in defaults
    validate  Check the config file, log filter and registry root

EXIT CODES:
    0  Configuration is valid
    2  Configuration error
"
            );
        }
        _ => {
            eprintln!("No help available for: {}", command);
            print_usage();
        }
    }
}
