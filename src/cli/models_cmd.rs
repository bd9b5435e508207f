//! Models CLI subcommands: list, apply, delete.

use crate::cli::{exit_code, EXIT_FAILURE, EXIT_OK};
use crate::models::{ModelEntry, RegistryHandle};

/// Run `models list`. Prints a table, or a JSON array with `--json`.
pub async fn run_list(registry: &RegistryHandle, json_output: bool) -> u8 {
    let entries = match registry.list_models().await {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Error listing models: {}", e);
            return exit_code(&e);
        }
    };

    if json_output {
        match serde_json::to_string_pretty(&entries) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error encoding models: {}", e);
                return EXIT_FAILURE;
            }
        }
    } else {
        print_models(&entries);
    }
    EXIT_OK
}

/// Run `models apply NAME`.
pub async fn run_apply(registry: &RegistryHandle, name: &str) -> u8 {
    match registry.apply_model(name).await {
        Ok(outcome) => {
            println!("Active model: {}", outcome.model);
            if let Some(warning) = outcome.notify_warning {
                eprintln!("WARNING: serving runtime not notified: {}", warning);
            }
            EXIT_OK
        }
        Err(e) => {
            eprintln!("Error applying model: {}", e);
            exit_code(&e)
        }
    }
}

/// Run `models delete NAME`.
pub async fn run_delete(registry: &RegistryHandle, name: &str) -> u8 {
    match registry.delete_model(name).await {
        Ok(()) => {
            println!("Deleted model: {}", name);
            EXIT_OK
        }
        Err(e) => {
            eprintln!("Error deleting model: {}", e);
            exit_code(&e)
        }
    }
}

/// Print entries as a table to stdout.
pub fn print_models(entries: &[ModelEntry]) {
    print!("{}", format_models(entries));
}

/// Render entries as a table with a `*` beside the active model.
pub fn format_models(entries: &[ModelEntry]) -> String {
    if entries.is_empty() {
        return "No models in registry.\n".to_string();
    }

    let mut out = format!(
        "{:<2} {:<28} {:<10} {:<14} {:>9} {:<25}\n",
        "", "NAME", "VERSION", "USER", "ACCURACY", "TRAINED"
    );
    out.push_str(&"-".repeat(91));
    out.push('\n');

    for m in entries {
        out.push_str(&format!(
            "{:<2} {:<28} {:<10} {:<14} {:>9.4} {:<25}\n",
            if m.active { "*" } else { "" },
            truncate(&m.name, 27),
            truncate(&m.version, 9),
            truncate(&m.user, 13),
            m.accuracy,
            truncate(m.train_date.as_str(), 25),
        ));
    }

    let active = entries.iter().find(|m| m.active).map(|m| m.name.as_str());
    out.push_str(&"-".repeat(91));
    out.push('\n');
    out.push_str(&format!(
        "{} model(s)  |  active: {}\n",
        entries.len(),
        active.unwrap_or("none")
    ));
    out
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
