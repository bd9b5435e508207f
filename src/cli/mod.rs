//! CLI subcommands for the `model-registry` binary.
//!
//! ## Usage
//!
//! ```bash
//! model-registry models list [--json]   # Catalog, newest first
//! model-registry models apply NAME      # Make NAME the active model
//! model-registry models delete NAME     # Remove an inactive model
//! model-registry config show            # Effective configuration
//! ```

pub mod config_cmd;
pub mod models_cmd;

use crate::models::RegistryError;

pub const EXIT_OK: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_USAGE: u8 = 2;
pub const EXIT_NOT_FOUND: u8 = 4;
pub const EXIT_CONFLICT: u8 = 5;

/// Process exit code for a failed registry operation.
pub fn exit_code(err: &RegistryError) -> u8 {
    match err {
        RegistryError::NotFound(_) => EXIT_NOT_FOUND,
        RegistryError::Conflict(_) => EXIT_CONFLICT,
        _ => EXIT_FAILURE,
    }
}
