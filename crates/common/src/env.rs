//! Environment helpers
//!
//! Loads `.env` once and reads variables, treating blank values as unset.

use std::sync::Once;

use tracing::debug;

static DOTENV: Once = Once::new();

/// Load `.env` from the working directory (or a parent) if present.
pub fn load_dotenv() {
    DOTENV.call_once(|| match dotenvy::dotenv() {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(_) => debug!("no .env file found"),
    });
}

/// Read an environment variable, returning `None` when unset or blank.
pub fn var_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Read a boolean flag (`1`, `true`, `yes`, case-insensitive).
pub fn flag(key: &str) -> bool {
    var_non_empty(key)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
