//! Shared utilities: logging and lookup keys.

use crate::error::LoadError;
use crate::model::Unit;
use tracing::Level;

/// Initialize tracing with env filter. Safe to call once at startup.
pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| level.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Normalize a unit ID or name for lookup (lowercase, trim).
pub fn normalize_id(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Find a unit by ID first, then by display name.
pub fn find_unit<'a>(units: &'a [Unit], id_or_name: &str) -> Result<&'a Unit, LoadError> {
    let key = normalize_id(id_or_name);
    units
        .iter()
        .find(|u| normalize_id(&u.id) == key)
        .or_else(|| units.iter().find(|u| normalize_id(&u.name) == key))
        .ok_or_else(|| LoadError::UnknownUnit(id_or_name.to_string()))
}
