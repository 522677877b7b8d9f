pub mod api;
pub mod models;

/// Channel used by read endpoints when the caller does not name one.
pub const DEFAULT_CHANNEL: &str = "general";
