use std::sync::Arc;

use murmur_store::Store;

use crate::uploads::Uploads;

pub type AppState = Arc<AppStateInner>;

/// Everything handlers share. Built once at startup and injected through
/// axum's `State`, so tests can hand in a store with a manual clock.
pub struct AppStateInner {
    pub store: Store,
    pub uploads: Uploads,
    /// Request body limit for uploads, in bytes.
    pub max_upload_bytes: usize,
}
