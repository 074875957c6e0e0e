use sharm_core::TokenKeys;
use sharm_db::Database;

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState {
    pub db: Database,
    /// Signs and verifies session tokens.
    pub keys: TokenKeys,
}
