use std::sync::Arc;

use ripple_crypto::signer::Signer;
use ripple_db::Database;

use crate::error::{AppError, joined};
use crate::uploads::Storage;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub signer: Signer,
    pub storage: Storage,
    pub settings: Settings,
}

impl AppStateInner {
    pub fn new(db: Database, secret: &str, storage: Storage, settings: Settings) -> AppState {
        Arc::new(Self {
            db,
            signer: Signer::new(secret.as_bytes()),
            storage,
            settings,
        })
    }
}

/// Run database or hashing work on the blocking pool; the connection lock
/// must never be held on an async worker.
pub(crate) async fn blocking<T, F>(state: &AppState, work: F) -> Result<T, AppError>
where
    F: FnOnce(&AppStateInner) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let st = state.clone();
    joined(tokio::task::spawn_blocking(move || work(&st)).await)
}

#[derive(Debug, Clone)]
pub struct Settings {
    /// Items per page on every paginated list.
    pub per_page: u32,
    /// Lifetime of the browser-session login cookie.
    pub session_hours: i64,
    pub secure_cookies: bool,
    /// Absolute origin used when printing activation links.
    pub base_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            per_page: 30,
            session_hours: 24,
            secure_cookies: false,
            base_url: "http://localhost:3000".into(),
        }
    }
}
