use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::{info, warn};

use ripple_api::state::Settings;

/// Secrets that only exist to make local development work.
const PLACEHOLDER_SECRETS: &[&str] = &["dev-secret-change-me", "secret", "changeme"];

pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub secret: String,
    pub uploads_dir: PathBuf,
    pub settings: Settings,
    pub admin: Option<AdminAccount>,
}

/// Account created at startup when all three `RIPPLE_ADMIN_*` variables are set.
pub struct AdminAccount {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let secret: String = try_load("RIPPLE_SECRET", "dev-secret-change-me")?;
        if PLACEHOLDER_SECRETS.contains(&secret.as_str()) {
            warn!("RIPPLE_SECRET is a placeholder; anyone can forge login cookies. Set a real secret.");
        }

        Ok(Self {
            host: try_load("RIPPLE_HOST", "0.0.0.0")?,
            port: try_load("RIPPLE_PORT", "3000")?,
            db_path: try_load("RIPPLE_DB_PATH", "ripple.db")?,
            secret,
            uploads_dir: try_load("RIPPLE_UPLOADS_DIR", "./uploads")?,
            settings: Settings {
                per_page: try_load("RIPPLE_PER_PAGE", "30")?,
                session_hours: try_load("RIPPLE_SESSION_HOURS", "24")?,
                secure_cookies: try_load("RIPPLE_SECURE_COOKIES", "false")?,
                base_url: try_load("RIPPLE_BASE_URL", "http://localhost:3000")?,
            },
            admin: admin_account(),
        })
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.parse::<T>()
        .map_err(|e| anyhow::anyhow!("Invalid {key} value {raw:?}: {e}"))
}

fn admin_account() -> Option<AdminAccount> {
    let name = env::var("RIPPLE_ADMIN_NAME").ok();
    let email = env::var("RIPPLE_ADMIN_EMAIL").ok();
    let password = env::var("RIPPLE_ADMIN_PASSWORD").ok();
    match (name, email, password) {
        (Some(name), Some(email), Some(password)) => Some(AdminAccount { name, email, password }),
        (None, None, None) => None,
        _ => {
            warn!("RIPPLE_ADMIN_NAME, RIPPLE_ADMIN_EMAIL and RIPPLE_ADMIN_PASSWORD must be set together; skipping admin bootstrap");
            None
        }
    }
}
