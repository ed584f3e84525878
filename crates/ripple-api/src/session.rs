//! Cookie-backed session state: who is logged in, remember-me, flash
//! messages and the post-login forwarding URL.
//!
//! Every cookie value is a token signed by [`ripple_crypto::signer::Signer`],
//! so clients can't forge a login or inject flash markup.

use axum::{
    extract::FromRequestParts,
    http::{Method, Uri, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use ripple_crypto::{digest, signer::expires_in, tokens};
use ripple_types::models::User;

use crate::error::AppError;
use crate::state::{AppState, AppStateInner, Settings};

pub const SESSION_COOKIE: &str = "ripple_session";
pub const REMEMBER_COOKIE: &str = "remember_token";
pub const FLASH_COOKIE: &str = "flash";
pub const FORWARDING_COOKIE: &str = "forwarding_url";

const REMEMBER_DAYS: i64 = 20 * 365;
const FLASH_MINUTES: i64 = 10;
const FORWARDING_MINUTES: i64 = 60;

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct SessionClaims {
    pub sub: String,
    pub exp: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct RememberClaims {
    pub sub: String,
    pub token: String,
    pub exp: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Info,
    Warning,
    Danger,
}

impl FlashKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashKind::Success => "success",
            FlashKind::Info => "info",
            FlashKind::Warning => "warning",
            FlashKind::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn new(kind: FlashKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct FlashClaims {
    kind: FlashKind,
    message: String,
    exp: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct ForwardingClaims {
    url: String,
    exp: usize,
}

// -- Cookies --

fn cookie(settings: &Settings, name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(settings.secure_cookies)
        .build()
}

fn removal(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, "")).path("/").build()
}

// -- Login state --

/// Start a browser session for `user_id`.
pub fn log_in(state: &AppStateInner, jar: CookieJar, user_id: &str) -> anyhow::Result<CookieJar> {
    let claims = SessionClaims {
        sub: user_id.to_string(),
        exp: expires_in(Duration::hours(state.settings.session_hours)),
    };
    let token = state.signer.sign(&claims)?;
    Ok(jar.add(cookie(&state.settings, SESSION_COOKIE, token)))
}

/// Persist a fresh remember token: digest in the database, raw token in a
/// permanent signed cookie. Hashes and writes; call off the async workers.
pub fn remember(state: &AppStateInner, jar: CookieJar, user_id: &str) -> anyhow::Result<CookieJar> {
    let token = tokens::new_token();
    state.db.set_remember_digest(user_id, Some(&digest::digest(&token)?))?;

    let claims = RememberClaims {
        sub: user_id.to_string(),
        token,
        exp: expires_in(Duration::days(REMEMBER_DAYS)),
    };
    let mut remember_cookie = cookie(&state.settings, REMEMBER_COOKIE, state.signer.sign(&claims)?);
    remember_cookie.make_permanent();
    Ok(jar.add(remember_cookie))
}

pub fn forget(state: &AppStateInner, jar: CookieJar, user_id: &str) -> anyhow::Result<CookieJar> {
    state.db.set_remember_digest(user_id, None)?;
    Ok(jar.remove(removal(REMEMBER_COOKIE)))
}

pub fn log_out(state: &AppStateInner, jar: CookieJar, user_id: &str) -> anyhow::Result<CookieJar> {
    let jar = forget(state, jar, user_id)?;
    info!("User {} logged out", user_id);
    Ok(jar.remove(removal(SESSION_COOKIE)))
}

// -- Flash --

/// Queue a message for the next rendered page.
pub fn set_flash(
    state: &AppStateInner,
    jar: CookieJar,
    kind: FlashKind,
    message: impl Into<String>,
) -> anyhow::Result<CookieJar> {
    let claims = FlashClaims {
        kind,
        message: message.into(),
        exp: expires_in(Duration::minutes(FLASH_MINUTES)),
    };
    let token = state.signer.sign(&claims)?;
    Ok(jar.add(cookie(&state.settings, FLASH_COOKIE, token)))
}

/// Read and clear the pending flash message.
pub fn take_flash(state: &AppStateInner, jar: CookieJar) -> (CookieJar, Option<Flash>) {
    let Some(raw) = jar.get(FLASH_COOKIE).map(|c| c.value().to_string()) else {
        return (jar, None);
    };
    let flash = state
        .signer
        .verify::<FlashClaims>(&raw)
        .map(|claims| Flash::new(claims.kind, claims.message));
    (jar.remove(removal(FLASH_COOKIE)), flash)
}

/// Flash `message` and redirect to `to`.
pub fn redirect_with_flash(
    state: &AppStateInner,
    jar: CookieJar,
    kind: FlashKind,
    message: impl Into<String>,
    to: &str,
) -> Result<Response, AppError> {
    let jar = set_flash(state, jar, kind, message)?;
    Ok((jar, Redirect::to(to)).into_response())
}

// -- Friendly forwarding --

fn is_local_path(url: &str) -> bool {
    url.starts_with('/') && !url.starts_with("//")
}

pub fn store_location(state: &AppStateInner, jar: CookieJar, url: &str) -> anyhow::Result<CookieJar> {
    if !is_local_path(url) {
        return Ok(jar);
    }
    let claims = ForwardingClaims {
        url: url.to_string(),
        exp: expires_in(Duration::minutes(FORWARDING_MINUTES)),
    };
    let token = state.signer.sign(&claims)?;
    Ok(jar.add(cookie(&state.settings, FORWARDING_COOKIE, token)))
}

pub fn take_location(state: &AppStateInner, jar: CookieJar) -> (CookieJar, Option<String>) {
    let Some(raw) = jar.get(FORWARDING_COOKIE).map(|c| c.value().to_string()) else {
        return (jar, None);
    };
    let url = state
        .signer
        .verify::<ForwardingClaims>(&raw)
        .map(|claims| claims.url)
        .filter(|url| is_local_path(url));
    (jar.remove(removal(FORWARDING_COOKIE)), url)
}

// -- Current user --

/// The logged-in user, if any. Inserted into request extensions by
/// [`crate::middleware::load_current_user`].
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<User>);

impl CurrentUser {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }
}

/// Extractor for handlers behind the login filter. Anonymous visitors are
/// redirected to the login page; GET targets are remembered for after login.
pub struct LoggedIn(pub User);

impl FromRequestParts<AppState> for LoggedIn {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(CurrentUser(Some(user))) = parts.extensions.get::<CurrentUser>() {
            return Ok(LoggedIn(user.clone()));
        }
        let jar = CookieJar::from_headers(&parts.headers);
        Err(login_redirect(state, jar, &parts.method, &parts.uri))
    }
}

fn login_redirect(state: &AppStateInner, jar: CookieJar, method: &Method, uri: &Uri) -> Response {
    let result = (|| -> anyhow::Result<CookieJar> {
        let jar = if method == Method::GET {
            let target = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
            store_location(state, jar, target)?
        } else {
            jar
        };
        set_flash(state, jar, FlashKind::Danger, "Please log in.")
    })();

    match result {
        Ok(jar) => (jar, Redirect::to("/login")).into_response(),
        Err(e) => {
            error!("Failed to build login redirect: {:#}", e);
            Redirect::to("/login").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_local_paths_are_forwarded() {
        assert!(is_local_path("/users/1/edit"));
        assert!(!is_local_path("//evil.example.com"));
        assert!(!is_local_path("https://evil.example.com"));
    }
}
