use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, error, warn};

use ripple_crypto::digest;
use ripple_db::models::UserRow;

use crate::convert;
use crate::session::{self, CurrentUser, REMEMBER_COOKIE, RememberClaims, SESSION_COOKIE, SessionClaims};
use crate::state::{AppState, AppStateInner};

/// How the current user was recognised.
enum Resolved {
    Anonymous,
    Session(UserRow),
    Remembered(UserRow),
}

fn resolve(state: &AppStateInner, session: Option<String>, remember: Option<String>) -> anyhow::Result<Resolved> {
    if let Some(claims) = session.and_then(|raw| state.signer.verify::<SessionClaims>(&raw)) {
        if let Some(user) = state.db.get_user_by_id(&claims.sub)? {
            return Ok(Resolved::Session(user));
        }
        debug!("Session names unknown user {}", claims.sub);
    }

    let Some(raw) = remember else {
        return Ok(Resolved::Anonymous);
    };
    let Some(claims) = state.signer.verify::<RememberClaims>(&raw) else {
        warn!("Ignoring remember cookie with bad signature");
        return Ok(Resolved::Anonymous);
    };
    let Some(user) = state.db.get_user_by_id(&claims.sub)? else {
        return Ok(Resolved::Anonymous);
    };
    if user.activated && digest::authenticated(user.remember_digest.as_deref(), &claims.token) {
        Ok(Resolved::Remembered(user))
    } else {
        Ok(Resolved::Anonymous)
    }
}

fn sets_cookie(response: &Response, name: &str) -> bool {
    let prefix = format!("{}=", name);
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.starts_with(&prefix))
}

/// Resolve the logged-in user from the session or remember cookie and expose
/// it to handlers as a [`CurrentUser`] extension.
///
/// A login restored from the remember cookie gets a fresh session cookie,
/// unless the handler already set or cleared one itself.
pub async fn load_current_user(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let jar = CookieJar::from_headers(req.headers());
    let session_raw = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let remember_raw = jar.get(REMEMBER_COOKIE).map(|c| c.value().to_string());

    let resolved = if session_raw.is_none() && remember_raw.is_none() {
        Ok(Resolved::Anonymous)
    } else {
        let st = state.clone();
        tokio::task::spawn_blocking(move || resolve(&st, session_raw, remember_raw))
            .await
            .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))
            .and_then(|r| r)
    };

    let (user, remembered) = match resolved {
        Ok(Resolved::Anonymous) => (None, None),
        Ok(Resolved::Session(row)) => (Some(convert::user(&row)), None),
        Ok(Resolved::Remembered(row)) => (Some(convert::user(&row)), Some(row.id)),
        Err(e) => {
            error!("Failed to resolve current user: {:#}", e);
            (None, None)
        }
    };

    req.extensions_mut().insert(CurrentUser(user));
    let response = next.run(req).await;

    let Some(user_id) = remembered else {
        return response;
    };
    if sets_cookie(&response, SESSION_COOKIE) {
        return response;
    }
    match session::log_in(&state, CookieJar::new(), &user_id) {
        Ok(jar) => (jar, response).into_response(),
        Err(e) => {
            error!("Failed to refresh session for {}: {:#}", user_id, e);
            response
        }
    }
}
