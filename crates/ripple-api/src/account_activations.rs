use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, warn};

use ripple_crypto::digest;
use ripple_types::forms::ActivationQuery;

use crate::error::{AppError, joined};
use crate::session::{self, FlashKind};
use crate::state::AppState;

/// `GET /account_activations/{token}/edit?email=...`
pub async fn edit(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Query(query): Query<ActivationQuery>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let st = state.clone();
    let email = query.email.clone();
    let user = joined(
        tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
            let user = st.db.get_user_by_email(&email)?.filter(|u| {
                !u.activated && digest::authenticated(u.activation_digest.as_deref(), &token)
            });
            if let Some(user) = &user {
                st.db.activate_user(&user.id)?;
            }
            Ok(user)
        })
        .await,
    )?;

    let Some(user) = user else {
        warn!("Invalid activation link for {}", query.email);
        return session::redirect_with_flash(&state, jar, FlashKind::Danger, "Invalid activation link", "/");
    };

    info!("User {} activated", user.id);

    let jar = session::log_in(&state, jar, &user.id)?;
    let jar = session::set_flash(&state, jar, FlashKind::Success, "Account activated!")?;
    Ok((jar, Redirect::to(&format!("/users/{}", user.id))).into_response())
}
