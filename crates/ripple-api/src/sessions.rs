use axum::{
    Extension, Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, warn};

use ripple_crypto::digest;
use ripple_types::forms::LoginForm;
use ripple_types::validation::normalize_email;

use crate::error::{AppError, joined};
use crate::session::{self, CurrentUser, Flash, FlashKind};
use crate::state::{AppState, blocking};
use crate::views;

pub async fn new(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
) -> impl IntoResponse {
    views::render_page(&state, jar, &current, "Log in", &views::sessions::new(""))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let email = normalize_email(&form.email);

    // Argon2 verify is CPU-bound.
    let st = state.clone();
    let lookup_email = email.clone();
    let password = form.password.clone();
    let user = joined(
        tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
            let user = st.db.get_user_by_email(&lookup_email)?;
            Ok(user.filter(|u| digest::verify(&password, &u.password_digest)))
        })
        .await,
    )?;

    let Some(user) = user else {
        warn!("Failed login for {}", email);
        let flash = Flash::new(FlashKind::Danger, "Invalid email/password combination");
        let body = views::sessions::new(&form.email);
        return Ok(views::render_page_now(&current, "Log in", &body, flash).into_response());
    };

    if !user.activated {
        return session::redirect_with_flash(
            &state,
            jar,
            FlashKind::Warning,
            "Account not activated. Check your email for the activation link.",
            "/",
        );
    }

    let jar = session::log_in(&state, jar, &user.id)?;
    let remember = form.remember();
    let user_id = user.id.clone();
    let jar = blocking(&state, move |st| {
        if remember {
            session::remember(st, jar, &user_id)
        } else {
            session::forget(st, jar, &user_id)
        }
    })
    .await?;
    info!("User {} logged in", user.id);

    let (jar, forwarding) = session::take_location(&state, jar);
    let target = forwarding.unwrap_or_else(|| format!("/users/{}", user.id));
    Ok((jar, Redirect::to(&target)).into_response())
}

pub async fn destroy(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let jar = match current.user() {
        Some(user) => {
            let user_id = user.id.to_string();
            blocking(&state, move |st| session::log_out(st, jar, &user_id)).await?
        }
        None => jar,
    };
    Ok((jar, Redirect::to("/")).into_response())
}
