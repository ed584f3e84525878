use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, warn};
use uuid::Uuid;

use ripple_types::forms::FollowForm;

use crate::error::AppError;
use crate::session::{self, FlashKind, LoggedIn};
use crate::state::{AppState, blocking};

pub async fn create(
    State(state): State<AppState>,
    LoggedIn(user): LoggedIn,
    jar: CookieJar,
    Form(form): Form<FollowForm>,
) -> Result<Response, AppError> {
    let followed_id = form.followed_id;
    let target = blocking(&state, move |st| st.db.get_user_by_id(&followed_id))
        .await?
        .ok_or(AppError::NotFound)?;
    let profile = format!("/users/{}", target.id);
    let follower_id = user.id.to_string();

    if target.id == follower_id {
        warn!("User {} tried to follow themselves", follower_id);
        return session::redirect_with_flash(
            &state,
            jar,
            FlashKind::Danger,
            "You can't follow yourself",
            &profile,
        );
    }

    let (follower, followed) = (follower_id.clone(), target.id.clone());
    let created = blocking(&state, move |st| {
        st.db.follow(&Uuid::new_v4().to_string(), &follower, &followed)
    })
    .await?;
    if created {
        info!("User {} followed {}", follower_id, target.id);
    }
    Ok((jar, Redirect::to(&profile)).into_response())
}

pub async fn destroy(
    State(state): State<AppState>,
    LoggedIn(user): LoggedIn,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let rel = blocking(&state, move |st| st.db.get_relationship(&id))
        .await?
        .ok_or(AppError::NotFound)?;
    let follower_id = user.id.to_string();
    if rel.follower_id != follower_id {
        warn!("User {} tried to remove relationship {} of {}", follower_id, rel.id, rel.follower_id);
        return Ok(Redirect::to("/").into_response());
    }

    let (follower, followed) = (follower_id.clone(), rel.followed_id.clone());
    let removed = blocking(&state, move |st| st.db.unfollow(&follower, &followed)).await?;
    if removed {
        info!("User {} unfollowed {}", follower_id, rel.followed_id);
    }
    Ok(Redirect::to(&format!("/users/{}", rel.followed_id)).into_response())
}
