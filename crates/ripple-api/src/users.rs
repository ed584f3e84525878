use axum::{
    Extension, Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, warn};
use uuid::Uuid;

use ripple_crypto::{digest, tokens};
use ripple_db::{Database, is_constraint_violation, models::NewUser};
use ripple_types::forms::{PageQuery, UserForm};
use ripple_types::pagination::Page;
use ripple_types::validation::{
    PasswordPolicy, ValidationErrors, normalize_email, password_unchanged, validate_user,
};

use crate::convert;
use crate::error::{AppError, joined};
use crate::session::{self, CurrentUser, FlashKind, LoggedIn};
use crate::state::{AppState, blocking};
use crate::views::{self, users::FollowButton};

const EMAIL_TAKEN: &str = "Email has already been taken";

fn page_number(query: &PageQuery) -> u32 {
    Page::parse_number(query.page.as_deref())
}

// -- Listing and profiles --

pub async fn index(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    LoggedIn(viewer): LoggedIn,
    Query(query): Query<PageQuery>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let st = state.clone();
    let number = page_number(&query);
    let (users, page) = joined(
        tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
            let page = Page::new(number, st.settings.per_page, st.db.count_activated_users()?);
            let rows = st.db.list_activated_users(page.per_page, page.offset())?;
            Ok((rows.iter().map(convert::user).collect::<Vec<_>>(), page))
        })
        .await,
    )?;

    let body = views::users::index(&users, &page, &viewer);
    Ok(views::render_page(&state, jar, &current, "All users", &body))
}

pub async fn show(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let lookup = id.clone();
    let row = blocking(&state, move |st| st.db.get_user_by_id(&lookup))
        .await?
        .ok_or(AppError::NotFound)?;
    if !row.activated {
        return Ok(Redirect::to("/").into_response());
    }
    let user = convert::user(&row);

    let viewer_id = current
        .user()
        .filter(|viewer| viewer.id != user.id)
        .map(|viewer| viewer.id.to_string());
    let number = page_number(&query);
    let (stats, page, posts, relationship) = blocking(&state, move |st| -> anyhow::Result<_> {
        let stats = st.db.user_stats(&id)?;
        let page = Page::new(number, st.settings.per_page, stats.microposts);
        let posts: Vec<_> = st
            .db
            .user_microposts(&id, page.per_page, page.offset())?
            .into_iter()
            .map(convert::micropost)
            .collect();
        let relationship = match viewer_id {
            Some(viewer_id) => Some(st.db.find_relationship(&viewer_id, &id)?),
            None => None,
        };
        Ok((stats, page, posts, relationship))
    })
    .await?;

    let button = match relationship {
        Some(Some(rel)) => FollowButton::Unfollow { relationship_id: rel.id },
        Some(None) => FollowButton::Follow,
        None => FollowButton::Hidden,
    };

    let body = views::users::show(&user, &stats, &posts, &page, &button, current.user());
    Ok(views::render_page(&state, jar, &current, &user.name, &body).into_response())
}

// -- Signup --

pub async fn new(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
) -> impl IntoResponse {
    let body = views::users::new(&UserForm::default(), &ValidationErrors::new());
    views::render_page(&state, jar, &current, "Sign up", &body)
}

/// Check everything about a submitted user, including email ownership.
fn check_user(
    db: &Database,
    form: &UserForm,
    policy: PasswordPolicy,
    except_id: Option<&str>,
) -> anyhow::Result<ValidationErrors> {
    let mut errors = validate_user(form, policy).err().unwrap_or_default();
    if !form.email.trim().is_empty() && db.email_taken(&normalize_email(&form.email), except_id)? {
        errors.add(EMAIL_TAKEN);
    }
    Ok(errors)
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
    Form(form): Form<UserForm>,
) -> Result<Response, AppError> {
    let st = state.clone();
    let submitted = form.clone();
    let outcome = joined(
        tokio::task::spawn_blocking(move || -> anyhow::Result<Result<(String, String), ValidationErrors>> {
            let mut errors = check_user(&st.db, &submitted, PasswordPolicy::Required, None)?;
            if !errors.is_empty() {
                return Ok(Err(errors));
            }

            let id = Uuid::new_v4().to_string();
            let email = normalize_email(&submitted.email);
            let activation_token = tokens::new_token();
            let password_digest = digest::digest(&submitted.password)?;
            let activation_digest = digest::digest(&activation_token)?;

            let new_user = NewUser {
                id: &id,
                name: submitted.name.trim(),
                email: &email,
                password_digest: &password_digest,
                activation_digest: Some(&activation_digest),
                activated: false,
                admin: false,
            };
            match st.db.create_user(&new_user) {
                Ok(()) => Ok(Ok((id, activation_token))),
                Err(e) if is_constraint_violation(&e) => {
                    errors.add(EMAIL_TAKEN);
                    Ok(Err(errors))
                }
                Err(e) => Err(e),
            }
        })
        .await,
    )?;

    let (id, activation_token) = match outcome {
        Ok(created) => created,
        Err(errors) => {
            let body = views::users::new(&form, &errors);
            return Ok(views::render_page(&state, jar, &current, "Sign up", &body).into_response());
        }
    };

    let email = normalize_email(&form.email);
    info!("User {} signed up as {}", id, email);
    info!(
        "Activation link for {}: {}/account_activations/{}/edit?email={}",
        email,
        state.settings.base_url.trim_end_matches('/'),
        activation_token,
        urlencoding::encode(&email),
    );

    session::redirect_with_flash(
        &state,
        jar,
        FlashKind::Info,
        "Please check your email to activate your account.",
        "/",
    )
}

// -- Settings --

pub async fn edit(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    LoggedIn(viewer): LoggedIn,
    Path(id): Path<String>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    if viewer.id.to_string() != id {
        return Ok(Redirect::to("/").into_response());
    }
    let form = UserForm {
        name: viewer.name.clone(),
        email: viewer.email.clone(),
        ..Default::default()
    };
    let body = views::users::edit(&viewer, &form, &ValidationErrors::new());
    Ok(views::render_page(&state, jar, &current, "Edit user", &body).into_response())
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    LoggedIn(viewer): LoggedIn,
    Path(id): Path<String>,
    jar: CookieJar,
    Form(form): Form<UserForm>,
) -> Result<Response, AppError> {
    if viewer.id.to_string() != id {
        return Ok(Redirect::to("/").into_response());
    }

    let st = state.clone();
    let submitted = form.clone();
    let user_id = id.clone();
    let outcome = joined(
        tokio::task::spawn_blocking(move || -> anyhow::Result<Result<(), ValidationErrors>> {
            let mut errors =
                check_user(&st.db, &submitted, PasswordPolicy::KeepIfBlank, Some(&user_id))?;
            if !errors.is_empty() {
                return Ok(Err(errors));
            }

            let password_digest = if password_unchanged(&submitted) {
                None
            } else {
                Some(digest::digest(&submitted.password)?)
            };
            let email = normalize_email(&submitted.email);
            match st.db.update_user(&user_id, submitted.name.trim(), &email, password_digest.as_deref()) {
                Ok(()) => Ok(Ok(())),
                Err(e) if is_constraint_violation(&e) => {
                    errors.add(EMAIL_TAKEN);
                    Ok(Err(errors))
                }
                Err(e) => Err(e),
            }
        })
        .await,
    )?;

    if let Err(errors) = outcome {
        let body = views::users::edit(&viewer, &form, &errors);
        return Ok(views::render_page(&state, jar, &current, "Edit user", &body).into_response());
    }

    info!("User {} updated their profile", id);
    session::redirect_with_flash(&state, jar, FlashKind::Success, "Profile updated", &format!("/users/{}", id))
}

// -- Admin --

pub async fn destroy(
    State(state): State<AppState>,
    LoggedIn(viewer): LoggedIn,
    Path(id): Path<String>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    if !viewer.admin || viewer.id.to_string() == id {
        warn!("User {} may not delete user {}", viewer.id, id);
        return Ok(Redirect::to("/").into_response());
    }

    let target = id.clone();
    let orphaned = blocking(&state, move |st| -> anyhow::Result<Option<Vec<String>>> {
        let pictures = st.db.user_pictures(&target)?;
        if !st.db.delete_user(&target)? {
            return Ok(None);
        }
        let mut orphaned = Vec::new();
        for picture in pictures {
            if !st.db.picture_in_use(&picture)? {
                orphaned.push(picture);
            }
        }
        Ok(Some(orphaned))
    })
    .await?
    .ok_or(AppError::NotFound)?;
    info!("Admin {} deleted user {}", viewer.id, id);

    for picture in orphaned {
        state.storage.delete(&picture).await?;
    }

    session::redirect_with_flash(&state, jar, FlashKind::Success, "User deleted", "/users")
}

// -- Follow lists --

#[derive(Clone, Copy)]
enum FollowList {
    Following,
    Followers,
}

async fn show_follow(
    state: AppState,
    current: CurrentUser,
    id: String,
    query: PageQuery,
    jar: CookieJar,
    list: FollowList,
) -> Result<Response, AppError> {
    let lookup = id.clone();
    let row = blocking(&state, move |st| st.db.get_user_by_id(&lookup))
        .await?
        .ok_or(AppError::NotFound)?;
    let user = convert::user(&row);

    let (title, segment) = match list {
        FollowList::Following => ("Following", "following"),
        FollowList::Followers => ("Followers", "followers"),
    };
    let number = page_number(&query);
    let user_id = id.clone();
    let (stats, page, users) = blocking(&state, move |st| -> anyhow::Result<_> {
        let stats = st.db.user_stats(&user_id)?;
        let total = match list {
            FollowList::Following => stats.following,
            FollowList::Followers => stats.followers,
        };
        let page = Page::new(number, st.settings.per_page, total);
        let rows = match list {
            FollowList::Following => st.db.following(&user_id, page.per_page, page.offset())?,
            FollowList::Followers => st.db.followers(&user_id, page.per_page, page.offset())?,
        };
        Ok((stats, page, rows.iter().map(convert::user).collect::<Vec<_>>()))
    })
    .await?;

    let base_path = format!("/users/{}/{}", id, segment);
    let body = views::users::show_follow(title, &user, &stats, &users, &page, &base_path);
    Ok(views::render_page(&state, jar, &current, title, &body).into_response())
}

pub async fn following(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    LoggedIn(_): LoggedIn,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    show_follow(state, current, id, query, jar, FollowList::Following).await
}

pub async fn followers(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    LoggedIn(_): LoggedIn,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    show_follow(state, current, id, query, jar, FollowList::Followers).await
}

// -- Bootstrap --

/// Create an activated admin account unless the email is already registered.
pub fn bootstrap_admin(db: &Database, name: &str, email: &str, password: &str) -> anyhow::Result<()> {
    if db.get_user_by_email(email)?.is_some() {
        info!("Admin account {} already exists", email);
        return Ok(());
    }

    let form = UserForm {
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        password_confirmation: password.to_string(),
    };
    if let Err(errors) = validate_user(&form, PasswordPolicy::Required) {
        anyhow::bail!("Invalid admin account: {}", errors.messages().join(", "));
    }

    let id = Uuid::new_v4().to_string();
    let email = normalize_email(email);
    let password_digest = digest::digest(password)?;
    db.create_user(&NewUser {
        id: &id,
        name: name.trim(),
        email: &email,
        password_digest: &password_digest,
        activation_digest: None,
        activated: true,
        admin: true,
    })?;
    info!("Created admin account {}", email);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_admin_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        bootstrap_admin(&db, "Admin", "Admin@Example.com", "secret123").unwrap();
        bootstrap_admin(&db, "Admin", "admin@example.com", "secret123").unwrap();

        assert_eq!(db.count_users().unwrap(), 1);
        let admin = db.get_user_by_email("admin@example.com").unwrap().unwrap();
        assert!(admin.admin);
        assert!(admin.activated);
        assert!(digest::verify("secret123", &admin.password_digest));
    }

    #[test]
    fn bootstrap_admin_rejects_bad_input() {
        let db = Database::open_in_memory().unwrap();
        assert!(bootstrap_admin(&db, "Admin", "not-an-email", "secret123").is_err());
        assert!(bootstrap_admin(&db, "Admin", "admin@example.com", "123").is_err());
        assert_eq!(db.count_users().unwrap(), 0);
    }
}
