use axum::{
    Extension,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use ripple_types::forms::PageQuery;
use ripple_types::models::User;
use ripple_types::pagination::Page;
use ripple_types::validation::ValidationErrors;

use crate::convert;
use crate::error::{AppError, joined};
use crate::session::CurrentUser;
use crate::state::AppState;
use crate::views;

pub async fn home(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<PageQuery>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let number = Page::parse_number(query.page.as_deref());
    match current.user() {
        Some(user) => {
            render_home(&state, jar, &current, user, number, "", &ValidationErrors::new()).await
        }
        None => Ok(
            views::render_page(&state, jar, &current, "", &views::static_pages::home_anonymous())
                .into_response(),
        ),
    }
}

/// The logged-in home page: sidebar, micropost form (with any rejected
/// `content` and its errors) and one page of the feed.
pub(crate) async fn render_home(
    state: &AppState,
    jar: CookieJar,
    current: &CurrentUser,
    user: &User,
    page_number: u32,
    content: &str,
    errors: &ValidationErrors,
) -> Result<Response, AppError> {
    let st = state.clone();
    let user_id = user.id.to_string();
    let (stats, posts, page) = joined(
        tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
            let stats = st.db.user_stats(&user_id)?;
            let page = Page::new(page_number, st.settings.per_page, st.db.count_feed(&user_id)?);
            let posts: Vec<_> = st
                .db
                .feed(&user_id, page.per_page, page.offset())?
                .into_iter()
                .map(convert::micropost)
                .collect();
            Ok((stats, posts, page))
        })
        .await,
    )?;

    let body = views::static_pages::home(
        user,
        stats.microposts,
        &views::users::stats(user, &stats),
        &views::microposts::form(content, errors),
        &views::microposts::list(&posts, &page, "/", Some(user)),
    );
    Ok(views::render_page(state, jar, current, "", &body).into_response())
}

pub async fn help(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
) -> impl IntoResponse {
    views::render_page(&state, jar, &current, "Help", &views::static_pages::help())
}

pub async fn about(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
) -> impl IntoResponse {
    views::render_page(&state, jar, &current, "About", &views::static_pages::about())
}

pub async fn contact(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
) -> impl IntoResponse {
    views::render_page(&state, jar, &current, "Contact", &views::static_pages::contact())
}
