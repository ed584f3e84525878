//! Server-rendered HTML. Every user-supplied string passes through
//! [`helpers::e`] or [`helpers::attr`] before it reaches markup.

pub mod errors;
pub mod helpers;
pub mod layout;
pub mod microposts;
pub mod sessions;
pub mod static_pages;
pub mod users;

use axum::response::Html;
use axum_extra::extract::cookie::CookieJar;

use crate::session::{self, CurrentUser, Flash};
use crate::state::AppStateInner;

/// Wrap `body` in the site layout, consuming any pending flash message.
pub fn render_page(
    state: &AppStateInner,
    jar: CookieJar,
    current: &CurrentUser,
    title: &str,
    body: &str,
) -> (CookieJar, Html<String>) {
    let (jar, flash) = session::take_flash(state, jar);
    let html = layout::render(title, current.user(), flash.as_ref(), body);
    (jar, Html(html))
}

/// Render with a message that applies to this response only, leaving any
/// queued flash for the next page.
pub fn render_page_now(current: &CurrentUser, title: &str, body: &str, flash: Flash) -> Html<String> {
    Html(layout::render(title, current.user(), Some(&flash), body))
}
