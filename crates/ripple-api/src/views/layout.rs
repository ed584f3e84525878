use ripple_types::models::User;

use super::helpers::{attr, e};
use crate::session::Flash;

const BASE_TITLE: &str = "Ripple";

/// `"Help | Ripple"`, or just the site name for an empty page title.
pub fn full_title(page_title: &str) -> String {
    if page_title.is_empty() {
        BASE_TITLE.to_string()
    } else {
        format!("{} | {}", page_title, BASE_TITLE)
    }
}

fn header(current_user: Option<&User>) -> String {
    let account = match current_user {
        Some(user) => format!(
            r#"<li><a href="/users">Users</a></li>
          <li><a href="/users/{id}">Profile</a></li>
          <li><a href="/users/{id}/edit">Settings</a></li>
          <li><a href="/logout" data-method="delete">Log out</a></li>"#,
            id = user.id
        ),
        None => r#"<li><a href="/login">Log in</a></li>"#.to_string(),
    };

    format!(
        r#"<header class="navbar">
      <div class="container">
        <a id="logo" href="/">ripple</a>
        <nav>
          <ul>
          <li><a href="/">Home</a></li>
          <li><a href="/help">Help</a></li>
          {}
          </ul>
        </nav>
      </div>
    </header>"#,
        account
    )
}

fn footer() -> &'static str {
    r#"<footer class="footer">
      <small>A microblogging sample app</small>
      <nav>
        <ul>
          <li><a href="/about">About</a></li>
          <li><a href="/contact">Contact</a></li>
        </ul>
      </nav>
    </footer>"#
}

pub fn flash_html(flash: Option<&Flash>) -> String {
    flash
        .map(|f| {
            format!(
                r#"<div class="alert alert-{}">{}</div>"#,
                f.kind.as_str(),
                e(&f.message)
            )
        })
        .unwrap_or_default()
}

pub fn render(title: &str, current_user: Option<&User>, flash: Option<&Flash>, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <title>{title}</title>
    <link rel="stylesheet" href="/assets/ripple.css">
    <script src="/assets/ripple.js" defer></script>
  </head>
  <body>
    {header}
    <div class="container">
      {flash}
      {body}
      {footer}
    </div>
  </body>
</html>
"#,
        title = attr(&full_title(title)),
        header = header(current_user),
        flash = flash_html(flash),
        body = body,
        footer = footer(),
    )
}
