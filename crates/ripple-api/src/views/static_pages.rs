use ripple_types::models::User;

use super::users;

pub fn home_anonymous() -> String {
    r#"<div class="center jumbotron">
  <h1>Welcome to Ripple</h1>
  <h2>A place to share short updates with the people you follow.</h2>
  <a href="/signup" class="btn btn-lg btn-primary">Sign up now!</a>
</div>"#
        .to_string()
}

/// Logged-in home: sidebar, posting form and feed, each pre-rendered.
pub fn home(
    user: &User,
    micropost_count: u64,
    stats_html: &str,
    form_html: &str,
    feed_html: &str,
) -> String {
    format!(
        r#"<div class="row">
  <aside>
    {info}
    {stats}
    <section class="micropost_form">{form}</section>
  </aside>
  <div class="main">
    <h3>Micropost Feed</h3>
    {feed}
  </div>
</div>"#,
        info = users::user_info(user, Some(micropost_count)),
        stats = stats_html,
        form = form_html,
        feed = feed_html,
    )
}

pub fn help() -> String {
    r#"<h1>Help</h1>
<p>Stuck? Start by signing up, activating your account from the link we send,
and following a few people from the <a href="/users">users</a> page.</p>"#
        .to_string()
}

pub fn about() -> String {
    r#"<h1>About</h1>
<p>Ripple is a small microblogging service: post short updates, attach a
picture, and follow other people to see theirs in your feed.</p>"#
        .to_string()
}

pub fn contact() -> String {
    r#"<h1>Contact</h1>
<p>Questions about Ripple? Reach the maintainers through the project's issue
tracker.</p>"#
        .to_string()
}
