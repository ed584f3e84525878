use ripple_types::forms::UserForm;
use ripple_types::models::{Micropost, User, UserStats};
use ripple_types::pagination::Page;
use ripple_types::validation::ValidationErrors;

use super::helpers::{attr, e, error_explanation, gravatar_for, paginate, pluralize};
use super::microposts;

/// What the profile page offers the viewer next to the stats.
pub enum FollowButton {
    Hidden,
    Follow,
    Unfollow { relationship_id: String },
}

pub fn user_info(user: &User, microposts: Option<u64>) -> String {
    let count = microposts
        .map(|n| format!("<span>{}</span>", pluralize(n, "micropost")))
        .unwrap_or_default();
    format!(
        r#"<section class="user_info">
  <a href="/users/{id}">{gravatar}</a>
  <h1>{name}</h1>
  <span><a href="/users/{id}">view my profile</a></span>
  {count}
</section>"#,
        id = user.id,
        gravatar = gravatar_for(&user.name, &user.email, 50),
        name = e(&user.name),
        count = count,
    )
}

pub fn stats(user: &User, stats: &UserStats) -> String {
    format!(
        r#"<section class="stats">
  <div class="stats">
    <a href="/users/{id}/following"><strong id="following" class="stat">{following}</strong> following</a>
    <a href="/users/{id}/followers"><strong id="followers" class="stat">{followers}</strong> followers</a>
  </div>
</section>"#,
        id = user.id,
        following = stats.following,
        followers = stats.followers,
    )
}

fn follow_form(profile: &User, button: &FollowButton) -> String {
    match button {
        FollowButton::Hidden => String::new(),
        FollowButton::Follow => format!(
            r#"<div id="follow_form"><form action="/relationships" method="post">
  <input type="hidden" name="followed_id" value="{}">
  <input type="submit" value="Follow" class="btn btn-primary">
</form></div>"#,
            profile.id
        ),
        FollowButton::Unfollow { relationship_id } => format!(
            r#"<div id="follow_form"><form action="/relationships/{}?_method=DELETE" method="post">
  <input type="submit" value="Unfollow" class="btn">
</form></div>"#,
            attr(relationship_id)
        ),
    }
}

pub fn index(users: &[User], page: &Page, viewer: &User) -> String {
    let items: String = users
        .iter()
        .map(|user| {
            let delete = if viewer.admin && user.id != viewer.id {
                format!(
                    r#" | <a href="/users/{}" data-method="delete" data-confirm="You sure?">delete</a>"#,
                    user.id
                )
            } else {
                String::new()
            };
            format!(
                r#"<li>{} <a href="/users/{}">{}</a>{}</li>"#,
                gravatar_for(&user.name, &user.email, 50),
                user.id,
                e(&user.name),
                delete
            )
        })
        .collect();

    let pagination = paginate(page, "/users");
    format!(
        r#"<h1>All users</h1>
{pagination}
<ul class="users">{items}</ul>
{pagination}"#
    )
}

pub fn show(
    user: &User,
    stats: &UserStats,
    posts: &[Micropost],
    page: &Page,
    button: &FollowButton,
    viewer: Option<&User>,
) -> String {
    let posts_html = if stats.microposts > 0 {
        format!(
            "<h3>Microposts ({})</h3>{}",
            stats.microposts,
            microposts::list(posts, page, &format!("/users/{}", user.id), viewer)
        )
    } else {
        String::new()
    };

    format!(
        r#"<div class="row">
  <aside>
    <section class="user_info">
      <h1>{gravatar} {name}</h1>
    </section>
    {stats}
  </aside>
  <div class="main">
    {follow}
    {posts}
  </div>
</div>"#,
        gravatar = gravatar_for(&user.name, &user.email, 80),
        name = e(&user.name),
        stats = self::stats(user, stats),
        follow = follow_form(user, button),
        posts = posts_html,
    )
}

/// Shared by signup and settings; `action` already carries any `_method`.
fn user_form(action: &str, submit: &str, form: &UserForm, errors: &ValidationErrors) -> String {
    format!(
        r#"<form action="{action}" method="post">
  {errors}
  <label for="user_name">Name</label>
  <input id="user_name" type="text" name="name" value="{name}">
  <label for="user_email">Email</label>
  <input id="user_email" type="email" name="email" value="{email}">
  <label for="user_password">Password</label>
  <input id="user_password" type="password" name="password">
  <label for="user_password_confirmation">Confirmation</label>
  <input id="user_password_confirmation" type="password" name="password_confirmation">
  <input type="submit" value="{submit}" class="btn btn-primary">
</form>"#,
        action = attr(action),
        errors = error_explanation(errors),
        name = attr(&form.name),
        email = attr(&form.email),
        submit = attr(submit),
    )
}

pub fn new(form: &UserForm, errors: &ValidationErrors) -> String {
    format!(
        r#"<h1>Sign up</h1>
<div class="row"><div class="main">{}</div></div>"#,
        user_form("/users", "Create my account", form, errors)
    )
}

pub fn edit(user: &User, form: &UserForm, errors: &ValidationErrors) -> String {
    format!(
        r#"<h1>Update your profile</h1>
<div class="row"><div class="main">
{form}
<div class="gravatar_edit">
  {gravatar}
  <a href="https://gravatar.com/emails" target="_blank" rel="noopener">change</a>
</div>
</div></div>"#,
        form = user_form(&format!("/users/{}?_method=PATCH", user.id), "Save changes", form, errors),
        gravatar = gravatar_for(&user.name, &user.email, 80),
    )
}

/// The following/followers listing for `user`.
pub fn show_follow(
    title: &str,
    user: &User,
    stats: &UserStats,
    users: &[User],
    page: &Page,
    base_path: &str,
) -> String {
    let avatars: String = users
        .iter()
        .map(|u| format!(r#"<a href="/users/{}">{}</a>"#, u.id, gravatar_for(&u.name, &u.email, 30)))
        .collect();
    let items: String = users
        .iter()
        .map(|u| {
            format!(
                r#"<li>{} <a href="/users/{}">{}</a></li>"#,
                gravatar_for(&u.name, &u.email, 50),
                u.id,
                e(&u.name)
            )
        })
        .collect();

    let list = if users.is_empty() {
        String::new()
    } else {
        format!(r#"<ul class="users follow">{}</ul>{}"#, items, paginate(page, base_path))
    };

    format!(
        r#"<div class="row">
  <aside>
    <section class="user_info">
      {gravatar}
      <h1>{name}</h1>
      <span><a href="/users/{id}">view my profile</a></span>
      <span><b>Microposts:</b> {microposts}</span>
    </section>
    {stats}
    <div class="user_avatars">{avatars}</div>
  </aside>
  <div class="main">
    <h3>{title}</h3>
    {list}
  </div>
</div>"#,
        gravatar = gravatar_for(&user.name, &user.email, 50),
        name = e(&user.name),
        id = user.id,
        microposts = stats.microposts,
        stats = self::stats(user, stats),
        avatars = avatars,
        title = e(title),
        list = list,
    )
}
