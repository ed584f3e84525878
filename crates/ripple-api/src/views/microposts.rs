use chrono::Utc;

use ripple_types::models::{Micropost, User};
use ripple_types::pagination::Page;
use ripple_types::validation::{MAX_MICROPOST_LENGTH, ValidationErrors};

use super::helpers::{attr, e, error_explanation, gravatar_for, paginate, time_ago_in_words};

pub fn micropost(post: &Micropost, viewer: Option<&User>) -> String {
    let picture = post
        .picture
        .as_deref()
        .map(|name| format!(r#"<img src="/uploads/{}" alt="picture">"#, attr(name)))
        .unwrap_or_default();

    let delete = match viewer {
        Some(user) if user.id == post.user_id => format!(
            r#" <a href="/microposts/{}" data-method="delete" data-confirm="You sure?">delete</a>"#,
            post.id
        ),
        _ => String::new(),
    };

    format!(
        r#"<li id="micropost-{id}">
  <a href="/users/{user_id}">{gravatar}</a>
  <span class="user"><a href="/users/{user_id}">{name}</a></span>
  <span class="content">{content}{picture}</span>
  <span class="timestamp">Posted {ago} ago.{delete}</span>
</li>"#,
        id = post.id,
        user_id = post.user_id,
        gravatar = gravatar_for(&post.author_name, &post.author_email, 50),
        name = e(&post.author_name),
        content = e(&post.content),
        picture = picture,
        ago = time_ago_in_words(post.created_at, Utc::now()),
        delete = delete,
    )
}

/// An `<ol class="microposts">` followed by page links, or nothing when empty.
pub fn list(posts: &[Micropost], page: &Page, base_path: &str, viewer: Option<&User>) -> String {
    if posts.is_empty() {
        return String::new();
    }
    let items: String = posts.iter().map(|p| micropost(p, viewer)).collect();
    format!(
        r#"<ol class="microposts">{}</ol>{}"#,
        items,
        paginate(page, base_path)
    )
}

pub fn form(content: &str, errors: &ValidationErrors) -> String {
    format!(
        r#"<form class="micropost_form" action="/microposts" method="post" enctype="multipart/form-data">
  {errors}
  <div class="field">
    <textarea name="content" maxlength="{max}" placeholder="Compose new micropost...">{content}</textarea>
  </div>
  <input type="submit" value="Post" class="btn btn-primary">
  <span class="picture">
    <input type="file" id="micropost_picture" name="picture" accept="image/jpeg,image/gif,image/png">
  </span>
</form>"#,
        errors = error_explanation(errors),
        max = MAX_MICROPOST_LENGTH,
        content = e(content),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user(name: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: name.into(),
            email: format!("{}@example.com", name),
            admin: false,
            activated: true,
            created_at: Utc::now(),
        }
    }

    fn post_by(author: &User, content: &str) -> Micropost {
        Micropost {
            id: Uuid::new_v4(),
            user_id: author.id,
            author_name: author.name.clone(),
            author_email: author.email.clone(),
            content: content.into(),
            picture: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn delete_link_only_for_author() {
        let alice = user("alice");
        let bob = user("bob");
        let post = post_by(&alice, "hello <world>");

        let own = micropost(&post, Some(&alice));
        assert!(own.contains(r#"data-method="delete""#));
        assert!(own.contains("hello &lt;world&gt;"));

        assert!(!micropost(&post, Some(&bob)).contains(r#"data-method="delete""#));
        assert!(!micropost(&post, None).contains(r#"data-method="delete""#));
    }

    #[test]
    fn picture_is_rendered() {
        let alice = user("alice");
        let mut post = post_by(&alice, "look");
        post.picture = Some("abc.png".into());
        assert!(micropost(&post, None).contains(r#"<img src="/uploads/abc.png""#));
    }
}
