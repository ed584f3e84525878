use chrono::{DateTime, Utc};
use md5::{Digest, Md5};

use ripple_types::pagination::Page;
use ripple_types::validation::ValidationErrors;

/// Escape text for an element body.
pub fn e(text: &str) -> String {
    html_escape::encode_text(text).to_string()
}

/// Escape text for a double-quoted attribute value.
pub fn attr(text: &str) -> String {
    html_escape::encode_double_quoted_attribute(text).to_string()
}

pub fn gravatar_url(email: &str, size: u32) -> String {
    let hash = hex::encode(Md5::digest(email.trim().to_lowercase().as_bytes()));
    format!("https://secure.gravatar.com/avatar/{}?s={}", hash, size)
}

pub fn gravatar_for(name: &str, email: &str, size: u32) -> String {
    format!(
        r#"<img src="{}" alt="{}" class="gravatar" width="{size}" height="{size}">"#,
        gravatar_url(email, size),
        attr(name),
    )
}

/// `pluralize(1, "micropost")` is `"1 micropost"`, anything else takes an `s`.
pub fn pluralize(count: u64, singular: &str) -> String {
    if count == 1 {
        format!("1 {}", singular)
    } else {
        format!("{} {}s", count, singular)
    }
}

pub fn time_ago_in_words(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds().max(0);
    let minutes = (seconds as f64 / 60.0).round() as i64;

    match minutes {
        0 => "less than a minute".into(),
        1 => "1 minute".into(),
        2..=44 => format!("{} minutes", minutes),
        45..=89 => "about 1 hour".into(),
        90..=1439 => format!("about {} hours", (minutes as f64 / 60.0).round() as i64),
        1440..=2519 => "1 day".into(),
        2520..=43199 => format!("{} days", (minutes as f64 / 1440.0).round() as i64),
        43200..=86399 => "about 1 month".into(),
        86400..=525599 => format!("{} months", (minutes as f64 / 43200.0).round() as i64),
        _ => {
            let years = minutes / 525600;
            if years == 1 { "about 1 year".into() } else { format!("about {} years", years) }
        }
    }
}

/// Page links for a list at `base_path`; empty when everything fits on one page.
pub fn paginate(page: &Page, base_path: &str) -> String {
    if !page.is_paginated() {
        return String::new();
    }

    let link = |n: u32, label: &str| format!(r#"<a href="{}?page={}">{}</a>"#, attr(base_path), n, label);
    let total = page.total_pages();
    let mut html = String::from(r#"<div class="pagination">"#);

    if page.has_previous() {
        html.push_str(&link(page.number - 1, "&larr; Previous"));
    } else {
        html.push_str(r#"<span class="previous_page disabled">&larr; Previous</span>"#);
    }

    let mut gap = false;
    for n in 1..=total {
        let near = n.abs_diff(page.number) <= 2;
        if n == 1 || n == total || near {
            gap = false;
            if n == page.number {
                html.push_str(&format!(r#"<em class="current">{}</em>"#, n));
            } else {
                html.push_str(&link(n, &n.to_string()));
            }
        } else if !gap {
            gap = true;
            html.push_str(r#"<span class="gap">&hellip;</span>"#);
        }
    }

    if page.has_next() {
        html.push_str(&link(page.number + 1, "Next &rarr;"));
    } else {
        html.push_str(r#"<span class="next_page disabled">Next &rarr;</span>"#);
    }

    html.push_str("</div>");
    html
}

pub fn error_explanation(errors: &ValidationErrors) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let items: String = errors
        .messages()
        .iter()
        .map(|m| format!("<li>{}</li>", e(m)))
        .collect();
    format!(
        r#"<div id="error_explanation"><div class="alert alert-danger">The form contains {}.</div><ul>{}</ul></div>"#,
        pluralize(errors.len() as u64, "error"),
        items,
    )
}
