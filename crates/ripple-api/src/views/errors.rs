use super::layout;

fn page(title: &str, message: &str) -> String {
    let body = format!(
        r#"<div class="center jumbotron"><h1>{}</h1><p>{}</p><a href="/">Back to the home page</a></div>"#,
        title, message
    );
    layout::render(title, None, None, &body)
}

pub fn not_found() -> String {
    page("Not found", "The page you were looking for doesn't exist.")
}

pub fn bad_request() -> String {
    page("Bad request", "The request could not be understood.")
}

pub fn internal() -> String {
    page("Something went wrong", "We're sorry, but something went wrong. Please try again later.")
}
