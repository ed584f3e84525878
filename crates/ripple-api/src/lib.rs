pub mod account_activations;
pub mod assets;
pub mod convert;
pub mod error;
pub mod microposts;
pub mod middleware;
pub mod relationships;
pub mod session;
pub mod sessions;
pub mod state;
pub mod static_pages;
pub mod uploads;
pub mod users;
pub mod views;

use axum::{
    Router,
    extract::{DefaultBodyLimit, Request},
    http::Method,
    routing::{delete, get, post},
};
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::error::AppError;
use crate::state::AppState;

/// HTML forms can only POST; `?_method=PATCH|PUT|DELETE` on a POST names the
/// method the form meant.
pub fn method_override(mut req: Request) -> Request {
    if req.method() != Method::POST {
        return req;
    }
    let requested = req.uri().query().and_then(|query| {
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "_method")
            .map(|(_, value)| value.to_ascii_uppercase())
    });
    let method = match requested.as_deref() {
        Some("PATCH") => Method::PATCH,
        Some("PUT") => Method::PUT,
        Some("DELETE") => Method::DELETE,
        _ => return req,
    };
    *req.method_mut() = method;
    req
}

async fn not_found() -> AppError {
    AppError::NotFound
}

/// The full application. Method override runs before routing, so it wraps
/// the routed service instead of being a route layer.
pub fn app(state: AppState) -> Router {
    let pages = Router::new()
        .route("/", get(static_pages::home))
        .route("/help", get(static_pages::help))
        .route("/about", get(static_pages::about))
        .route("/contact", get(static_pages::contact))
        .route("/signup", get(users::new))
        .route("/login", get(sessions::new).post(sessions::create))
        .route("/logout", delete(sessions::destroy))
        .route("/users", get(users::index).post(users::create))
        .route(
            "/users/{id}",
            get(users::show)
                .patch(users::update)
                .put(users::update)
                .delete(users::destroy),
        )
        .route("/users/{id}/edit", get(users::edit))
        .route("/users/{id}/following", get(users::following))
        .route("/users/{id}/followers", get(users::followers))
        .route(
            "/microposts",
            post(microposts::create).layer(DefaultBodyLimit::max(microposts::MAX_UPLOAD_BYTES)),
        )
        .route("/microposts/{id}", delete(microposts::destroy))
        .route("/relationships", post(relationships::create))
        .route("/relationships/{id}", delete(relationships::destroy))
        .route("/account_activations/{token}/edit", get(account_activations::edit))
        .fallback(not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::load_current_user,
        ))
        // Static files skip the session lookup.
        .route("/assets/{*path}", get(assets::serve))
        .nest_service("/uploads", ServeDir::new(state.storage.dir()))
        .with_state(state);

    let routed = ServiceBuilder::new()
        .map_request(method_override)
        .service(pages);

    Router::new()
        .fallback_service(routed)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn post(uri: &str) -> Request {
        Request::builder().method(Method::POST).uri(uri).body(Body::empty()).unwrap()
    }

    #[test]
    fn rewrites_post_with_method_param() {
        assert_eq!(method_override(post("/users/1?_method=PATCH")).method(), Method::PATCH);
        assert_eq!(method_override(post("/logout?_method=delete")).method(), Method::DELETE);
        assert_eq!(method_override(post("/users/1?a=b&_method=PUT")).method(), Method::PUT);
    }

    #[test]
    fn leaves_other_requests_alone() {
        assert_eq!(method_override(post("/users")).method(), Method::POST);
        assert_eq!(method_override(post("/users?_method=GET")).method(), Method::POST);

        let get = Request::builder()
            .method(Method::GET)
            .uri("/users?_method=DELETE")
            .body(Body::empty())
            .unwrap();
        assert_eq!(method_override(get).method(), Method::GET);
    }
}
