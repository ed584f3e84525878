#![allow(dead_code)]

use std::collections::HashMap;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use ripple_api::state::{AppState, AppStateInner, Settings};
use ripple_api::uploads::Storage;
use ripple_crypto::digest;
use ripple_db::{Database, models::NewUser};

pub const PASSWORD: &str = "password";

/// Drives the full router in-process, carrying cookies between requests the
/// way a browser would.
pub struct TestApp {
    pub state: AppState,
    router: Router,
    cookies: HashMap<String, String>,
    _uploads: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers.get(header::LOCATION).and_then(|v| v.to_str().ok())
    }

    pub fn assert_redirect(&self, to: &str) {
        assert_eq!(self.status, StatusCode::SEE_OTHER, "body: {}", self.body);
        assert_eq!(self.location(), Some(to));
    }

    pub fn count(&self, needle: &str) -> usize {
        self.body.matches(needle).count()
    }
}

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
}

const BOUNDARY: &str = "ripple-test-boundary";

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File { name, file_name, content_type, data } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn form_body(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_settings(Settings::default()).await
    }

    pub async fn with_settings(settings: Settings) -> Self {
        let uploads = tempfile::tempdir().unwrap();
        let storage = Storage::new(uploads.path().join("uploads")).await.unwrap();
        let db = Database::open_in_memory().unwrap();
        let state = AppStateInner::new(db, "test-secret", storage, settings);
        let router = ripple_api::app(state.clone());
        Self {
            state,
            router,
            cookies: HashMap::new(),
            _uploads: uploads,
        }
    }

    // -- Fixtures --

    pub fn create_user(&self, name: &str, email: &str, activated: bool, admin: bool) -> String {
        let id = Uuid::new_v4().to_string();
        let password_digest = digest::digest(PASSWORD).unwrap();
        self.state
            .db
            .create_user(&NewUser {
                id: &id,
                name,
                email,
                password_digest: &password_digest,
                activation_digest: None,
                activated,
                admin,
            })
            .unwrap();
        id
    }

    pub fn create_micropost(&self, user_id: &str, content: &str) -> String {
        let id = Uuid::new_v4().to_string();
        self.state.db.create_micropost(&id, user_id, content, None).unwrap();
        id
    }

    // -- Cookies --

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn drop_cookie(&mut self, name: &str) {
        self.cookies.remove(name);
    }

    pub fn clear_cookies(&mut self) {
        self.cookies.clear();
    }

    fn absorb_cookies(&mut self, headers: &HeaderMap) {
        for value in headers.get_all(header::SET_COOKIE) {
            let Ok(raw) = value.to_str() else { continue };
            let pair = raw.split(';').next().unwrap_or_default();
            let Some((name, value)) = pair.split_once('=') else { continue };
            if value.is_empty() {
                self.cookies.remove(name.trim());
            } else {
                self.cookies.insert(name.trim().to_string(), value.to_string());
            }
        }
    }

    // -- Requests --

    pub async fn send(&mut self, mut req: Request<Body>) -> TestResponse {
        if !self.cookies.is_empty() {
            let cookie = self
                .cookies
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("; ");
            req.headers_mut().insert(header::COOKIE, cookie.parse().unwrap());
        }

        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        self.absorb_cookies(&headers);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(req).await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let req = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form_body(fields)))
            .unwrap();
        self.send(req).await
    }

    pub async fn post_multipart(&mut self, uri: &str, parts: &[Part<'_>]) -> TestResponse {
        let req = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap();
        self.send(req).await
    }

    /// The POST a `data-method="delete"` link turns into.
    pub async fn delete(&mut self, uri: &str) -> TestResponse {
        let sep = if uri.contains('?') { '&' } else { '?' };
        self.post_form(&format!("{}{}_method=DELETE", uri, sep), &[]).await
    }

    pub async fn log_in(&mut self, email: &str, password: &str, remember: bool) -> TestResponse {
        let mut fields = vec![("email", email), ("password", password)];
        if remember {
            fields.push(("remember_me", "1"));
        }
        self.post_form("/login", &fields).await
    }

    pub async fn log_in_as(&mut self, email: &str) -> TestResponse {
        self.log_in(email, PASSWORD, false).await
    }
}
