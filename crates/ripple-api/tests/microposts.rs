mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};

use common::{Part, TestApp};
use ripple_api::state::Settings;

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nnot a real image";

#[tokio::test]
async fn create_requires_login() {
    let mut app = TestApp::new().await;
    app.post_multipart("/microposts", &[Part::Text("content", "Lorem ipsum")])
        .await
        .assert_redirect("/login");
    assert_eq!(app.state.db.count_microposts().unwrap(), 0);
}

#[tokio::test]
async fn destroy_requires_login() {
    let mut app = TestApp::new().await;
    let id = app.create_user("Michael", "michael@example.com", true, false);
    let post = app.create_micropost(&id, "keep me");

    app.delete(&format!("/microposts/{}", post)).await.assert_redirect("/login");
    assert_eq!(app.state.db.count_microposts().unwrap(), 1);
}

#[tokio::test]
async fn micropost_interface() {
    let mut app = TestApp::new().await;
    let michael = app.create_user("Michael", "michael@example.com", true, false);
    let archer = app.create_user("Archer", "archer@example.com", true, false);
    app.create_micropost(&archer, "archer's post");

    app.log_in_as("michael@example.com").await;
    let home = app.get("/").await;
    assert!(home.body.contains(r#"<input type="file""#));

    // Invalid submission.
    let resp = app.post_multipart("/microposts", &[Part::Text("content", "")]).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains(r#"<div id="error_explanation">"#));
    assert!(resp.body.contains("Content can't be blank"));
    assert_eq!(app.state.db.count_microposts().unwrap(), 1);

    // Valid submission with a picture.
    let content = "This micropost really ties the room together";
    let resp = app
        .post_multipart(
            "/microposts",
            &[
                Part::Text("content", content),
                Part::File {
                    name: "picture",
                    file_name: "rails.png",
                    content_type: "image/png",
                    data: PNG_BYTES,
                },
            ],
        )
        .await;
    resp.assert_redirect("/");
    assert_eq!(app.state.db.count_microposts().unwrap(), 2);

    let home = app.get("/").await;
    assert!(home.body.contains("Micropost created!"));
    assert!(home.body.contains(content));
    assert!(home.body.contains(r#"<img src="/uploads/"#));

    // Delete own post.
    let own = app
        .state
        .db
        .user_microposts(&michael, 1, 0)
        .unwrap()
        .remove(0);
    let picture = own.picture.clone().unwrap();
    assert!(app.state.storage.file_path(&picture).exists());

    app.delete(&format!("/microposts/{}", own.id)).await.assert_redirect("/");
    assert_eq!(app.state.db.count_microposts().unwrap(), 1);
    assert!(!app.state.storage.file_path(&picture).exists());
    assert!(app.get("/").await.body.contains("Micropost deleted"));

    // No delete links on someone else's profile.
    let profile = app.get(&format!("/users/{}", archer)).await;
    assert!(profile.body.contains("archer's post"));
    assert_eq!(profile.count(">delete</a>"), 0);
}

#[tokio::test]
async fn home_feed_is_paginated() {
    let settings = Settings { per_page: 2, ..Settings::default() };
    let mut app = TestApp::with_settings(settings).await;
    let id = app.create_user("Michael", "michael@example.com", true, false);
    for i in 0..3 {
        app.create_micropost(&id, &format!("feed entry {}", i));
    }
    app.log_in_as("michael@example.com").await;

    let first = app.get("/").await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.count(r#"<div class="pagination">"#), 1);
    assert!(first.body.contains(r#"<a href="/?page=2">"#));
    assert!(first.body.contains("feed entry 2"));
    assert!(!first.body.contains("feed entry 0"));

    let second = app.get("/?page=2").await;
    assert_eq!(second.status, StatusCode::OK);
    assert!(second.body.contains("feed entry 0"));
    assert!(!second.body.contains("feed entry 2"));
}

#[tokio::test]
async fn cannot_delete_someone_elses_micropost() {
    let mut app = TestApp::new().await;
    app.create_user("Michael", "michael@example.com", true, false);
    let archer = app.create_user("Archer", "archer@example.com", true, false);
    let post = app.create_micropost(&archer, "mine, not yours");

    app.log_in_as("michael@example.com").await;
    app.delete(&format!("/microposts/{}", post)).await.assert_redirect("/");
    assert_eq!(app.state.db.count_microposts().unwrap(), 1);
}

#[tokio::test]
async fn delete_returns_to_the_referring_page() {
    let mut app = TestApp::new().await;
    let id = app.create_user("Michael", "michael@example.com", true, false);
    let post = app.create_micropost(&id, "delete me from my profile");
    app.log_in_as("michael@example.com").await;

    let profile = format!("/users/{}", id);
    let req = Request::builder()
        .method("POST")
        .uri(format!("/microposts/{}?_method=DELETE", post))
        .header(header::REFERER, format!("http://localhost:3000{}", profile))
        .body(Body::empty())
        .unwrap();
    app.send(req).await.assert_redirect(&profile);
}

#[tokio::test]
async fn picture_type_and_size_are_validated() {
    let mut app = TestApp::new().await;
    app.create_user("Michael", "michael@example.com", true, false);
    app.log_in_as("michael@example.com").await;

    let resp = app
        .post_multipart(
            "/microposts",
            &[
                Part::Text("content", "with a pdf"),
                Part::File {
                    name: "picture",
                    file_name: "doc.pdf",
                    content_type: "application/pdf",
                    data: b"%PDF-1.4",
                },
            ],
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Picture must be a JPEG, PNG or GIF image"));

    let big = vec![0u8; 5 * 1024 * 1024];
    let resp = app
        .post_multipart(
            "/microposts",
            &[
                Part::Text("content", "huge"),
                Part::File {
                    name: "picture",
                    file_name: "big.jpg",
                    content_type: "image/jpeg",
                    data: &big,
                },
            ],
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Picture should be less than 5MB"));
    assert_eq!(app.state.db.count_microposts().unwrap(), 0);
}

#[tokio::test]
async fn empty_file_field_means_no_picture() {
    let mut app = TestApp::new().await;
    let id = app.create_user("Michael", "michael@example.com", true, false);
    app.log_in_as("michael@example.com").await;

    app.post_multipart(
        "/microposts",
        &[
            Part::Text("content", "just words"),
            Part::File {
                name: "picture",
                file_name: "",
                content_type: "application/octet-stream",
                data: b"",
            },
        ],
    )
    .await
    .assert_redirect("/");

    let posts = app.state.db.user_microposts(&id, 10, 0).unwrap();
    assert_eq!(posts.len(), 1);
    assert!(posts[0].picture.is_none());
}

#[tokio::test]
async fn uploaded_pictures_are_served() {
    let mut app = TestApp::new().await;
    let id = app.create_user("Michael", "michael@example.com", true, false);
    app.log_in_as("michael@example.com").await;

    app.post_multipart(
        "/microposts",
        &[
            Part::Text("content", "look at this"),
            Part::File {
                name: "picture",
                file_name: "cat.png",
                content_type: "image/png",
                data: PNG_BYTES,
            },
        ],
    )
    .await;

    let picture = app.state.db.user_pictures(&id).unwrap().remove(0);
    let resp = app.get(&format!("/uploads/{}", picture)).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(
        resp.headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        Some("image/png")
    );
}

#[tokio::test]
async fn sidebar_micropost_count() {
    let mut app = TestApp::new().await;
    let id = app.create_user("Michael", "michael@example.com", true, false);
    app.log_in_as("michael@example.com").await;

    assert!(app.get("/").await.body.contains("0 microposts"));

    app.create_micropost(&id, "first");
    assert!(app.get("/").await.body.contains("<span>1 micropost</span>"));

    app.create_micropost(&id, "second");
    assert!(app.get("/").await.body.contains("2 microposts"));
}
