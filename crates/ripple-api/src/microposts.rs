use axum::{
    Extension,
    extract::{Multipart, Path, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use ripple_types::forms::PictureMeta;
use ripple_types::validation::validate_micropost;

use crate::error::AppError;
use crate::session::{self, CurrentUser, FlashKind, LoggedIn};
use crate::state::{AppState, blocking};
use crate::static_pages::render_home;

/// Request bodies above this are refused before validation. Pictures up to
/// it still reach the size check and get a readable error.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

struct Upload {
    content_type: String,
    data: Bytes,
}

struct Submission {
    content: String,
    picture: Option<Upload>,
}

async fn read_submission(mut multipart: Multipart) -> Result<Submission, AppError> {
    let mut content = String::new();
    let mut picture = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("multipart: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("content") => {
                content = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("content field: {}", e)))?;
            }
            Some("picture") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let declared = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("picture field: {}", e)))?;
                // Browsers send an empty part when no file was chosen.
                if data.is_empty() && file_name.is_empty() {
                    continue;
                }
                let content_type = match declared.as_deref() {
                    Some(ct) if ct != "application/octet-stream" => ct.to_string(),
                    _ => mime_guess::from_path(&file_name)
                        .first_raw()
                        .unwrap_or("application/octet-stream")
                        .to_string(),
                };
                picture = Some(Upload { content_type, data });
            }
            _ => {}
        }
    }

    Ok(Submission { content, picture })
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    LoggedIn(user): LoggedIn,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let submission = read_submission(multipart).await?;
    let meta = submission.picture.as_ref().map(|p| PictureMeta {
        content_type: p.content_type.clone(),
        size: p.data.len(),
    });

    if let Err(errors) = validate_micropost(&submission.content, meta.as_ref()) {
        return render_home(&state, jar, &current, &user, 1, &submission.content, &errors).await;
    }

    let picture = match &submission.picture {
        Some(upload) => Some(state.storage.store_picture(&upload.content_type, &upload.data).await?),
        None => None,
    };

    let id = Uuid::new_v4().to_string();
    let post_id = id.clone();
    let author_id = user.id.to_string();
    let content = submission.content;
    blocking(&state, move |st| {
        st.db.create_micropost(&post_id, &author_id, &content, picture.as_deref())
    })
    .await?;
    info!("User {} posted micropost {}", user.id, id);

    session::redirect_with_flash(&state, jar, FlashKind::Success, "Micropost created!", "/")
}

/// Local path of the `Referer`, so deleting from a profile page stays there.
fn referer_path(headers: &HeaderMap) -> Option<String> {
    let referer = headers.get(header::REFERER)?.to_str().ok()?;
    let uri: axum::http::Uri = referer.parse().ok()?;
    let path = uri.path_and_query()?.as_str();
    (path.starts_with('/') && !path.starts_with("//")).then(|| path.to_string())
}

pub async fn destroy(
    State(state): State<AppState>,
    LoggedIn(user): LoggedIn,
    Path(id): Path<String>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let lookup = id.clone();
    let Some(post) = blocking(&state, move |st| st.db.get_micropost(&lookup)).await? else {
        return Ok(Redirect::to("/").into_response());
    };
    if post.user_id != user.id.to_string() {
        warn!("User {} tried to delete micropost {} of {}", user.id, id, post.user_id);
        return Ok(Redirect::to("/").into_response());
    }

    let post_id = id.clone();
    let picture = post.picture;
    let orphan = blocking(&state, move |st| -> anyhow::Result<Option<String>> {
        st.db.delete_micropost(&post_id)?;
        let Some(picture) = picture else {
            return Ok(None);
        };
        Ok((!st.db.picture_in_use(&picture)?).then_some(picture))
    })
    .await?;
    info!("User {} deleted micropost {}", user.id, id);

    if let Some(picture) = orphan {
        state.storage.delete(&picture).await?;
    }

    let target = referer_path(&headers).unwrap_or_else(|| "/".to_string());
    session::redirect_with_flash(&state, jar, FlashKind::Success, "Micropost deleted", &target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn referer_is_reduced_to_a_local_path() {
        let mut headers = HeaderMap::new();
        assert_eq!(referer_path(&headers), None);

        headers.insert(header::REFERER, HeaderValue::from_static("http://localhost:3000/users/abc?page=2"));
        assert_eq!(referer_path(&headers).as_deref(), Some("/users/abc?page=2"));

        headers.insert(header::REFERER, HeaderValue::from_static("/"));
        assert_eq!(referer_path(&headers).as_deref(), Some("/"));
    }
}
