use serde::Deserialize;

// -- Sessions --

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// Checkbox; `"1"` means persist the login across browser restarts.
    #[serde(default)]
    pub remember_me: Option<String>,
}

impl LoginForm {
    pub fn remember(&self) -> bool {
        self.remember_me.as_deref() == Some("1")
    }
}

// -- Users --

/// Signup and profile edit share the same fields.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct UserForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
}

#[derive(Debug, Deserialize)]
pub struct ActivationQuery {
    #[serde(default)]
    pub email: String,
}

// -- Relationships --

#[derive(Debug, Deserialize)]
pub struct FollowForm {
    pub followed_id: String,
}

// -- Microposts --

/// Metadata of an uploaded picture, enough to validate it before storing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PictureMeta {
    pub content_type: String,
    pub size: usize,
}

// -- Pagination --

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}
