/// Database row types — these map directly to SQLite rows.
/// Distinct from ripple-types models so digests stay in this layer.

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_digest: String,
    pub remember_digest: Option<String>,
    pub admin: bool,
    pub activation_digest: Option<String>,
    pub activated: bool,
    pub activated_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Insert payload for a user; ids and digests are produced by the caller.
pub struct NewUser<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub password_digest: &'a str,
    pub activation_digest: Option<&'a str>,
    pub activated: bool,
    pub admin: bool,
}

/// A micropost joined with its author.
#[derive(Debug, Clone)]
pub struct MicropostRow {
    pub id: String,
    pub user_id: String,
    pub author_name: String,
    pub author_email: String,
    pub content: String,
    pub picture: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct RelationshipRow {
    pub id: String,
    pub follower_id: String,
    pub followed_id: String,
    pub created_at: String,
}
