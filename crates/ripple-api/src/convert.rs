use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use ripple_db::models::{MicropostRow, UserRow};
use ripple_types::models::{Micropost, User};

fn parse_id(raw: &str, what: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}': {}", what, raw, e);
        Uuid::default()
    })
}

fn parse_timestamp(raw: &str, what: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite's datetime('now') has no timezone; treat it as UTC.
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt {} '{}': {}", what, raw, e);
            DateTime::default()
        })
}

pub fn user(row: &UserRow) -> User {
    User {
        id: parse_id(&row.id, "user id"),
        name: row.name.clone(),
        email: row.email.clone(),
        admin: row.admin,
        activated: row.activated,
        created_at: parse_timestamp(&row.created_at, "user created_at"),
    }
}

pub fn micropost(row: MicropostRow) -> Micropost {
    Micropost {
        id: parse_id(&row.id, "micropost id"),
        user_id: parse_id(&row.user_id, "micropost user_id"),
        created_at: parse_timestamp(&row.created_at, "micropost created_at"),
        author_name: row.author_name,
        author_email: row.author_email,
        content: row.content,
        picture: row.picture,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_and_rfc3339_timestamps_parse() {
        let a = parse_timestamp("2024-05-01T10:00:00.000001Z", "t");
        let b = parse_timestamp("2024-05-01 10:00:00", "t");
        assert_eq!(a.timestamp(), b.timestamp());
        assert_eq!(parse_timestamp("garbage", "t"), DateTime::<Utc>::default());
    }
}
