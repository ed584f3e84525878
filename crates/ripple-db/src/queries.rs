use crate::models::{MicropostRow, NewUser, RelationshipRow, UserRow};
use crate::Database;
use anyhow::{Result, bail};
use chrono::{SecondsFormat, Utc};
use ripple_types::models::UserStats;
use rusqlite::{Connection, OptionalExtension, Row};

const USER_COLUMNS: &str = "u.id, u.name, u.email, u.password_digest, u.remember_digest, u.admin, \
     u.activation_digest, u.activated, u.activated_at, u.created_at, u.updated_at";

const MICROPOST_COLUMNS: &str =
    "m.id, m.user_id, u.name, u.email, m.content, m.picture, m.created_at";

/// Microsecond RFC 3339 timestamps sort lexicographically in creation order.
pub fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl Database {
    // -- Users --

    pub fn create_user(&self, user: &NewUser<'_>) -> Result<()> {
        self.with_conn_mut(|conn| {
            let ts = now();
            conn.execute(
                "INSERT INTO users (id, name, email, password_digest, activation_digest, activated, \
                 activated_at, admin, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
                rusqlite::params![
                    user.id,
                    user.name,
                    user.email.to_lowercase(),
                    user.password_digest,
                    user.activation_digest,
                    user.activated,
                    user.activated.then(|| ts.clone()),
                    user.admin,
                    ts,
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "u.id = ?1", id))
    }

    /// Email lookups ignore case; stored emails are already lowercase.
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        let email = email.to_lowercase();
        self.with_conn(|conn| query_user(conn, "u.email = ?1", &email))
    }

    /// Whether another user (not `except_id`) already owns this email.
    pub fn email_taken(&self, email: &str, except_id: Option<&str>) -> Result<bool> {
        self.with_conn(|conn| {
            let taken: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1 AND id IS NOT ?2)",
                rusqlite::params![email.to_lowercase(), except_id],
                |row| row.get(0),
            )?;
            Ok(taken)
        })
    }

    /// Profile edit. `password_digest` of `None` keeps the current password.
    pub fn update_user(
        &self,
        id: &str,
        name: &str,
        email: &str,
        password_digest: Option<&str>,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE users
                 SET name = ?2, email = ?3,
                     password_digest = COALESCE(?4, password_digest),
                     updated_at = ?5
                 WHERE id = ?1",
                rusqlite::params![id, name, email.to_lowercase(), password_digest, now()],
            )?;
            Ok(())
        })
    }

    pub fn set_remember_digest(&self, id: &str, digest: Option<&str>) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE users SET remember_digest = ?2 WHERE id = ?1",
                rusqlite::params![id, digest],
            )?;
            Ok(())
        })
    }

    pub fn activate_user(&self, id: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE users SET activated = 1, activated_at = ?2, activation_digest = NULL
                 WHERE id = ?1",
                rusqlite::params![id, now()],
            )?;
            Ok(())
        })
    }

    /// Deletes the user; microposts and relationships go with it.
    pub fn delete_user(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let n = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }

    pub fn count_users(&self) -> Result<u64> {
        self.with_conn(|conn| count(conn, "SELECT COUNT(*) FROM users", &[]))
    }

    pub fn count_activated_users(&self) -> Result<u64> {
        self.with_conn(|conn| count(conn, "SELECT COUNT(*) FROM users WHERE activated = 1", &[]))
    }

    /// Activated users in signup order.
    pub fn list_activated_users(&self, limit: u32, offset: u64) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {USER_COLUMNS} FROM users u
                 WHERE u.activated = 1
                 ORDER BY u.created_at ASC, u.rowid ASC
                 LIMIT ?1 OFFSET ?2"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params![limit, offset as i64], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn user_stats(&self, id: &str) -> Result<UserStats> {
        self.with_conn(|conn| {
            let (microposts, following, followers): (i64, i64, i64) = conn.query_row(
                "SELECT
                    (SELECT COUNT(*) FROM microposts WHERE user_id = ?1),
                    (SELECT COUNT(*) FROM relationships WHERE follower_id = ?1),
                    (SELECT COUNT(*) FROM relationships WHERE followed_id = ?1)",
                [id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )?;
            Ok(UserStats {
                microposts: microposts as u64,
                following: following as u64,
                followers: followers as u64,
            })
        })
    }

    // -- Microposts --

    pub fn create_micropost(
        &self,
        id: &str,
        user_id: &str,
        content: &str,
        picture: Option<&str>,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO microposts (id, user_id, content, picture, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, user_id, content, picture, now()],
            )?;
            Ok(())
        })
    }

    pub fn get_micropost(&self, id: &str) -> Result<Option<MicropostRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {MICROPOST_COLUMNS} FROM microposts m
                 JOIN users u ON u.id = m.user_id
                 WHERE m.id = ?1"
            );
            let row = conn.query_row(&sql, [id], micropost_from_row).optional()?;
            Ok(row)
        })
    }

    pub fn delete_micropost(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let n = conn.execute("DELETE FROM microposts WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }

    pub fn count_microposts(&self) -> Result<u64> {
        self.with_conn(|conn| count(conn, "SELECT COUNT(*) FROM microposts", &[]))
    }

    /// A user's own microposts, newest first.
    pub fn user_microposts(&self, user_id: &str, limit: u32, offset: u64) -> Result<Vec<MicropostRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {MICROPOST_COLUMNS} FROM microposts m
                 JOIN users u ON u.id = m.user_id
                 WHERE m.user_id = ?1
                 ORDER BY m.created_at DESC, m.rowid DESC
                 LIMIT ?2 OFFSET ?3"
            );
            query_microposts(conn, &sql, user_id, limit, offset)
        })
    }

    /// Microposts by the user and everyone they follow, newest first.
    ///
    /// The followed ids come from a subselect so the whole page is one
    /// round trip, author names included.
    pub fn feed(&self, user_id: &str, limit: u32, offset: u64) -> Result<Vec<MicropostRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {MICROPOST_COLUMNS} FROM microposts m
                 JOIN users u ON u.id = m.user_id
                 WHERE m.user_id = ?1
                    OR m.user_id IN (SELECT followed_id FROM relationships WHERE follower_id = ?1)
                 ORDER BY m.created_at DESC, m.rowid DESC
                 LIMIT ?2 OFFSET ?3"
            );
            query_microposts(conn, &sql, user_id, limit, offset)
        })
    }

    pub fn count_feed(&self, user_id: &str) -> Result<u64> {
        self.with_conn(|conn| {
            count(
                conn,
                "SELECT COUNT(*) FROM microposts
                 WHERE user_id = ?1
                    OR user_id IN (SELECT followed_id FROM relationships WHERE follower_id = ?1)",
                &[&user_id],
            )
        })
    }

    pub fn picture_in_use(&self, picture: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let used: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM microposts WHERE picture = ?1)",
                [picture],
                |row| row.get(0),
            )?;
            Ok(used)
        })
    }

    pub fn user_pictures(&self, user_id: &str) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT picture FROM microposts WHERE user_id = ?1 AND picture IS NOT NULL",
            )?;
            let pictures = stmt
                .query_map([user_id], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(pictures)
        })
    }

    // -- Relationships --

    /// Follow `followed_id`. Returns false if the edge already existed.
    pub fn follow(&self, id: &str, follower_id: &str, followed_id: &str) -> Result<bool> {
        if follower_id == followed_id {
            bail!("User {} cannot follow themselves", follower_id);
        }
        self.with_conn_mut(|conn| {
            let n = conn.execute(
                "INSERT OR IGNORE INTO relationships (id, follower_id, followed_id, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id, follower_id, followed_id, now()],
            )?;
            Ok(n > 0)
        })
    }

    /// Returns false if there was nothing to remove.
    pub fn unfollow(&self, follower_id: &str, followed_id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let n = conn.execute(
                "DELETE FROM relationships WHERE follower_id = ?1 AND followed_id = ?2",
                [follower_id, followed_id],
            )?;
            Ok(n > 0)
        })
    }

    pub fn is_following(&self, follower_id: &str, followed_id: &str) -> Result<bool> {
        Ok(self.find_relationship(follower_id, followed_id)?.is_some())
    }

    pub fn find_relationship(
        &self,
        follower_id: &str,
        followed_id: &str,
    ) -> Result<Option<RelationshipRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, follower_id, followed_id, created_at FROM relationships
                     WHERE follower_id = ?1 AND followed_id = ?2",
                    [follower_id, followed_id],
                    relationship_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn get_relationship(&self, id: &str) -> Result<Option<RelationshipRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, follower_id, followed_id, created_at FROM relationships WHERE id = ?1",
                    [id],
                    relationship_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Users that `user_id` follows.
    pub fn following(&self, user_id: &str, limit: u32, offset: u64) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {USER_COLUMNS} FROM users u
                 JOIN relationships r ON r.followed_id = u.id
                 WHERE r.follower_id = ?1
                 ORDER BY r.created_at ASC, r.rowid ASC
                 LIMIT ?2 OFFSET ?3"
            );
            query_users(conn, &sql, user_id, limit, offset)
        })
    }

    /// Users following `user_id`.
    pub fn followers(&self, user_id: &str, limit: u32, offset: u64) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {USER_COLUMNS} FROM users u
                 JOIN relationships r ON r.follower_id = u.id
                 WHERE r.followed_id = ?1
                 ORDER BY r.created_at ASC, r.rowid ASC
                 LIMIT ?2 OFFSET ?3"
            );
            query_users(conn, &sql, user_id, limit, offset)
        })
    }
}

fn count(conn: &Connection, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<u64> {
    let n: i64 = conn.query_row(sql, params, |row| row.get(0))?;
    Ok(n as u64)
}

fn query_user(conn: &Connection, predicate: &str, value: &str) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE {predicate}");
    let row = conn.query_row(&sql, [value], user_from_row).optional()?;
    Ok(row)
}

fn query_users(
    conn: &Connection,
    sql: &str,
    user_id: &str,
    limit: u32,
    offset: u64,
) -> Result<Vec<UserRow>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(rusqlite::params![user_id, limit, offset as i64], user_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn query_microposts(
    conn: &Connection,
    sql: &str,
    user_id: &str,
    limit: u32,
    offset: u64,
) -> Result<Vec<MicropostRow>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(rusqlite::params![user_id, limit, offset as i64], micropost_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_digest: row.get(3)?,
        remember_digest: row.get(4)?,
        admin: row.get(5)?,
        activation_digest: row.get(6)?,
        activated: row.get(7)?,
        activated_at: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn micropost_from_row(row: &Row<'_>) -> rusqlite::Result<MicropostRow> {
    Ok(MicropostRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        author_name: row.get(2)?,
        author_email: row.get(3)?,
        content: row.get(4)?,
        picture: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn relationship_from_row(row: &Row<'_>) -> rusqlite::Result<RelationshipRow> {
    Ok(RelationshipRow {
        id: row.get(0)?,
        follower_id: row.get(1)?,
        followed_id: row.get(2)?,
        created_at: row.get(3)?,
    })
}
