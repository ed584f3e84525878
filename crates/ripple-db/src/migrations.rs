use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (users, microposts, relationships)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id                  TEXT PRIMARY KEY,
                name                TEXT NOT NULL,
                email               TEXT NOT NULL UNIQUE COLLATE NOCASE,
                password_digest     TEXT NOT NULL,
                remember_digest     TEXT,
                admin               INTEGER NOT NULL DEFAULT 0,
                activation_digest   TEXT,
                activated           INTEGER NOT NULL DEFAULT 0,
                activated_at        TEXT,
                created_at          TEXT NOT NULL,
                updated_at          TEXT NOT NULL
            );

            CREATE TABLE microposts (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                content     TEXT NOT NULL,
                picture     TEXT,
                created_at  TEXT NOT NULL
            );

            CREATE INDEX idx_microposts_user_created
                ON microposts(user_id, created_at);

            CREATE TABLE relationships (
                id           TEXT PRIMARY KEY,
                follower_id  TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                followed_id  TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at   TEXT NOT NULL,
                UNIQUE(follower_id, followed_id),
                CHECK(follower_id <> followed_id)
            );

            CREATE INDEX idx_relationships_followed
                ON relationships(followed_id);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
