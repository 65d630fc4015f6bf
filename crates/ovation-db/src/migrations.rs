use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id              TEXT PRIMARY KEY,
            username        TEXT NOT NULL UNIQUE,
            email           TEXT NOT NULL UNIQUE,
            password_hash   TEXT NOT NULL,
            full_name       TEXT,
            organization    TEXT,
            created_at      TEXT NOT NULL,
            last_login      TEXT,
            is_active       INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS sessions (
            token       TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id),
            created_at  TEXT NOT NULL,
            expires_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_sessions_user
            ON sessions(user_id);

        CREATE TABLE IF NOT EXISTS events (
            id              TEXT PRIMARY KEY,
            user_id         TEXT NOT NULL REFERENCES users(id),
            title           TEXT NOT NULL,
            category        TEXT NOT NULL,
            description     TEXT,
            venue           TEXT NOT NULL,
            event_date      TEXT NOT NULL,
            event_time      TEXT,
            capacity        INTEGER,
            status          TEXT NOT NULL DEFAULT 'upcoming',
            unique_code     TEXT NOT NULL UNIQUE,
            allow_reviews   INTEGER NOT NULL DEFAULT 1,
            created_at      TEXT NOT NULL,
            updated_at      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_events_user
            ON events(user_id);

        CREATE TABLE IF NOT EXISTS reviews (
            id                  TEXT PRIMARY KEY,
            event_id            TEXT NOT NULL REFERENCES events(id),
            reviewer_name       TEXT NOT NULL,
            reviewer_email      TEXT NOT NULL,
            star_rating         INTEGER NOT NULL,
            review_text         TEXT,
            review_categories   TEXT,
            attendee_type       TEXT,
            would_recommend     INTEGER NOT NULL DEFAULT 0,
            submitted_at        TEXT NOT NULL,
            ip_address          TEXT,
            user_agent          TEXT,
            is_approved         INTEGER NOT NULL DEFAULT 1,
            is_featured         INTEGER NOT NULL DEFAULT 0,
            helpful_votes       INTEGER NOT NULL DEFAULT 0,
            UNIQUE(event_id, reviewer_email)
        );

        CREATE INDEX IF NOT EXISTS idx_reviews_event
            ON reviews(event_id, submitted_at);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
