use crate::Database;
use crate::models::{EventRow, ReviewRow, SessionRow, UserRow};
use anyhow::Result;
use rusqlite::{OptionalExtension, params};

/// True when the error wraps a SQLite UNIQUE-constraint failure. The unique
/// indexes (username, email, unique_code, (event_id, reviewer_email)) are the
/// race-safety net behind the application-level checks.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<rusqlite::Error>(),
        Some(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

impl Database {
    // -- Users --

    pub fn create_user(&self, user: &UserRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, email, password_hash, full_name, organization, created_at, last_login, is_active)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    user.id,
                    user.username,
                    user.email,
                    user.password_hash,
                    user.full_name,
                    user.organization,
                    user.created_at,
                    user.last_login,
                    user.is_active,
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!("{USER_SELECT} WHERE username = ?1"),
                    [username],
                    map_user,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(&format!("{USER_SELECT} WHERE email = ?1"), [email], map_user)
                .optional()?;
            Ok(row)
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(&format!("{USER_SELECT} WHERE id = ?1"), [id], map_user)
                .optional()?;
            Ok(row)
        })
    }

    pub fn touch_last_login(&self, id: &str, at: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("UPDATE users SET last_login = ?1 WHERE id = ?2", [at, id])?;
            Ok(())
        })
    }

    /// Deletes a user and everything it owns: each event's reviews, the
    /// events, the user's sessions, then the user, all in one transaction.
    pub fn delete_user(&self, id: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare("SELECT id FROM events WHERE user_id = ?1")?;
                let event_ids = stmt
                    .query_map([id], |row| row.get::<_, String>(0))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                for event_id in &event_ids {
                    tx.execute("DELETE FROM reviews WHERE event_id = ?1", [event_id])?;
                    tx.execute("DELETE FROM events WHERE id = ?1", [event_id])?;
                }
            }
            tx.execute("DELETE FROM sessions WHERE user_id = ?1", [id])?;
            tx.execute("DELETE FROM users WHERE id = ?1", [id])?;
            tx.commit()?;
            Ok(())
        })
    }

    // -- Sessions --

    pub fn create_session(&self, session: &SessionRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
                params![
                    session.token,
                    session.user_id,
                    session.created_at,
                    session.expires_at,
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_session(&self, token: &str) -> Result<Option<SessionRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT token, user_id, created_at, expires_at FROM sessions WHERE token = ?1",
                    [token],
                    |row| {
                        Ok(SessionRow {
                            token: row.get(0)?,
                            user_id: row.get(1)?,
                            created_at: row.get(2)?,
                            expires_at: row.get(3)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn delete_session(&self, token: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM sessions WHERE token = ?1", [token])?;
            Ok(())
        })
    }

    // -- Events --

    pub fn create_event(&self, event: &EventRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO events (id, user_id, title, category, description, venue, event_date, event_time, capacity, status, unique_code, allow_reviews, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                params![
                    event.id,
                    event.user_id,
                    event.title,
                    event.category,
                    event.description,
                    event.venue,
                    event.event_date,
                    event.event_time,
                    event.capacity,
                    event.status,
                    event.unique_code,
                    event.allow_reviews,
                    event.created_at,
                    event.updated_at,
                ],
            )?;
            Ok(())
        })
    }

    /// Applies every editable column; unique_code is immutable and never
    /// part of the SET list.
    pub fn update_event(&self, event: &EventRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE events
                 SET title = ?1, category = ?2, description = ?3, venue = ?4,
                     event_date = ?5, event_time = ?6, capacity = ?7, status = ?8,
                     allow_reviews = ?9, updated_at = ?10
                 WHERE id = ?11",
                params![
                    event.title,
                    event.category,
                    event.description,
                    event.venue,
                    event.event_date,
                    event.event_time,
                    event.capacity,
                    event.status,
                    event.allow_reviews,
                    event.updated_at,
                    event.id,
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_event(&self, id: &str) -> Result<Option<EventRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(&format!("{EVENT_SELECT} WHERE id = ?1"), [id], map_event)
                .optional()?;
            Ok(row)
        })
    }

    pub fn get_event_by_code(&self, code: &str) -> Result<Option<EventRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!("{EVENT_SELECT} WHERE unique_code = ?1"),
                    [code],
                    map_event,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn event_code_exists(&self, code: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM events WHERE unique_code = ?1",
                    [code],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    pub fn list_events_for_user(&self, user_id: &str) -> Result<Vec<EventRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("{EVENT_SELECT} WHERE user_id = ?1 ORDER BY created_at DESC"))?;
            let rows = stmt
                .query_map([user_id], map_event)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Deletes an event and its reviews in one transaction.
    pub fn delete_event(&self, id: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM reviews WHERE event_id = ?1", [id])?;
            tx.execute("DELETE FROM events WHERE id = ?1", [id])?;
            tx.commit()?;
            Ok(())
        })
    }

    // -- Reviews --

    pub fn insert_review(&self, review: &ReviewRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO reviews (id, event_id, reviewer_name, reviewer_email, star_rating, review_text, review_categories, attendee_type, would_recommend, submitted_at, ip_address, user_agent, is_approved, is_featured, helpful_votes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                params![
                    review.id,
                    review.event_id,
                    review.reviewer_name,
                    review.reviewer_email,
                    review.star_rating,
                    review.review_text,
                    review.review_categories,
                    review.attendee_type,
                    review.would_recommend,
                    review.submitted_at,
                    review.ip_address,
                    review.user_agent,
                    review.is_approved,
                    review.is_featured,
                    review.helpful_votes,
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_review(&self, id: &str) -> Result<Option<ReviewRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(&format!("{REVIEW_SELECT} WHERE id = ?1"), [id], map_review)
                .optional()?;
            Ok(row)
        })
    }

    /// Review plus the owning user of its parent event, resolved in a single
    /// JOIN; every moderation action needs both.
    pub fn get_review_with_owner(&self, id: &str) -> Result<Option<(ReviewRow, String)>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT r.id, r.event_id, r.reviewer_name, r.reviewer_email, r.star_rating,
                            r.review_text, r.review_categories, r.attendee_type, r.would_recommend,
                            r.submitted_at, r.ip_address, r.user_agent, r.is_approved, r.is_featured,
                            r.helpful_votes, e.user_id
                     FROM reviews r
                     JOIN events e ON r.event_id = e.id
                     WHERE r.id = ?1",
                    [id],
                    |row| Ok((map_review(row)?, row.get::<_, String>(15)?)),
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn review_exists(&self, event_id: &str, reviewer_email: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM reviews WHERE event_id = ?1 AND reviewer_email = ?2",
                    [event_id, reviewer_email],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    /// All reviews for an event, newest first, approved or not.
    pub fn list_reviews_for_event(&self, event_id: &str) -> Result<Vec<ReviewRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{REVIEW_SELECT} WHERE event_id = ?1 ORDER BY submitted_at DESC"
            ))?;
            let rows = stmt
                .query_map([event_id], map_review)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_approved_reviews(&self, event_id: &str, limit: Option<u32>) -> Result<Vec<ReviewRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{REVIEW_SELECT} WHERE event_id = ?1 AND is_approved = 1
                 ORDER BY submitted_at DESC LIMIT ?2"
            ))?;
            let rows = stmt
                .query_map(
                    params![event_id, limit.map(i64::from).unwrap_or(-1)],
                    map_review,
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Every review across all of an owner's events, newest first, with the
    /// event title attached (JOIN, so the dashboard avoids per-event queries).
    pub fn list_reviews_for_owner(&self, user_id: &str) -> Result<Vec<(ReviewRow, String)>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT r.id, r.event_id, r.reviewer_name, r.reviewer_email, r.star_rating,
                        r.review_text, r.review_categories, r.attendee_type, r.would_recommend,
                        r.submitted_at, r.ip_address, r.user_agent, r.is_approved, r.is_featured,
                        r.helpful_votes, e.title
                 FROM reviews r
                 JOIN events e ON r.event_id = e.id
                 WHERE e.user_id = ?1
                 ORDER BY r.submitted_at DESC",
            )?;
            let rows = stmt
                .query_map([user_id], |row| {
                    Ok((map_review(row)?, row.get::<_, String>(15)?))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn set_review_approved(&self, id: &str, approved: bool) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE reviews SET is_approved = ?1 WHERE id = ?2",
                params![approved, id],
            )?;
            Ok(())
        })
    }

    pub fn set_review_featured(&self, id: &str, featured: bool) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE reviews SET is_featured = ?1 WHERE id = ?2",
                params![featured, id],
            )?;
            Ok(())
        })
    }

    pub fn delete_review(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM reviews WHERE id = ?1", [id])?;
            Ok(())
        })
    }
}

const USER_SELECT: &str = "SELECT id, username, email, password_hash, full_name, organization, created_at, last_login, is_active FROM users";

const EVENT_SELECT: &str = "SELECT id, user_id, title, category, description, venue, event_date, event_time, capacity, status, unique_code, allow_reviews, created_at, updated_at FROM events";

const REVIEW_SELECT: &str = "SELECT id, event_id, reviewer_name, reviewer_email, star_rating, review_text, review_categories, attendee_type, would_recommend, submitted_at, ip_address, user_agent, is_approved, is_featured, helpful_votes FROM reviews";

fn map_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        full_name: row.get(4)?,
        organization: row.get(5)?,
        created_at: row.get(6)?,
        last_login: row.get(7)?,
        is_active: row.get(8)?,
    })
}

fn map_event(row: &rusqlite::Row<'_>) -> rusqlite::Result<EventRow> {
    Ok(EventRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        category: row.get(3)?,
        description: row.get(4)?,
        venue: row.get(5)?,
        event_date: row.get(6)?,
        event_time: row.get(7)?,
        capacity: row.get(8)?,
        status: row.get(9)?,
        unique_code: row.get(10)?,
        allow_reviews: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

fn map_review(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReviewRow> {
    Ok(ReviewRow {
        id: row.get(0)?,
        event_id: row.get(1)?,
        reviewer_name: row.get(2)?,
        reviewer_email: row.get(3)?,
        star_rating: row.get(4)?,
        review_text: row.get(5)?,
        review_categories: row.get(6)?,
        attendee_type: row.get(7)?,
        would_recommend: row.get(8)?,
        submitted_at: row.get(9)?,
        ip_address: row.get(10)?,
        user_agent: row.get(11)?,
        is_approved: row.get(12)?,
        is_featured: row.get(13)?,
        helpful_votes: row.get(14)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    fn user(id: &str, username: &str, email: &str) -> UserRow {
        UserRow {
            id: id.to_string(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            full_name: Some("Test User".to_string()),
            organization: None,
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
            last_login: None,
            is_active: true,
        }
    }

    fn event(id: &str, user_id: &str, code: &str) -> EventRow {
        EventRow {
            id: id.to_string(),
            user_id: user_id.to_string(),
            title: "Jazz Night".to_string(),
            category: "Music".to_string(),
            description: None,
            venue: "Blue Hall".to_string(),
            event_date: "2026-09-01".to_string(),
            event_time: None,
            capacity: Some(100),
            status: "upcoming".to_string(),
            unique_code: code.to_string(),
            allow_reviews: true,
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
            updated_at: "2026-01-01T00:00:00+00:00".to_string(),
        }
    }

    fn review(id: &str, event_id: &str, email: &str, rating: i64) -> ReviewRow {
        ReviewRow {
            id: id.to_string(),
            event_id: event_id.to_string(),
            reviewer_name: "Ada".to_string(),
            reviewer_email: email.to_string(),
            star_rating: rating,
            review_text: Some("Great night".to_string()),
            review_categories: Some("[\"Great Sound\"]".to_string()),
            attendee_type: None,
            would_recommend: true,
            submitted_at: "2026-01-02T00:00:00+00:00".to_string(),
            ip_address: None,
            user_agent: None,
            is_approved: true,
            is_featured: false,
            helpful_votes: 0,
        }
    }

    #[test]
    fn duplicate_username_is_a_unique_violation() {
        let db = Database::open_in_memory().unwrap();
        db.create_user(&user("u1", "alice", "alice@example.com")).unwrap();
        let err = db
            .create_user(&user("u2", "alice", "other@example.com"))
            .unwrap_err();
        assert!(is_unique_violation(&err));

        let err = db
            .create_user(&user("u3", "bob", "alice@example.com"))
            .unwrap_err();
        assert!(is_unique_violation(&err));
    }

    #[test]
    fn duplicate_event_code_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.create_user(&user("u1", "alice", "alice@example.com")).unwrap();
        db.create_event(&event("e1", "u1", "ABCD1234")).unwrap();
        let err = db.create_event(&event("e2", "u1", "ABCD1234")).unwrap_err();
        assert!(is_unique_violation(&err));
        assert!(db.event_code_exists("ABCD1234").unwrap());
        assert!(!db.event_code_exists("ZZZZ9999").unwrap());
    }

    #[test]
    fn first_review_per_email_wins() {
        let db = Database::open_in_memory().unwrap();
        db.create_user(&user("u1", "alice", "alice@example.com")).unwrap();
        db.create_event(&event("e1", "u1", "ABCD1234")).unwrap();

        db.insert_review(&review("r1", "e1", "a@x.com", 5)).unwrap();
        let err = db.insert_review(&review("r2", "e1", "a@x.com", 1)).unwrap_err();
        assert!(is_unique_violation(&err));

        let rows = db.list_reviews_for_event("e1").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].star_rating, 5);
        assert!(db.review_exists("e1", "a@x.com").unwrap());
        assert!(!db.review_exists("e1", "b@x.com").unwrap());
    }

    #[test]
    fn deleting_a_user_cascades_through_events_and_reviews() {
        let db = Database::open_in_memory().unwrap();
        db.create_user(&user("u1", "alice", "alice@example.com")).unwrap();
        db.create_event(&event("e1", "u1", "CODE0001")).unwrap();
        db.create_event(&event("e2", "u1", "CODE0002")).unwrap();
        db.insert_review(&review("r1", "e1", "a@x.com", 4)).unwrap();
        db.insert_review(&review("r2", "e2", "b@x.com", 2)).unwrap();
        db.create_session(&SessionRow {
            token: "tok".to_string(),
            user_id: "u1".to_string(),
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
            expires_at: "2026-02-01T00:00:00+00:00".to_string(),
        })
        .unwrap();

        db.delete_user("u1").unwrap();

        assert!(db.get_user_by_id("u1").unwrap().is_none());
        assert!(db.get_event("e1").unwrap().is_none());
        assert!(db.get_event("e2").unwrap().is_none());
        assert!(db.get_review("r1").unwrap().is_none());
        assert!(db.get_review("r2").unwrap().is_none());
        assert!(db.get_session("tok").unwrap().is_none());
    }

    #[test]
    fn deleting_an_event_removes_its_reviews() {
        let db = Database::open_in_memory().unwrap();
        db.create_user(&user("u1", "alice", "alice@example.com")).unwrap();
        db.create_event(&event("e1", "u1", "CODE0001")).unwrap();
        db.insert_review(&review("r1", "e1", "a@x.com", 4)).unwrap();

        db.delete_event("e1").unwrap();
        assert!(db.get_event("e1").unwrap().is_none());
        assert!(db.get_review("r1").unwrap().is_none());
    }

    #[test]
    fn review_owner_join_resolves_the_event_owner() {
        let db = Database::open_in_memory().unwrap();
        db.create_user(&user("u1", "alice", "alice@example.com")).unwrap();
        db.create_event(&event("e1", "u1", "CODE0001")).unwrap();
        db.insert_review(&review("r1", "e1", "a@x.com", 4)).unwrap();

        let (row, owner) = db.get_review_with_owner("r1").unwrap().unwrap();
        assert_eq!(row.id, "r1");
        assert_eq!(owner, "u1");
        assert!(db.get_review_with_owner("missing").unwrap().is_none());
    }

    #[test]
    fn approved_listing_filters_and_limits() {
        let db = Database::open_in_memory().unwrap();
        db.create_user(&user("u1", "alice", "alice@example.com")).unwrap();
        db.create_event(&event("e1", "u1", "CODE0001")).unwrap();
        let mut r = review("r1", "e1", "a@x.com", 5);
        r.submitted_at = "2026-01-02T00:00:00+00:00".to_string();
        db.insert_review(&r).unwrap();
        let mut r = review("r2", "e1", "b@x.com", 3);
        r.submitted_at = "2026-01-03T00:00:00+00:00".to_string();
        db.insert_review(&r).unwrap();
        let mut r = review("r3", "e1", "c@x.com", 1);
        r.is_approved = false;
        db.insert_review(&r).unwrap();

        let approved = db.list_approved_reviews("e1", None).unwrap();
        assert_eq!(approved.len(), 2);
        assert_eq!(approved[0].id, "r2"); // newest first

        let limited = db.list_approved_reviews("e1", Some(1)).unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].id, "r2");

        let all = db.list_reviews_for_event("e1").unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn moderation_updates_stick() {
        let db = Database::open_in_memory().unwrap();
        db.create_user(&user("u1", "alice", "alice@example.com")).unwrap();
        db.create_event(&event("e1", "u1", "CODE0001")).unwrap();
        db.insert_review(&review("r1", "e1", "a@x.com", 4)).unwrap();

        db.set_review_approved("r1", false).unwrap();
        assert!(!db.get_review("r1").unwrap().unwrap().is_approved);
        db.set_review_approved("r1", true).unwrap();
        assert!(db.get_review("r1").unwrap().unwrap().is_approved);

        db.set_review_featured("r1", true).unwrap();
        assert!(db.get_review("r1").unwrap().unwrap().is_featured);

        db.delete_review("r1").unwrap();
        assert!(db.get_review("r1").unwrap().is_none());
    }

    #[test]
    fn owner_review_join_carries_event_titles() {
        let db = Database::open_in_memory().unwrap();
        db.create_user(&user("u1", "alice", "alice@example.com")).unwrap();
        db.create_user(&user("u2", "bob", "bob@example.com")).unwrap();
        db.create_event(&event("e1", "u1", "CODE0001")).unwrap();
        db.create_event(&event("e2", "u2", "CODE0002")).unwrap();
        db.insert_review(&review("r1", "e1", "a@x.com", 4)).unwrap();
        db.insert_review(&review("r2", "e2", "b@x.com", 2)).unwrap();

        let owned = db.list_reviews_for_owner("u1").unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].0.id, "r1");
        assert_eq!(owned[0].1, "Jazz Night");
    }
}
