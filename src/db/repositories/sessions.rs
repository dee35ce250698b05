use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, parse_optional_datetime, parse_status, to_i64, to_u64},
    models::{SessionStatus, WalkingSession},
};
use crate::models::elapsed_secs;

fn row_to_session(row: &Row) -> Result<WalkingSession> {
    let started_at: String = row.get("started_at")?;
    let ended_at: Option<String> = row.get("ended_at")?;
    let duration_secs: Option<i64> = row.get("duration_secs")?;
    let status: String = row.get("status")?;

    Ok(WalkingSession {
        id: row.get("id")?,
        started_at: parse_datetime(&started_at, "started_at")?,
        ended_at: parse_optional_datetime(ended_at, "ended_at")?,
        duration_secs: duration_secs
            .map(|secs| to_u64(secs, "duration_secs"))
            .transpose()?,
        status: parse_status(&status)?,
    })
}

impl Database {
    pub async fn insert_walking_session(&self, session: &WalkingSession) -> Result<()> {
        let record = session.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO walking_sessions (id, started_at, ended_at, duration_secs, status)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.id,
                    record.started_at.to_rfc3339(),
                    record.ended_at.as_ref().map(|dt| dt.to_rfc3339()),
                    record.duration_secs.map(to_i64).transpose()?,
                    record.status.as_str(),
                ],
            )
            .context("failed to insert walking session")?;
            Ok(())
        })
        .await
    }

    /// Close an active session at `ended_at` and store its duration.
    pub async fn complete_walking_session(
        &self,
        session_id: &str,
        ended_at: DateTime<Utc>,
    ) -> Result<WalkingSession> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let tx = conn.transaction()?;

            let started_at: String = tx
                .query_row(
                    "SELECT started_at FROM walking_sessions WHERE id = ?1",
                    params![session_id],
                    |row| row.get(0),
                )
                .optional()?
                .ok_or_else(|| anyhow!("walking session {session_id} not found"))?;
            let started_at = parse_datetime(&started_at, "started_at")?;
            let duration_secs = elapsed_secs(started_at, ended_at);

            tx.execute(
                "UPDATE walking_sessions
                 SET ended_at = ?1,
                     duration_secs = ?2,
                     status = ?3
                 WHERE id = ?4",
                params![
                    ended_at.to_rfc3339(),
                    to_i64(duration_secs)?,
                    SessionStatus::Completed.as_str(),
                    session_id,
                ],
            )?;
            tx.commit().context("failed to complete walking session")?;

            Ok(WalkingSession {
                id: session_id,
                started_at,
                ended_at: Some(ended_at),
                duration_secs: Some(duration_secs),
                status: SessionStatus::Completed,
            })
        })
        .await
    }

    pub async fn get_walking_session(&self, session_id: &str) -> Result<Option<WalkingSession>> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, started_at, ended_at, duration_secs, status
                 FROM walking_sessions
                 WHERE id = ?1",
            )?;

            let session = stmt
                .query_row(params![session_id], |row| Ok(row_to_session(row)))
                .optional()?
                .transpose()?;
            Ok(session)
        })
        .await
    }

    /// Sessions left Active by a previous process. Their end time is unknown,
    /// so they are marked Interrupted without a duration.
    pub async fn mark_active_sessions_interrupted(&self) -> Result<usize> {
        self.execute(|conn| {
            let updated = conn.execute(
                "UPDATE walking_sessions SET status = ?1 WHERE status = ?2",
                params![
                    SessionStatus::Interrupted.as_str(),
                    SessionStatus::Active.as_str()
                ],
            )?;
            Ok(updated)
        })
        .await
    }

    /// Sessions that started in `[from, to)`, oldest first.
    pub async fn list_walking_sessions(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<WalkingSession>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, started_at, ended_at, duration_secs, status
                 FROM walking_sessions
                 WHERE started_at >= ?1 AND started_at < ?2
                 ORDER BY started_at ASC",
            )?;

            let mut rows = stmt.query(params![from.to_rfc3339(), to.to_rfc3339()])?;
            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                sessions.push(row_to_session(row)?);
            }

            Ok(sessions)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 1, 7, 0, 0).unwrap() + Duration::seconds(secs)
    }

    fn active(id: &str, started_at: DateTime<Utc>) -> WalkingSession {
        WalkingSession {
            id: id.into(),
            started_at,
            ended_at: None,
            duration_secs: None,
            status: SessionStatus::Active,
        }
    }

    #[tokio::test]
    async fn completes_session_with_duration() {
        let db = Database::open_in_memory().unwrap();
        db.insert_walking_session(&active("a", t(0))).await.unwrap();

        let done = db.complete_walking_session("a", t(125)).await.unwrap();
        assert_eq!(done.duration_secs, Some(125));

        let stored = db.get_walking_session("a").await.unwrap().unwrap();
        assert_eq!(stored, done);
    }

    #[tokio::test]
    async fn completing_unknown_session_fails() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.complete_walking_session("missing", t(1)).await.is_err());
    }

    #[tokio::test]
    async fn leftover_sessions_become_interrupted() {
        let db = Database::open_in_memory().unwrap();
        db.insert_walking_session(&active("a", t(0))).await.unwrap();
        db.insert_walking_session(&active("b", t(50))).await.unwrap();
        db.complete_walking_session("b", t(60)).await.unwrap();

        assert_eq!(db.mark_active_sessions_interrupted().await.unwrap(), 1);

        let sessions = db.list_walking_sessions(t(0), t(3600)).await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].status, SessionStatus::Interrupted);
        assert_eq!(sessions[1].status, SessionStatus::Completed);
    }
}
