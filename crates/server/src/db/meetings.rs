use anyhow::Result;
use chrono::Utc;
use shared::ParseStatusError;
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

use super::{Agent, CreateMeeting, Database, Meeting, MeetingWithAgent, UpdateMeeting};

const MEETING_COLUMNS: &str =
    "id, name, status, started_at, ended_at, user_id, agent_id, created_at, updated_at";

// Meetings joined with their agent in one query instead of a per-row
// lookup. LEFT JOIN so rows written without foreign_keys enforcement
// still list; those surface agent = None.
const MEETING_WITH_AGENT_SELECT: &str = "\
    SELECT m.id, m.name, m.status, m.started_at, m.ended_at, m.user_id, m.agent_id, \
           m.created_at, m.updated_at, \
           a.id AS a_id, a.name AS a_name, a.description AS a_description, \
           a.status AS a_status, a.user_id AS a_user_id, \
           a.created_at AS a_created_at, a.updated_at AS a_updated_at \
    FROM meetings m LEFT JOIN agents a ON a.id = m.agent_id";

fn decode_status<T: std::str::FromStr<Err = ParseStatusError>>(
    value: String,
    column: &str,
) -> Result<T, sqlx::Error> {
    value.parse().map_err(|err: ParseStatusError| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(err),
    })
}

fn meeting_with_agent_from_row(row: &SqliteRow) -> Result<MeetingWithAgent, sqlx::Error> {
    let meeting = Meeting {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        status: decode_status(row.try_get("status")?, "status")?,
        started_at: row.try_get("started_at")?,
        ended_at: row.try_get("ended_at")?,
        user_id: row.try_get("user_id")?,
        agent_id: row.try_get("agent_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    };

    let agent = match row.try_get::<Option<String>, _>("a_id")? {
        Some(id) => Some(Agent {
            id,
            name: row.try_get("a_name")?,
            description: row.try_get("a_description")?,
            status: decode_status(row.try_get("a_status")?, "a_status")?,
            user_id: row.try_get("a_user_id")?,
            created_at: row.try_get("a_created_at")?,
            updated_at: row.try_get("a_updated_at")?,
        }),
        None => None,
    };

    Ok(MeetingWithAgent { meeting, agent })
}

impl Database {
    pub async fn get_all_meetings(&self, user_id: &str) -> Result<Vec<MeetingWithAgent>> {
        let rows = sqlx::query(&format!(
            "{MEETING_WITH_AGENT_SELECT} WHERE m.user_id = ? ORDER BY m.created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut meetings = Vec::with_capacity(rows.len());
        for row in &rows {
            meetings.push(meeting_with_agent_from_row(row)?);
        }
        Ok(meetings)
    }

    pub async fn get_meetings_by_agent(
        &self,
        agent_id: &str,
        user_id: &str,
    ) -> Result<Vec<Meeting>> {
        let meetings = sqlx::query_as::<_, Meeting>(&format!(
            "SELECT {MEETING_COLUMNS} FROM meetings WHERE agent_id = ? AND user_id = ? ORDER BY created_at DESC"
        ))
        .bind(agent_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(meetings)
    }

    pub async fn get_meeting(&self, id: &str, user_id: &str) -> Result<Option<MeetingWithAgent>> {
        let row = sqlx::query(&format!(
            "{MEETING_WITH_AGENT_SELECT} WHERE m.id = ? AND m.user_id = ?"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(meeting_with_agent_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_meeting_record(&self, id: &str, user_id: &str) -> Result<Option<Meeting>> {
        let meeting = sqlx::query_as::<_, Meeting>(&format!(
            "SELECT {MEETING_COLUMNS} FROM meetings WHERE id = ? AND user_id = ?"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(meeting)
    }

    /// The referenced agent's ownership is not cross-checked here; the
    /// meeting itself is always stamped with the caller as owner.
    pub async fn create_meeting(&self, data: &CreateMeeting, user_id: &str) -> Result<Meeting> {
        let now = Utc::now();
        let meeting = Meeting {
            id: Uuid::new_v4().to_string(),
            name: data.name.clone(),
            status: data.status.unwrap_or_default(),
            started_at: data.started_at,
            ended_at: data.ended_at,
            user_id: user_id.to_string(),
            agent_id: data.agent_id.clone(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO meetings (id, name, status, started_at, ended_at, user_id, agent_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&meeting.id)
        .bind(&meeting.name)
        .bind(meeting.status.as_str())
        .bind(meeting.started_at)
        .bind(meeting.ended_at)
        .bind(&meeting.user_id)
        .bind(&meeting.agent_id)
        .bind(meeting.created_at)
        .bind(meeting.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(meeting)
    }

    /// Partial update scoped to (id, owner). `started_at` / `ended_at`
    /// distinguish "leave unchanged" from "clear to NULL".
    pub async fn update_meeting(
        &self,
        id: &str,
        data: &UpdateMeeting,
        user_id: &str,
    ) -> Result<Option<Meeting>> {
        let Some(mut meeting) = self.get_meeting_record(id, user_id).await? else {
            return Ok(None);
        };

        if let Some(name) = &data.name {
            meeting.name = name.clone();
        }
        if let Some(agent_id) = &data.agent_id {
            meeting.agent_id = agent_id.clone();
        }
        if let Some(status) = data.status {
            meeting.status = status;
        }
        if let Some(started_at) = data.started_at {
            meeting.started_at = started_at;
        }
        if let Some(ended_at) = data.ended_at {
            meeting.ended_at = ended_at;
        }
        meeting.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE meetings
            SET name = ?, agent_id = ?, status = ?, started_at = ?, ended_at = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&meeting.name)
        .bind(&meeting.agent_id)
        .bind(meeting.status.as_str())
        .bind(meeting.started_at)
        .bind(meeting.ended_at)
        .bind(meeting.updated_at)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(Some(meeting))
    }

    pub async fn delete_meeting(&self, id: &str, user_id: &str) -> Result<Option<Meeting>> {
        let Some(meeting) = self.get_meeting_record(id, user_id).await? else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM meetings WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(Some(meeting))
    }

    pub async fn count_meetings_by_agent(&self, agent_id: &str, user_id: &str) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM meetings WHERE agent_id = ? AND user_id = ?")
                .bind(agent_id)
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
