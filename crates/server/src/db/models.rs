use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use shared::{AgentStatus, MeetingStatus};
use sqlx::FromRow;

use crate::error::{AppError, FieldError};

pub const MAX_MEETING_NAME_LEN: usize = 100;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub email_verified: bool,
    pub image: Option<String>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-facing view of a user; never exposes the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub email_verified: bool,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            email_verified: user.email_verified,
            image: user.image,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: AgentStatus,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Meeting {
    pub id: String,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub status: MeetingStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub user_id: String,
    pub agent_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A meeting joined with its agent. `agent` is `None` only for rows
/// whose agent is missing, which foreign-key enforcement prevents for
/// anything written by this server.
#[derive(Debug, Clone, Serialize)]
pub struct MeetingWithAgent {
    #[serde(flatten)]
    pub meeting: Meeting,
    pub agent: Option<Agent>,
}

// ============================================================================
// Inputs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAgent {
    pub name: String,
    pub description: Option<String>,
    pub status: Option<AgentStatus>,
}

impl CreateAgent {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut fields = Vec::new();
        if self.name.trim().is_empty() {
            fields.push(FieldError::new("name", "Name is required"));
        }
        if fields.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(fields))
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAgent {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<AgentStatus>,
}

impl UpdateAgent {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut fields = Vec::new();
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                fields.push(FieldError::new("name", "Name is required"));
            }
        }
        if fields.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(fields))
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMeeting {
    pub name: String,
    pub agent_id: String,
    pub status: Option<MeetingStatus>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl CreateMeeting {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut fields = Vec::new();
        if self.name.trim().is_empty() {
            fields.push(FieldError::new("name", "Name is required"));
        } else if self.name.chars().count() > MAX_MEETING_NAME_LEN {
            fields.push(FieldError::new("name", "Name too long"));
        }
        if self.agent_id.trim().is_empty() {
            fields.push(FieldError::new("agent_id", "Agent is required"));
        }
        if fields.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(fields))
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMeeting {
    pub name: Option<String>,
    pub agent_id: Option<String>,
    pub status: Option<MeetingStatus>,
    /// Absent field = keep current value; explicit null = clear.
    #[serde(default, deserialize_with = "double_option")]
    pub started_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    pub ended_at: Option<Option<DateTime<Utc>>>,
}

impl UpdateMeeting {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut fields = Vec::new();
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                fields.push(FieldError::new("name", "Name is required"));
            } else if name.chars().count() > MAX_MEETING_NAME_LEN {
                fields.push(FieldError::new("name", "Name too long"));
            }
        }
        if let Some(agent_id) = &self.agent_id {
            if agent_id.trim().is_empty() {
                fields.push(FieldError::new("agent_id", "Agent is required"));
            }
        }
        if fields.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(fields))
        }
    }
}

/// Distinguishes a missing field from an explicit `null`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
