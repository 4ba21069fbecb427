use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::{
    db::{CreateMeeting, Meeting, MeetingWithAgent, UpdateMeeting},
    error::AppError,
    routes::auth::AuthUser,
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct DeleteMeetingResponse {
    pub success: bool,
    pub deleted_meeting: Meeting,
}

#[derive(Debug, Serialize)]
pub struct MeetingCountResponse {
    pub count: i64,
}

/// Every meeting the caller owns, newest first, each with its agent.
/// GET /api/meetings
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<MeetingWithAgent>>, AppError> {
    let meetings = state.db.get_all_meetings(&user.user_id).await?;
    Ok(Json(meetings))
}

/// Meetings bound to one agent.
/// GET /api/agents/:id/meetings
pub async fn list_for_agent(
    State(state): State<AppState>,
    user: AuthUser,
    Path(agent_id): Path<String>,
) -> Result<Json<Vec<Meeting>>, AppError> {
    let meetings = state
        .db
        .get_meetings_by_agent(&agent_id, &user.user_id)
        .await?;
    Ok(Json(meetings))
}

/// How many meetings reference an agent; shown before agent deletion.
/// GET /api/agents/:id/meetings/count
pub async fn count_for_agent(
    State(state): State<AppState>,
    user: AuthUser,
    Path(agent_id): Path<String>,
) -> Result<Json<MeetingCountResponse>, AppError> {
    let count = state
        .db
        .count_meetings_by_agent(&agent_id, &user.user_id)
        .await?;
    Ok(Json(MeetingCountResponse { count }))
}

/// GET /api/meetings/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MeetingWithAgent>, AppError> {
    let meeting = state
        .db
        .get_meeting(&id, &user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Meeting not found".to_string()))?;
    Ok(Json(meeting))
}

/// POST /api/meetings
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateMeeting>,
) -> Result<Json<Meeting>, AppError> {
    input.validate()?;
    let meeting = state.db.create_meeting(&input, &user.user_id).await?;
    tracing::info!("User {} created meeting {}", user.user_id, meeting.id);
    Ok(Json(meeting))
}

/// PUT /api/meetings/:id
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(input): Json<UpdateMeeting>,
) -> Result<Json<Meeting>, AppError> {
    input.validate()?;
    let meeting = state
        .db
        .update_meeting(&id, &input, &user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Meeting not found".to_string()))?;
    Ok(Json(meeting))
}

/// DELETE /api/meetings/:id
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DeleteMeetingResponse>, AppError> {
    let meeting = state
        .db
        .delete_meeting(&id, &user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Meeting not found".to_string()))?;
    tracing::info!("User {} deleted meeting {}", user.user_id, meeting.id);
    Ok(Json(DeleteMeetingResponse {
        success: true,
        deleted_meeting: meeting,
    }))
}
