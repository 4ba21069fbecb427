use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use shared::{AgentFilters, Page, MAX_PAGE_SIZE};

use crate::{
    db::{Agent, CreateAgent, UpdateAgent},
    error::{AppError, FieldError},
    routes::auth::AuthUser,
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct DeleteAgentResponse {
    pub success: bool,
    pub deleted_agent: Agent,
}

fn validate_filters(filters: &AgentFilters) -> Result<(), AppError> {
    let mut fields = Vec::new();
    if filters.page < 1 {
        fields.push(FieldError::new("page", "Page must be at least 1"));
    }
    if filters.page_size < 1 || filters.page_size > MAX_PAGE_SIZE {
        fields.push(FieldError::new(
            "page_size",
            format!("Page size must be between 1 and {MAX_PAGE_SIZE}"),
        ));
    }
    if fields.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(fields))
    }
}

/// Paginated, filterable listing.
/// GET /api/agents?search=&status=&page=&page_size=
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(filters): Query<AgentFilters>,
) -> Result<Json<Page<Agent>>, AppError> {
    validate_filters(&filters)?;
    let page = state.db.list_agents(&user.user_id, &filters).await?;
    Ok(Json(page))
}

/// Every agent the caller owns, newest first.
/// GET /api/agents/all
pub async fn get_all(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Agent>>, AppError> {
    let agents = state.db.get_all_agents(&user.user_id).await?;
    Ok(Json(agents))
}

/// GET /api/agents/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Agent>, AppError> {
    let agent = state
        .db
        .get_agent(&id, &user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Agent not found".to_string()))?;
    Ok(Json(agent))
}

/// POST /api/agents
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateAgent>,
) -> Result<Json<Agent>, AppError> {
    input.validate()?;
    let agent = state.db.create_agent(&input, &user.user_id).await?;
    tracing::info!("User {} created agent {}", user.user_id, agent.id);
    Ok(Json(agent))
}

/// PUT /api/agents/:id
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(input): Json<UpdateAgent>,
) -> Result<Json<Agent>, AppError> {
    input.validate()?;
    let agent = state
        .db
        .update_agent(&id, &input, &user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Agent not found".to_string()))?;
    Ok(Json(agent))
}

/// DELETE /api/agents/:id
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DeleteAgentResponse>, AppError> {
    let agent = state
        .db
        .delete_agent(&id, &user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Agent not found".to_string()))?;
    tracing::info!("User {} deleted agent {}", user.user_id, agent.id);
    Ok(Json(DeleteAgentResponse {
        success: true,
        deleted_agent: agent,
    }))
}
