use anyhow::Result;
use chrono::Utc;
use shared::{AgentFilters, Page};
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

use super::{Agent, CreateAgent, Database, UpdateAgent};

const AGENT_COLUMNS: &str = "id, name, description, status, user_id, created_at, updated_at";

/// Ownership plus the optional search / status conditions, shared by the
/// page query and the count query.
fn push_filters<'a>(
    qb: &mut QueryBuilder<'a, Sqlite>,
    user_id: &'a str,
    filters: &'a AgentFilters,
) {
    qb.push(" WHERE user_id = ").push_bind(user_id);

    let search = filters.search.trim();
    if !search.is_empty() {
        // SQLite LIKE is case-insensitive for ASCII
        qb.push(" AND name LIKE ").push_bind(format!("%{}%", search));
    }

    if let Some(status) = filters.status.as_status() {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
}

impl Database {
    pub async fn get_all_agents(&self, user_id: &str) -> Result<Vec<Agent>> {
        let agents = sqlx::query_as::<_, Agent>(&format!(
            "SELECT {AGENT_COLUMNS} FROM agents WHERE user_id = ? ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(agents)
    }

    /// Paginated listing with optional name search and status filter,
    /// newest-created first.
    pub async fn list_agents(&self, user_id: &str, filters: &AgentFilters) -> Result<Page<Agent>> {
        let offset = (filters.page as i64 - 1) * filters.page_size as i64;

        let mut query = QueryBuilder::new(format!("SELECT {AGENT_COLUMNS} FROM agents"));
        push_filters(&mut query, user_id, filters);
        query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(filters.page_size as i64)
            .push(" OFFSET ")
            .push_bind(offset);

        let agents = query
            .build_query_as::<Agent>()
            .fetch_all(&self.pool)
            .await?;

        // Total ignores pagination but keeps the filter conditions
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM agents");
        push_filters(&mut count, user_id, filters);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        Ok(Page::new(agents, total, filters.page, filters.page_size))
    }

    pub async fn get_agent(&self, id: &str, user_id: &str) -> Result<Option<Agent>> {
        let agent = sqlx::query_as::<_, Agent>(&format!(
            "SELECT {AGENT_COLUMNS} FROM agents WHERE id = ? AND user_id = ?"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(agent)
    }

    pub async fn create_agent(&self, data: &CreateAgent, user_id: &str) -> Result<Agent> {
        let now = Utc::now();
        let agent = Agent {
            id: Uuid::new_v4().to_string(),
            name: data.name.clone(),
            description: data.description.clone(),
            status: data.status.unwrap_or_default(),
            user_id: user_id.to_string(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO agents (id, name, description, status, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&agent.id)
        .bind(&agent.name)
        .bind(&agent.description)
        .bind(agent.status.as_str())
        .bind(&agent.user_id)
        .bind(agent.created_at)
        .bind(agent.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(agent)
    }

    /// Partial update scoped to (id, owner). Fields absent from `data`
    /// keep their current values.
    pub async fn update_agent(
        &self,
        id: &str,
        data: &UpdateAgent,
        user_id: &str,
    ) -> Result<Option<Agent>> {
        let Some(mut agent) = self.get_agent(id, user_id).await? else {
            return Ok(None);
        };

        if let Some(name) = &data.name {
            agent.name = name.clone();
        }
        if let Some(description) = &data.description {
            agent.description = Some(description.clone());
        }
        if let Some(status) = data.status {
            agent.status = status;
        }
        agent.updated_at = Utc::now();

        sqlx::query(
            "UPDATE agents SET name = ?, description = ?, status = ?, updated_at = ? WHERE id = ? AND user_id = ?",
        )
        .bind(&agent.name)
        .bind(&agent.description)
        .bind(agent.status.as_str())
        .bind(agent.updated_at)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(Some(agent))
    }

    /// Scoped delete; returns the deleted record so callers can confirm.
    /// No cascade is applied to meetings referencing the agent.
    pub async fn delete_agent(&self, id: &str, user_id: &str) -> Result<Option<Agent>> {
        let Some(agent) = self.get_agent(id, user_id).await? else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM agents WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(Some(agent))
    }
}
