// SQLite TeamDirectory Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use mentorq_core::domain::{Team, TeamId};
use mentorq_core::error::Result;
use mentorq_core::port::TeamDirectory;
use sqlx::SqlitePool;
use tracing::info;

/// Team records kept next to the queues they own
pub struct SqliteTeamDirectory {
    pool: SqlitePool,
}

impl SqliteTeamDirectory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TeamDirectory for SqliteTeamDirectory {
    async fn find_team(&self, id: &TeamId) -> Result<Option<Team>> {
        let row = sqlx::query_as::<_, TeamRow>("SELECT * FROM teams WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(|r| r.into_team()))
    }

    async fn register(&self, team: &Team) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO teams (id, name, mentor_id, is_active) VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                mentor_id = excluded.mentor_id,
                is_active = excluded.is_active
            "#,
        )
        .bind(&team.id)
        .bind(&team.name)
        .bind(&team.mentor_id)
        .bind(team.is_active)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        info!(team_id = %team.id, mentor_id = %team.mentor_id, active = team.is_active, "Team registered");
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct TeamRow {
    id: String,
    name: String,
    mentor_id: String,
    is_active: bool,
}

impl TeamRow {
    fn into_team(self) -> Team {
        Team {
            id: self.id,
            name: self.name,
            mentor_id: self.mentor_id,
            is_active: self.is_active,
        }
    }
}
