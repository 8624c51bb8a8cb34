// SQLite QueueRepository Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use chrono::NaiveDate;
use mentorq_core::domain::{DomainError, MemberEntry, Queue, QueueId, QueueStatus};
use mentorq_core::error::{AppError, Result};
use mentorq_core::port::{QueueRepository, SwapOutcome};
use sqlx::SqlitePool;
use tracing::debug;

pub struct SqliteQueueRepository {
    pool: SqlitePool,
}

impl SqliteQueueRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM queues WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(found.is_some())
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[async_trait]
impl QueueRepository for SqliteQueueRepository {
    async fn insert(&self, queue: &Queue) -> Result<u64> {
        let members = serde_json::to_string(&queue.members)?;

        sqlx::query(
            r#"
            INSERT INTO queues (
                id, team_id, session_date, status, estimated_minutes_per_member,
                tickets_issued, members, version, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?, ?)
            "#,
        )
        .bind(&queue.id)
        .bind(&queue.team_id)
        .bind(queue.session_date)
        .bind(queue.status.to_string())
        .bind(i64::from(queue.estimated_minutes_per_member))
        .bind(queue.tickets_issued as i64)
        .bind(&members)
        .bind(queue.created_at)
        .bind(queue.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(1)
    }

    async fn load(&self, id: &QueueId) -> Result<Option<Queue>> {
        let row = sqlx::query_as::<_, QueueRow>("SELECT * FROM queues WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(QueueRow::into_queue).transpose()
    }

    async fn compare_and_swap(&self, queue: &Queue, expected_version: u64) -> Result<SwapOutcome> {
        let members = serde_json::to_string(&queue.members)?;

        // Single statement: the version check and the write are one atomic step
        let result = sqlx::query(
            r#"
            UPDATE queues
            SET status = ?, estimated_minutes_per_member = ?, tickets_issued = ?,
                members = ?, version = version + 1, updated_at = ?
            WHERE id = ? AND version = ?
            "#,
        )
        .bind(queue.status.to_string())
        .bind(i64::from(queue.estimated_minutes_per_member))
        .bind(queue.tickets_issued as i64)
        .bind(&members)
        .bind(now_millis())
        .bind(&queue.id)
        .bind(expected_version as i64)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 1 {
            return Ok(SwapOutcome::Swapped {
                version: expected_version + 1,
            });
        }

        if !self.exists(&queue.id).await? {
            return Err(DomainError::QueueNotFound(queue.id.clone()).into());
        }

        debug!(queue_id = %queue.id, expected_version, "Stored version moved on");
        Ok(SwapOutcome::Conflict)
    }

    async fn list_by_status(&self, status: QueueStatus) -> Result<Vec<Queue>> {
        let rows = sqlx::query_as::<_, QueueRow>(
            "SELECT * FROM queues WHERE status = ? ORDER BY session_date ASC, created_at ASC",
        )
        .bind(status.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(QueueRow::into_queue).collect()
    }
}

// Database row representation
#[derive(sqlx::FromRow)]
struct QueueRow {
    id: String,
    team_id: String,
    session_date: NaiveDate,
    status: String,
    estimated_minutes_per_member: i64,
    tickets_issued: i64,
    members: String,
    version: i64,
    created_at: i64,
}

impl QueueRow {
    fn into_queue(self) -> Result<Queue> {
        let status: QueueStatus = self.status.parse()?;
        let members: Vec<MemberEntry> = serde_json::from_str(&self.members)?;
        let estimated_minutes_per_member = u32::try_from(self.estimated_minutes_per_member)
            .map_err(|_| {
                AppError::Database(format!(
                    "queue {}: bad minutes per member {}",
                    self.id, self.estimated_minutes_per_member
                ))
            })?;

        Ok(Queue {
            id: self.id,
            team_id: self.team_id,
            session_date: self.session_date,
            status,
            estimated_minutes_per_member,
            tickets_issued: self.tickets_issued.max(0) as u64,
            members,
            version: self.version.max(0) as u64,
            created_at: self.created_at,
        })
    }
}
