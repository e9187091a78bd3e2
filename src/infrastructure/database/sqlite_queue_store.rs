use crate::application::ports::queue_store::{EnqueueOutcome, QueueStore};
use crate::domain::entities::{QueueCounts, QueueRecord};
use crate::domain::value_objects::{FailureReason, RecordId, RecordState};
use crate::infrastructure::database::rows::ScanQueueRow;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

/// SQLite-backed durable queue. Transitions are single conditional UPDATEs,
/// so they are atomic with respect to concurrent readers and a transition
/// from the wrong state affects zero rows instead of clobbering.
pub struct SqliteQueueStore {
    pool: SqlitePool,
}

impl SqliteQueueStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, id: &RecordId) -> Result<Option<ScanQueueRow>, AppError> {
        let row = sqlx::query_as::<_, ScanQueueRow>(
            "SELECT id, picker_id, bucket_id, kind, scanned_at, status, attempt_count, \
             failure_reason, created_at, updated_at, synced_at, failed_at \
             FROM scan_queue WHERE id = ?1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}

#[async_trait]
impl QueueStore for SqliteQueueStore {
    async fn enqueue(&self, record: &QueueRecord) -> Result<EnqueueOutcome, AppError> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO scan_queue (
                id, picker_id, bucket_id, kind, scanned_at,
                status, attempt_count, failure_reason,
                created_at, updated_at, synced_at, failed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(record.id.as_str())
        .bind(record.event.picker_id.as_str())
        .bind(record.event.bucket_id.as_str())
        .bind(record.event.kind.as_str())
        .bind(record.event.scanned_at.timestamp_millis())
        .bind(record.state.as_str())
        .bind(record.attempt_count as i64)
        .bind(record.failure_reason.as_ref().map(|r| r.as_str().to_string()))
        .bind(record.created_at.timestamp_millis())
        .bind(record.updated_at.timestamp_millis())
        .bind(record.synced_at.map(|t| t.timestamp_millis()))
        .bind(record.failed_at.map(|t| t.timestamp_millis()))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(EnqueueOutcome::Inserted);
        }

        // The id already exists. A retried capture with the same payload is
        // an idempotent no-op; a different payload under the same id is a
        // caller bug.
        let existing = self
            .fetch(&record.id)
            .await?
            .ok_or_else(|| {
                AppError::Database(format!("Insert conflicted but row missing: {}", record.id))
            })?
            .into_record()?;

        if existing.event == record.event {
            Ok(EnqueueOutcome::Duplicate)
        } else {
            Err(AppError::DuplicateRecord(record.id.to_string()))
        }
    }

    async fn get(&self, id: &RecordId) -> Result<Option<QueueRecord>, AppError> {
        self.fetch(id).await?.map(ScanQueueRow::into_record).transpose()
    }

    async fn list_pending(&self) -> Result<Vec<QueueRecord>, AppError> {
        let rows = sqlx::query_as::<_, ScanQueueRow>(
            "SELECT id, picker_id, bucket_id, kind, scanned_at, status, attempt_count, \
             failure_reason, created_at, updated_at, synced_at, failed_at \
             FROM scan_queue WHERE status = 'pending' \
             ORDER BY created_at ASC, rowid ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ScanQueueRow::into_record).collect()
    }

    async fn list_failed(&self) -> Result<Vec<QueueRecord>, AppError> {
        let rows = sqlx::query_as::<_, ScanQueueRow>(
            "SELECT id, picker_id, bucket_id, kind, scanned_at, status, attempt_count, \
             failure_reason, created_at, updated_at, synced_at, failed_at \
             FROM scan_queue WHERE status = 'failed' \
             ORDER BY failed_at ASC, rowid ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ScanQueueRow::into_record).collect()
    }

    async fn mark_in_flight(&self, id: &RecordId) -> Result<u32, AppError> {
        let now = Utc::now().timestamp_millis();
        let attempt = sqlx::query(
            r#"
            UPDATE scan_queue
            SET status = 'in_flight', attempt_count = attempt_count + 1, updated_at = ?1
            WHERE id = ?2 AND status = 'pending'
            RETURNING attempt_count
            "#,
        )
        .bind(now)
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match attempt {
            Some(row) => {
                let count: i64 = row.try_get("attempt_count")?;
                Ok(count.max(0) as u32)
            }
            None => Err(AppError::InvalidTransition(format!(
                "Record {id} is not pending"
            ))),
        }
    }

    async fn mark_synced(&self, id: &RecordId) -> Result<(), AppError> {
        let now = Utc::now().timestamp_millis();
        let result = sqlx::query(
            r#"
            UPDATE scan_queue
            SET status = 'synced', synced_at = ?1, updated_at = ?1, failure_reason = NULL
            WHERE id = ?2 AND status = 'in_flight'
            "#,
        )
        .bind(now)
        .bind(id.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::InvalidTransition(format!(
                "Record {id} is not in flight"
            )));
        }
        Ok(())
    }

    async fn mark_failed(&self, id: &RecordId, reason: &FailureReason) -> Result<(), AppError> {
        let now = Utc::now().timestamp_millis();
        let result = sqlx::query(
            r#"
            UPDATE scan_queue
            SET status = 'failed', failure_reason = ?1,
                failed_at = COALESCE(failed_at, ?2), updated_at = ?2
            WHERE id = ?3 AND status = 'in_flight'
            "#,
        )
        .bind(reason.as_str())
        .bind(now)
        .bind(id.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::InvalidTransition(format!(
                "Record {id} is not in flight"
            )));
        }
        Ok(())
    }

    async fn requeue(&self, id: &RecordId) -> Result<(), AppError> {
        let now = Utc::now().timestamp_millis();
        let result = sqlx::query(
            r#"
            UPDATE scan_queue
            SET status = 'pending', updated_at = ?1
            WHERE id = ?2 AND status = 'in_flight'
            "#,
        )
        .bind(now)
        .bind(id.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::InvalidTransition(format!(
                "Record {id} is not in flight"
            )));
        }
        Ok(())
    }

    async fn retry_failed(&self, id: &RecordId) -> Result<(), AppError> {
        let now = Utc::now().timestamp_millis();
        let result = sqlx::query(
            r#"
            UPDATE scan_queue
            SET status = 'pending', failure_reason = NULL, updated_at = ?1
            WHERE id = ?2 AND status = 'failed'
            "#,
        )
        .bind(now)
        .bind(id.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("No failed record {id}")));
        }
        Ok(())
    }

    async fn discard_failed(&self, id: &RecordId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM scan_queue WHERE id = ?1 AND status = 'failed'")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("No failed record {id}")));
        }
        Ok(())
    }

    async fn recover_in_flight(&self) -> Result<u64, AppError> {
        let now = Utc::now().timestamp_millis();
        let result = sqlx::query(
            r#"
            UPDATE scan_queue
            SET status = 'pending', updated_at = ?1
            WHERE status = 'in_flight'
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn purge_synced(&self, older_than: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            "DELETE FROM scan_queue WHERE status = 'synced' AND synced_at < ?1",
        )
        .bind(older_than.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn counts(&self) -> Result<QueueCounts, AppError> {
        let rows = sqlx::query(
            "SELECT status, COUNT(*) as count FROM scan_queue GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut counts = QueueCounts::default();
        for row in rows {
            let status: String = row.try_get("status")?;
            let count: i64 = row.try_get("count")?;
            let count = count.max(0) as u64;
            match RecordState::from(status.as_str()) {
                RecordState::Pending => counts.pending = count,
                RecordState::InFlight => counts.in_flight = count,
                RecordState::Synced => counts.synced = count,
                RecordState::Failed => counts.failed = count,
                RecordState::Unknown(_) => {}
            }
        }
        Ok(counts)
    }

    async fn has_unsynced(&self) -> Result<bool, AppError> {
        let (exists,): (i64,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM scan_queue WHERE status != 'synced')",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(exists != 0)
    }
}
