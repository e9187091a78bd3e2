use crate::application::ports::attendance_store::AttendanceStore;
use crate::domain::entities::AttendanceEntry;
use crate::infrastructure::database::rows::AttendanceRow;
use crate::shared::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteAttendanceStore {
    pool: SqlitePool,
}

impl SqliteAttendanceStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceStore for SqliteAttendanceStore {
    async fn load_all(&self) -> Result<Vec<AttendanceEntry>, AppError> {
        let rows = sqlx::query_as::<_, AttendanceRow>(
            "SELECT picker_id, is_checked_in, last_updated_at FROM attendance_cache",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AttendanceRow::into_entry).collect()
    }

    async fn upsert(&self, entry: &AttendanceEntry) -> Result<bool, AppError> {
        // Last-write-wins: the conditional DO UPDATE leaves newer rows alone.
        let result = sqlx::query(
            r#"
            INSERT INTO attendance_cache (picker_id, is_checked_in, last_updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(picker_id) DO UPDATE SET
                is_checked_in = excluded.is_checked_in,
                last_updated_at = excluded.last_updated_at
            WHERE excluded.last_updated_at > attendance_cache.last_updated_at
            "#,
        )
        .bind(entry.picker_id.as_str())
        .bind(entry.is_checked_in)
        .bind(entry.last_updated_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn replace_all(&self, entries: &[AttendanceEntry]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM attendance_cache")
            .execute(&mut *tx)
            .await?;

        for entry in entries {
            sqlx::query(
                "INSERT INTO attendance_cache (picker_id, is_checked_in, last_updated_at) \
                 VALUES (?1, ?2, ?3)",
            )
            .bind(entry.picker_id.as_str())
            .bind(entry.is_checked_in)
            .bind(entry.last_updated_at.timestamp_millis())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
