//! Recurring-schedule rows and the composite schedule id.

use super::Store;
use parrot_core::error::ParrotError;

/// A durable recurring daily send instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    /// Composite key: `{contact_id}_{HH:MM}`.
    pub id: String,
    pub contact_id: String,
    pub message: String,
    pub hour: u8,
    pub minute: u8,
}

/// Compose the deterministic schedule key. Zero-padded, so the natural key
/// is also the dedup key: one schedule per contact+time.
pub fn schedule_id(contact_id: &str, hour: u8, minute: u8) -> String {
    format!("{contact_id}_{hour:02}:{minute:02}")
}

impl Store {
    /// Persist a schedule, replacing any existing row with the same id
    /// (replace-not-duplicate semantics: the latest message wins).
    pub async fn upsert_schedule(
        &self,
        contact_id: &str,
        message: &str,
        hour: u8,
        minute: u8,
    ) -> Result<Schedule, ParrotError> {
        if hour > 23 || minute > 59 {
            return Err(ParrotError::Validation(format!(
                "invalid time {hour:02}:{minute:02}"
            )));
        }

        let id = schedule_id(contact_id, hour, minute);
        sqlx::query(
            "INSERT INTO schedules (id, contact_id, message, hour, minute) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET \
                 contact_id = excluded.contact_id, \
                 message = excluded.message, \
                 hour = excluded.hour, \
                 minute = excluded.minute",
        )
        .bind(&id)
        .bind(contact_id)
        .bind(message)
        .bind(hour as i64)
        .bind(minute as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| ParrotError::Store(format!("upsert schedule failed: {e}")))?;

        Ok(Schedule {
            id,
            contact_id: contact_id.to_string(),
            message: message.to_string(),
            hour,
            minute,
        })
    }

    /// Delete a schedule row. Returns `true` if a row was removed.
    pub async fn delete_schedule(&self, id: &str) -> Result<bool, ParrotError> {
        let result = sqlx::query("DELETE FROM schedules WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| ParrotError::Store(format!("delete schedule failed: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Fetch a single schedule by id.
    pub async fn get_schedule(&self, id: &str) -> Result<Option<Schedule>, ParrotError> {
        let row: Option<(String, String, String, i64, i64)> = sqlx::query_as(
            "SELECT id, contact_id, message, hour, minute FROM schedules WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ParrotError::Store(format!("query failed: {e}")))?;

        Ok(row.map(row_to_schedule))
    }

    /// List all schedules in storage order.
    pub async fn list_schedules(&self) -> Result<Vec<Schedule>, ParrotError> {
        let rows: Vec<(String, String, String, i64, i64)> = sqlx::query_as(
            "SELECT id, contact_id, message, hour, minute FROM schedules ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ParrotError::Store(format!("query failed: {e}")))?;

        Ok(rows.into_iter().map(row_to_schedule).collect())
    }
}

fn row_to_schedule((id, contact_id, message, hour, minute): (String, String, String, i64, i64)) -> Schedule {
    Schedule {
        id,
        contact_id,
        message,
        hour: hour as u8,
        minute: minute as u8,
    }
}
