//! Contact allow-list — set membership for secondary-channel auto-replies.
//!
//! Contact ids arrive here already normalized (see `parrot_core::phone`);
//! the store treats them as opaque keys with set semantics.

use super::Store;
use parrot_core::error::ParrotError;

impl Store {
    /// Add a contact. Idempotent: adding an existing contact is a no-op.
    pub async fn add_contact(&self, contact_id: &str) -> Result<(), ParrotError> {
        sqlx::query("INSERT OR IGNORE INTO authorized_numbers (contact_id) VALUES (?)")
            .bind(contact_id)
            .execute(&self.pool)
            .await
            .map_err(|e| ParrotError::Store(format!("add contact failed: {e}")))?;

        Ok(())
    }

    /// Remove a contact. Returns `true` if a row was removed.
    pub async fn remove_contact(&self, contact_id: &str) -> Result<bool, ParrotError> {
        let result = sqlx::query("DELETE FROM authorized_numbers WHERE contact_id = ?")
            .bind(contact_id)
            .execute(&self.pool)
            .await
            .map_err(|e| ParrotError::Store(format!("remove contact failed: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether a contact may receive/trigger secondary-channel auto-replies.
    pub async fn is_allowed(&self, contact_id: &str) -> Result<bool, ParrotError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT contact_id FROM authorized_numbers WHERE contact_id = ?")
                .bind(contact_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| ParrotError::Store(format!("query failed: {e}")))?;

        Ok(row.is_some())
    }

    /// List all allowed contacts in storage order.
    pub async fn list_contacts(&self) -> Result<Vec<String>, ParrotError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT contact_id FROM authorized_numbers ORDER BY rowid")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| ParrotError::Store(format!("query failed: {e}")))?;

        Ok(rows.into_iter().map(|(c,)| c).collect())
    }
}
