//! Trigger→reply rule CRUD and the owned rule-set cache.
//!
//! Every mutation writes to SQLite first and only refreshes the in-memory
//! cache after the write is confirmed, so the cache can never claim a rule
//! the disk does not have. Readers get an `Arc` snapshot — one consistent
//! rule set per inbound message, regardless of concurrent edits.

use super::Store;
use parrot_core::error::ParrotError;
use std::sync::Arc;

/// Cached rule snapshot in storage order. `None` until first load or after
/// an explicit invalidation.
#[derive(Default)]
pub(super) struct RuleCache {
    snapshot: Option<Arc<Vec<(String, String)>>>,
}

impl Store {
    /// Create or overwrite a rule. The trigger is folded to lower case;
    /// empty triggers are rejected here because the matcher performs no
    /// validation of its own (an empty trigger would match everything).
    pub async fn upsert_rule(&self, trigger: &str, reply: &str) -> Result<(), ParrotError> {
        let trigger = trigger.trim().to_lowercase();
        if trigger.is_empty() {
            return Err(ParrotError::Validation(
                "trigger must not be empty".to_string(),
            ));
        }

        sqlx::query(
            "INSERT INTO rules (\"trigger\", reply) VALUES (?, ?) \
             ON CONFLICT(\"trigger\") DO UPDATE SET reply = excluded.reply",
        )
        .bind(&trigger)
        .bind(reply)
        .execute(&self.pool)
        .await
        .map_err(|e| ParrotError::Store(format!("upsert rule failed: {e}")))?;

        self.refresh_rule_cache().await?;
        Ok(())
    }

    /// Delete a rule. Returns `true` if a row was removed.
    pub async fn remove_rule(&self, trigger: &str) -> Result<bool, ParrotError> {
        let trigger = trigger.trim().to_lowercase();
        let result = sqlx::query("DELETE FROM rules WHERE \"trigger\" = ?")
            .bind(&trigger)
            .execute(&self.pool)
            .await
            .map_err(|e| ParrotError::Store(format!("delete rule failed: {e}")))?;

        let removed = result.rows_affected() > 0;
        if removed {
            self.refresh_rule_cache().await?;
        }
        Ok(removed)
    }

    /// Look up the reply for an exact trigger.
    pub async fn get_reply(&self, trigger: &str) -> Result<Option<String>, ParrotError> {
        let trigger = trigger.trim().to_lowercase();
        let row: Option<(String,)> =
            sqlx::query_as("SELECT reply FROM rules WHERE \"trigger\" = ?")
                .bind(&trigger)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| ParrotError::Store(format!("query failed: {e}")))?;

        Ok(row.map(|(r,)| r))
    }

    /// List all rules in storage (insertion) order.
    pub async fn list_rules(&self) -> Result<Vec<(String, String)>, ParrotError> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT \"trigger\", reply FROM rules ORDER BY rowid")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| ParrotError::Store(format!("query failed: {e}")))?;

        Ok(rows)
    }

    /// Get a consistent snapshot of the rule set for matching.
    ///
    /// Served from the cache when warm; loaded from SQLite on miss. The
    /// returned `Arc` is immutable — concurrent rule edits produce a new
    /// snapshot rather than mutating this one.
    pub async fn rules_snapshot(&self) -> Result<Arc<Vec<(String, String)>>, ParrotError> {
        if let Some(ref snap) = self.rule_cache.read().await.snapshot {
            return Ok(snap.clone());
        }

        // Miss: load under the write lock so racing readers share one load.
        let mut cache = self.rule_cache.write().await;
        if let Some(ref snap) = cache.snapshot {
            return Ok(snap.clone());
        }
        let snap = Arc::new(self.list_rules().await?);
        cache.snapshot = Some(snap.clone());
        Ok(snap)
    }

    /// Reload the cache from storage after a confirmed durable write.
    async fn refresh_rule_cache(&self) -> Result<(), ParrotError> {
        let fresh = Arc::new(self.list_rules().await?);
        self.rule_cache.write().await.snapshot = Some(fresh);
        Ok(())
    }
}
