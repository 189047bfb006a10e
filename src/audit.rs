use serde_json::Value;

use crate::{db::DbPool, error::AppResult};

pub async fn log_audit(
    pool: &DbPool,
    action: &str,
    resource: Option<&str>,
    metadata: Option<Value>,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO audit_logs (action, resource, metadata)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(action)
    .bind(resource)
    .bind(metadata)
    .execute(pool)
    .await?;

    Ok(())
}

/// Records an audit entry after a committed change. Failures are logged and
/// swallowed: the business operation has already succeeded.
pub async fn record(pool: &DbPool, action: &str, resource: &str, metadata: Value) {
    if let Err(err) = log_audit(pool, action, Some(resource), Some(metadata)).await {
        tracing::warn!(error = %err, action, "audit log failed");
    }
}
