//! Append-only security audit log.
//!
//! Every webhook attempt is recorded, accepted or not. Writes are
//! best-effort: a failed audit insert is reported to operator diagnostics
//! and never aborts or rolls back the payment path that triggered it.

use sqlx::PgPool;

use crate::db::queries;

pub const WEBHOOK_RECEIVED: &str = "WEBHOOK_RECEIVED";
pub const INVALID_WEBHOOK_SIGNATURE: &str = "INVALID_WEBHOOK_SIGNATURE";
pub const WEBHOOK_RATE_LIMIT: &str = "WEBHOOK_RATE_LIMIT";
pub const MALFORMED_WEBHOOK_PAYLOAD: &str = "MALFORMED_WEBHOOK_PAYLOAD";
pub const WEBHOOK_PROCESSING_ERROR: &str = "WEBHOOK_PROCESSING_ERROR";

#[derive(Clone)]
pub struct SecurityEventRecorder {
    pool: PgPool,
}

impl SecurityEventRecorder {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn log(&self, event_type: &str, description: &str, metadata: serde_json::Value) {
        if let Err(e) = queries::insert_security_event(&self.pool, event_type, description, &metadata).await
        {
            tracing::error!(
                event_type,
                error = %e,
                "failed to record security event"
            );
        }
    }
}
