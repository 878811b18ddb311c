use chrono::{DateTime, Utc};
use common_types::queue::{JobState, QueueName};
use serde_json::Value;
use sqlx::FromRow;

/// A row of `jobs`.
#[derive(Debug, Clone, FromRow)]
pub struct Job {
    pub id: i64,
    pub queue: QueueName,
    pub name: String,
    pub payload: Value,
    pub status: JobState,
    pub priority: i32,
    pub attempts_made: i32,
    pub max_attempts: i32,
    pub backoff_ms: i64,
    pub progress: i32,
    pub failed_reason: Option<String>,
    pub return_value: Option<Value>,
    pub owner: Option<String>,
    pub created_at: DateTime<Utc>,
    pub run_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub last_heartbeat: Option<DateTime<Utc>>,
}

impl Job {
    /// The `fileId` carried in the payload, if any.
    #[must_use]
    pub fn file_id(&self) -> Option<i32> {
        self.payload
            .get("fileId")
            .and_then(Value::as_i64)
            .and_then(|id| i32::try_from(id).ok())
    }

    /// Whether a failure of the current run exhausts the attempt budget.
    #[must_use]
    pub const fn is_final_attempt(&self) -> bool {
        self.attempts_made + 1 >= self.max_attempts
    }
}
