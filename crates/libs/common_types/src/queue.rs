use crate::UnknownVariant;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Upper bound for a single retry delay.
pub const MAX_BACKOFF_MS: i64 = 60 * 60 * 1000;

/// Named queue. Stored as the `job_queue` Postgres enum, addressed by its
/// kebab-case name in the API (`file-processing`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash, ToSchema)]
#[sqlx(type_name = "job_queue", rename_all = "snake_case")]
#[serde(rename_all = "kebab-case")]
pub enum QueueName {
    FileProcessing,
    NoteGeneration,
    FileForwarding,
}

impl QueueName {
    pub const ALL: [Self; 3] = [
        Self::FileProcessing,
        Self::NoteGeneration,
        Self::FileForwarding,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FileProcessing => "file-processing",
            Self::NoteGeneration => "note-generation",
            Self::FileForwarding => "file-forwarding",
        }
    }

    /// Label of the Postgres enum value.
    #[must_use]
    pub const fn db_name(self) -> &'static str {
        match self {
            Self::FileProcessing => "file_processing",
            Self::NoteGeneration => "note_generation",
            Self::FileForwarding => "file_forwarding",
        }
    }
}

impl fmt::Display for QueueName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueueName {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|queue| queue.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "queue",
                value: s.to_owned(),
            })
    }
}

/// State of a queued job. Maps to the `job_state` Postgres enum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash, ToSchema)]
#[sqlx(type_name = "job_state", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Ready to be claimed.
    Waiting,
    /// Waiting for its backoff or initial delay to pass.
    Delayed,
    Active,
    Completed,
    Failed,
}

impl JobState {
    pub const ALL: [Self; 5] = [
        Self::Waiting,
        Self::Delayed,
        Self::Active,
        Self::Completed,
        Self::Failed,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Delayed => "delayed",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobState {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "job state",
                value: s.to_owned(),
            })
    }
}

/// Kind of work a job carries; stored in the `name` column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum JobName {
    ProcessFile,
    NotifyAdmin,
    ForwardFile,
}

impl JobName {
    pub const ALL: [Self; 3] = [Self::ProcessFile, Self::NotifyAdmin, Self::ForwardFile];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProcessFile => "process-file",
            Self::NotifyAdmin => "notify-admin",
            Self::ForwardFile => "forward-file",
        }
    }

    /// Queue this kind of job is published on.
    #[must_use]
    pub const fn queue(self) -> QueueName {
        match self {
            Self::ProcessFile => QueueName::FileProcessing,
            Self::NotifyAdmin => QueueName::NoteGeneration,
            Self::ForwardFile => QueueName::FileForwarding,
        }
    }
}

impl fmt::Display for JobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobName {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "job name",
                value: s.to_owned(),
            })
    }
}

/// Exponential backoff: after the n-th failed attempt wait `(2^n - 1) * base`.
#[must_use]
pub fn backoff_delay_ms(attempts_made: i32, base_ms: i64) -> i64 {
    if attempts_made <= 0 || base_ms <= 0 {
        return 0;
    }
    let exponent = attempts_made.min(32) as u32;
    let factor = 2_i64.saturating_pow(exponent) - 1;
    factor.saturating_mul(base_ms).min(MAX_BACKOFF_MS)
}
