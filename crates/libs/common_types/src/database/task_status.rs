use crate::UnknownVariant;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Maps to the `task_type` Postgres enum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash, ToSchema)]
#[sqlx(type_name = "task_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    FileProcessing,
}

impl TaskType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FileProcessing => "file_processing",
        }
    }
}

/// Processing state of a file's task row. Maps to the `task_status` Postgres enum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash, ToSchema)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    SentToMake,
    MakeError,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl TaskStatus {
    pub const ALL: [Self; 7] = [
        Self::Pending,
        Self::SentToMake,
        Self::MakeError,
        Self::Processing,
        Self::Completed,
        Self::Failed,
        Self::Cancelled,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::SentToMake => "sent_to_make",
            Self::MakeError => "make_error",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether a task in this state may move to `next`.
    ///
    /// The external callout may only mark a task before processing has picked it
    /// up, and `Cancelled` is terminal so a removed job's late writes are dropped.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        use TaskStatus::{
            Cancelled, Completed, Failed, MakeError, Pending, Processing, SentToMake,
        };
        matches!(
            (self, next),
            (
                Pending,
                SentToMake | MakeError | Processing | Completed | Failed | Cancelled
            ) | (SentToMake, Processing | Completed | Failed | Cancelled)
                | (
                    MakeError,
                    Pending | SentToMake | Processing | Completed | Failed | Cancelled
                )
                | (
                    Processing,
                    Pending | Processing | Completed | Failed | Cancelled
                )
                | (Completed, Completed | Failed)
                | (Failed, Pending | Processing | Completed | Failed)
        )
    }

    /// States whose transition stores the supplied error text.
    #[must_use]
    pub const fn records_error(self) -> bool {
        matches!(self, Self::Failed | Self::MakeError)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "task status",
                value: s.to_owned(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_reaches_everything_but_itself() {
        for next in TaskStatus::ALL {
            assert_eq!(
                TaskStatus::Pending.can_transition_to(next),
                next != TaskStatus::Pending,
                "{next}"
            );
        }
    }

    #[test]
    fn cancelled_is_terminal() {
        for next in TaskStatus::ALL {
            assert!(!TaskStatus::Cancelled.can_transition_to(next), "{next}");
        }
    }

    #[test]
    fn callout_cannot_overwrite_processing() {
        assert!(!TaskStatus::Processing.can_transition_to(TaskStatus::SentToMake));
        assert!(!TaskStatus::Completed.can_transition_to(TaskStatus::MakeError));
        assert!(TaskStatus::MakeError.can_transition_to(TaskStatus::SentToMake));
    }

    #[test]
    fn retry_resets_to_pending() {
        assert!(TaskStatus::Failed.can_transition_to(TaskStatus::Pending));
        assert!(TaskStatus::Processing.can_transition_to(TaskStatus::Pending));
        assert!(TaskStatus::MakeError.can_transition_to(TaskStatus::Pending));
        assert!(!TaskStatus::Completed.can_transition_to(TaskStatus::Pending));
    }

    #[test]
    fn completed_tasks_accept_repeated_completion() {
        assert!(TaskStatus::Completed.can_transition_to(TaskStatus::Completed));
        assert!(TaskStatus::Completed.can_transition_to(TaskStatus::Failed));
        assert!(!TaskStatus::Completed.can_transition_to(TaskStatus::Processing));
    }

    #[test]
    fn only_failures_record_errors() {
        let recording: Vec<_> = TaskStatus::ALL
            .into_iter()
            .filter(|s| s.records_error())
            .collect();
        assert_eq!(recording, vec![TaskStatus::MakeError, TaskStatus::Failed]);
    }

    #[test]
    fn parses_database_names() {
        assert_eq!("sent_to_make".parse::<TaskStatus>(), Ok(TaskStatus::SentToMake));
        assert!("sent-to-make".parse::<TaskStatus>().is_err());
    }
}
