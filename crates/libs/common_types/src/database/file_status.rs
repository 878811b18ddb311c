use crate::UnknownVariant;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Lifecycle of an uploaded file. Maps to the `file_status` Postgres enum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash, ToSchema)]
#[sqlx(type_name = "file_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Uploaded,
    Processing,
    ReadyForNotes,
    Processed,
    Failed,
}

impl FileStatus {
    pub const ALL: [Self; 5] = [
        Self::Uploaded,
        Self::Processing,
        Self::ReadyForNotes,
        Self::Processed,
        Self::Failed,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uploaded => "uploaded",
            Self::Processing => "processing",
            Self::ReadyForNotes => "ready_for_notes",
            Self::Processed => "processed",
            Self::Failed => "failed",
        }
    }

    /// Whether a file in this state may move to `next`.
    ///
    /// `Processed` is terminal: once notes exist for a file, neither the processor
    /// nor a repeated webhook call may move it again.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        use FileStatus::{Failed, Processed, Processing, ReadyForNotes, Uploaded};
        matches!(
            (self, next),
            (Uploaded, Processing | Processed | Failed)
                | (Processing, Processing | ReadyForNotes | Processed | Failed)
                | (ReadyForNotes, Processed | Failed)
                | (Failed, Processing | Processed | Failed)
        )
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Processed)
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "file status",
                value: s.to_owned(),
            })
    }
}
