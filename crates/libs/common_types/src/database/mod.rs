pub mod app_user;
pub mod file_status;
pub mod note;
pub mod task_status;

use thiserror::Error;

/// Returned when a status string does not name a known variant.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}
