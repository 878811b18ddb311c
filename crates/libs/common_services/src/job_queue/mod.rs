//! Postgres-backed job queue: publishing, inspection and administration.
//! Claiming and running jobs lives in the worker.

mod control;
mod enqueue;
mod error;
mod inspect;
mod retention;

pub use control::*;
pub use enqueue::*;
pub use error::*;
pub use inspect::*;
pub use retention::*;
