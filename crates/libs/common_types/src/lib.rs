#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::struct_excessive_bools
)]
mod database;
pub mod queue;
mod worker_payload;

pub use database::*;
pub use worker_payload::*;
