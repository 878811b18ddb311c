pub mod admin;
pub mod auth;
pub mod common;
pub mod error_detail;
pub mod notes;
pub mod queue;
pub mod upload;
