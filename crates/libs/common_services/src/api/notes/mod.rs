pub mod error;
pub mod interfaces;
pub mod render;
pub mod service;
