pub mod app_user;
pub mod file;
pub mod jobs;
pub mod note;
pub mod task;
