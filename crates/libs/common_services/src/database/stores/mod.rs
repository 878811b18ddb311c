pub mod file_store;
pub mod note_store;
pub mod report_store;
pub mod task_store;
pub mod user_store;
