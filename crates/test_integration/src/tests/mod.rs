pub mod test_auth;
pub mod test_notes;
pub mod test_queue;
pub mod test_root;
pub mod test_upload;
