pub mod heartbeat;
pub mod management;
