pub const USER_EMAIL: &str = "listener@example.com";
pub const USER_PASSWORD: &str = "listener-password";
pub const OTHER_EMAIL: &str = "other@example.com";
pub const OTHER_PASSWORD: &str = "other-password";
pub const NEW_PASSWORD: &str = "listener-password-2";
