pub mod app_state;
pub mod daily_log;
pub mod habit;
pub mod message;
pub mod profile;
