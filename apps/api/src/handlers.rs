pub mod health;
pub mod permission_sessions;
pub mod user_groups;
