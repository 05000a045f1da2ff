pub mod feedback;
pub mod password_reset_tokens;
pub mod repair_requests;
pub mod users;
