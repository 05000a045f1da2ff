pub mod code;
pub mod feedback;
pub mod login;
pub mod notify;
pub mod password;
pub mod register;
pub mod repair;
pub mod reset;
pub mod sweep;
pub mod verification;
