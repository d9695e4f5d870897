pub mod auth;
pub mod company;
pub mod log;
pub mod user;
