pub mod auth;
pub mod rate;
