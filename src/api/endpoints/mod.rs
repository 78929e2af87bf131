pub mod auth;
pub mod billing;
pub mod clinic;
pub mod doctors;
pub mod documents;
pub mod health;
pub mod notifications;
pub mod patients;
pub mod pharmacy;
pub mod share;
pub mod suggest;
pub mod waiting;
