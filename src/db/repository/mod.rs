//! Repository layer — entity-scoped database operations.

mod account;
mod clinic;
mod doctor;
mod patient;
mod prescription;
mod waiting;

pub use account::*;
pub use clinic::*;
pub use doctor::*;
pub use patient::*;
pub use prescription::*;
pub use waiting::*;
