pub mod clinic;
pub mod doctor;
pub mod enums;
pub mod patient;
pub mod prescription;
pub mod waiting;

pub use clinic::*;
pub use doctor::*;
pub use patient::*;
pub use prescription::*;
pub use waiting::*;
