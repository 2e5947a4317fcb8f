pub mod appointment;
pub mod enums;
pub mod medical_record;
pub mod patient;

pub use appointment::*;
pub use medical_record::*;
pub use patient::*;
