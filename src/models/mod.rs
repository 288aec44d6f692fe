pub mod appointment;
pub mod doctor;
pub mod enums;
pub mod filters;
pub mod patient;

pub use appointment::*;
pub use doctor::*;
pub use enums::*;
pub use filters::*;
pub use patient::*;
