//! Repository layer — entity-scoped database operations.
//!
//! Each sub-module owns the SQL for one record collection. All public
//! functions are re-exported here.

mod appointment;
mod doctor;
mod patient;

pub use appointment::*;
pub use doctor::*;
pub use patient::*;
