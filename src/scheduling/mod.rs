//! The appointment scheduling core: slot catalog, availability
//! resolution, the booking transaction and the status lifecycle.
//!
//! Every operation takes a verified [`crate::auth::Actor`] where role or
//! ownership matters and returns a [`SchedulingError`] kind the API layer
//! maps onto HTTP statuses. Booked slots are always derived from the
//! appointments table — there is no separate per-doctor ledger to keep
//! in sync.

pub mod availability;
pub mod booking;
pub mod lifecycle;
pub mod slots;

pub use availability::*;
pub use booking::*;
pub use lifecycle::*;

use thiserror::Error;

use crate::db::DatabaseError;
use crate::models::AppointmentStatus;

/// Failure kinds of the scheduling core. Messages are shown to callers
/// verbatim; every failure is terminal for the request.
#[derive(Debug, Error)]
pub enum SchedulingError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Doctor is not available for appointments")]
    DoctorUnavailable,

    #[error("This slot is already booked")]
    SlotConflict,

    #[error("Cannot change status of {0} appointments")]
    TerminalState(AppointmentStatus),

    #[error("{0}")]
    Forbidden(&'static str),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}
