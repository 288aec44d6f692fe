//! Appointment status lifecycle.
//!
//! ```text
//! pending ──► confirmed ──► completed
//!    │             │
//!    ├──► completed└──► cancelled
//!    └──► cancelled
//! ```
//!
//! `completed` and `cancelled` are terminal: nothing moves out of them,
//! including a repeat cancellation. Cancelling frees the slot implicitly
//! — availability is derived from live rows and the partial unique index
//! ignores cancelled ones.

use rusqlite::{Connection, TransactionBehavior};
use uuid::Uuid;

use super::SchedulingError;
use crate::auth::Actor;
use crate::db::repository;
use crate::db::DatabaseError;
use crate::models::{Appointment, AppointmentDetails, AppointmentStatus};

/// Whether `from -> to` is a legal transition.
pub fn can_transition(from: AppointmentStatus, to: AppointmentStatus) -> bool {
    use AppointmentStatus::*;
    matches!(
        (from, to),
        (Pending, Confirmed | Cancelled | Completed) | (Confirmed, Cancelled | Completed)
    )
}

/// Move an appointment to a new status.
///
/// Admins may mutate any appointment; doctors only their own. Patients
/// cannot set arbitrary statuses — they go through [`cancel`].
pub fn update_status(
    conn: &mut Connection,
    actor: &Actor,
    appointment_id: Uuid,
    new_status: AppointmentStatus,
    notes: Option<&str>,
) -> Result<AppointmentDetails, SchedulingError> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(DatabaseError::from)?;

    let appointment = repository::find_appointment(&tx, appointment_id)?
        .ok_or(SchedulingError::NotFound("Appointment"))?;

    match actor {
        Actor::Admin => {}
        Actor::Doctor(id) if *id == appointment.doctor_id => {}
        Actor::Doctor(_) => {
            return Err(SchedulingError::Forbidden(
                "Not authorized to update this appointment",
            ))
        }
        Actor::Patient(_) => {
            return Err(SchedulingError::Forbidden(
                "Patients may only cancel their own appointments",
            ))
        }
    }

    apply_transition(&tx, &appointment, new_status, notes)?;

    let details = repository::find_appointment_details(&tx, appointment_id)?
        .ok_or(SchedulingError::NotFound("Appointment"))?;
    tx.commit().map_err(DatabaseError::from)?;

    tracing::info!(
        appointment = %appointment_id,
        from = %appointment.status,
        to = %new_status,
        "Appointment status updated"
    );
    Ok(details)
}

/// Cancel an appointment, freeing its slot for rebooking.
///
/// Patients may cancel only their own appointments; doctors only theirs;
/// admins any. A terminal appointment — already cancelled included —
/// cannot be cancelled again.
pub fn cancel(
    conn: &mut Connection,
    actor: &Actor,
    appointment_id: Uuid,
) -> Result<(), SchedulingError> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(DatabaseError::from)?;

    let appointment = repository::find_appointment(&tx, appointment_id)?
        .ok_or(SchedulingError::NotFound("Appointment"))?;

    match actor {
        Actor::Admin => {}
        Actor::Patient(id) if *id == appointment.patient_id => {}
        Actor::Doctor(id) if *id == appointment.doctor_id => {}
        Actor::Patient(_) => {
            return Err(SchedulingError::Forbidden(
                "You are not authorized to cancel this appointment",
            ))
        }
        Actor::Doctor(_) => {
            return Err(SchedulingError::Forbidden(
                "Not authorized to cancel this appointment",
            ))
        }
    }

    apply_transition(&tx, &appointment, AppointmentStatus::Cancelled, None)?;
    tx.commit().map_err(DatabaseError::from)?;

    tracing::info!(appointment = %appointment_id, "Appointment cancelled");
    Ok(())
}

fn apply_transition(
    conn: &Connection,
    appointment: &Appointment,
    new_status: AppointmentStatus,
    notes: Option<&str>,
) -> Result<(), SchedulingError> {
    if appointment.status.is_terminal() {
        return Err(SchedulingError::TerminalState(appointment.status));
    }
    if !can_transition(appointment.status, new_status) {
        return Err(SchedulingError::InvalidRequest(format!(
            "Cannot move a {} appointment to {}",
            appointment.status, new_status
        )));
    }
    repository::update_appointment_status(conn, appointment.id, new_status, notes)?;
    Ok(())
}
