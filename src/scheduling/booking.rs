//! The booking transaction.
//!
//! All validation and the insert run inside a single immediate-mode
//! SQLite transaction, so two concurrent requests for the same
//! (doctor, day, slot) serialize: the first commits, the second sees the
//! row and fails with `SlotConflict`. The partial unique index on live
//! appointments backstops the same invariant at the storage layer.

use chrono::NaiveDate;
use rusqlite::{Connection, TransactionBehavior};
use uuid::Uuid;

use super::slots;
use super::SchedulingError;
use crate::db::repository;
use crate::db::DatabaseError;
use crate::models::{Appointment, AppointmentDetails, AppointmentStatus};

/// A validated booking request. Field presence is the caller's problem
/// (request deserialization); semantic checks happen in [`book`].
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub day: NaiveDate,
    pub slot: String,
    pub symptoms: Option<String>,
}

/// Book a slot. On success the appointment exists with status `pending`
/// and the slot is consumed for that day.
///
/// Failure order: InvalidRequest (unknown slot label), NotFound(doctor),
/// DoctorUnavailable, NotFound(patient), SlotConflict. A conflict is
/// terminal for this request; callers re-query availability and resubmit.
pub fn book(
    conn: &mut Connection,
    request: &BookingRequest,
) -> Result<AppointmentDetails, SchedulingError> {
    if !slots::is_valid_slot(&request.slot) {
        return Err(SchedulingError::InvalidRequest(format!(
            "Unknown slot label: {}",
            request.slot
        )));
    }

    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(DatabaseError::from)?;

    let doctor = repository::find_doctor(&tx, request.doctor_id)?
        .ok_or(SchedulingError::NotFound("Doctor"))?;
    if !doctor.available {
        return Err(SchedulingError::DoctorUnavailable);
    }

    let patient = repository::find_patient(&tx, request.patient_id)?
        .ok_or(SchedulingError::NotFound("Patient"))?;

    let booked = repository::booked_slots(&tx, request.doctor_id, request.day)?;
    if booked.iter().any(|slot| *slot == request.slot) {
        return Err(SchedulingError::SlotConflict);
    }

    let appointment = Appointment {
        id: Uuid::new_v4(),
        doctor_id: doctor.id,
        patient_id: patient.id,
        day: request.day,
        slot: request.slot.clone(),
        status: AppointmentStatus::Pending,
        symptoms: request.symptoms.clone().unwrap_or_default(),
        notes: String::new(),
    };

    // The partial unique index catches the writer we raced against.
    if let Err(e) = repository::insert_appointment(&tx, &appointment) {
        if e.is_unique_violation() {
            return Err(SchedulingError::SlotConflict);
        }
        return Err(e.into());
    }

    let details = repository::find_appointment_details(&tx, appointment.id)?
        .ok_or(SchedulingError::NotFound("Appointment"))?;

    tx.commit().map_err(DatabaseError::from)?;

    tracing::info!(
        appointment = %appointment.id,
        doctor = %doctor.id,
        day = %request.day,
        slot = %request.slot,
        "Appointment booked"
    );
    Ok(details)
}
