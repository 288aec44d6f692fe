//! Availability resolution: free slots are the catalog minus the slots
//! consumed by non-cancelled appointments.

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;
use uuid::Uuid;

use super::slots::SLOT_CATALOG;
use super::SchedulingError;
use crate::db::repository;

/// Free and booked slots for one (doctor, day). Both sequences follow
/// catalog order; together they partition the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct DayAvailability {
    pub day: NaiveDate,
    pub free: Vec<String>,
    pub booked: Vec<String>,
}

/// Resolve the free/booked slot partition for a doctor on a day.
///
/// An unavailable doctor is an explicit error, not an empty free list —
/// callers must distinguish "fully booked" from "not accepting bookings".
pub fn available_slots(
    conn: &Connection,
    doctor_id: Uuid,
    day: NaiveDate,
) -> Result<DayAvailability, SchedulingError> {
    let doctor =
        repository::find_doctor(conn, doctor_id)?.ok_or(SchedulingError::NotFound("Doctor"))?;
    if !doctor.available {
        return Err(SchedulingError::DoctorUnavailable);
    }

    let booked = repository::booked_slots(conn, doctor_id, day)?;
    let free = SLOT_CATALOG
        .iter()
        .filter(|slot| !booked.iter().any(|b| b == *slot))
        .map(|slot| slot.to_string())
        .collect();

    Ok(DayAvailability { day, free, booked })
}
