use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use super::doctor::DoctorSummary;
use super::enums::AppointmentStatus;
use super::patient::PatientSummary;

/// A stored appointment row. `day` is the calendar date with the
/// time-of-day normalized away; `slot` is a label from the slot catalog.
#[derive(Debug, Clone, Serialize)]
pub struct Appointment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub day: NaiveDate,
    pub slot: String,
    pub status: AppointmentStatus,
    pub symptoms: String,
    pub notes: String,
}

/// An appointment joined with the current doctor and patient profiles.
/// The summaries reflect profile state at query time, never a snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentDetails {
    pub id: Uuid,
    pub day: NaiveDate,
    pub slot: String,
    pub status: AppointmentStatus,
    pub symptoms: String,
    pub notes: String,
    pub doctor: DoctorSummary,
    pub patient: PatientSummary,
}

/// One page of appointment listings.
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentPage {
    pub appointments: Vec<AppointmentDetails>,
    pub page: u32,
    pub page_size: u32,
    pub total: u32,
}
