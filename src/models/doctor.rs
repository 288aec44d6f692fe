use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A doctor profile. The credential hash never leaves the service.
#[derive(Debug, Clone, Serialize)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub speciality: String,
    pub degree: String,
    pub experience_years: u32,
    pub fee: f64,
    pub about: String,
    pub address: Address,
    pub image_url: Option<String>,
    pub available: bool,
}

/// Two-line free-text postal address.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Address {
    pub line1: String,
    pub line2: String,
}

/// Doctor fields joined onto appointment listings.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub speciality: String,
    pub image_url: Option<String>,
}

/// Per-status appointment counts for the doctor dashboard.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AppointmentCounts {
    pub total: u32,
    pub pending: u32,
    pub confirmed: u32,
    pub completed: u32,
    pub cancelled: u32,
}

/// A patient seen by a doctor, with visit statistics.
#[derive(Debug, Clone, Serialize)]
pub struct SeenPatient {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image_url: Option<String>,
    pub appointment_count: u32,
    pub last_appointment_day: Option<NaiveDate>,
}
