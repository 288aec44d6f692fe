use chrono::NaiveDate;
use uuid::Uuid;

use super::enums::AppointmentStatus;

/// Filter for appointment listings. All criteria are conjunctive;
/// `page` is 1-indexed over a fixed page size.
#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    pub doctor_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub page: Option<u32>,
}

/// Filter and ordering for the public doctor directory.
#[derive(Debug, Clone, Default)]
pub struct DoctorFilter {
    pub speciality: Option<String>,
    pub name: Option<String>,
    pub available: Option<bool>,
    pub sort: Option<DoctorSort>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoctorSort {
    Name,
    Fee,
    Experience,
}

impl DoctorSort {
    pub fn from_query(s: &str) -> Option<Self> {
        match s {
            "name" => Some(Self::Name),
            "fee" => Some(Self::Fee),
            "experience" => Some(Self::Experience),
            _ => None,
        }
    }
}
