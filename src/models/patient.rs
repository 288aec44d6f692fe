use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use super::doctor::Address;
use super::enums::Gender;

/// A patient profile. The credential hash never leaves the service.
#[derive(Debug, Clone, Serialize)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Gender,
    pub address: Address,
    pub image_url: Option<String>,
}

/// Patient fields joined onto appointment listings.
#[derive(Debug, Clone, Serialize)]
pub struct PatientSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image_url: Option<String>,
}
