//! Patient registry endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::doctors::AppointmentPageResponse;
use super::{valid_email, MIN_PASSWORD_LEN};
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::auth::{self, Actor};
use crate::db::repository;
use crate::models::{
    Address, AppointmentFilter, AppointmentStatus, Gender, Patient,
};

#[derive(Serialize)]
pub struct PatientListResponse {
    pub success: bool,
    pub patients: Vec<Patient>,
}

/// `GET /api/patients` — admin-only listing.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<PatientListResponse>, ApiError> {
    if !actor.is_admin() {
        return Err(ApiError::Forbidden("Only admins can list patients".into()));
    }
    let conn = ctx.open_db()?;
    let patients = repository::list_patients(&conn)?;
    Ok(Json(PatientListResponse {
        success: true,
        patients,
    }))
}

#[derive(Deserialize)]
pub struct NewPatientRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<chrono::NaiveDate>,
    pub gender: Option<Gender>,
    pub address: Option<Address>,
    pub image_url: Option<String>,
}

#[derive(Serialize)]
pub struct PatientResponse {
    pub success: bool,
    pub message: String,
    pub patient: Patient,
}

/// `POST /api/patients` — admin creates a patient record.
pub async fn add(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<NewPatientRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !actor.is_admin() {
        return Err(ApiError::Forbidden("Only admins can add patients".into()));
    }
    if req.name.trim().is_empty() || req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Name, email and password are required".into(),
        ));
    }
    if !valid_email(&req.email) {
        return Err(ApiError::BadRequest("Please enter a valid email".into()));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(
            "Password must be at least 6 characters".into(),
        ));
    }

    let conn = ctx.open_db()?;
    if repository::patient_email_in_use(&conn, &req.email, None)? {
        return Err(ApiError::BadRequest("Email already in use".into()));
    }

    let patient = Patient {
        id: Uuid::new_v4(),
        name: req.name.trim().to_string(),
        email: req.email,
        password_hash: auth::hash_password(&req.password)?,
        phone: req.phone.unwrap_or_default(),
        date_of_birth: req.date_of_birth,
        gender: req.gender.unwrap_or(Gender::Unspecified),
        address: req.address.unwrap_or_default(),
        image_url: req.image_url,
    };
    repository::insert_patient(&conn, &patient)?;
    tracing::info!(patient = %patient.id, "Patient added");

    Ok((
        StatusCode::CREATED,
        Json(PatientResponse {
            success: true,
            message: "Patient added successfully".into(),
            patient,
        }),
    ))
}

#[derive(Serialize)]
pub struct PatientDetailResponse {
    pub success: bool,
    pub patient: Patient,
}

/// `GET /api/patients/:id` — admin or the patient themself.
pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<PatientDetailResponse>, ApiError> {
    if !actor.can_manage_patient(id) {
        return Err(ApiError::Forbidden(
            "Not authorized to view this profile".into(),
        ));
    }
    let conn = ctx.open_db()?;
    let patient = repository::find_patient(&conn, id)?
        .ok_or_else(|| ApiError::NotFound("Patient not found".into()))?;
    Ok(Json(PatientDetailResponse {
        success: true,
        patient,
    }))
}

/// Partial update: absent fields keep their stored value.
#[derive(Deserialize)]
pub struct UpdatePatientRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<chrono::NaiveDate>,
    pub gender: Option<Gender>,
    pub address: Option<Address>,
    pub image_url: Option<String>,
}

/// `PUT /api/patients/:id` — admin or the patient themself.
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePatientRequest>,
) -> Result<Json<PatientResponse>, ApiError> {
    if !actor.can_manage_patient(id) {
        return Err(ApiError::Forbidden(
            "Not authorized to update this profile".into(),
        ));
    }

    let conn = ctx.open_db()?;
    let mut patient = repository::find_patient(&conn, id)?
        .ok_or_else(|| ApiError::NotFound("Patient not found".into()))?;

    if let Some(email) = req.email {
        if email != patient.email {
            if !valid_email(&email) {
                return Err(ApiError::BadRequest("Please enter a valid email".into()));
            }
            if repository::patient_email_in_use(&conn, &email, Some(id))? {
                return Err(ApiError::BadRequest("Email already in use".into()));
            }
        }
        patient.email = email;
    }
    if let Some(name) = req.name {
        if name.trim().is_empty() {
            return Err(ApiError::BadRequest("Name cannot be empty".into()));
        }
        patient.name = name.trim().to_string();
    }
    if let Some(password) = req.password {
        if password.len() < MIN_PASSWORD_LEN {
            return Err(ApiError::BadRequest(
                "Password must be at least 6 characters".into(),
            ));
        }
        patient.password_hash = auth::hash_password(&password)?;
    }
    if let Some(phone) = req.phone {
        patient.phone = phone;
    }
    if let Some(date_of_birth) = req.date_of_birth {
        patient.date_of_birth = Some(date_of_birth);
    }
    if let Some(gender) = req.gender {
        patient.gender = gender;
    }
    if let Some(address) = req.address {
        patient.address = address;
    }
    if let Some(image_url) = req.image_url {
        patient.image_url = Some(image_url);
    }

    repository::update_patient(&conn, &patient)?;
    Ok(Json(PatientResponse {
        success: true,
        message: "Patient updated successfully".into(),
        patient,
    }))
}

#[derive(Serialize)]
pub struct DeletedResponse {
    pub success: bool,
    pub message: String,
}

/// `DELETE /api/patients/:id` — admin-only erasure.
pub async fn remove(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletedResponse>, ApiError> {
    if !actor.is_admin() {
        return Err(ApiError::Forbidden("Only admins can delete patients".into()));
    }
    let conn = ctx.open_db()?;
    repository::delete_patient(&conn, id).map_err(|e| match e {
        crate::db::DatabaseError::NotFound { .. } => {
            ApiError::NotFound("Patient not found".into())
        }
        other => ApiError::Internal(other.to_string()),
    })?;
    tracing::info!(patient = %id, "Patient deleted");

    Ok(Json(DeletedResponse {
        success: true,
        message: "Patient deleted successfully".into(),
    }))
}

#[derive(Deserialize)]
pub struct PatientAppointmentsQuery {
    pub status: Option<String>,
    pub page: Option<u32>,
}

/// `GET /api/patients/:id/appointments` — booking history.
pub async fn appointments(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Query(query): Query<PatientAppointmentsQuery>,
) -> Result<Json<AppointmentPageResponse>, ApiError> {
    if !actor.can_manage_patient(id) {
        return Err(ApiError::Forbidden(
            "Not authorized to view these appointments".into(),
        ));
    }

    let status = match query.status.as_deref() {
        None | Some("all") => None,
        Some(s) => Some(
            s.parse::<AppointmentStatus>()
                .map_err(|_| ApiError::BadRequest("Invalid status value".into()))?,
        ),
    };
    let filter = AppointmentFilter {
        patient_id: Some(id),
        status,
        page: query.page,
        ..Default::default()
    };

    let conn = ctx.open_db()?;
    let page = repository::list_appointments(&conn, &filter)?;
    Ok(Json(AppointmentPageResponse {
        success: true,
        page,
    }))
}
