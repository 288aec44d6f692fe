//! Login and registration endpoints.
//!
//! All three roles authenticate here and receive a signed role-tagged
//! token. Unknown email and wrong password produce the same message.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{valid_email, MIN_PASSWORD_LEN};
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::auth::{self, Actor};
use crate::db::repository;
use crate::models::{Address, DoctorSummary, Gender, Patient, PatientSummary};

const BAD_CREDENTIALS: &str = "Invalid email or password";

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct PatientAuthResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub patient: PatientSummary,
}

#[derive(Serialize)]
pub struct DoctorAuthResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub doctor: DoctorSummary,
}

#[derive(Serialize)]
pub struct AdminAuthResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<chrono::NaiveDate>,
    pub gender: Option<Gender>,
    pub address: Option<Address>,
    pub image_url: Option<String>,
}

/// `POST /api/auth/register` — patient self-registration with auto-login.
pub async fn register_patient(
    State(ctx): State<ApiContext>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
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
    tracing::info!(patient = %patient.id, "Patient registered");

    let token = auth::issue_token(&ctx.jwt_secret, &Actor::Patient(patient.id))?;
    Ok((
        StatusCode::CREATED,
        Json(PatientAuthResponse {
            success: true,
            message: "Registration successful".into(),
            token,
            patient: PatientSummary {
                id: patient.id,
                name: patient.name,
                email: patient.email,
                image_url: patient.image_url,
            },
        }),
    ))
}

/// `POST /api/auth/patient/login`
pub async fn patient_login(
    State(ctx): State<ApiContext>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<PatientAuthResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let patient = repository::find_patient_by_email(&conn, &req.email)?
        .ok_or_else(|| ApiError::BadRequest(BAD_CREDENTIALS.into()))?;
    if !auth::verify_password(&req.password, &patient.password_hash) {
        return Err(ApiError::BadRequest(BAD_CREDENTIALS.into()));
    }

    let token = auth::issue_token(&ctx.jwt_secret, &Actor::Patient(patient.id))?;
    Ok(Json(PatientAuthResponse {
        success: true,
        message: "Login successful".into(),
        token,
        patient: PatientSummary {
            id: patient.id,
            name: patient.name,
            email: patient.email,
            image_url: patient.image_url,
        },
    }))
}

/// `POST /api/auth/doctor/login`
pub async fn doctor_login(
    State(ctx): State<ApiContext>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<DoctorAuthResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let doctor = repository::find_doctor_by_email(&conn, &req.email)?
        .ok_or_else(|| ApiError::BadRequest(BAD_CREDENTIALS.into()))?;
    if !auth::verify_password(&req.password, &doctor.password_hash) {
        return Err(ApiError::BadRequest(BAD_CREDENTIALS.into()));
    }

    let token = auth::issue_token(&ctx.jwt_secret, &Actor::Doctor(doctor.id))?;
    Ok(Json(DoctorAuthResponse {
        success: true,
        message: "Login successful".into(),
        token,
        doctor: DoctorSummary {
            id: doctor.id,
            name: doctor.name,
            email: doctor.email,
            speciality: doctor.speciality,
            image_url: doctor.image_url,
        },
    }))
}

/// `POST /api/auth/admin/login` — checks the configured credentials.
pub async fn admin_login(
    State(ctx): State<ApiContext>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AdminAuthResponse>, ApiError> {
    if req.email != *ctx.admin_email || req.password != *ctx.admin_password {
        return Err(ApiError::BadRequest("Invalid credentials".into()));
    }

    let token = auth::issue_token(&ctx.jwt_secret, &Actor::Admin)?;
    Ok(Json(AdminAuthResponse {
        success: true,
        message: "Login successful".into(),
        token,
    }))
}
