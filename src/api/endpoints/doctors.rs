//! Doctor directory, profile and dashboard endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{valid_email, MIN_PASSWORD_LEN};
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::auth::{self, Actor};
use crate::db::repository;
use crate::models::{
    Address, AppointmentCounts, AppointmentDetails, AppointmentFilter, AppointmentPage,
    AppointmentStatus, Doctor, DoctorFilter, DoctorSort, SeenPatient,
};
use crate::scheduling::{availability, slots};

// ─── Directory (public) ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct DirectoryQuery {
    pub speciality: Option<String>,
    pub name: Option<String>,
    pub available: Option<bool>,
    pub sort: Option<String>,
}

#[derive(Serialize)]
pub struct DoctorListResponse {
    pub success: bool,
    pub doctors: Vec<Doctor>,
}

/// `GET /api/doctors` — public directory with optional filters.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<DirectoryQuery>,
) -> Result<Json<DoctorListResponse>, ApiError> {
    let filter = DoctorFilter {
        speciality: query.speciality,
        name: query.name,
        available: query.available,
        sort: query.sort.as_deref().and_then(DoctorSort::from_query),
    };
    let conn = ctx.open_db()?;
    let doctors = repository::list_doctors(&conn, &filter)?;
    Ok(Json(DoctorListResponse {
        success: true,
        doctors,
    }))
}

#[derive(Deserialize)]
pub struct TopQuery {
    pub limit: Option<u32>,
}

/// `GET /api/doctors/top` — first N available doctors for the landing page.
pub async fn top(
    State(ctx): State<ApiContext>,
    Query(query): Query<TopQuery>,
) -> Result<Json<DoctorListResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let doctors = repository::top_doctors(&conn, query.limit.unwrap_or(10))?;
    Ok(Json(DoctorListResponse {
        success: true,
        doctors,
    }))
}

#[derive(Serialize)]
pub struct SpecialitiesResponse {
    pub success: bool,
    pub specialities: Vec<String>,
}

/// `GET /api/specialities`
pub async fn specialities(
    State(ctx): State<ApiContext>,
) -> Result<Json<SpecialitiesResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let specialities = repository::list_specialities(&conn)?;
    Ok(Json(SpecialitiesResponse {
        success: true,
        specialities,
    }))
}

#[derive(Serialize)]
pub struct DoctorResponse {
    pub success: bool,
    pub doctor: Doctor,
}

/// `GET /api/doctors/:id` — public profile.
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<DoctorResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let doctor = repository::find_doctor(&conn, id)?
        .ok_or_else(|| ApiError::NotFound("Doctor not found".into()))?;
    Ok(Json(DoctorResponse {
        success: true,
        doctor,
    }))
}

// ─── Availability (public) ────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct SlotsResponse {
    pub success: bool,
    pub day: chrono::NaiveDate,
    pub available_slots: Vec<String>,
    pub booked_slots: Vec<String>,
}

/// `GET /api/doctors/:id/slots/:day` — free/booked slot partition.
pub async fn day_slots(
    State(ctx): State<ApiContext>,
    Path((id, day)): Path<(Uuid, String)>,
) -> Result<Json<SlotsResponse>, ApiError> {
    let day = slots::parse_day(&day)
        .ok_or_else(|| ApiError::BadRequest("Invalid date, expected YYYY-MM-DD".into()))?;

    let conn = ctx.open_db()?;
    let availability = availability::available_slots(&conn, id, day)?;
    Ok(Json(SlotsResponse {
        success: true,
        day,
        available_slots: availability.free,
        booked_slots: availability.booked,
    }))
}

// ─── Profile management ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct NewDoctorRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub speciality: String,
    pub degree: String,
    pub experience_years: u32,
    pub fee: f64,
    pub about: String,
    pub address: Option<Address>,
    pub image_url: Option<String>,
}

#[derive(Serialize)]
pub struct DoctorCreatedResponse {
    pub success: bool,
    pub message: String,
    pub doctor: Doctor,
}

/// `POST /api/admin/doctors` — admin creates a doctor.
pub async fn add(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<NewDoctorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !actor.is_admin() {
        return Err(ApiError::Forbidden("Only admins can add doctors".into()));
    }
    if req.name.trim().is_empty()
        || req.email.is_empty()
        || req.password.is_empty()
        || req.speciality.trim().is_empty()
        || req.degree.trim().is_empty()
        || req.about.is_empty()
    {
        return Err(ApiError::BadRequest("Please fill all the fields".into()));
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
    if repository::doctor_email_in_use(&conn, &req.email, None)? {
        return Err(ApiError::BadRequest("Email already in use".into()));
    }

    let doctor = Doctor {
        id: Uuid::new_v4(),
        name: req.name.trim().to_string(),
        email: req.email,
        password_hash: auth::hash_password(&req.password)?,
        speciality: req.speciality,
        degree: req.degree,
        experience_years: req.experience_years,
        fee: req.fee,
        about: req.about,
        address: req.address.unwrap_or_default(),
        image_url: req.image_url,
        available: true,
    };
    repository::insert_doctor(&conn, &doctor)?;
    tracing::info!(doctor = %doctor.id, "Doctor added");

    Ok((
        StatusCode::CREATED,
        Json(DoctorCreatedResponse {
            success: true,
            message: "Doctor added successfully".into(),
            doctor,
        }),
    ))
}

#[derive(Deserialize)]
pub struct UpdateDoctorRequest {
    pub name: String,
    pub email: String,
    pub speciality: String,
    pub degree: String,
    pub experience_years: u32,
    pub fee: f64,
    pub about: String,
    pub address: Option<Address>,
    pub image_url: Option<String>,
    pub available: Option<bool>,
}

#[derive(Serialize)]
pub struct DoctorUpdatedResponse {
    pub success: bool,
    pub message: String,
    pub doctor: Doctor,
}

/// `PUT /api/doctors/:id/profile` — admin or the doctor themself.
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateDoctorRequest>,
) -> Result<Json<DoctorUpdatedResponse>, ApiError> {
    if !actor.can_manage_doctor(id) {
        return Err(ApiError::Forbidden(
            "Not authorized to update this profile".into(),
        ));
    }
    if req.name.trim().is_empty() || req.speciality.trim().is_empty() || req.about.is_empty() {
        return Err(ApiError::BadRequest("All fields are required".into()));
    }
    if !valid_email(&req.email) {
        return Err(ApiError::BadRequest("Please enter a valid email".into()));
    }

    let conn = ctx.open_db()?;
    let mut doctor = repository::find_doctor(&conn, id)?
        .ok_or_else(|| ApiError::NotFound("Doctor not found".into()))?;

    if repository::doctor_email_in_use(&conn, &req.email, Some(id))? {
        return Err(ApiError::BadRequest("Email already in use".into()));
    }

    doctor.name = req.name.trim().to_string();
    doctor.email = req.email;
    doctor.speciality = req.speciality;
    doctor.degree = req.degree;
    doctor.experience_years = req.experience_years;
    doctor.fee = req.fee;
    doctor.about = req.about;
    if let Some(address) = req.address {
        doctor.address = address;
    }
    if let Some(image_url) = req.image_url {
        doctor.image_url = Some(image_url);
    }
    if let Some(available) = req.available {
        doctor.available = available;
    }
    repository::update_doctor(&conn, &doctor)?;

    Ok(Json(DoctorUpdatedResponse {
        success: true,
        message: "Profile updated successfully".into(),
        doctor,
    }))
}

#[derive(Deserialize)]
pub struct AvailabilityRequest {
    pub available: bool,
}

#[derive(Serialize)]
pub struct AvailabilityResponse {
    pub success: bool,
    pub message: String,
    pub available: bool,
}

/// `PUT /api/doctors/:id/availability` — toggle accepting bookings.
pub async fn set_availability(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(req): Json<AvailabilityRequest>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    if !actor.can_manage_doctor(id) {
        return Err(ApiError::Forbidden(
            "Not authorized to update this profile".into(),
        ));
    }

    let conn = ctx.open_db()?;
    repository::set_doctor_availability(&conn, id, req.available).map_err(|e| match e {
        crate::db::DatabaseError::NotFound { .. } => {
            ApiError::NotFound("Doctor not found".into())
        }
        other => ApiError::Internal(other.to_string()),
    })?;

    Ok(Json(AvailabilityResponse {
        success: true,
        message: format!(
            "You are now {} for appointments",
            if req.available { "available" } else { "unavailable" }
        ),
        available: req.available,
    }))
}

// ─── Dashboard ────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct DoctorStatsResponse {
    pub success: bool,
    pub stats: DoctorStats,
}

#[derive(Serialize)]
pub struct DoctorStats {
    pub counts: AppointmentCounts,
    pub unique_patients: u32,
    pub today: Vec<AppointmentDetails>,
    pub upcoming: Vec<AppointmentDetails>,
}

/// `GET /api/doctors/:id/stats` — dashboard counters plus today's and
/// next week's schedule.
pub async fn stats(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<DoctorStatsResponse>, ApiError> {
    if !actor.can_manage_doctor(id) {
        return Err(ApiError::Forbidden(
            "Not authorized to view this dashboard".into(),
        ));
    }

    let conn = ctx.open_db()?;
    if repository::find_doctor(&conn, id)?.is_none() {
        return Err(ApiError::NotFound("Doctor not found".into()));
    }

    let today = chrono::Local::now().date_naive();
    let stats = DoctorStats {
        counts: repository::count_appointments_by_status(&conn, id)?,
        unique_patients: repository::doctor_patients(&conn, id)?.len() as u32,
        today: repository::appointments_on_day(&conn, Some(id), today)?,
        upcoming: repository::upcoming_appointments(&conn, Some(id), today, 7)?,
    };

    Ok(Json(DoctorStatsResponse {
        success: true,
        stats,
    }))
}

#[derive(Serialize)]
pub struct DoctorPatientsResponse {
    pub success: bool,
    pub patients: Vec<SeenPatient>,
}

/// `GET /api/doctors/:id/patients` — patients seen by this doctor.
pub async fn patients(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<DoctorPatientsResponse>, ApiError> {
    if !actor.can_manage_doctor(id) {
        return Err(ApiError::Forbidden(
            "Not authorized to view these patients".into(),
        ));
    }

    let conn = ctx.open_db()?;
    let patients = repository::doctor_patients(&conn, id)?;
    Ok(Json(DoctorPatientsResponse {
        success: true,
        patients,
    }))
}

#[derive(Deserialize)]
pub struct DoctorAppointmentsQuery {
    pub status: Option<String>,
    pub page: Option<u32>,
}

#[derive(Serialize)]
pub struct AppointmentPageResponse {
    pub success: bool,
    #[serde(flatten)]
    pub page: AppointmentPage,
}

/// `GET /api/doctors/:id/appointments` — this doctor's bookings.
pub async fn appointments(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Query(query): Query<DoctorAppointmentsQuery>,
) -> Result<Json<AppointmentPageResponse>, ApiError> {
    if !actor.can_manage_doctor(id) {
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
        doctor_id: Some(id),
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
