//! Appointment endpoints: booking, listing, status transitions.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::doctors::AppointmentPageResponse;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::auth::Actor;
use crate::db::repository;
use crate::models::{AppointmentDetails, AppointmentFilter, AppointmentStatus};
use crate::scheduling::{booking, lifecycle, slots};

/// All fields optional so that missing ones produce the catalog error
/// message instead of a deserialization rejection.
#[derive(Deserialize)]
pub struct BookRequest {
    pub doctor_id: Option<Uuid>,
    /// Required for admin bookings; patients always book for themselves.
    pub patient_id: Option<Uuid>,
    pub date: Option<String>,
    pub slot: Option<String>,
    pub symptoms: Option<String>,
}

#[derive(Serialize)]
pub struct BookResponse {
    pub success: bool,
    pub message: String,
    pub appointment: AppointmentDetails,
}

/// `POST /api/appointments` — book a slot.
pub async fn book(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<BookRequest>,
) -> Result<impl IntoResponse, ApiError> {
    const REQUIRED: &str = "Doctor ID, Patient ID, date and slot are required";

    let patient_id = match actor {
        Actor::Patient(id) => id,
        Actor::Admin => req
            .patient_id
            .ok_or_else(|| ApiError::BadRequest(REQUIRED.into()))?,
        Actor::Doctor(_) => {
            return Err(ApiError::Forbidden(
                "Only patients or admins can book appointments".into(),
            ))
        }
    };

    let doctor_id = req
        .doctor_id
        .ok_or_else(|| ApiError::BadRequest(REQUIRED.into()))?;
    let date = req
        .date
        .ok_or_else(|| ApiError::BadRequest(REQUIRED.into()))?;
    let slot = req
        .slot
        .ok_or_else(|| ApiError::BadRequest(REQUIRED.into()))?;

    let day = slots::parse_day(&date)
        .ok_or_else(|| ApiError::BadRequest("Invalid date, expected YYYY-MM-DD".into()))?;

    let request = booking::BookingRequest {
        doctor_id,
        patient_id,
        day,
        slot,
        symptoms: req.symptoms,
    };

    let mut conn = ctx.open_db()?;
    let appointment = booking::book(&mut conn, &request)?;

    Ok((
        StatusCode::CREATED,
        Json(BookResponse {
            success: true,
            message: "Appointment booked successfully".into(),
            appointment,
        }),
    ))
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub doctor_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub status: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub page: Option<u32>,
}

/// `GET /api/appointments` — admin listing with filters and pagination.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ListQuery>,
) -> Result<Json<AppointmentPageResponse>, ApiError> {
    if !actor.is_admin() {
        return Err(ApiError::Forbidden(
            "Only admins can list all appointments".into(),
        ));
    }

    let status = match query.status.as_deref() {
        None | Some("all") => None,
        Some(s) => Some(
            s.parse::<AppointmentStatus>()
                .map_err(|_| ApiError::BadRequest("Invalid status value".into()))?,
        ),
    };
    let date_from = query
        .from
        .as_deref()
        .map(|s| {
            slots::parse_day(s)
                .ok_or_else(|| ApiError::BadRequest("Invalid 'from' date".into()))
        })
        .transpose()?;
    let date_to = query
        .to
        .as_deref()
        .map(|s| slots::parse_day(s).ok_or_else(|| ApiError::BadRequest("Invalid 'to' date".into())))
        .transpose()?;

    let filter = AppointmentFilter {
        doctor_id: query.doctor_id,
        patient_id: query.patient_id,
        status,
        date_from,
        date_to,
        page: query.page,
    };

    let conn = ctx.open_db()?;
    let page = repository::list_appointments(&conn, &filter)?;
    Ok(Json(AppointmentPageResponse {
        success: true,
        page,
    }))
}

#[derive(Deserialize)]
pub struct WindowQuery {
    pub doctor_id: Option<Uuid>,
    pub days: Option<u32>,
}

#[derive(Serialize)]
pub struct AppointmentListResponse {
    pub success: bool,
    pub appointments: Vec<AppointmentDetails>,
}

/// `GET /api/appointments/today` — admin view of today's live schedule.
pub async fn today(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<AppointmentListResponse>, ApiError> {
    if !actor.is_admin() {
        return Err(ApiError::Forbidden(
            "Only admins can view the clinic schedule".into(),
        ));
    }
    let conn = ctx.open_db()?;
    let day = chrono::Local::now().date_naive();
    let appointments = repository::appointments_on_day(&conn, query.doctor_id, day)?;
    Ok(Json(AppointmentListResponse {
        success: true,
        appointments,
    }))
}

/// `GET /api/appointments/upcoming` — admin view of the next N days.
pub async fn upcoming(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<AppointmentListResponse>, ApiError> {
    if !actor.is_admin() {
        return Err(ApiError::Forbidden(
            "Only admins can view the clinic schedule".into(),
        ));
    }
    let conn = ctx.open_db()?;
    let today = chrono::Local::now().date_naive();
    let appointments =
        repository::upcoming_appointments(&conn, query.doctor_id, today, query.days.unwrap_or(7))?;
    Ok(Json(AppointmentListResponse {
        success: true,
        appointments,
    }))
}

#[derive(Serialize)]
pub struct AppointmentResponse {
    pub success: bool,
    pub appointment: AppointmentDetails,
}

/// `GET /api/appointments/:id` — visible to admin and the two parties.
pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<AppointmentResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let appointment = repository::find_appointment_details(&conn, id)?
        .ok_or_else(|| ApiError::NotFound("Appointment not found".into()))?;

    let allowed = match actor {
        Actor::Admin => true,
        Actor::Doctor(doctor_id) => doctor_id == appointment.doctor.id,
        Actor::Patient(patient_id) => patient_id == appointment.patient.id,
    };
    if !allowed {
        return Err(ApiError::Forbidden(
            "Not authorized to view this appointment".into(),
        ));
    }

    Ok(Json(AppointmentResponse {
        success: true,
        appointment,
    }))
}

#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
    pub appointment: AppointmentDetails,
}

/// `PUT /api/appointments/:id/status` — admin any, doctor own only.
pub async fn update_status(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let mut conn = ctx.open_db()?;
    let appointment =
        lifecycle::update_status(&mut conn, &actor, id, req.status, req.notes.as_deref())?;

    Ok(Json(StatusResponse {
        success: true,
        message: format!("Appointment {} successfully", req.status),
        appointment,
    }))
}

#[derive(Serialize)]
pub struct CancelResponse {
    pub success: bool,
    pub message: String,
}

/// `PUT /api/appointments/:id/cancel` — the one status change patients
/// may make, on their own appointments.
pub async fn cancel(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<CancelResponse>, ApiError> {
    let mut conn = ctx.open_db()?;
    lifecycle::cancel(&mut conn, &actor, id)?;

    Ok(Json(CancelResponse {
        success: true,
        message: "Appointment cancelled successfully".into(),
    }))
}
