use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::repository::{doctor_summary_from_row, patient_summary_from_row};
use crate::db::DatabaseError;
use crate::models::{
    Appointment, AppointmentCounts, AppointmentDetails, AppointmentFilter, AppointmentPage,
    AppointmentStatus, SeenPatient,
};
use crate::scheduling::slots::slot_order;

/// Fixed page size for appointment listings (1-indexed pages).
pub const PAGE_SIZE: u32 = 10;

const DETAILS_SELECT: &str = "SELECT a.id, a.day, a.slot, a.status, a.symptoms, a.notes,
            d.id, d.name, d.email, d.speciality, d.image_url,
            p.id, p.name, p.email, p.image_url
     FROM appointments a
     JOIN doctors d ON a.doctor_id = d.id
     JOIN patients p ON a.patient_id = p.id";

fn details_from_row(row: &Row<'_>) -> rusqlite::Result<AppointmentDetails> {
    Ok(AppointmentDetails {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        day: row.get(1)?,
        slot: row.get(2)?,
        status: AppointmentStatus::from_str(&row.get::<_, String>(3)?)
            .unwrap_or(AppointmentStatus::Pending),
        symptoms: row.get(4)?,
        notes: row.get(5)?,
        doctor: doctor_summary_from_row(row, 6)?,
        patient: patient_summary_from_row(row, 11)?,
    })
}

fn appointment_from_row(row: &Row<'_>) -> rusqlite::Result<Appointment> {
    Ok(Appointment {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        doctor_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap_or_default(),
        patient_id: Uuid::parse_str(&row.get::<_, String>(2)?).unwrap_or_default(),
        day: row.get(3)?,
        slot: row.get(4)?,
        status: AppointmentStatus::from_str(&row.get::<_, String>(5)?)
            .unwrap_or(AppointmentStatus::Pending),
        symptoms: row.get(6)?,
        notes: row.get(7)?,
    })
}

pub fn insert_appointment(conn: &Connection, appt: &Appointment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO appointments (id, doctor_id, patient_id, day, slot, status, symptoms, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            appt.id.to_string(),
            appt.doctor_id.to_string(),
            appt.patient_id.to_string(),
            appt.day,
            appt.slot,
            appt.status.as_str(),
            appt.symptoms,
            appt.notes,
        ],
    )?;
    Ok(())
}

pub fn find_appointment(conn: &Connection, id: Uuid) -> Result<Option<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, doctor_id, patient_id, day, slot, status, symptoms, notes
         FROM appointments WHERE id = ?1",
    )?;
    let mut rows = stmt.query_map(params![id.to_string()], appointment_from_row)?;
    rows.next().transpose().map_err(DatabaseError::from)
}

/// Joined detail view of a single appointment.
pub fn find_appointment_details(
    conn: &Connection,
    id: Uuid,
) -> Result<Option<AppointmentDetails>, DatabaseError> {
    let sql = format!("{DETAILS_SELECT} WHERE a.id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params![id.to_string()], details_from_row)?;
    rows.next().transpose().map_err(DatabaseError::from)
}

pub fn update_appointment_status(
    conn: &Connection,
    id: Uuid,
    status: AppointmentStatus,
    notes: Option<&str>,
) -> Result<(), DatabaseError> {
    let changed = match notes {
        Some(notes) => conn.execute(
            "UPDATE appointments SET status = ?2, notes = ?3 WHERE id = ?1",
            params![id.to_string(), status.as_str(), notes],
        )?,
        None => conn.execute(
            "UPDATE appointments SET status = ?2 WHERE id = ?1",
            params![id.to_string(), status.as_str()],
        )?,
    };
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Slot labels consumed for (doctor, day): every non-cancelled appointment.
/// Returned in catalog order.
pub fn booked_slots(
    conn: &Connection,
    doctor_id: Uuid,
    day: NaiveDate,
) -> Result<Vec<String>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT slot FROM appointments
         WHERE doctor_id = ?1 AND day = ?2 AND status != 'cancelled'",
    )?;
    let rows = stmt.query_map(params![doctor_id.to_string(), day], |row| row.get(0))?;
    let mut slots: Vec<String> = rows.collect::<Result<Vec<_>, _>>()?;
    slots.sort_by_key(|s: &String| slot_order(s));
    Ok(slots)
}

/// Paginated listing ordered by date descending, joined with live
/// doctor/patient summaries.
pub fn list_appointments(
    conn: &Connection,
    filter: &AppointmentFilter,
) -> Result<AppointmentPage, DatabaseError> {
    let mut clauses = String::from(" WHERE 1=1");
    let mut args: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(doctor_id) = filter.doctor_id {
        clauses.push_str(&format!(" AND a.doctor_id = ?{}", args.len() + 1));
        args.push(Box::new(doctor_id.to_string()));
    }
    if let Some(patient_id) = filter.patient_id {
        clauses.push_str(&format!(" AND a.patient_id = ?{}", args.len() + 1));
        args.push(Box::new(patient_id.to_string()));
    }
    if let Some(status) = filter.status {
        clauses.push_str(&format!(" AND a.status = ?{}", args.len() + 1));
        args.push(Box::new(status.as_str()));
    }
    if let Some(from) = filter.date_from {
        clauses.push_str(&format!(" AND a.day >= ?{}", args.len() + 1));
        args.push(Box::new(from));
    }
    if let Some(to) = filter.date_to {
        clauses.push_str(&format!(" AND a.day <= ?{}", args.len() + 1));
        args.push(Box::new(to));
    }

    let total: u32 = conn.query_row(
        &format!("SELECT COUNT(*) FROM appointments a{clauses}"),
        rusqlite::params_from_iter(args.iter()),
        |row| row.get(0),
    )?;

    let page = filter.page.unwrap_or(1).max(1);
    let offset = (page - 1) * PAGE_SIZE;
    let sql = format!(
        "{DETAILS_SELECT}{clauses}
         ORDER BY a.day DESC, a.created_at DESC
         LIMIT {PAGE_SIZE} OFFSET {offset}"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(args.iter()), details_from_row)?;
    let appointments = rows.collect::<Result<Vec<_>, _>>()?;

    Ok(AppointmentPage {
        appointments,
        page,
        page_size: PAGE_SIZE,
        total,
    })
}

/// Pending/confirmed appointments on `day`, in slot order. Scoped to one
/// doctor when `doctor_id` is set.
pub fn appointments_on_day(
    conn: &Connection,
    doctor_id: Option<Uuid>,
    day: NaiveDate,
) -> Result<Vec<AppointmentDetails>, DatabaseError> {
    let sql = match doctor_id {
        Some(_) => format!(
            "{DETAILS_SELECT} WHERE a.day = ?1 AND a.status IN ('pending', 'confirmed')
             AND a.doctor_id = ?2"
        ),
        None => format!(
            "{DETAILS_SELECT} WHERE a.day = ?1 AND a.status IN ('pending', 'confirmed')"
        ),
    };
    let mut stmt = conn.prepare(&sql)?;
    let mut appointments = match doctor_id {
        Some(id) => stmt
            .query_map(params![day, id.to_string()], details_from_row)?
            .collect::<Result<Vec<_>, _>>()?,
        None => stmt
            .query_map(params![day], details_from_row)?
            .collect::<Result<Vec<_>, _>>()?,
    };
    appointments.sort_by_key(|a| slot_order(&a.slot));
    Ok(appointments)
}

/// Pending/confirmed appointments in the window (today, today + days],
/// ascending by day then slot.
pub fn upcoming_appointments(
    conn: &Connection,
    doctor_id: Option<Uuid>,
    today: NaiveDate,
    days: u32,
) -> Result<Vec<AppointmentDetails>, DatabaseError> {
    let until = today + chrono::Duration::days(days as i64);
    let sql = match doctor_id {
        Some(_) => format!(
            "{DETAILS_SELECT} WHERE a.day > ?1 AND a.day <= ?2
             AND a.status IN ('pending', 'confirmed') AND a.doctor_id = ?3
             ORDER BY a.day ASC"
        ),
        None => format!(
            "{DETAILS_SELECT} WHERE a.day > ?1 AND a.day <= ?2
             AND a.status IN ('pending', 'confirmed')
             ORDER BY a.day ASC"
        ),
    };
    let mut stmt = conn.prepare(&sql)?;
    let mut appointments = match doctor_id {
        Some(id) => stmt
            .query_map(params![today, until, id.to_string()], details_from_row)?
            .collect::<Result<Vec<_>, _>>()?,
        None => stmt
            .query_map(params![today, until], details_from_row)?
            .collect::<Result<Vec<_>, _>>()?,
    };
    appointments.sort_by(|a, b| a.day.cmp(&b.day).then(slot_order(&a.slot).cmp(&slot_order(&b.slot))));
    Ok(appointments)
}

/// Appointment counts by status for one doctor.
pub fn count_appointments_by_status(
    conn: &Connection,
    doctor_id: Uuid,
) -> Result<AppointmentCounts, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT status, COUNT(*) FROM appointments WHERE doctor_id = ?1 GROUP BY status",
    )?;
    let rows = stmt.query_map(params![doctor_id.to_string()], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
    })?;

    let mut counts = AppointmentCounts::default();
    for row in rows {
        let (status, count) = row?;
        counts.total += count;
        match AppointmentStatus::from_str(&status) {
            Ok(AppointmentStatus::Pending) => counts.pending = count,
            Ok(AppointmentStatus::Confirmed) => counts.confirmed = count,
            Ok(AppointmentStatus::Completed) => counts.completed = count,
            Ok(AppointmentStatus::Cancelled) => counts.cancelled = count,
            Err(_) => {}
        }
    }
    Ok(counts)
}

/// Distinct patients with a confirmed or completed appointment for this
/// doctor, with visit count and most recent visit day.
pub fn doctor_patients(
    conn: &Connection,
    doctor_id: Uuid,
) -> Result<Vec<SeenPatient>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.name, p.email, p.image_url, COUNT(*), MAX(a.day)
         FROM appointments a
         JOIN patients p ON a.patient_id = p.id
         WHERE a.doctor_id = ?1 AND a.status IN ('confirmed', 'completed')
         GROUP BY p.id, p.name, p.email, p.image_url
         ORDER BY MAX(a.day) DESC",
    )?;
    let rows = stmt.query_map(params![doctor_id.to_string()], |row| {
        Ok(SeenPatient {
            id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
            name: row.get(1)?,
            email: row.get(2)?,
            image_url: row.get(3)?,
            appointment_count: row.get(4)?,
            last_appointment_day: row.get(5)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::from)
}
