use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Address, Gender, Patient, PatientSummary};

const PATIENT_COLUMNS: &str = "id, name, email, password_hash, phone, date_of_birth, \
     gender, address_line1, address_line2, image_url";

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        phone: row.get(4)?,
        date_of_birth: row
            .get::<_, Option<String>>(5)?
            .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        gender: Gender::from_str(&row.get::<_, String>(6)?).unwrap_or(Gender::Unspecified),
        address: Address {
            line1: row.get(7)?,
            line2: row.get(8)?,
        },
        image_url: row.get(9)?,
    })
}

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, name, email, password_hash, phone, date_of_birth,
             gender, address_line1, address_line2, image_url)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            patient.id.to_string(),
            patient.name,
            patient.email,
            patient.password_hash,
            patient.phone,
            patient.date_of_birth.map(|d| d.to_string()),
            patient.gender.as_str(),
            patient.address.line1,
            patient.address.line2,
            patient.image_url,
        ],
    )?;
    Ok(())
}

pub fn find_patient(conn: &Connection, id: Uuid) -> Result<Option<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?1"
    ))?;
    let mut rows = stmt.query_map(params![id.to_string()], patient_from_row)?;
    rows.next().transpose().map_err(DatabaseError::from)
}

pub fn find_patient_by_email(
    conn: &Connection,
    email: &str,
) -> Result<Option<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patients WHERE email = ?1"
    ))?;
    let mut rows = stmt.query_map(params![email], patient_from_row)?;
    rows.next().transpose().map_err(DatabaseError::from)
}

/// Whether `email` belongs to any patient other than `exclude`.
pub fn patient_email_in_use(
    conn: &Connection,
    email: &str,
    exclude: Option<Uuid>,
) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM patients WHERE email = ?1 AND id != ?2",
        params![email, exclude.map(|id| id.to_string()).unwrap_or_default()],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn update_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE patients SET name = ?2, email = ?3, password_hash = ?4, phone = ?5,
             date_of_birth = ?6, gender = ?7, address_line1 = ?8, address_line2 = ?9,
             image_url = ?10
         WHERE id = ?1",
        params![
            patient.id.to_string(),
            patient.name,
            patient.email,
            patient.password_hash,
            patient.phone,
            patient.date_of_birth.map(|d| d.to_string()),
            patient.gender.as_str(),
            patient.address.line1,
            patient.address.line2,
            patient.image_url,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Patient".into(),
            id: patient.id.to_string(),
        });
    }
    Ok(())
}

/// Admin-only erasure. Referencing appointment rows go with the patient
/// (ON DELETE CASCADE).
pub fn delete_patient(conn: &Connection, id: Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "DELETE FROM patients WHERE id = ?1",
        params![id.to_string()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Patient".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn list_patients(conn: &Connection) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patients ORDER BY name ASC"
    ))?;
    let rows = stmt.query_map([], patient_from_row)?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::from)
}

pub fn patient_summary_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<PatientSummary> {
    Ok(PatientSummary {
        id: Uuid::parse_str(&row.get::<_, String>(offset)?).unwrap_or_default(),
        name: row.get(offset + 1)?,
        email: row.get(offset + 2)?,
        image_url: row.get(offset + 3)?,
    })
}
