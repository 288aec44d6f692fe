use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Address, Doctor, DoctorFilter, DoctorSort, DoctorSummary};

const DOCTOR_COLUMNS: &str = "id, name, email, password_hash, speciality, degree, \
     experience_years, fee, about, address_line1, address_line2, image_url, available";

fn doctor_from_row(row: &Row<'_>) -> rusqlite::Result<Doctor> {
    Ok(Doctor {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        speciality: row.get(4)?,
        degree: row.get(5)?,
        experience_years: row.get(6)?,
        fee: row.get(7)?,
        about: row.get(8)?,
        address: Address {
            line1: row.get(9)?,
            line2: row.get(10)?,
        },
        image_url: row.get(11)?,
        available: row.get(12)?,
    })
}

pub fn insert_doctor(conn: &Connection, doctor: &Doctor) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO doctors (id, name, email, password_hash, speciality, degree,
             experience_years, fee, about, address_line1, address_line2, image_url, available)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            doctor.id.to_string(),
            doctor.name,
            doctor.email,
            doctor.password_hash,
            doctor.speciality,
            doctor.degree,
            doctor.experience_years,
            doctor.fee,
            doctor.about,
            doctor.address.line1,
            doctor.address.line2,
            doctor.image_url,
            doctor.available,
        ],
    )?;
    Ok(())
}

pub fn find_doctor(conn: &Connection, id: Uuid) -> Result<Option<Doctor>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DOCTOR_COLUMNS} FROM doctors WHERE id = ?1"
    ))?;
    let mut rows = stmt.query_map(params![id.to_string()], doctor_from_row)?;
    rows.next().transpose().map_err(DatabaseError::from)
}

pub fn find_doctor_by_email(
    conn: &Connection,
    email: &str,
) -> Result<Option<Doctor>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DOCTOR_COLUMNS} FROM doctors WHERE email = ?1"
    ))?;
    let mut rows = stmt.query_map(params![email], doctor_from_row)?;
    rows.next().transpose().map_err(DatabaseError::from)
}

/// Whether `email` belongs to any doctor other than `exclude`.
pub fn doctor_email_in_use(
    conn: &Connection,
    email: &str,
    exclude: Option<Uuid>,
) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM doctors WHERE email = ?1 AND id != ?2",
        params![email, exclude.map(|id| id.to_string()).unwrap_or_default()],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn update_doctor(conn: &Connection, doctor: &Doctor) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE doctors SET name = ?2, email = ?3, speciality = ?4, degree = ?5,
             experience_years = ?6, fee = ?7, about = ?8, address_line1 = ?9,
             address_line2 = ?10, image_url = ?11, available = ?12
         WHERE id = ?1",
        params![
            doctor.id.to_string(),
            doctor.name,
            doctor.email,
            doctor.speciality,
            doctor.degree,
            doctor.experience_years,
            doctor.fee,
            doctor.about,
            doctor.address.line1,
            doctor.address.line2,
            doctor.image_url,
            doctor.available,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Doctor".into(),
            id: doctor.id.to_string(),
        });
    }
    Ok(())
}

pub fn set_doctor_availability(
    conn: &Connection,
    id: Uuid,
    available: bool,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE doctors SET available = ?2 WHERE id = ?1",
        params![id.to_string(), available],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Doctor".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Public directory listing with optional filters and sort order.
pub fn list_doctors(conn: &Connection, filter: &DoctorFilter) -> Result<Vec<Doctor>, DatabaseError> {
    let mut sql = format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE 1=1");
    let mut args: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(speciality) = &filter.speciality {
        sql.push_str(&format!(" AND speciality = ?{}", args.len() + 1));
        args.push(Box::new(speciality.clone()));
    }
    if let Some(name) = &filter.name {
        sql.push_str(&format!(" AND name LIKE ?{}", args.len() + 1));
        args.push(Box::new(format!("%{name}%")));
    }
    if let Some(available) = filter.available {
        sql.push_str(&format!(" AND available = ?{}", args.len() + 1));
        args.push(Box::new(available));
    }

    sql.push_str(match filter.sort {
        Some(DoctorSort::Fee) => " ORDER BY fee ASC, name ASC",
        Some(DoctorSort::Experience) => " ORDER BY experience_years DESC, name ASC",
        _ => " ORDER BY name ASC",
    });

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(args.iter()), doctor_from_row)?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::from)
}

/// First `limit` available doctors for the landing page.
pub fn top_doctors(conn: &Connection, limit: u32) -> Result<Vec<Doctor>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DOCTOR_COLUMNS} FROM doctors WHERE available = 1
         ORDER BY experience_years DESC, name ASC LIMIT ?1"
    ))?;
    let rows = stmt.query_map(params![limit], doctor_from_row)?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::from)
}

/// Distinct speciality labels across the directory.
pub fn list_specialities(conn: &Connection) -> Result<Vec<String>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT DISTINCT speciality FROM doctors ORDER BY speciality ASC")?;
    let rows = stmt.query_map([], |row| row.get(0))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::from)
}

pub fn doctor_summary_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<DoctorSummary> {
    Ok(DoctorSummary {
        id: Uuid::parse_str(&row.get::<_, String>(offset)?).unwrap_or_default(),
        name: row.get(offset + 1)?,
        email: row.get(offset + 2)?,
        speciality: row.get(offset + 3)?,
        image_url: row.get(offset + 4)?,
    })
}
