use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::ClinicStructure;
use crate::models::ClinicSettings;

/// Load the clinic settings singleton, seeding defaults on first access.
pub fn get_or_init_settings(conn: &Connection) -> Result<ClinicSettings, DatabaseError> {
    match get_settings(conn)? {
        Some(settings) => Ok(settings),
        None => {
            let settings = ClinicSettings::defaults();
            save_settings(conn, &settings)?;
            Ok(settings)
        }
    }
}

pub fn get_settings(conn: &Connection) -> Result<Option<ClinicSettings>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT clinic_id, name, address, logo_path, currency, structure, main_doctor_id,
                receipt_validity_days
         FROM clinic_settings WHERE id = 1",
    )?;

    let result = stmt.query_row([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, Option<String>>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, Option<String>>(6)?,
            row.get::<_, u32>(7)?,
        ))
    });

    let row = match result {
        Ok(row) => row,
        Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let (clinic_id, name, address, logo_path, currency, structure, main_doctor_id, days) = row;
    Ok(Some(ClinicSettings {
        clinic_id: Uuid::parse_str(&clinic_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        name,
        address,
        logo_path,
        currency,
        structure: ClinicStructure::from_str(&structure)?,
        main_doctor_id: main_doctor_id.and_then(|s| Uuid::parse_str(&s).ok()),
        receipt_validity_days: days,
    }))
}

pub fn save_settings(conn: &Connection, settings: &ClinicSettings) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO clinic_settings (id, clinic_id, name, address, logo_path, currency,
         structure, main_doctor_id, receipt_validity_days)
         VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(id) DO UPDATE SET
            clinic_id = excluded.clinic_id,
            name = excluded.name,
            address = excluded.address,
            logo_path = excluded.logo_path,
            currency = excluded.currency,
            structure = excluded.structure,
            main_doctor_id = excluded.main_doctor_id,
            receipt_validity_days = excluded.receipt_validity_days",
        params![
            settings.clinic_id.to_string(),
            settings.name,
            settings.address,
            settings.logo_path,
            settings.currency,
            settings.structure.as_str(),
            settings.main_doctor_id.map(|id| id.to_string()),
            settings.receipt_validity_days,
        ],
    )?;
    Ok(())
}
