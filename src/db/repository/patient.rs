use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::Gender;
use crate::models::*;

const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, name, phone, age, gender, address, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            patient.id.to_string(),
            patient.name,
            patient.phone,
            patient.age,
            patient.gender.as_str(),
            patient.address,
            patient.created_at.format(DATETIME_FMT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, phone, age, gender, address, created_at
         FROM patients WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.to_string()], patient_from_row);
    match result {
        Ok(row) => Ok(Some(row?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// All patients, most recently registered first.
pub fn get_all_patients(conn: &Connection) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, phone, age, gender, address, created_at
         FROM patients ORDER BY created_at DESC",
    )?;

    let rows = stmt.query_map([], patient_from_row)?;

    let mut patients = Vec::new();
    for row in rows {
        patients.push(row??);
    }
    Ok(patients)
}

/// Case-insensitive name/phone search for the reception lookup box.
pub fn search_patients(conn: &Connection, query: &str) -> Result<Vec<Patient>, DatabaseError> {
    let pattern = format!("%{query}%");
    let mut stmt = conn.prepare(
        "SELECT id, name, phone, age, gender, address, created_at
         FROM patients
         WHERE LOWER(name) LIKE LOWER(?1) OR phone LIKE ?1
         ORDER BY created_at DESC",
    )?;

    let rows = stmt.query_map(params![pattern], patient_from_row)?;

    let mut patients = Vec::new();
    for row in rows {
        patients.push(row??);
    }
    Ok(patients)
}

pub fn insert_history_entry(conn: &Connection, entry: &HistoryEntry) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patient_history (id, patient_id, visit_date, note, doctor_name)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            entry.id.to_string(),
            entry.patient_id.to_string(),
            entry.visit_date.to_string(),
            entry.note,
            entry.doctor_name,
        ],
    )?;
    Ok(())
}

/// Visit history for a patient, oldest first.
pub fn get_patient_history(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<HistoryEntry>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, visit_date, note, doctor_name
         FROM patient_history WHERE patient_id = ?1
         ORDER BY visit_date ASC, rowid ASC",
    )?;

    let rows = stmt.query_map(params![patient_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
        ))
    })?;

    let mut entries = Vec::new();
    for row in rows {
        let (id, patient_id, visit_date, note, doctor_name) = row?;
        entries.push(HistoryEntry {
            id: Uuid::parse_str(&id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            patient_id: Uuid::parse_str(&patient_id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            visit_date: NaiveDate::parse_from_str(&visit_date, "%Y-%m-%d").unwrap_or_default(),
            note,
            doctor_name,
        });
    }
    Ok(entries)
}

fn patient_from_row(row: &rusqlite::Row<'_>) -> Result<Result<Patient, DatabaseError>, rusqlite::Error> {
    let id: String = row.get(0)?;
    let gender: String = row.get(4)?;
    let created_at: String = row.get(6)?;
    Ok((|| {
        Ok(Patient {
            id: Uuid::parse_str(&id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            name: row.get(1).map_err(DatabaseError::from)?,
            phone: row.get(2).map_err(DatabaseError::from)?,
            age: row.get(3).map_err(DatabaseError::from)?,
            gender: Gender::from_str(&gender)?,
            address: row.get(5).map_err(DatabaseError::from)?,
            created_at: NaiveDateTime::parse_from_str(&created_at, DATETIME_FMT)
                .unwrap_or_default(),
        })
    })())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn sample_patient(name: &str) -> Patient {
        Patient {
            id: Uuid::new_v4(),
            name: name.to_string(),
            phone: "5551234567".to_string(),
            age: Some(34),
            gender: Gender::Female,
            address: Some("12 Elm Street".to_string()),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    #[test]
    fn insert_and_get_patient() {
        let conn = open_memory_database().unwrap();
        let patient = sample_patient("Jane Doe");
        insert_patient(&conn, &patient).unwrap();

        let loaded = get_patient(&conn, &patient.id).unwrap().unwrap();
        assert_eq!(loaded.name, "Jane Doe");
        assert_eq!(loaded.phone, "5551234567");
        assert_eq!(loaded.gender, Gender::Female);
        assert_eq!(loaded.age, Some(34));
    }

    #[test]
    fn get_missing_patient_returns_none() {
        let conn = open_memory_database().unwrap();
        assert!(get_patient(&conn, &Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn search_matches_name_case_insensitive() {
        let conn = open_memory_database().unwrap();
        insert_patient(&conn, &sample_patient("Jane Doe")).unwrap();
        insert_patient(&conn, &sample_patient("John Smith")).unwrap();

        let results = search_patients(&conn, "jane").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Jane Doe");
    }

    #[test]
    fn history_appends_in_order() {
        let conn = open_memory_database().unwrap();
        let patient = sample_patient("Jane Doe");
        insert_patient(&conn, &patient).unwrap();

        for (i, note) in ["fever", "follow-up"].iter().enumerate() {
            insert_history_entry(
                &conn,
                &HistoryEntry {
                    id: Uuid::new_v4(),
                    patient_id: patient.id,
                    visit_date: NaiveDate::from_ymd_opt(2026, 3, 1 + i as u32).unwrap(),
                    note: note.to_string(),
                    doctor_name: "Dr. Smith".to_string(),
                },
            )
            .unwrap();
        }

        let history = get_patient_history(&conn, &patient.id).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].note, "fever");
        assert_eq!(history[1].note, "follow-up");
    }
}
