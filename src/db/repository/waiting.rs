use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::VisitStatus;
use crate::models::*;

const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

pub fn insert_waiting_entry(conn: &Connection, entry: &WaitingEntry) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO waiting_entries (id, patient_id, doctor_id, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            entry.id.to_string(),
            entry.patient_id.to_string(),
            entry.doctor_id.to_string(),
            entry.status.as_str(),
            entry.created_at.format(DATETIME_FMT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_waiting_entry(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<WaitingEntry>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, doctor_id, status, created_at
         FROM waiting_entries WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
        ))
    });

    match result {
        Ok(row) => Ok(Some(entry_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn set_waiting_status(
    conn: &Connection,
    id: &Uuid,
    status: VisitStatus,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE waiting_entries SET status = ?2 WHERE id = ?1",
        params![id.to_string(), status.as_str()],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "WaitingEntry".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Count of entries currently in a given status (one-man mode guard).
pub fn count_entries_in_status(
    conn: &Connection,
    status: VisitStatus,
) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM waiting_entries WHERE status = ?1",
        params![status.as_str()],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Active waiting list joined with patient/doctor names, oldest first.
/// Dispensed entries are archived out of the board.
pub fn get_waiting_board(conn: &Connection) -> Result<Vec<WaitingCard>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT w.id, w.patient_id, p.name, w.doctor_id, d.name, w.status, w.created_at
         FROM waiting_entries w
         JOIN patients p ON w.patient_id = p.id
         JOIN doctors d ON w.doctor_id = d.id
         WHERE w.status != 'dispensed'
         ORDER BY w.created_at ASC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, String>(6)?,
        ))
    })?;

    let mut cards = Vec::new();
    for row in rows {
        let (id, patient_id, patient_name, doctor_id, doctor_name, status, created_at) = row?;
        cards.push(WaitingCard {
            id: parse_uuid(&id)?,
            patient_id: parse_uuid(&patient_id)?,
            patient_name,
            doctor_id: parse_uuid(&doctor_id)?,
            doctor_name,
            status: VisitStatus::from_str(&status)?,
            created_at: NaiveDateTime::parse_from_str(&created_at, DATETIME_FMT)
                .unwrap_or_default(),
        });
    }
    Ok(cards)
}

fn entry_from_row(
    row: (String, String, String, String, String),
) -> Result<WaitingEntry, DatabaseError> {
    let (id, patient_id, doctor_id, status, created_at) = row;
    Ok(WaitingEntry {
        id: parse_uuid(&id)?,
        patient_id: parse_uuid(&patient_id)?,
        doctor_id: parse_uuid(&doctor_id)?,
        status: VisitStatus::from_str(&status)?,
        created_at: NaiveDateTime::parse_from_str(&created_at, DATETIME_FMT).unwrap_or_default(),
    })
}

fn parse_uuid(s: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(s).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{insert_doctor, insert_patient};
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::Gender;

    fn seed_visit(conn: &Connection) -> WaitingEntry {
        let patient = Patient {
            id: Uuid::new_v4(),
            name: "Jane Doe".to_string(),
            phone: "5551234567".to_string(),
            age: Some(34),
            gender: Gender::Female,
            address: None,
            created_at: chrono::Utc::now().naive_utc(),
        };
        insert_patient(conn, &patient).unwrap();

        let doctor = Doctor {
            id: Uuid::new_v4(),
            name: "Dr. Smith".to_string(),
            specialization: "General Medicine".to_string(),
            initials: "DS".to_string(),
            pin_hash: None,
        };
        insert_doctor(conn, &doctor).unwrap();

        let entry = WaitingEntry {
            id: Uuid::new_v4(),
            patient_id: patient.id,
            doctor_id: doctor.id,
            status: VisitStatus::Waiting,
            created_at: chrono::Utc::now().naive_utc(),
        };
        insert_waiting_entry(conn, &entry).unwrap();
        entry
    }

    #[test]
    fn insert_and_get_entry() {
        let conn = open_memory_database().unwrap();
        let entry = seed_visit(&conn);

        let loaded = get_waiting_entry(&conn, &entry.id).unwrap().unwrap();
        assert_eq!(loaded.status, VisitStatus::Waiting);
        assert_eq!(loaded.patient_id, entry.patient_id);
    }

    #[test]
    fn set_status_persists() {
        let conn = open_memory_database().unwrap();
        let entry = seed_visit(&conn);

        set_waiting_status(&conn, &entry.id, VisitStatus::Called).unwrap();
        let loaded = get_waiting_entry(&conn, &entry.id).unwrap().unwrap();
        assert_eq!(loaded.status, VisitStatus::Called);
    }

    #[test]
    fn set_status_missing_entry_is_not_found() {
        let conn = open_memory_database().unwrap();
        let err = set_waiting_status(&conn, &Uuid::new_v4(), VisitStatus::Called).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn board_joins_names_and_hides_dispensed() {
        let conn = open_memory_database().unwrap();
        let entry = seed_visit(&conn);

        let board = get_waiting_board(&conn).unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].patient_name, "Jane Doe");
        assert_eq!(board[0].doctor_name, "Dr. Smith");

        set_waiting_status(&conn, &entry.id, VisitStatus::Dispensed).unwrap();
        assert!(get_waiting_board(&conn).unwrap().is_empty());
    }

    #[test]
    fn count_in_status_tracks_changes() {
        let conn = open_memory_database().unwrap();
        let entry = seed_visit(&conn);

        assert_eq!(count_entries_in_status(&conn, VisitStatus::InConsult).unwrap(), 0);
        set_waiting_status(&conn, &entry.id, VisitStatus::InConsult).unwrap();
        assert_eq!(count_entries_in_status(&conn, VisitStatus::InConsult).unwrap(), 1);
    }
}
