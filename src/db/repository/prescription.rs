use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::{PrescriptionStatus, TaxType};
use crate::models::*;

const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

pub fn insert_prescription(conn: &Connection, rx: &Prescription) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO prescriptions (id, waiting_entry_id, patient_name, doctor_name, advice,
         status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            rx.id.to_string(),
            rx.waiting_entry_id.to_string(),
            rx.patient_name,
            rx.doctor_name,
            rx.advice,
            rx.status.as_str(),
            rx.created_at.format(DATETIME_FMT).to_string(),
        ],
    )?;

    for (position, item) in rx.items.iter().enumerate() {
        conn.execute(
            "INSERT INTO prescription_items (id, prescription_id, position, name, price)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                Uuid::new_v4().to_string(),
                rx.id.to_string(),
                position as i64,
                item.name,
                item.price,
            ],
        )?;
    }

    Ok(())
}

pub fn get_prescription(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<Prescription>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, waiting_entry_id, patient_name, doctor_name, advice, status, created_at,
                tax_type, tax_percent, tax_amount, appointment_fee, round_off, subtotal, total,
                due_date
         FROM prescriptions WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.to_string()], |row| Ok(rx_row_from_rusqlite(row)));
    let row = match result {
        Ok(row) => row?,
        Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut rx = prescription_from_row(row)?;
    rx.items = get_prescription_items(conn, id)?;
    Ok(Some(rx))
}

/// Prescriptions awaiting dispensing, oldest first (the pharmacy queue).
pub fn get_pharmacy_queue(conn: &Connection) -> Result<Vec<Prescription>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, waiting_entry_id, patient_name, doctor_name, advice, status, created_at,
                tax_type, tax_percent, tax_amount, appointment_fee, round_off, subtotal, total,
                due_date
         FROM prescriptions WHERE status = 'pending' ORDER BY created_at ASC",
    )?;

    let rows = stmt.query_map([], |row| Ok(rx_row_from_rusqlite(row)))?;

    let mut queue = Vec::new();
    for row in rows {
        let mut rx = prescription_from_row(row??)?;
        rx.items = get_prescription_items(conn, &rx.id)?;
        queue.push(rx);
    }
    Ok(queue)
}

pub fn set_prescription_status(
    conn: &Connection,
    id: &Uuid,
    status: PrescriptionStatus,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE prescriptions SET status = ?2 WHERE id = ?1",
        params![id.to_string(), status.as_str()],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Prescription".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Store the computed bill snapshot and the prices entered per line item.
pub fn attach_bill(
    conn: &Connection,
    id: &Uuid,
    bill: &BillDetails,
    prices: &[Option<f64>],
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE prescriptions SET tax_type = ?2, tax_percent = ?3, tax_amount = ?4,
         appointment_fee = ?5, round_off = ?6, subtotal = ?7, total = ?8, due_date = ?9
         WHERE id = ?1",
        params![
            id.to_string(),
            bill.tax_type.as_str(),
            bill.tax_percent,
            bill.tax_amount,
            bill.appointment_fee,
            bill.round_off,
            bill.subtotal,
            bill.total,
            bill.due_date.to_string(),
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Prescription".into(),
            id: id.to_string(),
        });
    }

    for (position, price) in prices.iter().enumerate() {
        conn.execute(
            "UPDATE prescription_items SET price = ?3
             WHERE prescription_id = ?1 AND position = ?2",
            params![id.to_string(), position as i64, price],
        )?;
    }

    Ok(())
}

fn get_prescription_items(
    conn: &Connection,
    rx_id: &Uuid,
) -> Result<Vec<PrescriptionItem>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT name, price FROM prescription_items
         WHERE prescription_id = ?1 ORDER BY position ASC",
    )?;

    let rows = stmt.query_map(params![rx_id.to_string()], |row| {
        Ok(PrescriptionItem {
            name: row.get(0)?,
            price: row.get(1)?,
        })
    })?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

// Internal row type for Prescription mapping
struct PrescriptionRow {
    id: String,
    waiting_entry_id: String,
    patient_name: String,
    doctor_name: String,
    advice: Option<String>,
    status: String,
    created_at: String,
    tax_type: Option<String>,
    tax_percent: Option<f64>,
    tax_amount: Option<f64>,
    appointment_fee: Option<f64>,
    round_off: Option<f64>,
    subtotal: Option<f64>,
    total: Option<f64>,
    due_date: Option<String>,
}

fn rx_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<PrescriptionRow, rusqlite::Error> {
    Ok(PrescriptionRow {
        id: row.get(0)?,
        waiting_entry_id: row.get(1)?,
        patient_name: row.get(2)?,
        doctor_name: row.get(3)?,
        advice: row.get(4)?,
        status: row.get(5)?,
        created_at: row.get(6)?,
        tax_type: row.get(7)?,
        tax_percent: row.get(8)?,
        tax_amount: row.get(9)?,
        appointment_fee: row.get(10)?,
        round_off: row.get(11)?,
        subtotal: row.get(12)?,
        total: row.get(13)?,
        due_date: row.get(14)?,
    })
}

fn prescription_from_row(row: PrescriptionRow) -> Result<Prescription, DatabaseError> {
    // A bill snapshot is present only when the total column is set.
    let bill = match (row.total, row.due_date.as_deref()) {
        (Some(total), Some(due_date)) => Some(BillDetails {
            tax_type: row
                .tax_type
                .as_deref()
                .map(TaxType::from_str)
                .transpose()?
                .unwrap_or(TaxType::None),
            tax_percent: row.tax_percent.unwrap_or(0.0),
            tax_amount: row.tax_amount.unwrap_or(0.0),
            appointment_fee: row.appointment_fee.unwrap_or(0.0),
            round_off: row.round_off.unwrap_or(0.0),
            subtotal: row.subtotal.unwrap_or(0.0),
            total,
            due_date: NaiveDate::parse_from_str(due_date, "%Y-%m-%d").unwrap_or_default(),
        }),
        _ => None,
    };

    Ok(Prescription {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        waiting_entry_id: Uuid::parse_str(&row.waiting_entry_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        patient_name: row.patient_name,
        doctor_name: row.doctor_name,
        items: Vec::new(),
        advice: row.advice,
        status: PrescriptionStatus::from_str(&row.status)?,
        created_at: NaiveDateTime::parse_from_str(&row.created_at, DATETIME_FMT)
            .unwrap_or_default(),
        bill,
    })
}
