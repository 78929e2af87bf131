//! Waiting-room / pharmacy status workflow.
//!
//! Visit statuses advance through an explicit transition table; invalid
//! moves fail with a typed error rather than silently doing nothing.
//! Reaching `sent_to_pharmacy` synthesizes exactly one prescription per
//! waiting entry and places it on the pharmacy queue.

use chrono::Utc;
use rusqlite::Connection;
use uuid::Uuid;

use crate::core_state::NotificationKind;
use crate::db::{self, DatabaseError};
use crate::models::enums::{ClinicStructure, PrescriptionStatus, VisitStatus};
use crate::models::{Prescription, PrescriptionItem, WaitingEntry};

#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    #[error("Waiting entry not found: {0}")]
    EntryNotFound(Uuid),
    #[error("Prescription not found: {0}")]
    PrescriptionNotFound(Uuid),
    #[error("Invalid status transition: {from:?} -> {to:?}")]
    InvalidTransition { from: VisitStatus, to: VisitStatus },
    #[error("A consultation is already active")]
    ConsultationActive,
    #[error("Prescription already dispensed: {0}")]
    AlreadyDispensed(Uuid),
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// The single legal successor of a status, if any. `dispensed` is terminal.
pub fn next_status(status: VisitStatus) -> Option<VisitStatus> {
    match status {
        VisitStatus::Waiting => Some(VisitStatus::Called),
        VisitStatus::Called => Some(VisitStatus::InConsult),
        VisitStatus::InConsult => Some(VisitStatus::Prescribed),
        VisitStatus::Prescribed => Some(VisitStatus::SentToPharmacy),
        VisitStatus::SentToPharmacy => Some(VisitStatus::Dispensed),
        VisitStatus::Dispensed => None,
    }
}

/// Whether `from -> to` is a legal transition.
pub fn can_advance(from: VisitStatus, to: VisitStatus) -> bool {
    next_status(from) == Some(to)
}

/// Result of advancing a waiting entry.
#[derive(Debug)]
pub struct AdvanceOutcome {
    pub entry: WaitingEntry,
    /// Set when the transition synthesized a prescription.
    pub prescription: Option<Prescription>,
    /// Notification for the UI, if the transition warrants one.
    pub notification: Option<(NotificationKind, String)>,
}

/// Advance a waiting entry to `new_status`.
///
/// `items` and `advice` are consumed only by the `sent_to_pharmacy`
/// transition, which creates the prescription. In one-man mode a second
/// concurrent consultation is rejected.
pub fn advance_status(
    conn: &Connection,
    structure: ClinicStructure,
    entry_id: &Uuid,
    new_status: VisitStatus,
    items: Vec<String>,
    advice: Option<String>,
) -> Result<AdvanceOutcome, TransitionError> {
    let entry = db::get_waiting_entry(conn, entry_id)?
        .ok_or(TransitionError::EntryNotFound(*entry_id))?;

    if !can_advance(entry.status, new_status) {
        return Err(TransitionError::InvalidTransition {
            from: entry.status,
            to: new_status,
        });
    }

    if new_status == VisitStatus::InConsult
        && structure == ClinicStructure::OneMan
        && db::count_entries_in_status(conn, VisitStatus::InConsult)? > 0
    {
        return Err(TransitionError::ConsultationActive);
    }

    let mut prescription = None;
    let mut notification = None;

    if new_status == VisitStatus::SentToPharmacy {
        let patient = db::get_patient(conn, &entry.patient_id)?
            .ok_or(TransitionError::EntryNotFound(*entry_id))?;
        let doctor = db::get_doctor(conn, &entry.doctor_id)?
            .ok_or(TransitionError::EntryNotFound(*entry_id))?;

        let rx = Prescription {
            id: Uuid::new_v4(),
            waiting_entry_id: entry.id,
            patient_name: patient.name.clone(),
            doctor_name: doctor.name,
            items: items
                .into_iter()
                .map(|name| PrescriptionItem { name, price: None })
                .collect(),
            advice,
            status: PrescriptionStatus::Pending,
            created_at: Utc::now().naive_utc(),
            bill: None,
        };
        db::insert_prescription(conn, &rx)?;

        tracing::info!(entry = %entry.id, rx = %rx.id, "Prescription queued for pharmacy");
        notification = Some((
            NotificationKind::SentToPharmacy,
            format!("{} sent to pharmacy", patient.name),
        ));
        prescription = Some(rx);
    } else if new_status == VisitStatus::Called {
        if let Some(patient) = db::get_patient(conn, &entry.patient_id)? {
            notification = Some((
                NotificationKind::PatientCalled,
                format!("{} called in", patient.name),
            ));
        }
    }

    db::set_waiting_status(conn, entry_id, new_status)?;

    Ok(AdvanceOutcome {
        entry: WaitingEntry {
            status: new_status,
            ..entry
        },
        prescription,
        notification,
    })
}

/// Flip a pending prescription to dispensed and close out its visit.
///
/// This is a status flag only — no stock or inventory effect.
pub fn mark_dispensed(
    conn: &Connection,
    prescription_id: &Uuid,
) -> Result<(Prescription, Option<(NotificationKind, String)>), TransitionError> {
    let rx = db::get_prescription(conn, prescription_id)?
        .ok_or(TransitionError::PrescriptionNotFound(*prescription_id))?;

    if rx.status == PrescriptionStatus::Dispensed {
        return Err(TransitionError::AlreadyDispensed(*prescription_id));
    }

    db::set_prescription_status(conn, prescription_id, PrescriptionStatus::Dispensed)?;
    db::set_waiting_status(conn, &rx.waiting_entry_id, VisitStatus::Dispensed)?;

    let notification = Some((
        NotificationKind::Dispensed,
        format!("{} dispensed", rx.patient_name),
    ));

    Ok((
        Prescription {
            status: PrescriptionStatus::Dispensed,
            ..rx
        },
        notification,
    ))
}
