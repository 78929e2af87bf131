//! Printable bill / prescription rendering.
//!
//! PDF generation via `printpdf`, A4 pages with builtin Helvetica.
//! Page breaks follow the plan from [`crate::layout`]: the item table
//! always starts on page one, and the summary section (totals for a
//! bill, advice for a prescription) lands on page one or two per the
//! estimated fit.

use printpdf::*;
use std::io::BufWriter;

use crate::layout::{self, EstimatedMeasurer, LayoutPlan, SummaryPlacement, SummaryVariant};
use crate::models::enums::TaxType;
use crate::models::{ClinicSettings, Prescription};

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("PDF render error: {0}")]
    Render(String),
}

/// Which printable document to produce from a prescription record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocType {
    Bill,
    Prescription,
}

impl DocType {
    pub fn slug(self) -> &'static str {
        match self {
            Self::Bill => "bill",
            Self::Prescription => "prescription",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Self::Bill => "BILL / RECEIPT",
            Self::Prescription => "PRESCRIPTION",
        }
    }
}

/// Download filename: `{doc-type}-{patientName}-{id}.pdf`.
///
/// The patient name is sanitized to characters safe in filenames;
/// whitespace collapses to a single dash.
pub fn export_filename(doc_type: DocType, patient_name: &str, id: &uuid::Uuid) -> String {
    let safe_name: String = patient_name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    format!("{}-{}-{}.pdf", doc_type.slug(), safe_name, id)
}

/// Render a prescription record as a printable PDF. Returns the bytes.
pub fn render_document(
    doc_type: DocType,
    rx: &Prescription,
    settings: &ClinicSettings,
) -> Result<Vec<u8>, DocumentError> {
    let plan = layout::plan_layout(rx.items.len(), &EstimatedMeasurer::default());
    render_with_plan(doc_type, rx, settings, &plan)
}

fn render_with_plan(
    doc_type: DocType,
    rx: &Prescription,
    settings: &ClinicSettings,
    plan: &LayoutPlan,
) -> Result<Vec<u8>, DocumentError> {
    let title = format!("{} — {}", doc_type.title(), rx.patient_name);
    let (doc, page1, layer1) = PdfDocument::new(&title, Mm(210.0), Mm(297.0), "Layer 1");
    let layer = doc.get_page(page1).get_layer(layer1);
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| DocumentError::Render(format!("font: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| DocumentError::Render(format!("font: {e}")))?;

    let mut y = Mm(280.0);

    // Clinic header
    layer.use_text(&settings.name, 14.0, Mm(20.0), y, &bold);
    y -= Mm(5.5);
    if !settings.address.is_empty() {
        for line in wrap_text(&settings.address, 90) {
            layer.use_text(&line, 8.0, Mm(20.0), y, &font);
            y -= Mm(4.0);
        }
    }
    y -= Mm(2.0);
    layer.use_text(doc_type.title(), 12.0, Mm(20.0), y, &bold);
    y -= Mm(8.0);

    // Patient block
    layer.use_text(format!("Patient: {}", rx.patient_name), 10.0, Mm(20.0), y, &font);
    y -= Mm(5.0);
    layer.use_text(format!("Doctor: {}", rx.doctor_name), 10.0, Mm(20.0), y, &font);
    y -= Mm(5.0);
    layer.use_text(
        format!("Date: {}", rx.created_at.format("%Y-%m-%d")),
        10.0,
        Mm(20.0),
        y,
        &font,
    );
    y -= Mm(8.0);

    // Item table
    layer.use_text("ITEMS:", 11.0, Mm(20.0), y, &bold);
    y -= Mm(6.0);
    for (i, item) in rx.items.iter().enumerate() {
        let text = match (doc_type, item.price) {
            (DocType::Bill, Some(price)) => {
                format!("  {}. {} — {} {:.2}", i + 1, item.name, settings.currency, price)
            }
            _ => format!("  {}. {}", i + 1, item.name),
        };
        for line in wrap_text(&text, 80) {
            layer.use_text(&line, 9.0, Mm(25.0), y, &font);
            y -= Mm(4.5);
        }
        y -= Mm(1.5);
    }

    // Summary, on this page or a fresh one
    let (summary_layer, mut sy) = match plan.placement {
        SummaryPlacement::PageOne => (layer, y - Mm(6.0)),
        SummaryPlacement::PageTwo => {
            let (page2, layer2) = doc.add_page(Mm(210.0), Mm(297.0), "Layer 1");
            (doc.get_page(page2).get_layer(layer2), Mm(280.0))
        }
    };
    let step = match plan.variant {
        SummaryVariant::Regular => Mm(5.5),
        SummaryVariant::Compressed => Mm(4.0),
    };

    match doc_type {
        DocType::Bill => {
            if let Some(bill) = &rx.bill {
                summary_layer.use_text("SUMMARY:", 11.0, Mm(20.0), sy, &bold);
                sy -= step + Mm(1.0);
                let cur = &settings.currency;
                let mut row = |label: &str, amount: f64| {
                    summary_layer.use_text(
                        format!("  {label}: {cur} {amount:.2}"),
                        9.0,
                        Mm(25.0),
                        sy,
                        &font,
                    );
                    sy -= step;
                };
                row("Subtotal", bill.subtotal);
                if bill.tax_type != TaxType::None {
                    row(
                        &format!(
                            "Tax ({} {:.1}%)",
                            bill.tax_type.as_str().to_uppercase(),
                            bill.tax_percent
                        ),
                        bill.tax_amount,
                    );
                }
                row("Appointment fee", bill.appointment_fee);
                row("Round off", bill.round_off);
                sy -= Mm(1.0);
                summary_layer.use_text(
                    format!("  TOTAL: {} {:.2}", cur, bill.total),
                    11.0,
                    Mm(25.0),
                    sy,
                    &bold,
                );
                sy -= step + Mm(2.0);
                summary_layer.use_text(
                    format!("Valid until: {}", bill.due_date.format("%Y-%m-%d")),
                    8.0,
                    Mm(20.0),
                    sy,
                    &font,
                );
            }
        }
        DocType::Prescription => {
            if let Some(advice) = rx.advice.as_deref().filter(|a| !a.trim().is_empty()) {
                summary_layer.use_text("ADVICE:", 11.0, Mm(20.0), sy, &bold);
                sy -= step + Mm(1.0);
                for line in wrap_text(advice, 80) {
                    summary_layer.use_text(&line, 9.0, Mm(25.0), sy, &font);
                    sy -= step;
                }
            }
            sy -= Mm(8.0);
            summary_layer.use_text(
                format!("{}, {}", rx.doctor_name, rx.created_at.format("%Y-%m-%d")),
                9.0,
                Mm(20.0),
                sy,
                &bold,
            );
        }
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| DocumentError::Render(format!("save: {e}")))?;
    buf.into_inner()
        .map_err(|e| DocumentError::Render(format!("buffer: {e}")))
}

fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.len() + word.len() + 1 > max_chars && !current.is_empty() {
            lines.push(current.clone());
            current.clear();
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
