use std::str::FromStr;

use chrono::NaiveDate;
use printpdf::{BuiltinFont, Mm, PdfDocument};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{ParticipationStatus, Urgency};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 15.0;
const LINE_HEIGHT_MM: f32 = 6.0;
const TITLE_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 9.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    VolunteerHistory,
    EventAssignments,
}

impl ReportKind {
    pub fn slug(&self) -> &'static str {
        match self {
            ReportKind::VolunteerHistory => "volunteer-history",
            ReportKind::EventAssignments => "event-assignments",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::VolunteerHistory => "Volunteer History Report",
            ReportKind::EventAssignments => "Event Assignments Report",
        }
    }
}

impl FromStr for ReportKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "volunteer-history" => Ok(ReportKind::VolunteerHistory),
            "event-assignments" => Ok(ReportKind::EventAssignments),
            _ => Err(AppError::Validation(format!("Invalid report type: {}", s))),
        }
    }
}

/// A flat row that can be written as CSV or as one line of a PDF dump.
pub trait ReportRow {
    const HEADERS: &'static [&'static str];

    fn cells(&self) -> Vec<String>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VolunteerHistoryRow {
    pub username: String,
    pub full_name: String,
    pub event_name: String,
    pub location: String,
    pub participation_date: NaiveDate,
    pub status: ParticipationStatus,
}

impl ReportRow for VolunteerHistoryRow {
    const HEADERS: &'static [&'static str] = &[
        "username",
        "full_name",
        "event_name",
        "location",
        "participation_date",
        "status",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.username.clone(),
            self.full_name.clone(),
            self.event_name.clone(),
            self.location.clone(),
            self.participation_date.to_string(),
            self.status.as_str().to_string(),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventAssignmentRow {
    pub event_name: String,
    pub description: String,
    pub location: String,
    pub required_skills: String,
    pub event_date: NaiveDate,
    pub urgency: Urgency,
    pub username: String,
}

impl ReportRow for EventAssignmentRow {
    const HEADERS: &'static [&'static str] = &[
        "event_name",
        "description",
        "location",
        "required_skills",
        "event_date",
        "urgency",
        "username",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.event_name.clone(),
            self.description.clone(),
            self.location.clone(),
            self.required_skills.clone(),
            self.event_date.to_string(),
            self.urgency.as_str().to_string(),
            self.username.clone(),
        ]
    }
}

/// Header line followed by one record per row, even when there are no rows.
pub fn render_csv<R: ReportRow>(rows: &[R]) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(R::HEADERS)?;
    for row in rows {
        writer.write_record(row.cells())?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Report(format!("Failed to flush CSV: {}", e)))
}

/// Paginated text dump: a title, a header line, then one line per row.
pub fn render_pdf<R: ReportRow>(title: &str, rows: &[R]) -> Result<Vec<u8>, AppError> {
    let pdf_error = |e: printpdf::Error| AppError::Report(format!("PDF error: {:?}", e));

    let (doc, page, layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
    let body_font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;
    let title_font = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_error)?;

    let mut current = doc.get_page(page).get_layer(layer);
    let mut y = PAGE_HEIGHT_MM - MARGIN_MM;

    current.use_text(title, TITLE_SIZE, Mm(MARGIN_MM), Mm(y), &title_font);
    y -= LINE_HEIGHT_MM * 2.0;

    let header = R::HEADERS.join(" | ");
    let lines = std::iter::once(header).chain(rows.iter().map(|row| row.cells().join(" | ")));

    for line in lines {
        if y < MARGIN_MM {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            current = doc.get_page(page).get_layer(layer);
            y = PAGE_HEIGHT_MM - MARGIN_MM;
        }

        current.use_text(line, BODY_SIZE, Mm(MARGIN_MM), Mm(y), &body_font);
        y -= LINE_HEIGHT_MM;
    }

    doc.save_to_bytes().map_err(pdf_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_row(username: &str) -> VolunteerHistoryRow {
        VolunteerHistoryRow {
            username: username.to_string(),
            full_name: "Alice A".to_string(),
            event_name: "Park Cleanup, North".to_string(),
            location: "Metropolis".to_string(),
            participation_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            status: ParticipationStatus::Active,
        }
    }

    #[test]
    fn report_kind_parses_known_slugs_only() {
        assert_eq!(
            "volunteer-history".parse::<ReportKind>().unwrap(),
            ReportKind::VolunteerHistory
        );
        assert_eq!(
            "event-assignments".parse::<ReportKind>().unwrap(),
            ReportKind::EventAssignments
        );
        assert!("payroll".parse::<ReportKind>().is_err());
    }

    #[test]
    fn csv_quotes_embedded_commas() {
        let bytes = render_csv(&[history_row("alice")]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "username,full_name,event_name,location,participation_date,status"
        );
        assert_eq!(
            lines.next().unwrap(),
            "alice,Alice A,\"Park Cleanup, North\",Metropolis,2030-01-01,Active"
        );
    }

    #[test]
    fn csv_of_no_rows_is_just_the_header() {
        let bytes = render_csv::<EventAssignmentRow>(&[]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn pdf_spans_several_pages_for_long_reports() {
        let short = render_pdf("Volunteer History Report", &[history_row("alice")]).unwrap();
        let rows: Vec<_> = (0..120).map(|i| history_row(&format!("user{}", i))).collect();
        let long = render_pdf("Volunteer History Report", &rows).unwrap();

        assert!(short.starts_with(b"%PDF"));
        assert!(long.starts_with(b"%PDF"));
        assert!(long.len() > short.len());
    }
}
