use rocket::Route;
use rocket::State;
use rocket::http::{ContentType, Header};
use rocket::serde::json::Json;
use sqlx::{Pool, Sqlite};
use tracing::info;

use crate::db::{event_assignment_rows, volunteer_history_rows};
use crate::error::AppError;
use crate::reports::{
    EventAssignmentRow, ReportKind, VolunteerHistoryRow, render_csv, render_pdf,
};
use crate::validation::today;

#[derive(Responder)]
pub struct ReportFile {
    body: Vec<u8>,
    content_type: ContentType,
    disposition: Header<'static>,
}

impl ReportFile {
    fn new(bytes: Vec<u8>, content_type: ContentType, kind: ReportKind, extension: &str) -> Self {
        let disposition = format!(
            "attachment; filename=\"{}-report.{}\"",
            kind.slug(),
            extension
        );

        Self {
            body: bytes,
            content_type,
            disposition: Header::new("Content-Disposition", disposition),
        }
    }
}

enum Format {
    Csv,
    Pdf,
}

async fn render(db: &Pool<Sqlite>, kind: ReportKind, format: Format) -> Result<ReportFile, AppError> {
    info!(report = kind.slug(), "Generating report");

    // Rows are fully rendered before anything is sent.
    let bytes = match (kind, &format) {
        (ReportKind::VolunteerHistory, Format::Csv) => {
            render_csv(&volunteer_history_rows(db, today()).await?)?
        }
        (ReportKind::VolunteerHistory, Format::Pdf) => {
            render_pdf(kind.title(), &volunteer_history_rows(db, today()).await?)?
        }
        (ReportKind::EventAssignments, Format::Csv) => {
            render_csv(&event_assignment_rows(db).await?)?
        }
        (ReportKind::EventAssignments, Format::Pdf) => {
            render_pdf(kind.title(), &event_assignment_rows(db).await?)?
        }
    };

    Ok(match format {
        Format::Csv => ReportFile::new(bytes, ContentType::CSV, kind, "csv"),
        Format::Pdf => ReportFile::new(bytes, ContentType::PDF, kind, "pdf"),
    })
}

#[get("/generate-csv/<report_type>")]
pub async fn generate_csv(
    report_type: &str,
    db: &State<Pool<Sqlite>>,
) -> Result<ReportFile, AppError> {
    let kind: ReportKind = report_type.parse()?;
    render(db, kind, Format::Csv).await
}

#[get("/generate-pdf/<report_type>")]
pub async fn generate_pdf(
    report_type: &str,
    db: &State<Pool<Sqlite>>,
) -> Result<ReportFile, AppError> {
    let kind: ReportKind = report_type.parse()?;
    render(db, kind, Format::Pdf).await
}

#[get("/volunteer-history")]
pub async fn volunteer_history(
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<VolunteerHistoryRow>>, AppError> {
    Ok(Json(volunteer_history_rows(db, today()).await?))
}

#[get("/event-assignments")]
pub async fn event_assignments(
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<EventAssignmentRow>>, AppError> {
    Ok(Json(event_assignment_rows(db).await?))
}

pub fn routes() -> Vec<Route> {
    routes![generate_csv, generate_pdf, volunteer_history, event_assignments]
}
