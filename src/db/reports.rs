use chrono::NaiveDate;
use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::models::ParticipationStatus;
use crate::reports::{EventAssignmentRow, VolunteerHistoryRow};

#[derive(sqlx::FromRow)]
struct DbVolunteerHistoryRow {
    username: String,
    full_name: Option<String>,
    event_name: String,
    location: String,
    participation_date: NaiveDate,
    session_active: bool,
}

#[instrument(skip(pool))]
pub async fn volunteer_history_rows(
    pool: &Pool<Sqlite>,
    today: NaiveDate,
) -> Result<Vec<VolunteerHistoryRow>, AppError> {
    info!("Collecting volunteer history report rows");
    let rows = sqlx::query_as::<_, DbVolunteerHistoryRow>(
        "SELECT uc.username, p.full_name, e.event_name, e.location,
                vh.participation_date, vh.session_active
         FROM volunteer_history vh
         JOIN user_credentials uc ON uc.id = vh.user_id
         LEFT JOIN user_profiles p ON p.id = vh.user_id
         JOIN event_details e ON e.id = vh.event_id
         ORDER BY uc.username, vh.participation_date",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| VolunteerHistoryRow {
            username: row.username,
            full_name: row.full_name.unwrap_or_default(),
            event_name: row.event_name,
            location: row.location,
            participation_date: row.participation_date,
            status: ParticipationStatus::at(row.session_active, row.participation_date, today),
        })
        .collect())
}

#[derive(sqlx::FromRow)]
struct DbEventAssignmentRow {
    event_name: String,
    description: String,
    location: String,
    required_skills: Option<String>,
    event_date: NaiveDate,
    urgency: String,
    username: Option<String>,
}

#[instrument(skip(pool))]
pub async fn event_assignment_rows(
    pool: &Pool<Sqlite>,
) -> Result<Vec<EventAssignmentRow>, AppError> {
    info!("Collecting event assignment report rows");
    let rows = sqlx::query_as::<_, DbEventAssignmentRow>(
        "SELECT e.event_name, e.description, e.location,
                (SELECT GROUP_CONCAT(name, '; ') FROM (
                    SELECT s.name FROM event_skills es
                    JOIN skills s ON s.id = es.skill_id
                    WHERE es.event_id = e.id
                    ORDER BY es.position
                )) AS required_skills,
                e.event_date, e.urgency, uc.username
         FROM event_details e
         LEFT JOIN volunteer_history vh ON vh.event_id = e.id
         LEFT JOIN user_credentials uc ON uc.id = vh.user_id
         ORDER BY e.event_date, e.id, uc.username",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| EventAssignmentRow {
            event_name: row.event_name,
            description: row.description,
            location: row.location,
            required_skills: row.required_skills.unwrap_or_default(),
            event_date: row.event_date,
            urgency: row.urgency.parse().unwrap_or_default(),
            username: row.username.unwrap_or_default(),
        })
        .collect())
}
