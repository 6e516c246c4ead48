use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::db::skills::{replace_event_skills, skills_by_event, skills_for_event};
use crate::error::AppError;
use crate::models::{DbEvent, Event, EventData};
use crate::validation::today;

const EVENT_SELECT: &str = "SELECT e.id, e.event_name, e.description, e.location, e.urgency, e.event_date,
        (SELECT GROUP_CONCAT(vh.user_id)
         FROM volunteer_history vh
         WHERE vh.event_id = e.id AND vh.session_active = 1
           AND vh.participation_date >= ?) AS assigned_volunteers
     FROM event_details e";

#[instrument(skip(pool, event), fields(event_name = %event.event_name))]
pub async fn create_event(pool: &Pool<Sqlite>, event: &EventData) -> Result<i64, AppError> {
    info!("Creating event");
    let mut tx = pool.begin().await?;

    let res = sqlx::query(
        "INSERT INTO event_details (event_name, description, location, urgency, event_date)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&event.event_name)
    .bind(&event.description)
    .bind(&event.location)
    .bind(event.urgency.as_str())
    .bind(event.event_date)
    .execute(&mut *tx)
    .await?;

    let event_id = res.last_insert_rowid();
    replace_event_skills(&mut *tx, event_id, &event.required_skills).await?;

    tx.commit().await?;
    Ok(event_id)
}

#[instrument(skip(pool, event))]
pub async fn update_event(pool: &Pool<Sqlite>, id: i64, event: &EventData) -> Result<(), AppError> {
    info!("Updating event");
    let mut tx = pool.begin().await?;

    let res = sqlx::query(
        "UPDATE event_details
         SET event_name = ?, description = ?, location = ?, urgency = ?, event_date = ?
         WHERE id = ?",
    )
    .bind(&event.event_name)
    .bind(&event.description)
    .bind(&event.location)
    .bind(event.urgency.as_str())
    .bind(event.event_date)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if res.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(AppError::NotFound(format!("Event {} not found", id)));
    }

    replace_event_skills(&mut *tx, id, &event.required_skills).await?;

    tx.commit().await?;
    Ok(())
}

/// Removes the event and its skill links. Assignment rows are left alone.
#[instrument(skip(pool))]
pub async fn delete_event(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting event");
    let res = sqlx::query("DELETE FROM event_details WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Event {} not found", id)));
    }

    Ok(())
}

#[instrument(skip(pool))]
pub async fn get_event(pool: &Pool<Sqlite>, id: i64) -> Result<Event, AppError> {
    info!("Fetching event");
    let row = sqlx::query_as::<_, DbEvent>(&format!("{} WHERE e.id = ?", EVENT_SELECT))
        .bind(today())
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => {
            let skills = skills_for_event(pool, id).await?;
            Ok(Event::from_db(row, skills))
        }
        _ => Err(AppError::NotFound(format!("Event {} not found", id))),
    }
}

#[instrument(skip(pool))]
pub async fn list_events(pool: &Pool<Sqlite>) -> Result<Vec<Event>, AppError> {
    info!("Listing events");
    let rows = sqlx::query_as::<_, DbEvent>(&format!(
        "{} ORDER BY e.event_date, e.id",
        EVENT_SELECT
    ))
    .bind(today())
    .fetch_all(pool)
    .await?;

    let mut skills = skills_by_event(pool).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let event_skills = skills.remove(&row.id).unwrap_or_default();
            Event::from_db(row, event_skills)
        })
        .collect())
}
