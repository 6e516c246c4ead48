use chrono::NaiveDate;
use sqlx::{Pool, Sqlite};
use tracing::{info, instrument, warn};

use crate::error::AppError;
use crate::models::{Assignment, AssignmentSummary, AssignmentUpdate, DbParticipation, Participation};
use crate::validation::today;

const PARTICIPATION_SELECT: &str = "SELECT vh.id, vh.event_id, e.event_name, e.description, e.location,
            e.urgency, e.event_date, vh.participation_date, vh.session_active
     FROM volunteer_history vh
     JOIN event_details e ON e.id = vh.event_id";

/// Applies additions and removals for one event as a single transaction.
/// Re-adding an already active volunteer is a no-op. Rows dated before today
/// are history and are neither matched nor removed.
#[instrument(skip(pool, update), fields(event_id = update.event_id))]
pub async fn update_assignments(
    pool: &Pool<Sqlite>,
    update: &AssignmentUpdate,
) -> Result<AssignmentSummary, AppError> {
    info!(
        assigned = ?update.people_assigned,
        removed = ?update.people_to_delete,
        "Updating event assignments"
    );

    let mut tx = pool.begin().await?;

    let event_date: Option<NaiveDate> =
        sqlx::query_scalar("SELECT event_date FROM event_details WHERE id = ?")
            .bind(update.event_id)
            .fetch_optional(&mut *tx)
            .await?;

    let Some(event_date) = event_date else {
        tx.rollback().await?;
        return Err(AppError::NotFound(format!(
            "Event {} not found",
            update.event_id
        )));
    };
    let participation_date = update.event_date.unwrap_or(event_date);
    let today = today();

    let mut summary = AssignmentSummary::default();

    for user_id in &update.people_assigned {
        let res = sqlx::query(
            "INSERT INTO volunteer_history (user_id, event_id, participation_date, session_active)
             SELECT ?, ?, ?, 1
             WHERE NOT EXISTS (
                 SELECT 1 FROM volunteer_history vh
                 WHERE vh.user_id = ? AND vh.event_id = ?
                   AND vh.session_active = 1 AND vh.participation_date >= ?
             )",
        )
        .bind(user_id)
        .bind(update.event_id)
        .bind(participation_date)
        .bind(user_id)
        .bind(update.event_id)
        .bind(today)
        .execute(&mut *tx)
        .await;

        match res {
            Ok(res) => summary.added += res.rows_affected(),
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
                warn!(user_id = %user_id, "Assigned volunteer has no profile");
                tx.rollback().await?;
                return Err(AppError::NotFound(format!(
                    "Volunteer {} not found",
                    user_id
                )));
            }
            Err(e) => return Err(e.into()),
        }
    }

    for user_id in &update.people_to_delete {
        let res = sqlx::query(
            "DELETE FROM volunteer_history
             WHERE user_id = ? AND event_id = ? AND session_active = 1 AND participation_date >= ?",
        )
        .bind(user_id)
        .bind(update.event_id)
        .bind(today)
        .execute(&mut *tx)
        .await?;

        summary.removed += res.rows_affected();
    }

    tx.commit().await?;
    Ok(summary)
}

#[instrument(skip(pool))]
pub async fn active_volunteer_ids(pool: &Pool<Sqlite>, event_id: i64) -> Result<Vec<i64>, AppError> {
    let ids: Vec<i64> = sqlx::query_scalar(
        "SELECT DISTINCT user_id FROM volunteer_history
         WHERE event_id = ? AND session_active = 1 AND participation_date >= ?
         ORDER BY user_id",
    )
    .bind(event_id)
    .bind(today())
    .fetch_all(pool)
    .await?;

    Ok(ids)
}

/// Drops every assignment row referencing the event, active or not.
#[instrument(skip(pool))]
pub async fn remove_event_assignments(
    pool: &Pool<Sqlite>,
    event_id: i64,
) -> Result<Vec<Assignment>, AppError> {
    info!("Removing event from all volunteers");
    let rows = sqlx::query_as::<_, Assignment>(
        "DELETE FROM volunteer_history WHERE event_id = ?
         RETURNING id, user_id, event_id, participation_date, session_active",
    )
    .bind(event_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Upcoming active assignments for a volunteer, soonest first.
#[instrument(skip(pool))]
pub async fn notifications_for_user(
    pool: &Pool<Sqlite>,
    user_id: i64,
    today: NaiveDate,
) -> Result<Vec<Participation>, AppError> {
    info!("Fetching notifications");
    let rows = sqlx::query_as::<_, DbParticipation>(&format!(
        "{} WHERE vh.user_id = ? AND vh.session_active = 1 AND vh.participation_date >= ?
         ORDER BY vh.participation_date ASC, vh.id ASC",
        PARTICIPATION_SELECT
    ))
    .bind(user_id)
    .bind(today)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Participation::from_db(row, today))
        .collect())
}

/// Completed assignments for a volunteer, most recent first.
#[instrument(skip(pool))]
pub async fn history_for_user(
    pool: &Pool<Sqlite>,
    user_id: i64,
    today: NaiveDate,
) -> Result<Vec<Participation>, AppError> {
    info!("Fetching volunteer history");
    let rows = sqlx::query_as::<_, DbParticipation>(&format!(
        "{} WHERE vh.user_id = ? AND (vh.session_active = 0 OR vh.participation_date < ?)
         ORDER BY vh.participation_date DESC, vh.id DESC",
        PARTICIPATION_SELECT
    ))
    .bind(user_id)
    .bind(today)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Participation::from_db(row, today))
        .collect())
}
