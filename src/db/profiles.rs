use chrono::NaiveDate;
use sqlx::{Pool, QueryBuilder, Sqlite};
use tracing::{info, instrument};

use crate::db::skills::{
    normalize_skills, replace_profile_skills, skills_by_profile, skills_for_profile,
};
use crate::error::AppError;
use crate::models::{DbProfile, DbVolunteer, Profile, ProfileData, Volunteer};
use crate::validation::today;

const PROFILE_COLUMNS: &str =
    "id, full_name, address_1, address_2, city, state, zipcode, preferences, availability";

/// Inserts or replaces the profile keyed by the credential id.
/// Returns true when a new profile row was created.
#[instrument(skip(pool, profile))]
pub async fn upsert_profile(
    pool: &Pool<Sqlite>,
    user_id: i64,
    profile: &ProfileData,
) -> Result<bool, AppError> {
    info!("Upserting user profile");
    let availability = serde_json::to_string(&profile.availability)?;

    let mut tx = pool.begin().await?;

    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM user_profiles WHERE id = ?")
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

    sqlx::query(
        "INSERT INTO user_profiles
            (id, full_name, address_1, address_2, city, state, zipcode, preferences, availability)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
            full_name = excluded.full_name,
            address_1 = excluded.address_1,
            address_2 = excluded.address_2,
            city = excluded.city,
            state = excluded.state,
            zipcode = excluded.zipcode,
            preferences = excluded.preferences,
            availability = excluded.availability",
    )
    .bind(user_id)
    .bind(&profile.full_name)
    .bind(&profile.address_1)
    .bind(&profile.address_2)
    .bind(&profile.city)
    .bind(&profile.state)
    .bind(&profile.zipcode)
    .bind(&profile.preferences)
    .bind(&availability)
    .execute(&mut *tx)
    .await?;

    replace_profile_skills(&mut *tx, user_id, &profile.skills).await?;

    tx.commit().await?;

    Ok(existing.is_none())
}

#[instrument(skip(pool))]
pub async fn get_profile(pool: &Pool<Sqlite>, user_id: i64) -> Result<Profile, AppError> {
    info!("Fetching user profile");
    let row = sqlx::query_as::<_, DbProfile>(&format!(
        "SELECT {} FROM user_profiles WHERE id = ?",
        PROFILE_COLUMNS
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let skills = skills_for_profile(pool, user_id).await?;
            Ok(Profile::from_db(row, skills))
        }
        _ => Err(AppError::NotFound("User not found".to_string())),
    }
}

#[instrument(skip(pool))]
pub async fn get_all_profiles(pool: &Pool<Sqlite>) -> Result<Vec<Profile>, AppError> {
    info!("Listing all profiles");
    let rows = sqlx::query_as::<_, DbProfile>(&format!(
        "SELECT {} FROM user_profiles ORDER BY id",
        PROFILE_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    let mut skills = skills_by_profile(pool).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let profile_skills = skills.remove(&row.id).unwrap_or_default();
            Profile::from_db(row, profile_skills)
        })
        .collect())
}

async fn hydrate_volunteers(
    pool: &Pool<Sqlite>,
    rows: Vec<DbVolunteer>,
) -> Result<Vec<Volunteer>, AppError> {
    let mut skills = skills_by_profile(pool).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let volunteer_skills = skills.remove(&row.id).unwrap_or_default();
            Volunteer::from_db(row, volunteer_skills)
        })
        .collect())
}

/// Appends the `active_events` column: events the profile is assigned to that
/// have not yet happened.
fn push_active_events(query: &mut QueryBuilder<Sqlite>, today: NaiveDate) {
    query.push(
        "(SELECT GROUP_CONCAT(vh.event_id)
          FROM volunteer_history vh
          WHERE vh.user_id = p.id AND vh.session_active = 1 AND vh.participation_date >= ",
    );
    query.push_bind(today);
    query.push(") AS active_events");
}

#[instrument(skip(pool))]
pub async fn list_volunteers(pool: &Pool<Sqlite>) -> Result<Vec<Volunteer>, AppError> {
    info!("Listing volunteers");
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT p.id, p.full_name, ");
    push_active_events(&mut query, today());
    query.push(" FROM user_profiles p ORDER BY p.full_name, p.id");

    let rows = query
        .build_query_as::<DbVolunteer>()
        .fetch_all(pool)
        .await?;

    hydrate_volunteers(pool, rows).await
}

/// Volunteers holding every required skill who are not already active on an
/// event called `event_name`. Assignments dated before today no longer count.
#[instrument(skip(pool))]
pub async fn find_volunteers_with_skills(
    pool: &Pool<Sqlite>,
    required_skills: &[String],
    event_name: Option<&str>,
) -> Result<Vec<Volunteer>, AppError> {
    let required = normalize_skills(required_skills);
    if required.is_empty() {
        return Err(AppError::Validation(
            "At least one skill is required".to_string(),
        ));
    }
    info!(skills = ?required, "Matching volunteers by skill");

    let today = today();
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT p.id, p.full_name, ");
    push_active_events(&mut query, today);
    query.push(
        " FROM user_profiles p
         JOIN profile_skills ps ON ps.profile_id = p.id
         JOIN skills s ON s.id = ps.skill_id
         WHERE s.name IN (",
    );

    let mut names = query.separated(", ");
    for skill in &required {
        names.push_bind(skill.as_str());
    }
    names.push_unseparated(")");

    if let Some(event_name) = event_name.map(str::trim).filter(|name| !name.is_empty()) {
        query.push(
            " AND p.id NOT IN (
                SELECT vh.user_id FROM volunteer_history vh
                JOIN event_details e ON e.id = vh.event_id
                WHERE vh.session_active = 1 AND vh.participation_date >= ",
        );
        query.push_bind(today);
        query.push(" AND e.event_name = ");
        query.push_bind(event_name);
        query.push(")");
    }

    query.push(" GROUP BY p.id HAVING COUNT(DISTINCT s.id) = ");
    query.push_bind(required.len() as i64);
    query.push(" ORDER BY p.full_name, p.id");

    let rows = query
        .build_query_as::<DbVolunteer>()
        .fetch_all(pool)
        .await?;

    hydrate_volunteers(pool, rows).await
}
