use std::collections::{HashMap, HashSet};

use sqlx::{Pool, Sqlite, SqliteConnection};
use tracing::{debug, instrument};

use crate::error::AppError;

/// Trims names, drops blanks and collapses case-insensitive duplicates,
/// keeping the first spelling seen.
pub fn normalize_skills<S: AsRef<str>>(skills: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    skills
        .iter()
        .map(|skill| skill.as_ref().trim())
        .filter(|skill| !skill.is_empty())
        .filter(|skill| seen.insert(skill.to_lowercase()))
        .map(str::to_string)
        .collect()
}

async fn ensure_skill(conn: &mut SqliteConnection, name: &str) -> Result<i64, AppError> {
    sqlx::query("INSERT INTO skills (name) VALUES (?) ON CONFLICT(name) DO NOTHING")
        .bind(name)
        .execute(&mut *conn)
        .await?;

    let id: i64 = sqlx::query_scalar("SELECT id FROM skills WHERE name = ?")
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;

    Ok(id)
}

#[instrument(skip(conn, skills))]
pub async fn replace_profile_skills(
    conn: &mut SqliteConnection,
    profile_id: i64,
    skills: &[String],
) -> Result<(), AppError> {
    debug!(count = skills.len(), "Replacing profile skills");
    sqlx::query("DELETE FROM profile_skills WHERE profile_id = ?")
        .bind(profile_id)
        .execute(&mut *conn)
        .await?;

    for (position, skill) in normalize_skills(skills).iter().enumerate() {
        let skill_id = ensure_skill(conn, skill).await?;
        sqlx::query("INSERT INTO profile_skills (profile_id, skill_id, position) VALUES (?, ?, ?)")
            .bind(profile_id)
            .bind(skill_id)
            .bind(position as i64)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

#[instrument(skip(conn, skills))]
pub async fn replace_event_skills(
    conn: &mut SqliteConnection,
    event_id: i64,
    skills: &[String],
) -> Result<(), AppError> {
    debug!(count = skills.len(), "Replacing event skills");
    sqlx::query("DELETE FROM event_skills WHERE event_id = ?")
        .bind(event_id)
        .execute(&mut *conn)
        .await?;

    for (position, skill) in normalize_skills(skills).iter().enumerate() {
        let skill_id = ensure_skill(conn, skill).await?;
        sqlx::query("INSERT INTO event_skills (event_id, skill_id, position) VALUES (?, ?, ?)")
            .bind(event_id)
            .bind(skill_id)
            .bind(position as i64)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

#[derive(sqlx::FromRow)]
struct OwnedSkill {
    owner_id: i64,
    name: String,
}

fn group_by_owner(rows: Vec<OwnedSkill>) -> HashMap<i64, Vec<String>> {
    let mut grouped: HashMap<i64, Vec<String>> = HashMap::new();
    for row in rows {
        grouped.entry(row.owner_id).or_default().push(row.name);
    }
    grouped
}

/// Skill names per profile, in the order they were submitted.
pub async fn skills_by_profile(pool: &Pool<Sqlite>) -> Result<HashMap<i64, Vec<String>>, AppError> {
    let rows = sqlx::query_as::<_, OwnedSkill>(
        "SELECT ps.profile_id AS owner_id, s.name
         FROM profile_skills ps
         JOIN skills s ON s.id = ps.skill_id
         ORDER BY ps.profile_id, ps.position",
    )
    .fetch_all(pool)
    .await?;

    Ok(group_by_owner(rows))
}

pub async fn skills_by_event(pool: &Pool<Sqlite>) -> Result<HashMap<i64, Vec<String>>, AppError> {
    let rows = sqlx::query_as::<_, OwnedSkill>(
        "SELECT es.event_id AS owner_id, s.name
         FROM event_skills es
         JOIN skills s ON s.id = es.skill_id
         ORDER BY es.event_id, es.position",
    )
    .fetch_all(pool)
    .await?;

    Ok(group_by_owner(rows))
}

pub async fn skills_for_profile(pool: &Pool<Sqlite>, profile_id: i64) -> Result<Vec<String>, AppError> {
    let names: Vec<String> = sqlx::query_scalar(
        "SELECT s.name FROM profile_skills ps
         JOIN skills s ON s.id = ps.skill_id
         WHERE ps.profile_id = ?
         ORDER BY ps.position",
    )
    .bind(profile_id)
    .fetch_all(pool)
    .await?;

    Ok(names)
}

pub async fn skills_for_event(pool: &Pool<Sqlite>, event_id: i64) -> Result<Vec<String>, AppError> {
    let names: Vec<String> = sqlx::query_scalar(
        "SELECT s.name FROM event_skills es
         JOIN skills s ON s.id = es.skill_id
         WHERE es.event_id = ?
         ORDER BY es.position",
    )
    .bind(event_id)
    .fetch_all(pool)
    .await?;

    Ok(names)
}
