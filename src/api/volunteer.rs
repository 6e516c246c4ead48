use rocket::FromForm;
use rocket::Route;
use rocket::State;
use rocket::serde::{Deserialize, Serialize, json::Json};
use sqlx::{Pool, Sqlite};
use tracing::info;

use crate::db::{
    active_volunteer_ids, find_volunteers_with_skills, list_volunteers, remove_event_assignments,
    update_assignments,
};
use crate::error::AppError;
use crate::models::{AssignmentUpdate, Volunteer};
use crate::validation::parse_date;

#[derive(FromForm, Debug)]
pub struct SkillQuery {
    skills: Option<String>,
    #[field(name = "eventName")]
    event_name: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRequest {
    pub event_id: i64,
    #[serde(default)]
    pub people_assigned: Vec<i64>,
    #[serde(default)]
    pub people_to_delete: Vec<i64>,
    #[serde(default)]
    pub event_date: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResponse {
    pub message: String,
    pub event_id: i64,
    pub added: u64,
    pub removed: u64,
    pub assigned_volunteers: Vec<i64>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RemovedResponse {
    pub removed: u64,
}

#[get("/")]
pub async fn all_volunteers(db: &State<Pool<Sqlite>>) -> Result<Json<Vec<Volunteer>>, AppError> {
    Ok(Json(list_volunteers(db).await?))
}

#[get("/with-skills?<query..>")]
pub async fn volunteers_with_skills(
    query: SkillQuery,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<Volunteer>>, AppError> {
    let skills: Vec<String> = query
        .skills
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::to_string)
        .collect();

    let volunteers =
        find_volunteers_with_skills(db, &skills, query.event_name.as_deref()).await?;
    info!(count = volunteers.len(), "Matched volunteers");

    Ok(Json(volunteers))
}

#[put("/update-people", data = "<request>")]
pub async fn update_people(
    request: Json<AssignmentRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<AssignmentResponse>, AppError> {
    let request = request.into_inner();
    let event_date = match request.event_date.as_deref().map(str::trim) {
        Some(date) if !date.is_empty() => Some(parse_date(date)?),
        _ => None,
    };

    let update = AssignmentUpdate {
        event_id: request.event_id,
        people_assigned: request.people_assigned,
        people_to_delete: request.people_to_delete,
        event_date,
    };

    let summary = update_assignments(db, &update).await?;
    let assigned_volunteers = active_volunteer_ids(db, update.event_id).await?;

    Ok(Json(AssignmentResponse {
        message: "Volunteers updated successfully".to_string(),
        event_id: update.event_id,
        added: summary.added,
        removed: summary.removed,
        assigned_volunteers,
    }))
}

#[delete("/remove-event/<event_id>")]
pub async fn remove_event(
    event_id: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<RemovedResponse>, AppError> {
    let removed = remove_event_assignments(db, event_id).await?;
    let volunteers: Vec<i64> = removed.iter().map(|row| row.user_id).collect();
    info!(event_id = %event_id, volunteers = ?volunteers, "Removed event from volunteers");

    Ok(Json(RemovedResponse {
        removed: removed.len() as u64,
    }))
}

pub fn routes() -> Vec<Route> {
    routes![all_volunteers, volunteers_with_skills, update_people, remove_event]
}
