use rocket::State;
use rocket::Route;
use rocket::response::status::Created;
use rocket::serde::{Deserialize, json::Json};
use sqlx::{Pool, Sqlite};
use tracing::info;
use validator::Validate;

use super::MessageResponse;
use crate::db::{create_event, delete_event, get_event, list_events, update_event};
use crate::error::AppError;
use crate::models::{Event, EventData, Urgency};
use crate::validation::{
    ValidateExt, iso_date_not_past, not_blank, parse_date, skill_names, urgency_label,
};

#[derive(Deserialize, Validate, Debug)]
pub struct EventRequest {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank", message = "Event name is required"),
        length(max = 100, message = "Event name must be at most 100 characters")
    )]
    pub event_name: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Description is required"))]
    pub description: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Location is required"))]
    pub location: String,

    #[serde(default)]
    #[validate(
        length(min = 1, message = "At least one required skill is needed"),
        custom(function = "skill_names")
    )]
    pub required_skills: Vec<String>,

    #[serde(default)]
    #[validate(custom(function = "urgency_label"))]
    pub urgency: String,

    #[serde(default)]
    #[validate(custom(function = "iso_date_not_past"))]
    pub event_date: String,
}

impl EventRequest {
    fn into_data(self) -> Result<EventData, AppError> {
        let urgency: Urgency = self
            .urgency
            .parse()
            .map_err(|e: anyhow::Error| AppError::Validation(e.to_string()))?;

        Ok(EventData {
            event_name: self.event_name.trim().to_string(),
            description: self.description.trim().to_string(),
            location: self.location.trim().to_string(),
            required_skills: self.required_skills,
            urgency,
            event_date: parse_date(&self.event_date)?,
        })
    }
}

#[get("/")]
pub async fn all_events(db: &State<Pool<Sqlite>>) -> Result<Json<Vec<Event>>, AppError> {
    Ok(Json(list_events(db).await?))
}

#[get("/<id>")]
pub async fn one_event(id: i64, db: &State<Pool<Sqlite>>) -> Result<Json<Event>, AppError> {
    Ok(Json(get_event(db, id).await?))
}

#[post("/", data = "<request>")]
pub async fn new_event(
    request: Json<EventRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Created<Json<Event>>, AppError> {
    request.validate_request()?;

    let data = request.into_inner().into_data()?;
    let id = create_event(db, &data).await?;
    info!(event_id = %id, "Created event");

    let event = get_event(db, id).await?;
    Ok(Created::new(format!("/api/events/{}", id)).body(Json(event)))
}

#[put("/<id>", data = "<request>")]
pub async fn edit_event(
    id: i64,
    request: Json<EventRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Event>, AppError> {
    request.validate_request()?;

    let data = request.into_inner().into_data()?;
    update_event(db, id, &data).await?;
    info!(event_id = %id, "Updated event");

    Ok(Json(get_event(db, id).await?))
}

#[delete("/<id>")]
pub async fn remove_event(
    id: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<MessageResponse>, AppError> {
    delete_event(db, id).await?;
    info!(event_id = %id, "Deleted event");

    Ok(MessageResponse::new("Event deleted successfully"))
}

pub fn routes() -> Vec<Route> {
    routes![all_events, one_event, new_event, edit_event, remove_event]
}
