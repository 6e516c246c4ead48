use rocket::Route;
use rocket::State;
use rocket::serde::json::Json;
use sqlx::{Pool, Sqlite};

use crate::auth::User;
use crate::db::{history_for_user, notifications_for_user};
use crate::error::AppError;
use crate::models::Participation;
use crate::validation::today;

#[get("/")]
pub async fn my_history(
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<Participation>>, AppError> {
    Ok(Json(history_for_user(db, user.id, today()).await?))
}

#[get("/")]
pub async fn my_notifications(
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<Participation>>, AppError> {
    Ok(Json(notifications_for_user(db, user.id, today()).await?))
}

pub fn history_routes() -> Vec<Route> {
    routes![my_history]
}

pub fn notification_routes() -> Vec<Route> {
    routes![my_notifications]
}
