use rocket::serde::{Deserialize, Serialize, json::Json};
use rocket::{Catcher, Request, Route, http::Status};

use crate::validation::ErrorResponse;

pub mod auth;
pub mod events;
pub mod history;
pub mod profile;
pub mod reports;
pub mod volunteer;

#[derive(Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

#[get("/health")]
pub fn health() -> &'static str {
    "OK"
}

pub fn routes() -> Vec<Route> {
    routes![health]
}

#[catch(400)]
fn bad_request_api(_req: &Request) -> Json<ErrorResponse> {
    Json(ErrorResponse::new("Bad request"))
}

#[catch(401)]
fn unauthorized_api(_req: &Request) -> Json<ErrorResponse> {
    Json(ErrorResponse::new("Unauthorized"))
}

#[catch(404)]
fn not_found_api(req: &Request) -> Json<ErrorResponse> {
    Json(ErrorResponse::new(format!("No route for {}", req.uri().path())))
}

// Rocket answers 422 when a JSON body does not deserialize.
#[catch(422)]
fn unprocessable_api(_req: &Request) -> (Status, Json<ErrorResponse>) {
    (
        Status::BadRequest,
        Json(ErrorResponse::new("Request body is malformed")),
    )
}

#[catch(500)]
fn internal_error_api(_req: &Request) -> Json<ErrorResponse> {
    Json(ErrorResponse::new("Internal server error"))
}

pub fn catchers() -> Vec<Catcher> {
    catchers![
        bad_request_api,
        unauthorized_api,
        not_found_api,
        unprocessable_api,
        internal_error_api
    ]
}
