use rocket::State;
use rocket::Route;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::{Deserialize, json::Json};
use sqlx::{Pool, Sqlite};
use tracing::info;
use validator::Validate;

use crate::auth::User;
use crate::db::{get_all_profiles, get_profile, upsert_profile};
use crate::error::AppError;
use crate::models::{Profile, ProfileData};
use crate::validation::{
    STATE_CODE, ValidateExt, ZIP_CODE, iso_dates, not_blank, parse_date, skill_names,
};

#[derive(Deserialize, Validate, Debug)]
pub struct ProfileRequest {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank", message = "Full name is required"),
        length(max = 50, message = "Full name must be at most 50 characters")
    )]
    pub full_name: String,

    #[serde(default)]
    #[validate(
        custom(function = "not_blank", message = "Address is required"),
        length(max = 100, message = "Address must be at most 100 characters")
    )]
    pub address_1: String,

    #[serde(default)]
    #[validate(length(max = 100, message = "Address line 2 must be at most 100 characters"))]
    pub address_2: Option<String>,

    #[serde(default)]
    #[validate(
        custom(function = "not_blank", message = "City is required"),
        length(max = 100, message = "City must be at most 100 characters")
    )]
    pub city: String,

    #[serde(default)]
    #[validate(
        length(equal = 2, message = "State code must be exactly 2 characters"),
        regex(path = *STATE_CODE, message = "State code must be two letters")
    )]
    pub state: String,

    #[serde(default)]
    #[validate(
        length(min = 5, max = 9, message = "Zip code must be 5 to 9 characters"),
        regex(path = *ZIP_CODE, message = "Zip code may only contain digits and a hyphen")
    )]
    pub zipcode: String,

    #[serde(default)]
    #[validate(
        length(min = 1, message = "At least one skill is required"),
        custom(function = "skill_names")
    )]
    pub skills: Vec<String>,

    #[serde(default)]
    pub preferences: Option<String>,

    #[serde(default)]
    #[validate(
        length(min = 1, message = "At least one availability date is required"),
        custom(function = "iso_dates")
    )]
    pub availability: Vec<String>,
}

impl ProfileRequest {
    fn into_data(self) -> Result<ProfileData, AppError> {
        let availability = self
            .availability
            .iter()
            .map(|date| parse_date(date))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ProfileData {
            full_name: self.full_name.trim().to_string(),
            address_1: self.address_1.trim().to_string(),
            address_2: self
                .address_2
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty()),
            city: self.city.trim().to_string(),
            state: self.state.to_ascii_uppercase(),
            zipcode: self.zipcode,
            skills: self.skills,
            preferences: self.preferences.unwrap_or_default(),
            availability,
        })
    }
}

/// Validation runs before the session check, so an anonymous caller with a
/// bad body sees 400 rather than 401.
#[post("/", data = "<request>")]
pub async fn save_profile(
    request: Json<ProfileRequest>,
    user: Option<User>,
    db: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<Profile>>, AppError> {
    request.validate_request()?;

    let user = user.ok_or_else(|| {
        AppError::Authentication("You must be logged in to update a profile".to_string())
    })?;

    let data = request.into_inner().into_data()?;
    let created = upsert_profile(db, user.id, &data).await?;
    info!(user_id = %user.id, created, "Saved user profile");

    let profile = get_profile(db, user.id).await?;
    let status = if created { Status::Created } else { Status::Ok };

    Ok(Custom(status, Json(profile)))
}

#[get("/")]
pub async fn list_profiles(db: &State<Pool<Sqlite>>) -> Result<Json<Vec<Profile>>, AppError> {
    Ok(Json(get_all_profiles(db).await?))
}

#[get("/myProfile")]
pub async fn my_profile(user: User, db: &State<Pool<Sqlite>>) -> Result<Json<Profile>, AppError> {
    Ok(Json(get_profile(db, user.id).await?))
}

pub fn routes() -> Vec<Route> {
    routes![save_profile, list_profiles, my_profile]
}
