use chrono::Utc;
use rocket::State;
use rocket::http::{Cookie, CookieJar, SameSite};
use rocket::response::status::Created;
use rocket::Route;
use rocket::serde::{Deserialize, Serialize, json::Json};
use sqlx::{Pool, Sqlite};
use tracing::info;
use validator::Validate;

use super::MessageResponse;
use crate::auth::{SESSION_COOKIE, User, UserSession};
use crate::db::{authenticate_user, create_credential, create_user_session, invalidate_session};
use crate::env::Settings;
use crate::error::AppError;
use crate::validation::{ValidateExt, not_blank};

#[derive(Deserialize, Validate, Debug)]
pub struct CredentialsRequest {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank", message = "Username is required"),
        length(max = 100, message = "Username must be at most 100 characters")
    )]
    pub username: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Password is required"))]
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub message: String,
    pub user: User,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AuthStatus {
    #[serde(rename = "isAuthenticated")]
    pub is_authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

#[post("/register", data = "<request>")]
pub async fn register(
    request: Json<CredentialsRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Created<Json<MessageResponse>>, AppError> {
    request.validate_request()?;

    let username = request.username.trim();
    let user_id = create_credential(db, username, &request.password).await?;
    info!(user_id = %user_id, username = %username, "Registered user");

    Ok(Created::new("/api/auth/login")
        .body(MessageResponse::new("User registered successfully")))
}

#[post("/login", data = "<request>")]
pub async fn login(
    request: Json<CredentialsRequest>,
    cookies: &CookieJar<'_>,
    db: &State<Pool<Sqlite>>,
    settings: &State<Settings>,
) -> Result<Json<LoginResponse>, AppError> {
    request.validate_request()?;

    let user = authenticate_user(db, request.username.trim(), &request.password).await?;

    let token = UserSession::generate_token();
    let expires_at = Utc::now() + settings.session_ttl;
    create_user_session(db, user.id, &token, expires_at.naive_utc()).await?;

    let max_age = rocket::time::Duration::seconds(settings.session_ttl.num_seconds());
    cookies.add_private(
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(true)
            .max_age(max_age)
            .build(),
    );

    info!(user_id = %user.id, "User logged in");
    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        user,
    }))
}

#[get("/check-auth")]
pub fn check_auth(user: Option<User>) -> Json<AuthStatus> {
    Json(AuthStatus {
        is_authenticated: user.is_some(),
        user,
    })
}

#[post("/logout")]
pub async fn logout(
    cookies: &CookieJar<'_>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<MessageResponse>, AppError> {
    if let Some(cookie) = cookies.get_private(SESSION_COOKIE) {
        invalidate_session(db, cookie.value()).await?;
    }

    cookies.remove_private(Cookie::build(SESSION_COOKIE).path("/"));

    Ok(MessageResponse::new("Logout successful"))
}

#[get("/me")]
pub fn me(user: User) -> Json<User> {
    Json(user)
}

pub fn routes() -> Vec<Route> {
    routes![register, login, check_auth, logout, me]
}
