#[macro_use]
extern crate rocket;

mod api;
mod auth;
mod cors;
mod database;
mod db;
mod env;
mod error;
mod models;
mod reports;
mod telemetry;
#[cfg(test)]
mod test;
mod validation;

use cors::Cors;
use db::clean_expired_sessions;
use env::{Settings, load_environment};
use rocket::fs::FileServer;
use rocket::{Build, Rocket, tokio};
use sqlx::SqlitePool;
use telemetry::{TelemetryFairing, background_span, init_tracing};
use tracing::{Instrument, error, info, warn};

const SESSION_SWEEP_INTERVAL_SECS: u64 = 3600;

#[launch]
async fn rocket() -> _ {
    let env_loaded = load_environment();
    init_tracing();

    if let Err(e) = env_loaded {
        warn!("Failed to load environment files: {:#}", e);
    }

    let settings = Settings::from_env().expect("Invalid configuration");

    let pool = database::connect(&settings.database_url)
        .await
        .expect("Failed to connect to SQLite database");

    database::init_schema(&pool)
        .await
        .expect("Failed to initialise database schema");

    let pool_clone = pool.clone();

    tokio::spawn(
        async move {
            tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;

            loop {
                match clean_expired_sessions(&pool_clone).await {
                    Ok(count) => {
                        if count > 0 {
                            info!("Cleaned up {} expired sessions", count);
                        }
                    }
                    Err(e) => {
                        error!("Failed to clean expired sessions: {}", e);
                    }
                }

                tokio::time::sleep(tokio::time::Duration::from_secs(SESSION_SWEEP_INTERVAL_SECS))
                    .await;
            }
        }
        .instrument(background_span("session_sweeper")),
    );

    init_rocket(pool, &settings)
}

pub fn init_rocket(pool: SqlitePool, settings: &Settings) -> Rocket<Build> {
    info!(port = settings.port, "Starting volunteer coordinator");

    let mut figment = rocket::Config::figment().merge(("port", settings.port));
    if let Some(secret) = &settings.session_secret {
        figment = figment.merge(("secret_key", secret.as_str()));
    }

    let mut rocket = rocket::custom(figment)
        .manage(pool)
        .manage(settings.clone())
        .mount("/api", api::routes())
        .mount("/api", cors::routes())
        .mount("/api/auth", api::auth::routes())
        .mount("/api/userProfile", api::profile::routes())
        .mount("/api/events", api::events::routes())
        .mount("/api/volunteer", api::volunteer::routes())
        .mount("/api/history", api::history::history_routes())
        .mount("/api/notifications", api::history::notification_routes())
        .mount("/api/reports", api::reports::routes())
        .register("/api", api::catchers())
        .attach(Cors::new(settings.frontend_origin.clone()))
        .attach(TelemetryFairing);

    if let Some(static_dir) = &settings.static_dir {
        info!(dir = %static_dir.display(), "Serving front end");
        rocket = rocket.mount("/", FileServer::from(static_dir));
    }

    rocket
}
