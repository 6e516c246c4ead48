use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_DATABASE_URL: &str = "sqlite://volunteer.db?mode=rwc";
const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_SESSION_TTL_MINUTES: i64 = 60;

pub fn load_environment() -> Result<()> {
    let is_production =
        dotenvy::var("ROCKET_PROFILE").unwrap_or("development".to_string()) == "production";

    let env_files = if is_production {
        vec!["config/common.env", "config/prod.env", ".secrets.env"]
    } else {
        vec!["config/common.env", "config/dev.env", ".secrets.env"]
    };

    for env_file in env_files {
        load_env_file(env_file)?;
    }

    Ok(())
}

fn load_env_file(path: &str) -> Result<()> {
    if !Path::new(path).exists() {
        warn!("Environment file {} not found, skipping", path);
        return Ok(());
    }

    dotenvy::from_filename_override(path)
        .with_context(|| format!("Failed to load environment file {}", path))?;
    info!("Loaded environment from: {}", path);
    Ok(())
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub database_url: String,
    pub frontend_origin: String,
    pub session_secret: Option<String>,
    pub static_dir: Option<PathBuf>,
    pub session_ttl: chrono::Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            frontend_origin: DEFAULT_FRONTEND_ORIGIN.to_string(),
            session_secret: None,
            static_dir: None,
            session_ttl: chrono::Duration::minutes(DEFAULT_SESSION_TTL_MINUTES),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    dotenvy::var(name).ok().filter(|value| !value.trim().is_empty())
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let defaults = Settings::default();

        let port = match non_empty_var("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a port number, got '{}'", raw))?,
            None => defaults.port,
        };

        let session_ttl = match non_empty_var("SESSION_TTL_MINUTES") {
            Some(raw) => {
                let minutes: i64 = raw.trim().parse().with_context(|| {
                    format!("SESSION_TTL_MINUTES must be a number, got '{}'", raw)
                })?;
                anyhow::ensure!(minutes > 0, "SESSION_TTL_MINUTES must be positive");
                chrono::Duration::minutes(minutes)
            }
            None => defaults.session_ttl,
        };

        Ok(Self {
            port,
            database_url: non_empty_var("DATABASE_URL").unwrap_or(defaults.database_url),
            frontend_origin: non_empty_var("FRONTEND_ORIGIN").unwrap_or(defaults.frontend_origin),
            session_secret: non_empty_var("SESSION_SECRET"),
            static_dir: non_empty_var("STATIC_DIR").map(PathBuf::from),
            session_ttl,
        })
    }
}
