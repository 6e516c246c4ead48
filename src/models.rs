use std::fmt;
use std::str::FromStr;

use anyhow::Error;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Urgency {
    #[default]
    Low,
    Medium,
    High,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "Low",
            Urgency::Medium => "Medium",
            Urgency::High => "High",
        }
    }
}

impl FromStr for Urgency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Urgency::Low),
            "medium" => Ok(Urgency::Medium),
            "high" => Ok(Urgency::High),
            _ => Err(Error::msg(format!("Unknown urgency: {}", s))),
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub id: i64,
    pub full_name: String,
    pub address_1: String,
    pub address_2: Option<String>,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub skills: Vec<String>,
    pub preferences: String,
    pub availability: Vec<NaiveDate>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbProfile {
    pub id: i64,
    pub full_name: String,
    pub address_1: String,
    pub address_2: Option<String>,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub preferences: Option<String>,
    pub availability: Option<String>,
}

impl Profile {
    pub fn from_db(row: DbProfile, skills: Vec<String>) -> Self {
        let availability = row
            .availability
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default();

        Self {
            id: row.id,
            full_name: row.full_name,
            address_1: row.address_1,
            address_2: row.address_2.filter(|a| !a.is_empty()),
            city: row.city,
            state: row.state,
            zipcode: row.zipcode,
            skills,
            preferences: row.preferences.unwrap_or_default(),
            availability,
        }
    }
}

/// Validated profile fields ready to be written.
#[derive(Debug, Clone)]
pub struct ProfileData {
    pub full_name: String,
    pub address_1: String,
    pub address_2: Option<String>,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub skills: Vec<String>,
    pub preferences: String,
    pub availability: Vec<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: i64,
    pub event_name: String,
    pub description: String,
    pub location: String,
    pub required_skills: Vec<String>,
    pub urgency: Urgency,
    pub event_date: NaiveDate,
    pub assigned_volunteers: Vec<i64>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbEvent {
    pub id: i64,
    pub event_name: String,
    pub description: String,
    pub location: String,
    pub urgency: String,
    pub event_date: NaiveDate,
    pub assigned_volunteers: Option<String>,
}

impl Event {
    pub fn from_db(row: DbEvent, required_skills: Vec<String>) -> Self {
        Self {
            id: row.id,
            event_name: row.event_name,
            description: row.description,
            location: row.location,
            required_skills,
            urgency: row.urgency.parse().unwrap_or_default(),
            event_date: row.event_date,
            assigned_volunteers: parse_id_list(row.assigned_volunteers.as_deref()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventData {
    pub event_name: String,
    pub description: String,
    pub location: String,
    pub required_skills: Vec<String>,
    pub urgency: Urgency,
    pub event_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Volunteer {
    pub id: i64,
    pub full_name: String,
    pub skills: Vec<String>,
    pub active_events: Vec<i64>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbVolunteer {
    pub id: i64,
    pub full_name: String,
    pub active_events: Option<String>,
}

impl Volunteer {
    pub fn from_db(row: DbVolunteer, skills: Vec<String>) -> Self {
        Self {
            id: row.id,
            full_name: row.full_name,
            skills,
            active_events: parse_id_list(row.active_events.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Assignment {
    pub id: i64,
    pub user_id: i64,
    pub event_id: i64,
    pub participation_date: NaiveDate,
    pub session_active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct AssignmentUpdate {
    pub event_id: i64,
    pub people_assigned: Vec<i64>,
    pub people_to_delete: Vec<i64>,
    pub event_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct AssignmentSummary {
    pub added: u64,
    pub removed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticipationStatus {
    Active,
    Completed,
}

impl ParticipationStatus {
    /// Rows are never flipped by a job; a passed date reads as completed.
    pub fn at(session_active: bool, participation_date: NaiveDate, today: NaiveDate) -> Self {
        if session_active && participation_date >= today {
            ParticipationStatus::Active
        } else {
            ParticipationStatus::Completed
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipationStatus::Active => "Active",
            ParticipationStatus::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Participation {
    pub id: i64,
    pub event_id: i64,
    pub event_name: String,
    pub description: String,
    pub location: String,
    pub urgency: Urgency,
    pub event_date: NaiveDate,
    pub participation_date: NaiveDate,
    pub status: ParticipationStatus,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbParticipation {
    pub id: i64,
    pub event_id: i64,
    pub event_name: String,
    pub description: String,
    pub location: String,
    pub urgency: String,
    pub event_date: NaiveDate,
    pub participation_date: NaiveDate,
    pub session_active: bool,
}

impl Participation {
    pub fn from_db(row: DbParticipation, today: NaiveDate) -> Self {
        Self {
            id: row.id,
            event_id: row.event_id,
            event_name: row.event_name,
            description: row.description,
            location: row.location,
            urgency: row.urgency.parse().unwrap_or_default(),
            event_date: row.event_date,
            participation_date: row.participation_date,
            status: ParticipationStatus::at(row.session_active, row.participation_date, today),
        }
    }
}

fn parse_id_list(raw: Option<&str>) -> Vec<i64> {
    let mut ids: Vec<i64> = raw
        .unwrap_or_default()
        .split(',')
        .filter_map(|id| id.trim().parse().ok())
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}
