#[cfg(test)]
pub mod test_utils {
    use std::collections::HashMap;
    use std::sync::Once;

    use chrono::{Duration, NaiveDate};
    use rocket::http::{ContentType, Cookie, Status};
    use rocket::local::asynchronous::Client;
    use serde_json::json;
    use sqlx::{Pool, Sqlite};

    use crate::database::{connect, init_schema};
    use crate::db::{create_credential, create_event, upsert_profile};
    use crate::env::Settings;
    use crate::error::AppError;
    use crate::init_rocket;
    use crate::models::{Assignment, EventData, ProfileData, Urgency};
    use crate::validation::today;

    static INIT: Once = Once::new();
    pub static STANDARD_PASSWORD: &str = "password123";

    #[derive(Default)]
    pub struct TestDbBuilder {
        users: Vec<TestUser>,
        profiles: Vec<TestProfile>,
        events: Vec<TestEvent>,
        assignments: Vec<TestAssignment>,
    }

    pub struct TestUser {
        pub username: String,
        pub password: String,
    }

    pub struct TestProfile {
        pub username: String,
        pub full_name: String,
        pub skills: Vec<String>,
    }

    pub struct TestEvent {
        pub name: String,
        pub skills: Vec<String>,
        pub days_from_today: i64,
        pub urgency: Urgency,
    }

    pub struct TestAssignment {
        pub username: String,
        pub event_name: String,
        pub days_from_today: i64,
        pub active: bool,
    }

    pub fn days_from_today(days: i64) -> NaiveDate {
        today() + Duration::days(days)
    }

    impl TestDbBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn user(self, username: &str) -> Self {
            self.user_with_password(username, STANDARD_PASSWORD)
        }

        pub fn user_with_password(mut self, username: &str, password: &str) -> Self {
            self.users.push(TestUser {
                username: username.to_string(),
                password: password.to_string(),
            });
            self
        }

        /// Registers the user as well when they were not added already.
        pub fn volunteer(mut self, username: &str, full_name: &str, skills: &[&str]) -> Self {
            if !self.users.iter().any(|u| u.username == username) {
                self = self.user(username);
            }

            self.profiles.push(TestProfile {
                username: username.to_string(),
                full_name: full_name.to_string(),
                skills: skills.iter().map(|s| s.to_string()).collect(),
            });
            self
        }

        pub fn event(mut self, name: &str, skills: &[&str], days_from_today: i64) -> Self {
            self.events.push(TestEvent {
                name: name.to_string(),
                skills: skills.iter().map(|s| s.to_string()).collect(),
                days_from_today,
                urgency: Urgency::Medium,
            });
            self
        }

        pub fn assignment(
            mut self,
            username: &str,
            event_name: &str,
            days_from_today: i64,
            active: bool,
        ) -> Self {
            self.assignments.push(TestAssignment {
                username: username.to_string(),
                event_name: event_name.to_string(),
                days_from_today,
                active,
            });
            self
        }

        pub async fn build(self) -> Result<TestDb, AppError> {
            INIT.call_once(|| {
                let _ = tracing_subscriber::fmt()
                    .with_env_filter("debug")
                    .with_test_writer()
                    .try_init();
            });

            let pool = connect("sqlite::memory:").await?;
            init_schema(&pool).await?;

            let mut user_id_map: HashMap<String, i64> = HashMap::new();
            let mut event_id_map: HashMap<String, i64> = HashMap::new();

            for user in &self.users {
                let user_id = create_credential(&pool, &user.username, &user.password).await?;
                user_id_map.insert(user.username.clone(), user_id);
            }

            for profile in &self.profiles {
                let user_id = user_id_map[&profile.username];
                let data = ProfileData {
                    full_name: profile.full_name.clone(),
                    address_1: "1 Main St".to_string(),
                    address_2: None,
                    city: "Metropolis".to_string(),
                    state: "CA".to_string(),
                    zipcode: "90001".to_string(),
                    skills: profile.skills.clone(),
                    preferences: String::new(),
                    availability: vec![days_from_today(30)],
                };
                upsert_profile(&pool, user_id, &data).await?;
            }

            for event in &self.events {
                let data = EventData {
                    event_name: event.name.clone(),
                    description: format!("{} description", event.name),
                    location: "Community Hall".to_string(),
                    required_skills: event.skills.clone(),
                    urgency: event.urgency,
                    event_date: days_from_today(event.days_from_today),
                };
                let event_id = create_event(&pool, &data).await?;
                event_id_map.insert(event.name.clone(), event_id);
            }

            for assignment in &self.assignments {
                sqlx::query(
                    "INSERT INTO volunteer_history (user_id, event_id, participation_date, session_active)
                     VALUES (?, ?, ?, ?)",
                )
                .bind(user_id_map[&assignment.username])
                .bind(event_id_map[&assignment.event_name])
                .bind(days_from_today(assignment.days_from_today))
                .bind(assignment.active)
                .execute(&pool)
                .await?;
            }

            Ok(TestDb {
                pool,
                user_id_map,
                event_id_map,
            })
        }
    }

    pub struct TestDb {
        pub pool: Pool<Sqlite>,
        pub user_id_map: HashMap<String, i64>,
        pub event_id_map: HashMap<String, i64>,
    }

    impl TestDb {
        pub fn user_id(&self, username: &str) -> Option<i64> {
            self.user_id_map.get(username).copied()
        }

        pub fn event_id(&self, name: &str) -> Option<i64> {
            self.event_id_map.get(name).copied()
        }

        pub async fn active_volunteers(&self, event_name: &str) -> Vec<i64> {
            let event_id = self.event_id(event_name).expect("Event not found");
            crate::db::active_volunteer_ids(&self.pool, event_id)
                .await
                .expect("Failed to read active volunteers")
        }

        /// Every assignment row pointing at `event_id`, even if the event is gone.
        pub async fn assignment_rows(&self, event_id: i64) -> Vec<Assignment> {
            sqlx::query_as::<_, Assignment>(
                "SELECT id, user_id, event_id, participation_date, session_active
                 FROM volunteer_history WHERE event_id = ? ORDER BY id",
            )
            .bind(event_id)
            .fetch_all(&self.pool)
            .await
            .expect("Failed to read assignment rows")
        }
    }

    /// Three volunteers with overlapping skills and two upcoming events.
    pub async fn create_standard_test_db() -> TestDb {
        TestDbBuilder::new()
            .volunteer("alice", "Alice Adams", &["First Aid", "Cooking"])
            .volunteer("bob", "Bob Brown", &["first aid"])
            .volunteer("carol", "Carol Chen", &["Physically Fit", "Cooking", "Driving"])
            .user("dave")
            .event("Food Drive", &["Cooking"], 7)
            .event("Marathon Aid Station", &["First Aid"], 14)
            .build()
            .await
            .expect("Failed to build standard test database")
    }

    pub async fn setup_test_client(test_db: TestDb) -> (Client, TestDb) {
        let settings = Settings::default();
        let rocket = init_rocket(test_db.pool.clone(), &settings);

        let client = Client::tracked(rocket)
            .await
            .expect("Failed to build rocket client");

        (client, test_db)
    }

    pub async fn login_test_user(
        client: &Client,
        username: &str,
        password: &str,
    ) -> Vec<Cookie<'static>> {
        let response = client
            .post("/api/auth/login")
            .header(ContentType::JSON)
            .body(
                json!({
                    "username": username,
                    "password": password
                })
                .to_string(),
            )
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Ok, "Login failed for {}", username);

        response
            .cookies()
            .iter()
            .map(|cookie| cookie.clone().into_owned())
            .collect()
    }
}
