#[cfg(test)]
mod tests {
    use rocket::http::{ContentType, Status};
    use serde_json::{Value, json};

    use crate::api::volunteer::RemovedResponse;
    use crate::models::{Event, Urgency};
    use crate::test::test_utils::{
        TestDbBuilder, create_standard_test_db, days_from_today, setup_test_client,
    };

    fn event_body(name: &str, days: i64) -> Value {
        json!({
            "event_name": name,
            "description": "Sort donated cans",
            "location": "Community Hall",
            "required_skills": ["Cooking", "Lifting"],
            "urgency": "high",
            "event_date": days_from_today(days).to_string()
        })
    }

    #[rocket::async_test]
    async fn test_create_event_rejects_past_dates() {
        let test_db = TestDbBuilder::new().build().await.unwrap();
        let (client, _) = setup_test_client(test_db).await;

        let response = client
            .post("/api/events")
            .header(ContentType::JSON)
            .body(event_body("Yesterday's Drive", -1).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);

        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["errors"][0]["field"], "event_date");

        let response = client
            .post("/api/events")
            .header(ContentType::JSON)
            .body(event_body("Today's Drive", 0).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Created);

        let event: Event = response.into_json().await.unwrap();
        assert_eq!(event.event_name, "Today's Drive");
        assert_eq!(event.urgency, Urgency::High);
        assert_eq!(event.required_skills, vec!["Cooking", "Lifting"]);
        assert_eq!(event.event_date, days_from_today(0));
        assert!(event.assigned_volunteers.is_empty());
    }

    #[rocket::async_test]
    async fn test_create_event_rejects_unknown_urgency() {
        let test_db = TestDbBuilder::new().build().await.unwrap();
        let (client, _) = setup_test_client(test_db).await;

        let mut body = event_body("Cleanup", 3);
        body["urgency"] = json!("3");

        let response = client
            .post("/api/events")
            .header(ContentType::JSON)
            .body(body.to_string())
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::BadRequest);
    }

    #[rocket::async_test]
    async fn test_update_and_get_event() {
        let test_db = create_standard_test_db().await;
        let (client, test_db) = setup_test_client(test_db).await;
        let id = test_db.event_id("Food Drive").unwrap();

        let response = client
            .put(format!("/api/events/{}", id))
            .header(ContentType::JSON)
            .body(event_body("Winter Food Drive", 10).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let event: Event = client
            .get(format!("/api/events/{}", id))
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert_eq!(event.event_name, "Winter Food Drive");
        assert_eq!(event.event_date, days_from_today(10));

        let response = client
            .put("/api/events/9999")
            .header(ContentType::JSON)
            .body(event_body("Ghost", 10).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NotFound);

        let response = client.get("/api/events/9999").dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
    }

    #[rocket::async_test]
    async fn test_list_events_includes_active_volunteers() {
        let test_db = TestDbBuilder::new()
            .volunteer("alice", "Alice Adams", &["Cooking"])
            .volunteer("bob", "Bob Brown", &["Cooking"])
            .event("Food Drive", &["Cooking"], 5)
            .event("Bake Sale", &["Cooking"], 2)
            .assignment("alice", "Food Drive", 5, true)
            .assignment("bob", "Food Drive", -30, false)
            .build()
            .await
            .unwrap();
        let alice = test_db.user_id("alice").unwrap();
        let (client, _) = setup_test_client(test_db).await;

        let events: Vec<Event> = client
            .get("/api/events")
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_name, "Bake Sale");
        assert_eq!(events[1].event_name, "Food Drive");
        assert_eq!(events[1].assigned_volunteers, vec![alice]);
    }

    #[rocket::async_test]
    async fn test_delete_event_leaves_orphaned_assignments() {
        let test_db = TestDbBuilder::new()
            .volunteer("alice", "Alice Adams", &["Cooking"])
            .event("Food Drive", &["Cooking"], 5)
            .assignment("alice", "Food Drive", 5, true)
            .build()
            .await
            .unwrap();
        let (client, test_db) = setup_test_client(test_db).await;
        let id = test_db.event_id("Food Drive").unwrap();

        let response = client.delete(format!("/api/events/{}", id)).dispatch().await;
        assert_eq!(response.status(), Status::Ok);

        let response = client.get(format!("/api/events/{}", id)).dispatch().await;
        assert_eq!(response.status(), Status::NotFound);

        let orphans = test_db.assignment_rows(id).await;
        assert_eq!(orphans.len(), 1);

        let removed: RemovedResponse = client
            .delete(format!("/api/volunteer/remove-event/{}", id))
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert_eq!(removed.removed, 1);
        assert!(test_db.assignment_rows(id).await.is_empty());

        let response = client.delete(format!("/api/events/{}", id)).dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
    }
}
