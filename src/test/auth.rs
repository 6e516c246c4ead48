#[cfg(test)]
mod tests {
    use rocket::http::{ContentType, Cookie, Status};
    use serde_json::{Value, json};

    use crate::api::auth::{AuthStatus, LoginResponse};
    use crate::auth::User;
    use crate::test::test_utils::{
        STANDARD_PASSWORD, TestDbBuilder, create_standard_test_db, login_test_user,
        setup_test_client,
    };

    fn credentials(username: &str, password: &str) -> String {
        json!({
            "username": username,
            "password": password
        })
        .to_string()
    }

    #[rocket::async_test]
    async fn test_register_same_username_twice() {
        let test_db = TestDbBuilder::new().build().await.unwrap();
        let (client, _) = setup_test_client(test_db).await;

        let response = client
            .post("/api/auth/register")
            .header(ContentType::JSON)
            .body(credentials("erin", "Secret123!"))
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Created);

        let response = client
            .post("/api/auth/register")
            .header(ContentType::JSON)
            .body(credentials("erin", "another"))
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::BadRequest);
        let body: Value = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(body["message"], "User already exists");
    }

    #[rocket::async_test]
    async fn test_register_requires_both_fields() {
        let test_db = TestDbBuilder::new().build().await.unwrap();
        let (client, _) = setup_test_client(test_db).await;

        let response = client
            .post("/api/auth/register")
            .header(ContentType::JSON)
            .body(json!({ "username": "   " }).to_string())
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::BadRequest);

        let body: Value = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        let fields: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect();

        assert_eq!(fields, vec!["password", "username"]);
    }

    #[rocket::async_test]
    async fn test_login_outcomes() {
        let test_db = create_standard_test_db().await;
        let (client, test_db) = setup_test_client(test_db).await;

        let response = client
            .post("/api/auth/login")
            .header(ContentType::JSON)
            .body(credentials("nobody", STANDARD_PASSWORD))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NotFound);

        let response = client
            .post("/api/auth/login")
            .header(ContentType::JSON)
            .body(credentials("alice", "wrong_password"))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);

        let response = client
            .post("/api/auth/login")
            .header(ContentType::JSON)
            .body(credentials("alice", STANDARD_PASSWORD))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        assert!(response.cookies().get_private("session_token").is_some());

        let login: LoginResponse =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(login.user.username, "alice");
        assert_eq!(Some(login.user.id), test_db.user_id("alice"));
    }

    #[rocket::async_test]
    async fn test_check_auth_follows_login_and_logout() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;

        let status: AuthStatus = client
            .get("/api/auth/check-auth")
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert!(!status.is_authenticated);
        assert!(status.user.is_none());

        login_test_user(&client, "bob", STANDARD_PASSWORD).await;

        let status: AuthStatus = client
            .get("/api/auth/check-auth")
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert!(status.is_authenticated);
        assert_eq!(status.user.unwrap().username, "bob");

        let response = client.post("/api/auth/logout").dispatch().await;
        assert_eq!(response.status(), Status::Ok);

        let status: AuthStatus = client
            .get("/api/auth/check-auth")
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert!(!status.is_authenticated);
    }

    #[rocket::async_test]
    async fn test_logged_out_session_is_gone_from_store() {
        let test_db = create_standard_test_db().await;
        let (client, test_db) = setup_test_client(test_db).await;

        let cookies = login_test_user(&client, "carol", STANDARD_PASSWORD).await;
        client.post("/api/auth/logout").dispatch().await;

        let sessions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_sessions")
            .fetch_one(&test_db.pool)
            .await
            .unwrap();
        assert_eq!(sessions, 0);

        // Replaying the old cookie must not authenticate
        let response = client.get("/api/auth/me").cookies(cookies).dispatch().await;
        assert_eq!(response.status(), Status::Unauthorized);
    }

    #[rocket::async_test]
    async fn test_me_requires_a_valid_session() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;

        let response = client.get("/api/auth/me").dispatch().await;
        assert_eq!(response.status(), Status::Unauthorized);
        assert_eq!(response.content_type(), Some(ContentType::JSON));

        let forged_cookie = Cookie::build(("session_token", "fake_token")).build();
        let response = client
            .get("/api/auth/me")
            .private_cookie(forged_cookie)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Unauthorized);

        login_test_user(&client, "alice", STANDARD_PASSWORD).await;

        let user: User = client
            .get("/api/auth/me")
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert_eq!(user.username, "alice");
    }
}
