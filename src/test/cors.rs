#[cfg(test)]
mod tests {
    use rocket::http::{Header, Status};

    use crate::test::test_utils::{TestDbBuilder, setup_test_client};

    #[rocket::async_test]
    async fn test_health() {
        let test_db = TestDbBuilder::new().build().await.unwrap();
        let (client, _) = setup_test_client(test_db).await;

        let response = client.get("/api/health").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.into_string().await.unwrap(), "OK");
    }

    #[rocket::async_test]
    async fn test_preflight_for_frontend_origin() {
        let test_db = TestDbBuilder::new().build().await.unwrap();
        let (client, _) = setup_test_client(test_db).await;

        let response = client
            .options("/api/userProfile/myProfile")
            .header(Header::new("Origin", "http://localhost:3000"))
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::NoContent);
        assert_eq!(
            response.headers().get_one("Access-Control-Allow-Origin"),
            Some("http://localhost:3000")
        );
        assert_eq!(
            response.headers().get_one("Access-Control-Allow-Credentials"),
            Some("true")
        );
    }

    #[rocket::async_test]
    async fn test_foreign_origin_gets_no_cors_headers() {
        let test_db = TestDbBuilder::new().build().await.unwrap();
        let (client, _) = setup_test_client(test_db).await;

        let response = client
            .get("/api/health")
            .header(Header::new("Origin", "https://evil.example"))
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Ok);
        assert!(
            response
                .headers()
                .get_one("Access-Control-Allow-Origin")
                .is_none()
        );
    }
}
