use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::{Request, Response, Route};

const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization";
const PREFLIGHT_MAX_AGE_SECS: &str = "3600";

/// Allows credentialed requests from the single configured front end origin.
pub struct Cors {
    origin: String,
}

impl Cors {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
        }
    }
}

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "CORS",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let Some(origin) = request.headers().get_one("Origin") else {
            return;
        };

        if origin != self.origin {
            tracing::debug!(origin = %origin, "Ignoring request from foreign origin");
            return;
        }

        response.set_header(Header::new("Access-Control-Allow-Origin", self.origin.clone()));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
        response.set_header(Header::new("Access-Control-Allow-Methods", ALLOWED_METHODS));
        response.set_header(Header::new("Access-Control-Allow-Headers", ALLOWED_HEADERS));
        response.set_header(Header::new("Access-Control-Max-Age", PREFLIGHT_MAX_AGE_SECS));
        response.set_header(Header::new("Vary", "Origin"));
    }
}

#[options("/<_..>")]
pub fn preflight() -> Status {
    Status::NoContent
}

pub fn routes() -> Vec<Route> {
    routes![preflight]
}
