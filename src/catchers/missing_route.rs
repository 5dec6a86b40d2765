use crate::catchers::CaughtError;
use rocket::response::status::NotFound;
use rocket::serde::json::Json;
use rocket::Request;

#[catch(404)]
pub fn not_found(req: &Request) -> NotFound<Json<CaughtError>> {
    tracing::debug!(uri = %req.uri(), "No route matched");
    NotFound(Json(CaughtError::new(
        "Not found",
        "The requested resource does not exist",
    )))
}
