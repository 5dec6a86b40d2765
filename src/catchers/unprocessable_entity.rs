use crate::catchers::CaughtError;
use rocket::response::status::BadRequest;
use rocket::serde::json::Json;
use rocket::Request;

#[catch(422)]
pub fn unprocessable_entity_to_bad_request(_req: &Request) -> BadRequest<Json<CaughtError>> {
    BadRequest(Json(CaughtError::new(
        "Malformed request body",
        "The request body is not valid JSON of the expected shape",
    )))
}

#[catch(400)]
pub fn bad_request(_req: &Request) -> BadRequest<Json<CaughtError>> {
    BadRequest(Json(CaughtError::new(
        "Bad request",
        "The request could not be understood",
    )))
}
