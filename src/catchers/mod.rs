mod missing_route;
mod unprocessable_entity;

pub use missing_route::*;
pub use unprocessable_entity::*;

/// Body of every error response produced outside a handler.
#[derive(serde::Serialize)]
pub struct CaughtError {
    success: bool,
    error: &'static str,
    message: &'static str,
}

impl CaughtError {
    fn new(error: &'static str, message: &'static str) -> Self {
        Self {
            success: false,
            error,
            message,
        }
    }
}
