mod feedback;
mod notification;
mod user_token;

pub use feedback::*;
pub use notification::*;
pub use user_token::*;
