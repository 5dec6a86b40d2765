use crate::domain::{Platform, PushToken, UserId};

#[derive(Debug)]
pub struct NewTokenRegistration {
    pub user_id: UserId,
    pub token: PushToken,
    pub platform: Platform,
}
