use crate::schema::user_tokens;
use chrono::offset::Utc;
use chrono::DateTime;

#[derive(Queryable, Debug)]
pub struct UserToken {
    pub id: i32,
    pub user_id: String,
    pub fcm_token: String,
    pub platform: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = user_tokens)]
pub struct NewUserToken<'a> {
    pub user_id: &'a str,
    pub fcm_token: &'a str,
    pub platform: &'a str,
    pub created_at: &'a DateTime<Utc>,
    pub updated_at: &'a DateTime<Utc>,
}
