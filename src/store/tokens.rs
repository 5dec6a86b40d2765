//! Registry of push tokens per user.

use crate::domain::{NewTokenRegistration, PushToken, UserId};
use crate::models::NewUserToken;
use crate::schema::user_tokens;
use chrono::{DateTime, Duration, Utc};
use diesel::{ExpressionMethods, PgConnection, QueryDsl, QueryResult, RunQueryDsl};

/// Tokens are considered live for this many days after first registration.
pub const TOKEN_FRESHNESS_DAYS: i64 = 30;

/// Tokens created before the returned instant are stale.
pub fn stale_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(TOKEN_FRESHNESS_DAYS)
}

#[tracing::instrument(
    name = "Saving push token",
    skip(conn, registration),
    fields(user_id = %registration.user_id, platform = registration.platform.as_str())
)]
pub fn register(
    conn: &mut PgConnection,
    registration: &NewTokenRegistration,
    now: DateTime<Utc>,
) -> QueryResult<()> {
    diesel::insert_into(user_tokens::table)
        .values(NewUserToken {
            user_id: registration.user_id.as_ref(),
            fcm_token: registration.token.as_ref(),
            platform: registration.platform.as_str(),
            created_at: &now,
            updated_at: &now,
        })
        .on_conflict((user_tokens::user_id, user_tokens::fcm_token))
        .do_update()
        .set((
            user_tokens::platform.eq(registration.platform.as_str()),
            user_tokens::updated_at.eq(now),
        ))
        .execute(conn)
        .map(|_| ())
}

/// Returns how many rows were removed; removing an unknown token is a no-op.
#[tracing::instrument(name = "Removing push token", skip(conn, token), fields(user_id = %user_id))]
pub fn unregister(
    conn: &mut PgConnection,
    user_id: &UserId,
    token: &PushToken,
) -> QueryResult<usize> {
    diesel::delete(
        user_tokens::table
            .filter(user_tokens::user_id.eq(user_id.as_ref()))
            .filter(user_tokens::fcm_token.eq(token.as_ref())),
    )
    .execute(conn)
}

/// Fresh tokens for a user, most recently updated first. Rows that no longer
/// parse as tokens are skipped.
#[tracing::instrument(name = "Listing active push tokens", skip(conn), fields(user_id = %user_id))]
pub fn list_active(
    conn: &mut PgConnection,
    user_id: &UserId,
    now: DateTime<Utc>,
) -> QueryResult<Vec<PushToken>> {
    let rows = user_tokens::table
        .select(user_tokens::fcm_token)
        .filter(user_tokens::user_id.eq(user_id.as_ref()))
        .filter(user_tokens::created_at.gt(stale_cutoff(now)))
        .order(user_tokens::updated_at.desc())
        .load::<String>(conn)?;

    let tokens = rows
        .into_iter()
        .filter_map(|raw| match PushToken::parse(raw) {
            Ok(token) => Some(token),
            Err(error) => {
                tracing::warn!(%error, "Skipping a stored push token that is no longer valid");
                None
            }
        })
        .collect();
    Ok(tokens)
}

#[tracing::instrument(name = "Purging stale push tokens", skip(conn))]
pub fn purge_stale(conn: &mut PgConnection, now: DateTime<Utc>) -> QueryResult<usize> {
    diesel::delete(user_tokens::table.filter(user_tokens::created_at.lt(stale_cutoff(now))))
        .execute(conn)
}
