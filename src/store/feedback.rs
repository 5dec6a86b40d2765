use crate::domain::{Feedback, FeedbackId, UserId};
use crate::models::FeedbackRow;
use crate::schema::feedback;
use diesel::{ExpressionMethods, OptionalExtension, PgConnection, QueryDsl, RunQueryDsl};

#[tracing::instrument(name = "Get feedback details", skip(conn), fields(feedback_id = %id))]
pub fn find(conn: &mut PgConnection, id: &FeedbackId) -> diesel::QueryResult<Option<Feedback>> {
    let row = feedback::table
        .select((
            feedback::customer_name,
            feedback::content,
            feedback::created_at,
            feedback::assigned_user_id,
        ))
        .filter(feedback::id.eq(id.as_ref()))
        .first::<FeedbackRow>(conn)
        .optional()?;
    Ok(row.map(|row| into_feedback(id, row)))
}

fn into_feedback(id: &FeedbackId, row: FeedbackRow) -> Feedback {
    Feedback {
        id: id.clone(),
        customer_name: row.customer_name,
        content: row.content,
        created_at: row.created_at,
        assigned_user_id: row.assigned_user_id.and_then(parse_assignee),
    }
}

fn parse_assignee(raw: String) -> Option<UserId> {
    match UserId::parse(raw) {
        Ok(user_id) => Some(user_id),
        Err(error) => {
            tracing::warn!(%error, "Ignoring a feedback assignee with an invalid user id");
            None
        }
    }
}
