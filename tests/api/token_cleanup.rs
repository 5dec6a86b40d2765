use crate::helpers::{spawn_app, spawn_app_with};
use chrono::Utc;
use feedback_push::store::tokens;
use std::time::Duration;

#[tokio::test]
async fn purge_removes_tokens_older_than_thirty_days() {
    // arrange
    let mut app = spawn_app().await;
    app.insert_token_aged("user-1", "old-token", 31);
    app.insert_token_aged("user-1", "recent-token", 29);

    // act
    let deleted = tokens::purge_stale(&mut app.db_connection, Utc::now()).unwrap();

    // assert
    assert_eq!(deleted, 1);
    let remaining: Vec<String> = app.stored_tokens().into_iter().map(|t| t.fcm_token).collect();
    assert_eq!(remaining, vec!["recent-token".to_string()]);
}

#[tokio::test]
async fn stale_tokens_are_not_used_for_sends() {
    let mut app = spawn_app().await;
    app.insert_token_aged("user-1", "old-token", 31);

    let response = app
        .post_json(
            "/api/notifications/send",
            &serde_json::json!({"user_id": "user-1", "title": "Hi", "body": "There"}),
        )
        .await;

    assert_eq!(400, response.status().as_u16());
    assert!(app.push_client.sent().is_empty());
}

#[tokio::test]
async fn the_background_sweep_purges_stale_tokens() {
    let mut app = spawn_app_with(|c| c.notifications.token_sweep_interval_seconds = 1).await;
    app.insert_token_aged("user-1", "old-token", 31);
    app.insert_token_aged("user-1", "recent-token", 29);

    let mut remaining = app.stored_tokens();
    for _ in 0..50 {
        if remaining.len() == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        remaining = app.stored_tokens();
    }

    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].fcm_token, "recent-token");
}
