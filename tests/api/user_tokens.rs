use crate::helpers::spawn_app;
use serde_json::json;

#[tokio::test]
async fn register_returns_a_200_and_stores_the_token() {
    // arrange
    let mut app = spawn_app().await;

    // act
    let response = app
        .register_token(json!({
            "fcm_token": "device-token-1",
            "platform": "ios",
            "user_id": "user-1",
        }))
        .await;

    // assert
    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "FCM token saved successfully");

    let saved = app.stored_tokens();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].user_id, "user-1");
    assert_eq!(saved[0].fcm_token, "device-token-1");
    assert_eq!(saved[0].platform, "ios");
    assert_eq!(saved[0].created_at, saved[0].updated_at);
}

#[tokio::test]
async fn registering_twice_keeps_one_row_with_the_latest_platform() {
    let mut app = spawn_app().await;

    for platform in ["ios", "android"] {
        let response = app
            .register_token(json!({
                "fcm_token": "device-token-1",
                "platform": platform,
                "user_id": "user-1",
            }))
            .await;
        assert_eq!(200, response.status().as_u16());
    }

    let saved = app.stored_tokens();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].platform, "android");
    assert!(saved[0].updated_at > saved[0].created_at);
}

#[tokio::test]
async fn register_returns_a_400_when_data_is_missing_or_invalid() {
    // arrange
    let mut app = spawn_app().await;
    let test_cases = vec![
        (json!({"platform": "ios", "user_id": "u1"}), "missing the token"),
        (json!({"fcm_token": "tok", "platform": "ios"}), "missing the user id"),
        (
            json!({"fcm_token": "tok", "platform": "windows", "user_id": "u1"}),
            "an unknown platform",
        ),
        (json!({}), "missing everything"),
    ];

    for (invalid_body, error_message) in test_cases {
        // act
        let response = app.register_token(invalid_body).await;

        // assert
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload was {}.",
            error_message
        );
    }
    assert!(app.stored_tokens().is_empty());
}

#[tokio::test]
async fn malformed_json_is_answered_with_a_json_400() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .post(&format!("{}/api/user/fcm-token", &app.address))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn tokens_the_provider_rejects_are_not_stored() {
    let mut app = spawn_app().await;
    app.push_client.reject_as_invalid("stale-token");

    let response = app
        .register_token(json!({
            "fcm_token": "stale-token",
            "platform": "android",
            "user_id": "user-1",
        }))
        .await;

    assert_eq!(400, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "The provided FCM token is not valid");
    assert!(app.stored_tokens().is_empty());
}

#[tokio::test]
async fn removing_a_token_deletes_it_and_is_idempotent() {
    let mut app = spawn_app().await;
    app.given_token("user-1", "device-token-1").await;
    app.given_token("user-1", "device-token-2").await;

    for _ in 0..2 {
        let response = app
            .remove_token(json!({"fcm_token": "device-token-1", "user_id": "user-1"}))
            .await;
        assert_eq!(200, response.status().as_u16());
    }

    let saved = app.stored_tokens();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].fcm_token, "device-token-2");
}

#[tokio::test]
async fn removing_without_a_user_id_is_a_400() {
    let app = spawn_app().await;

    let response = app.remove_token(json!({"fcm_token": "tok"})).await;

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn the_most_recently_updated_token_is_pushed_first() {
    // arrange
    let app = spawn_app().await;
    app.given_token("user-1", "older-device").await;
    app.given_token("user-1", "newer-device").await;
    app.given_token("user-1", "older-device").await;

    // act
    let response = app
        .post_json(
            "/api/notifications/send",
            &json!({"user_id": "user-1", "title": "Hi", "body": "There"}),
        )
        .await;

    // assert
    assert_eq!(200, response.status().as_u16());
    let order: Vec<String> = app
        .push_client
        .sent()
        .into_iter()
        .map(|push| push.token)
        .collect();
    assert_eq!(order, vec!["older-device", "newer-device"]);
}
