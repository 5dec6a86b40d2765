use crate::helpers::spawn_app;

#[tokio::test]
async fn unknown_feedback_is_a_404_without_any_push() {
    // arrange
    let mut app = spawn_app().await;
    app.given_token("user-1", "device-token-1").await;

    // act
    let response = app.notify_new_feedback("does-not-exist").await;

    // assert
    assert_eq!(404, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "The specified feedback does not exist");
    assert!(app.push_client.sent().is_empty());
    assert_eq!(app.history_count(), 0);
}

#[tokio::test]
async fn feedback_without_recipients_is_reported_as_such() {
    let mut app = spawn_app().await;
    app.insert_feedback("fb-1", "Ada", None);

    let response = app.notify_new_feedback("fb-1").await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "No users to notify for this feedback");
    assert_eq!(body["data"]["summary"]["total_users"], 0);
    assert!(app.push_client.sent().is_empty());
}

#[tokio::test]
async fn assignees_are_notified_and_the_delivery_is_recorded() {
    // arrange
    let mut app = spawn_app().await;
    app.given_token("agent-1", "agent-device").await;
    app.insert_feedback("fb-1", "Ada", Some("agent-1"));

    // act
    let response = app.notify_new_feedback("fb-1").await;

    // assert
    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Feedback notifications processed");
    assert_eq!(body["data"]["summary"]["total_users"], 1);
    assert_eq!(body["data"]["summary"]["success_count"], 1);
    assert_eq!(body["data"]["details"][0]["user_id"], "agent-1");

    let sent = app.push_client.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, "New customer feedback");
    assert!(sent[0].body.starts_with("Ada: "));
    assert_eq!(sent[0].data.to_string_map()["feedback_id"], "fb-1");

    let page: serde_json::Value = app
        .get_notifications("user_id=agent-1")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(page["data"]["notifications"][0]["feedback_id"], "fb-1");
}

#[tokio::test]
async fn standing_recipients_are_notified_alongside_assignees() {
    // arrange
    let mut app = crate::helpers::spawn_app_with(|c| {
        c.notifications.always_notify = vec!["ops-1".into(), "agent-1".into(), "ops-2".into()];
    })
    .await;
    app.given_token("agent-1", "agent-device").await;
    app.given_token("ops-1", "ops-device").await;
    app.push_client.fail_sends_to("ops-device");
    app.insert_feedback("fb-1", "Ada", Some("agent-1"));

    // act
    let response = app.notify_new_feedback("fb-1").await;

    // assert
    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    let summary = &body["data"]["summary"];
    assert_eq!(summary["total_users"], 3);
    assert_eq!(summary["success_count"], 1);
    assert_eq!(summary["failure_count"], 2);

    let recipients: Vec<&str> = body["data"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|outcome| outcome["user_id"].as_str().unwrap())
        .collect();
    assert_eq!(recipients, vec!["agent-1", "ops-1", "ops-2"]);
    assert_eq!(app.history_count(), 1);
}

#[tokio::test]
async fn a_missing_feedback_id_is_a_400() {
    let app = spawn_app().await;

    let response = app
        .post_json("/api/notifications/new-feedback", &serde_json::json!({}))
        .await;

    assert_eq!(400, response.status().as_u16());
}
