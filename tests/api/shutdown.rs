use crate::helpers::spawn_app;
use std::time::Duration;

#[tokio::test]
async fn shutdown_drains_the_pool_and_stops_the_server() {
    // arrange
    let app = spawn_app().await;
    app.given_token("user-1", "device-token-1").await;

    // act
    app.shutdown.clone().notify();
    let stopped = tokio::time::timeout(Duration::from_secs(30), app.server)
        .await
        .expect("Server did not shut down in time.")
        .expect("Server task panicked.");

    // assert
    assert!(stopped.is_ok());
    let after = reqwest::Client::new()
        .get(&format!("{}/health_check", &app.address))
        .send()
        .await;
    assert!(after.is_err());
}
