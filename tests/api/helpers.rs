use async_trait::async_trait;
use chrono::{Duration, Utc};
use diesel::prelude::*;
use diesel::{Connection, PgConnection};
use feedback_push::configuration::{get_configuration, Settings};
use feedback_push::domain::{NotificationData, PushNotification, PushToken};
use feedback_push::models::UserToken;
use feedback_push::push::{MessageId, PushClient, PushError};
use feedback_push::schema::{feedback, notification_history, user_tokens};
use feedback_push::startup::Application;
use feedback_push::telemetry::{get_subscriber, init_subscriber};
use once_cell::sync::Lazy;
use rocket::{Ignite, Rocket, Shutdown};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use uuid::Uuid;

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".into();
    let subscriber_name = "test".into();
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

#[derive(Debug, Clone)]
pub struct SentPush {
    pub token: String,
    pub title: String,
    pub body: String,
    pub data: NotificationData,
}

/// Records every push and lets a test decide which tokens the provider
/// rejects.
#[derive(Default)]
pub struct MockPushClient {
    sent: Mutex<Vec<SentPush>>,
    invalid_tokens: Mutex<HashSet<String>>,
    failing_tokens: Mutex<HashSet<String>>,
}

impl MockPushClient {
    pub fn sent(&self) -> Vec<SentPush> {
        self.sent.lock().unwrap().clone()
    }

    pub fn reject_as_invalid(&self, token: &str) {
        self.invalid_tokens.lock().unwrap().insert(token.into());
    }

    pub fn fail_sends_to(&self, token: &str) {
        self.failing_tokens.lock().unwrap().insert(token.into());
    }
}

#[async_trait]
impl PushClient for MockPushClient {
    async fn validate_token(&self, token: &PushToken) -> Result<bool, PushError> {
        Ok(!self.invalid_tokens.lock().unwrap().contains(token.as_ref()))
    }

    async fn send_to_token(
        &self,
        token: &PushToken,
        notification: &PushNotification,
        data: &NotificationData,
    ) -> Result<MessageId, PushError> {
        if self.failing_tokens.lock().unwrap().contains(token.as_ref()) {
            return Err(PushError::Api {
                status: 404,
                body: "UNREGISTERED".into(),
            });
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(SentPush {
            token: token.as_ref().into(),
            title: notification.title.clone(),
            body: notification.body.clone(),
            data: data.clone(),
        });
        Ok(format!("projects/test/messages/{}", sent.len()))
    }
}

pub struct TestApp {
    pub address: String,
    pub shutdown: Shutdown,
    pub server: JoinHandle<Result<Rocket<Ignite>, rocket::Error>>,
    pub db_connection: PgConnection,
    pub push_client: Arc<MockPushClient>,
    pub api_client: reqwest::Client,
}

impl TestApp {
    pub async fn post_json(&self, path: &str, body: &serde_json::Value) -> reqwest::Response {
        self.api_client
            .post(&format!("{}{}", &self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn register_token(&self, body: serde_json::Value) -> reqwest::Response {
        self.post_json("/api/user/fcm-token", &body).await
    }

    pub async fn remove_token(&self, body: serde_json::Value) -> reqwest::Response {
        self.api_client
            .delete(&format!("{}/api/user/fcm-token", &self.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_notifications(&self, query: &str) -> reqwest::Response {
        self.api_client
            .get(&format!("{}/api/notifications?{}", &self.address, query))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_stats(&self, user_id: &str) -> reqwest::Response {
        self.api_client
            .get(&format!(
                "{}/api/notifications/stats?user_id={}",
                &self.address, user_id
            ))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn mark_read(&self, notification_id: i32, user_id: &str) -> reqwest::Response {
        self.api_client
            .put(&format!(
                "{}/api/notifications/{}/read",
                &self.address, notification_id
            ))
            .json(&serde_json::json!({ "user_id": user_id }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn notify_new_feedback(&self, feedback_id: &str) -> reqwest::Response {
        self.post_json(
            "/api/notifications/new-feedback",
            &serde_json::json!({ "feedback_id": feedback_id }),
        )
        .await
    }

    /// Registers through the API, the way a mobile client would.
    pub async fn given_token(&self, user_id: &str, token: &str) {
        let response = self
            .register_token(serde_json::json!({
                "fcm_token": token,
                "platform": "android",
                "user_id": user_id,
            }))
            .await;
        assert_eq!(200, response.status().as_u16());
    }

    pub fn insert_feedback(&mut self, id: &str, customer_name: &str, assignee: Option<&str>) {
        diesel::insert_into(feedback::table)
            .values((
                feedback::id.eq(id),
                feedback::customer_name.eq(customer_name),
                feedback::content.eq("The app keeps logging me out"),
                feedback::created_at.eq(Utc::now()),
                feedback::assigned_user_id.eq(assignee),
            ))
            .execute(&mut self.db_connection)
            .expect("Failed to insert feedback.");
    }

    pub fn insert_token_aged(&mut self, user_id: &str, token: &str, age_in_days: i64) {
        let created_at = Utc::now() - Duration::days(age_in_days);
        diesel::insert_into(user_tokens::table)
            .values((
                user_tokens::user_id.eq(user_id),
                user_tokens::fcm_token.eq(token),
                user_tokens::platform.eq("ios"),
                user_tokens::created_at.eq(created_at),
                user_tokens::updated_at.eq(created_at),
            ))
            .execute(&mut self.db_connection)
            .expect("Failed to insert push token.");
    }

    pub fn stored_tokens(&mut self) -> Vec<UserToken> {
        user_tokens::table
            .order(user_tokens::id)
            .load::<UserToken>(&mut self.db_connection)
            .expect("Failed to load push tokens.")
    }

    pub fn history_count(&mut self) -> i64 {
        notification_history::table
            .count()
            .get_result(&mut self.db_connection)
            .expect("Failed to count history.")
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with(customize: impl FnOnce(&mut Settings)) -> TestApp {
    Lazy::force(&TRACING);

    let configuration = {
        let mut c = get_configuration().expect("Failed to read configuration.");
        c.application.port = None;
        c.database.database_name = Uuid::new_v4().to_string();
        c.notifications.token_sweep_interval_seconds = 0;
        customize(&mut c);
        c
    };

    create_database(&configuration);

    let push_client = Arc::new(MockPushClient::default());
    let Application { server, mut port } = Application::build(&configuration, push_client.clone())
        .await
        .expect("Failed to build application.");
    let shutdown = server.shutdown();
    let server = tokio::spawn(server.launch());
    let port = port.get().await.expect("Server never lifted off.");

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        shutdown,
        server,
        db_connection: connect(&configuration.database.connection_string()),
        push_client,
        api_client: reqwest::Client::new(),
    }
}

fn create_database(configuration: &Settings) {
    let mut connection = connect(&configuration.database.connection_string_without_database());
    diesel::sql_query(format!(
        "CREATE DATABASE \"{}\"",
        configuration.database.database_name
    ))
    .execute(&mut connection)
    .expect("Failed to create database.");
}

fn connect(connection_string: &str) -> PgConnection {
    PgConnection::establish(connection_string).expect("Failed to connect to Postgres.")
}
