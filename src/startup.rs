use crate::catchers::*;
use crate::configuration::Settings;
use crate::dispatch::NotificationDispatcher;
use crate::pool_drain::PoolDrain;
use crate::port_saver;
use crate::port_saver::Port;
use crate::push::PushClient;
use crate::routes::*;
use crate::store::MIGRATIONS;
use crate::sweeper::TokenSweeper;
use anyhow::anyhow;
use diesel_migrations::MigrationHarness;
use rocket::fairing::{self, AdHoc};
use rocket::{Build, Ignite, Rocket};
use rocket_sync_db_pools::database;
use std::sync::Arc;

#[database("feedback_push")]
pub struct PushDbConn(diesel::PgConnection);

pub struct Application {
    pub server: Rocket<Ignite>,
    pub port: Port,
}

impl Application {
    pub async fn build(
        configuration: &Settings,
        push_client: Arc<dyn PushClient>,
    ) -> anyhow::Result<Application> {
        let always_notify = configuration
            .notifications
            .always_notify()
            .map_err(|e| anyhow!("Invalid notifications.always_notify entry: {}", e))?;
        let dispatcher = NotificationDispatcher::new(
            push_client,
            always_notify,
            configuration.notifications.max_concurrent_sends,
            configuration.push_client.timeout(),
        );

        let figment = rocket::Config::figment()
            .merge(("address", configuration.application.host))
            .merge(("port", configuration.application.port.unwrap_or(0)))
            .merge((
                "databases.feedback_push.url",
                configuration.database.connection_string(),
            ))
            .merge((
                "databases.feedback_push.pool_size",
                configuration.database.pool_size,
            ));

        let (port_saver, port) = port_saver::create_pair();
        let mut server = rocket::custom(figment)
            .attach(PushDbConn::fairing())
            .attach(AdHoc::try_on_ignite("Database migrations", run_migrations))
            .attach(port_saver)
            .attach(PoolDrain::new(configuration.database.pool_size))
            .manage(dispatcher)
            .mount(
                "/",
                routes![
                    health_check,
                    register_token,
                    remove_token,
                    list_notifications,
                    mark_notification_read,
                    notification_stats,
                    send_test_notification,
                    send_custom_notification,
                    notify_new_feedback,
                ],
            )
            .register(
                "/",
                catchers![unprocessable_entity_to_bad_request, bad_request, not_found],
            );
        if let Some(period) = configuration.notifications.token_sweep_interval() {
            server = server.attach(TokenSweeper::new(period));
        }

        let server = server
            .ignite()
            .await
            .map_err(|e| anyhow!("Failed to ignite the server: {}", e))?;
        Ok(Application { server, port })
    }

    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        self.server
            .launch()
            .await
            .map_err(|e| anyhow!("Server stopped with an error: {}", e))?;
        Ok(())
    }
}

async fn run_migrations(rocket: Rocket<Build>) -> fairing::Result {
    let conn = match PushDbConn::get_one(&rocket).await {
        Some(conn) => conn,
        None => {
            tracing::error!("No database connection available for migrations");
            return Err(rocket);
        }
    };
    let applied = conn
        .run(|c| c.run_pending_migrations(MIGRATIONS).map(|versions| versions.len()))
        .await;
    match applied {
        Ok(count) => {
            tracing::info!(count, "Database migrations applied");
            Ok(rocket)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to run database migrations");
            Err(rocket)
        }
    }
}
