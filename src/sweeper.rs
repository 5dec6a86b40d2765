//! Periodic removal of push tokens past their freshness window.

use crate::startup::PushDbConn;
use crate::store::tokens;
use chrono::Utc;
use diesel::PgConnection;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Orbit, Rocket, Shutdown};
use rocket_sync_db_pools::ConnectionPool;
use std::time::Duration;

pub struct TokenSweeper {
    period: Duration,
}

impl TokenSweeper {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }
}

#[rocket::async_trait]
impl Fairing for TokenSweeper {
    fn info(&self) -> Info {
        Info {
            name: "Stale Token Sweeper",
            kind: Kind::Liftoff,
        }
    }

    async fn on_liftoff(&self, rocket: &Rocket<Orbit>) {
        let pool = match PushDbConn::pool(rocket) {
            Some(pool) => pool.clone(),
            None => {
                tracing::error!("Database pool unavailable; stale tokens will not be purged");
                return;
            }
        };
        tokio::spawn(run_sweeps(pool, self.period, rocket.shutdown()));
    }
}

async fn run_sweeps(
    pool: ConnectionPool<PushDbConn, PgConnection>,
    period: Duration,
    shutdown: Shutdown,
) {
    let mut ticker = tokio::time::interval(period);
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => sweep_once(&pool).await,
        }
    }
}

#[tracing::instrument(name = "Sweeping stale push tokens", skip(pool))]
async fn sweep_once(pool: &ConnectionPool<PushDbConn, PgConnection>) {
    let conn = match pool.get().await {
        Some(conn) => conn,
        None => {
            tracing::warn!("No database connection available for the token sweep");
            return;
        }
    };
    match conn.run(|c| tokens::purge_stale(c, Utc::now())).await {
        Ok(deleted) => tracing::info!(deleted, "Purged stale push tokens"),
        Err(e) => tracing::error!(error = %e, "Failed to purge stale push tokens"),
    }
}
