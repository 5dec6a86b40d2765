use crate::startup::PushDbConn;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Orbit, Rocket};

/// Shutdown hook that waits for every pooled connection to come back before
/// Rocket drops the pool, so in-flight `run` calls finish their queries.
pub struct PoolDrain {
    pool_size: u32,
}

impl PoolDrain {
    pub fn new(pool_size: u32) -> Self {
        Self { pool_size }
    }
}

#[rocket::async_trait]
impl Fairing for PoolDrain {
    fn info(&self) -> Info {
        Info {
            name: "Database Pool Drain",
            kind: Kind::Shutdown,
        }
    }

    async fn on_shutdown(&self, rocket: &Rocket<Orbit>) {
        let pool = match PushDbConn::pool(rocket) {
            Some(pool) => pool,
            None => {
                tracing::debug!("No database pool to drain");
                return;
            }
        };

        // Holding every permit at once means no connection is still in use.
        let mut drained = Vec::with_capacity(self.pool_size as usize);
        while drained.len() < self.pool_size as usize {
            match pool.get().await {
                Some(conn) => drained.push(conn),
                None => break,
            }
        }
        if drained.len() < self.pool_size as usize {
            tracing::warn!(
                drained = drained.len(),
                pool_size = self.pool_size,
                "Timed out draining the database pool"
            );
        } else {
            tracing::info!(drained = drained.len(), "Database pool drained");
        }
    }
}
