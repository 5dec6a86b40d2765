use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Orbit, Rocket};
use tokio::sync::watch;

/// Captures the port Rocket actually bound to, which is only known at
/// liftoff when the configured port is 0.
pub fn create_pair() -> (PortSaver, Port) {
    let (sender, receiver) = watch::channel(None);
    (PortSaver { sender }, Port { receiver })
}

pub struct Port {
    receiver: watch::Receiver<Option<u16>>,
}

impl Port {
    /// Waits for liftoff. `None` if the server was dropped before it lifted off.
    pub async fn get(&mut self) -> Option<u16> {
        loop {
            let current = *self.receiver.borrow();
            if let Some(port) = current {
                return Some(port);
            }
            if self.receiver.changed().await.is_err() {
                return None;
            }
        }
    }
}

pub struct PortSaver {
    sender: watch::Sender<Option<u16>>,
}

#[rocket::async_trait]
impl Fairing for PortSaver {
    fn info(&self) -> Info {
        Info {
            name: "Port Saver",
            kind: Kind::Liftoff,
        }
    }

    async fn on_liftoff(&self, rocket: &Rocket<Orbit>) {
        let port = rocket.config().port;
        tracing::info!(port, "Server lifted off");
        if self.sender.send(Some(port)).is_err() {
            tracing::debug!("Nobody is waiting for the bound port");
        }
    }
}
