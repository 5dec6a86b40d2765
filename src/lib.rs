#[macro_use]
extern crate rocket;
#[macro_use]
extern crate diesel;

pub mod catchers;
pub mod configuration;
pub mod dispatch;
pub mod domain;
pub mod models;
pub mod pool_drain;
pub mod port_saver;
pub mod push;
pub mod routes;
pub mod schema;
pub mod startup;
pub mod store;
pub mod sweeper;
pub mod telemetry;
