use anyhow::Context;
use feedback_push::configuration::get_configuration;
use feedback_push::push::FcmClient;
use feedback_push::startup::Application;
use feedback_push::telemetry::{get_subscriber, init_subscriber};
use std::sync::Arc;

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("feedback_push".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let configuration = get_configuration().context("Failed to read configuration.")?;
    let push_client =
        FcmClient::new(&configuration.push_client).context("Failed to build the FCM client.")?;

    let application = Application::build(&configuration, Arc::new(push_client)).await?;
    application.run_until_stopped().await
}
