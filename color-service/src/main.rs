use std::sync::Arc;

use aws_config::BehaviorVersion;
use color_service::config::Config;
use color_service::event_handler::{function_handler, AppState};
use color_service::service::ColorService;
use color_service::store::DynamoDbStore;
use lambda_runtime::{run, service_fn, Error};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::tracing::init_default_subscriber();

    let config = Config::from_env()?;
    info!(
        table = %config.table_name,
        path = %config.colors_path,
        write_mode = ?config.write_mode,
        "starting color service"
    );

    let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let store = DynamoDbStore::new(aws_sdk_dynamodb::Client::new(&sdk_config), &config.table_name);
    let service = ColorService::new(Arc::new(store), config.write_mode);
    let state = Arc::new(AppState::new(service, &config.allowed_origin, &config.colors_path)?);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { function_handler(state, event).await }
    }))
    .await
}
