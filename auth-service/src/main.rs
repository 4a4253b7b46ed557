use std::sync::Arc;

use auth_service::cognito::CognitoIdentity;
use auth_service::config::Config;
use auth_service::event_handler::{function_handler, AppState};
use auth_service::service::AuthService;
use aws_config::{BehaviorVersion, Region};
use lambda_runtime::{run, service_fn, Error};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::tracing::init_default_subscriber();

    let config = Config::from_env()?;
    info!(region = ?config.region, "starting auth service");

    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = &config.region {
        loader = loader.region(Region::new(region.clone()));
    }
    let sdk_config = loader.load().await;

    let identity = CognitoIdentity::new(
        aws_sdk_cognitoidentityprovider::Client::new(&sdk_config),
        &config.client_id,
    );
    let service = AuthService::new(Arc::new(identity));
    let state = Arc::new(AppState::new(service, &config.allowed_origin)?);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { function_handler(state, event).await }
    }))
    .await
}
