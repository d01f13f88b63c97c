use lambda_http::{run, service_fn, tracing, Error, Request};
use std::sync::Arc;
use workshop_shared::config::Config;
use workshop_shared::AppState;

mod http_handler;
mod responses;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let config = Config::from_env();

    // Initialize AWS clients once at startup
    let mut loader = aws_config::from_env();
    if let Some(endpoint_url) = &config.endpoint_url {
        tracing::info!("Using backend endpoint override: {}", endpoint_url);
        loader = loader.endpoint_url(endpoint_url);
    }
    let sdk_config = loader.load().await;

    let state = AppState::from_aws(&sdk_config, config);

    run(service_fn(move |event: Request| {
        let state = Arc::clone(&state);
        async move { http_handler::function_handler(event, state).await }
    }))
    .await
}
