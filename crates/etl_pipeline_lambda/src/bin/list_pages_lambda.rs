use etl_pipeline_core::contract::ListingState;
use etl_pipeline_lambda::adapters::aws::{S3Bucket, SqsQueue};
use etl_pipeline_lambda::adapters::deadline::LambdaDeadline;
use etl_pipeline_lambda::config::ListPagesConfig;
use etl_pipeline_lambda::error::EtlError;
use etl_pipeline_lambda::handlers::list_pages::handle_list_pages;
use etl_pipeline_lambda::logging::init_logging;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

struct RuntimeDependencies {
    config: ListPagesConfig,
    source: S3Bucket,
    pages_queue: SqsQueue,
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &RuntimeDependencies,
) -> Result<Value, Error> {
    let state: ListingState =
        serde_json::from_value(event.payload).map_err(EtlError::InvalidState)?;
    let budget = LambdaDeadline::from_epoch_millis(event.context.deadline)
        .ok_or_else(|| Error::from("invocation deadline is out of range"))?;

    let outcome = handle_list_pages(
        state,
        &deps.source,
        &deps.pages_queue,
        &budget,
        deps.config.safety_margin,
    )?;

    serde_json::to_value(outcome.state)
        .map_err(|error| Error::from(format!("failed to serialize listing state: {error}")))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_logging();

    let config = ListPagesConfig::from_env()?;
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let deps = RuntimeDependencies {
        source: S3Bucket::new(
            aws_sdk_s3::Client::new(&aws_config),
            config.source_bucket.clone(),
        ),
        pages_queue: SqsQueue::new(
            aws_sdk_sqs::Client::new(&aws_config),
            config.pages_queue_url.clone(),
        ),
        config,
    };

    let deps = &deps;
    lambda_runtime::run(service_fn(move |event| async move {
        handle_request(event, deps).await
    }))
    .await
}
