use etl_pipeline_lambda::adapters::aws::{CloudWatchMetrics, S3Bucket};
use etl_pipeline_lambda::config::TransformConfig;
use etl_pipeline_lambda::handlers::queue_event::decode_sqs_event;
use etl_pipeline_lambda::handlers::transform::handle_transform;
use etl_pipeline_lambda::logging::init_logging;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::{json, Value};

struct RuntimeDependencies {
    source: S3Bucket,
    destination: S3Bucket,
    metrics: CloudWatchMetrics,
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &RuntimeDependencies,
) -> Result<Value, Error> {
    let records = decode_sqs_event(&event.payload)?;
    let outcome = handle_transform(&records, &deps.source, &deps.destination, &deps.metrics)?;

    Ok(json!({
        "status": "ok",
        "objects_processed": outcome.objects_processed,
        "lines_processed": outcome.lines_processed,
    }))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_logging();

    let config = TransformConfig::from_env()?;
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let s3_client = aws_sdk_s3::Client::new(&aws_config);
    let deps = RuntimeDependencies {
        source: S3Bucket::new(s3_client.clone(), config.source_bucket),
        destination: S3Bucket::new(s3_client, config.destination_bucket),
        metrics: CloudWatchMetrics::new(
            aws_sdk_cloudwatch::Client::new(&aws_config),
            config.metrics_namespace,
        ),
    };

    let deps = &deps;
    lambda_runtime::run(service_fn(move |event| async move {
        handle_request(event, deps).await
    }))
    .await
}
