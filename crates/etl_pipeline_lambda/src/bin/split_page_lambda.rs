use etl_pipeline_lambda::adapters::aws::SqsQueue;
use etl_pipeline_lambda::config::SplitPageConfig;
use etl_pipeline_lambda::handlers::queue_event::decode_sqs_event;
use etl_pipeline_lambda::handlers::split_page::handle_split_pages;
use etl_pipeline_lambda::logging::init_logging;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::{json, Value};

async fn handle_request(event: LambdaEvent<Value>, objects_queue: &SqsQueue) -> Result<Value, Error> {
    let records = decode_sqs_event(&event.payload)?;
    let outcome = handle_split_pages(&records, objects_queue)?;

    Ok(json!({
        "status": "ok",
        "pages": outcome.pages,
        "keys_enqueued": outcome.keys_enqueued,
        "batches_sent": outcome.batches_sent,
    }))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_logging();

    let config = SplitPageConfig::from_env()?;
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let objects_queue = SqsQueue::new(
        aws_sdk_sqs::Client::new(&aws_config),
        config.objects_queue_url,
    );

    let objects_queue = &objects_queue;
    lambda_runtime::run(service_fn(move |event| async move {
        handle_request(event, objects_queue).await
    }))
    .await
}
