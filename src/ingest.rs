// Telemetry ingest Lambda entry point

mod config;
mod error;
mod pipeline;
mod recorder;
mod repo;
mod transport;

use aws_lambda_events::event::sns::SnsEvent;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use tracing::{error, info};

use config::Config;
use recorder::Recorder;
use repo::telemetry::{DynamoDbTelemetryStore, TelemetryStore};
use soil_telemetry::{RandomIdGenerator, SystemClock};

/// Handle one SNS invocation
///
/// Returns an error when any record failed so Lambda's retry policy
/// redelivers the message.
async fn function_handler<S: TelemetryStore>(
    event: LambdaEvent<SnsEvent>,
    recorder: &Recorder<S>,
) -> Result<(), Error> {
    let request_id = event.context.request_id.clone();
    let total = event.payload.records.len();

    info!(
        request_id = %request_id,
        records = total,
        "Telemetry ingest Lambda invoked"
    );

    let mut failed = 0;
    for record in &event.payload.records {
        if pipeline::process_sns_record(record, recorder).await.is_err() {
            failed += 1;
        }
    }

    if failed > 0 {
        error!(
            request_id = %request_id,
            failed = failed,
            records = total,
            "Telemetry ingest invocation failed"
        );
        return Err(format!("{} of {} telemetry events failed", failed, total).into());
    }

    info!(
        request_id = %request_id,
        records = total,
        "Telemetry ingest invocation completed"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .without_time()
        .init();

    // Storage client lives for the whole process and is shared by every invocation
    let config = Config::from_env().await?;
    let store = DynamoDbTelemetryStore::new(config.dynamodb_client, config.telemetry_table.clone());
    let recorder = Recorder::new(store, SystemClock::new(), RandomIdGenerator::new());

    info!(
        table = %config.telemetry_table,
        "Telemetry ingest Lambda starting"
    );

    let recorder = &recorder;
    run(service_fn(move |event: LambdaEvent<SnsEvent>| async move {
        function_handler(event, recorder).await
    }))
    .await
}
