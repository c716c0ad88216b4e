//! Food Waste Prediction Service - Main Entry Point
//!
//! Loads the trained artifacts, then answers prediction requests over NATS
//! request-reply. Requests are processed in parallel up to `service.workers`.

use anyhow::{Context, Result};
use food_waste_prediction::{
    config::{AppConfig, LoggingConfig},
    consumer::RequestConsumer,
    dispatch::WorkerPool,
    metrics::{MetricsReporter, ServiceMetrics},
    models::ArtifactStore,
    producer::ReplyPublisher,
    service::PredictionService,
};
use futures::StreamExt;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;
    init_tracing(&config.logging)?;

    info!("Starting Food Waste Prediction Service");
    info!(
        request_subject = %config.nats.request_subject,
        artifacts_dir = %config.artifacts.artifacts_dir,
        model_format = ?config.artifacts.model_format,
        "Configuration loaded successfully"
    );

    // Artifacts must be in place before anything is subscribed
    let store = ArtifactStore::load(&config.artifacts).context("Failed to load artifacts")?;
    let store = Arc::new(store);

    let metrics = Arc::new(ServiceMetrics::new());
    let service = Arc::new(PredictionService::new(store, metrics.clone()));

    // Connect to NATS
    let client = async_nats::connect(&config.nats.url)
        .await
        .with_context(|| format!("Failed to connect to NATS at {}", config.nats.url))?;
    info!("Connected to NATS at {}", config.nats.url);

    let consumer = RequestConsumer::new(
        client.clone(),
        &config.nats.request_subject,
        &config.nats.queue_group,
    );
    let publisher = ReplyPublisher::new(client.clone());

    if config.service.metrics_interval_secs > 0 {
        let reporter = MetricsReporter::new(metrics.clone(), config.service.metrics_interval_secs);
        tokio::spawn(reporter.start());
    }

    let mut pool = WorkerPool::new(config.service.workers);
    info!(
        workers = pool.workers(),
        subject = %consumer.subject(),
        "Ready to serve predictions"
    );

    let mut subscription = consumer.subscribe().await?;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        // A free worker first, so a saturated service still sees the signal
        let permit = tokio::select! {
            permit = pool.acquire() => permit?,
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
        };

        let message = tokio::select! {
            message = subscription.next() => match message {
                Some(message) => message,
                None => break,
            },
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
        };

        let service = service.clone();
        let publisher = publisher.clone();

        pool.spawn(permit, async move {
            let reply = service.handle_payload(&message.payload);

            match message.reply {
                Some(reply_to) => {
                    if let Err(e) = publisher.publish(reply_to, reply).await {
                        error!(error = %e, "Failed to publish reply");
                    }
                }
                None => {
                    warn!(
                        subject = %message.subject,
                        status = reply.status.code(),
                        "Request has no reply subject, dropping reply"
                    );
                }
            }
        });
    }

    info!("Service shutting down...");

    // Stop taking requests, then answer everything already accepted
    if let Err(e) = subscription.unsubscribe().await {
        warn!(error = %e, "Failed to unsubscribe from requests");
    }
    pool.drain().await;

    if let Err(e) = client.flush().await {
        warn!(error = %e, "Failed to flush pending replies");
    }
    metrics.print_summary();

    Ok(())
}

/// Install the global subscriber. `RUST_LOG` directives take precedence over
/// the configured level.
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::builder()
        .parse(format!("food_waste_prediction={}", logging.level))
        .context("Invalid logging level")?;
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) => directives
            .split(',')
            .filter_map(|d| d.parse().ok())
            .fold(filter, |filter, directive| filter.add_directive(directive)),
        Err(_) => filter,
    };

    match logging.format.as_str() {
        "pretty" => tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(filter)
            .init(),
        _ => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }

    Ok(())
}
