//! Devotional reel worker binary.
//!
//! Runs one production cycle for the date given as the first argument
//! (`YYYY-MM-DD`, default today) and prints the stored job id.

use std::sync::Arc;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use devo_genai::{GeminiClient, GeminiSearchSource};
use devo_source::{LiturgyApiClient, TieredSource};
use devo_storage::AppsScriptClient;
use devo_worker::{Services, Session, WorkerConfig};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("devo=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting devo-worker");

    let date = match parse_date(std::env::args().nth(1)) {
        Ok(date) => date,
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(2);
        }
    };

    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    let services = match build_services() {
        Ok(services) => services,
        Err(e) => {
            error!("Failed to create services: {:#}", e);
            std::process::exit(1);
        }
    };

    let mut session = Session::new(services, config);

    let mut observer = session.observer();
    let progress_handle = tokio::spawn(async move {
        while let Some(progress) = observer.progress_changed().await {
            if let Some(p) = progress {
                info!(
                    done = p.done,
                    total = p.total,
                    percent = p.percent,
                    eta_ms = p.estimated_remaining_ms,
                    "Media progress"
                );
            }
        }
    });

    let outcome = session.produce(date).await;
    drop(session);
    progress_handle.await.ok();

    match outcome {
        Ok(job_id) => {
            info!(job_id = %job_id, "Cycle complete");
            println!("{}", job_id);
        }
        Err(e) => {
            error!("Cycle failed: {}", e);
            if let Some(hint) = e.remediation() {
                warn!("{}", hint);
            }
            std::process::exit(1);
        }
    }
}

fn parse_date(arg: Option<String>) -> anyhow::Result<NaiveDate> {
    match arg {
        Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", raw)),
        None => Ok(Local::now().date_naive()),
    }
}

fn build_services() -> anyhow::Result<Services> {
    let gemini = Arc::new(GeminiClient::from_env().context("Gemini client")?);
    let liturgy = Arc::new(LiturgyApiClient::from_env().context("Liturgy API client")?);
    let search = Arc::new(GeminiSearchSource::new(Arc::clone(&gemini)));
    let transport = Arc::new(AppsScriptClient::from_env().context("Apps Script transport")?);

    Ok(Services {
        source: Arc::new(TieredSource::new(liturgy, search)),
        writer: gemini.clone(),
        speech: gemini.clone(),
        images: gemini,
        transport,
    })
}
