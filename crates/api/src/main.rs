//! Brake Fault Monitor - Main Entry Point

use anyhow::Context;
use api::{
    build_dispatcher, init_logging, install_metrics, run_server, AppState, ConsoleObserver,
    DashboardObserver, Settings,
};
use fault_monitor::{FaultMonitor, MonitorConfig};
use inference_engine::LinearModel;
use sample_source::{FeatureTable, SampleSource};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var_os("BRAKE_MONITOR_CONFIG").map(PathBuf::from);
    let settings = Settings::load(config_path.as_deref()).context("loading configuration")?;

    init_logging(&settings.logging).context("installing log subscriber")?;

    info!("=== Brake Fault Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    let language = settings.session.language;
    let state = Arc::new(AppState::new(language, install_metrics()));

    let classifier = LinearModel::load(&settings.model.path)
        .with_context(|| format!("loading model from {}", settings.model.path.display()))?;

    let table = FeatureTable::from_csv_path(
        &settings.session.data_path,
        settings.session.label_column.as_deref(),
    )
    .with_context(|| format!("loading samples from {}", settings.session.data_path.display()))?;
    info!("Total available samples: {}", table.len());

    let source = SampleSource::new(table, settings.session.max_samples)
        .with_delay(Duration::from_millis(settings.session.delay_ms));

    let dispatcher = build_dispatcher(&settings).context("configuring alert channels")?;

    let server = if settings.server.enabled {
        let addr = settings.bind_addr()?;
        Some(tokio::spawn(run_server(addr, state.clone())))
    } else {
        None
    };

    let mut monitor = FaultMonitor::new(
        classifier,
        dispatcher,
        MonitorConfig::new(settings.alerting.clone(), language.templates().alert),
    );

    state.begin_session(source.len());
    let mut observer = (ConsoleObserver::new(language), DashboardObserver::new(state.clone()));

    info!("Starting real-time brake fault monitoring...");
    let result = monitor.run(source.stream(), &mut observer).await;
    state.set_session_state(monitor.state());

    match &result {
        Ok(report) => info!(
            "Session summary: {} processed, {} suppressed, {} delivery failures",
            report.processed, report.suppressed, report.delivery_failures
        ),
        Err(e) => error!("Monitoring aborted: {}", e),
    }

    // The dashboard keeps serving the final session state, including an abort
    if let Some(server) = server {
        info!("Dashboard API still serving; press Ctrl-C to exit");
        tokio::select! {
            joined = server => joined.context("dashboard API task")??,
            _ = tokio::signal::ctrl_c() => info!("Shutting down"),
        }
    }

    result?;
    Ok(())
}
