use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::Instant;

use sheetsync_core::{config, EngineConfig, FileOrderStore};
use sheetsync_engine::{run_cycle_at, RowIndexCache};
use sheetsync_sheets::RestSheetsClient;

use crate::error::{io_err, DaemonError};

/// Start the scheduler runtime and block the current thread until it exits.
pub fn start_blocking(home: &Path) -> Result<(), DaemonError> {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(home.to_path_buf()))
}

/// Run the scheduler runtime until shutdown.
pub async fn run(home: PathBuf) -> Result<(), DaemonError> {
    let engine_config = config::load_at(&home)?;
    let period = Duration::from_secs(engine_config.cycle_interval_secs.max(1));
    tracing::info!(
        interval_secs = period.as_secs(),
        home = %home.display(),
        "sheetsync scheduler starting",
    );

    let (shutdown_tx, _) = broadcast::channel::<()>(16);

    let scheduler_handle = {
        let shutdown = shutdown_tx.clone();
        let home = home.clone();
        tokio::spawn(async move {
            let result = scheduler_task(home, engine_config, period, shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            let mut shutdown_rx = shutdown.subscribe();
            tokio::select! {
                _ = shutdown_rx.recv() => Ok(()),
                signal = tokio::signal::ctrl_c() => {
                    match signal {
                        Ok(()) => {
                            tracing::info!("received ctrl-c, shutting down scheduler");
                            let _ = shutdown.send(());
                            Ok(())
                        }
                        Err(err) => Err(DaemonError::Runtime(format!("ctrl-c handler failed: {err}"))),
                    }
                }
            }
        })
    };

    let (scheduler_result, signal_result) = tokio::join!(scheduler_handle, signal_handle);
    handle_join("scheduler", scheduler_result)?;
    handle_join("signal_handler", signal_result)?;
    Ok(())
}

async fn scheduler_task(
    home: PathBuf,
    config: EngineConfig,
    period: Duration,
    shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    // The locate cache survives across ticks; a verified hit saves a
    // full key-column scan per already-seen order.
    let cache = Arc::new(Mutex::new(RowIndexCache::new()));

    run_ticks(period, shutdown_rx, move || {
        let home = home.clone();
        let config = config.clone();
        let cache = cache.clone();
        async move {
            run_scheduled_cycle(home, config, cache).await;
        }
    })
    .await;
    Ok(())
}

/// Tick loop: fires `on_tick` immediately, then every `period`, until the
/// shutdown channel signals. Missed ticks are skipped, not bunched — a
/// cycle slower than the cadence must not queue a burst behind itself.
async fn run_ticks<F, Fut>(
    period: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
    mut on_tick: F,
) where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            _ = interval.tick() => on_tick().await,
        }
    }
}

/// One scheduled cycle. Every failure mode is logged and swallowed — the
/// scheduler itself only dies on shutdown.
async fn run_scheduled_cycle(
    home: PathBuf,
    config: EngineConfig,
    cache: Arc<Mutex<RowIndexCache>>,
) {
    let started = Instant::now();

    let result = tokio::task::spawn_blocking(move || {
        let store = FileOrderStore::new(&home);
        let mut cache = cache.lock().expect("locate cache mutex");
        run_cycle_at(
            &home,
            &store,
            || RestSheetsClient::from_env(&config),
            &config,
            &mut cache,
            false,
        )
    })
    .await;

    match result {
        Ok(Ok(report)) if report.skipped => {
            tracing::info!("cycle skipped: previous run still holds the sync lock");
        }
        Ok(Ok(report)) => {
            tracing::info!(
                synced = report.synced(),
                failed = report.failed(),
                records = report.outcomes.len(),
                duration_ms = started.elapsed().as_millis() as u64,
                "sync cycle completed",
            );
        }
        Ok(Err(err)) => {
            // Setup/store failure: no records were touched; retry next tick.
            tracing::error!(error = %err, "sync cycle failed");
        }
        Err(join_err) => {
            tracing::error!(error = %join_err, "sync cycle task panicked");
        }
    }
}

fn handle_join(
    task: &str,
    result: Result<Result<(), DaemonError>, tokio::task::JoinError>,
) -> Result<(), DaemonError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(DaemonError::Runtime(format!(
            "{task} task join failure: {err}"
        ))),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
