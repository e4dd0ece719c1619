use crate::config::Config;
use crate::core::orchestrator::Orchestrator;
use crate::errors::{AppError, AppResult};
use crate::transport::MqttSource;
use crate::utils::{Clock, SystemClock};
use std::sync::Arc;

/// Handle the `run` command
///
/// Configuration is validated before anything touches the network or the
/// log directory; a missing key ends the process with a non-zero status.
pub fn handle(cfg: &Config) -> AppResult<()> {
    let settings = cfg.settings()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(settings.timezone));
        let mut orchestrator = Orchestrator::from_settings(&settings, clock)?;

        log::info!(
            "Logging '{}' from {}:{} into {}",
            settings.broker.topic,
            settings.broker.host,
            settings.broker.port,
            orchestrator.journal().active_path().display()
        );

        let source = MqttSource::new(&settings.broker);
        let outcome = orchestrator.run(source, shutdown_signal()).await?;

        if outcome.skipped() {
            log::info!("Run skipped: the next invocation is due");
        }
        Ok::<(), AppError>(())
    })
}

/// Resolves on Ctrl-C, or SIGTERM on Unix. A handler that cannot be installed
/// never resolves, so the run falls back to its budget.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                log::warn!("Cannot listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
