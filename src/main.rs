use std::process::ExitCode;
use std::sync::Arc;

use fatalvisor::{Config, Listener, LogWriter, Subscribe};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout belongs to the supervisor protocol.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> ExitCode {
    init_logging();

    let cfg = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(label = e.as_label(), "{e}");
            return ExitCode::FAILURE;
        }
    };

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        tmp_dir = %cfg.tmp_dir.display(),
        log_dir = %cfg.log_dir.display(),
        "listening for PROCESS_STATE_FATAL"
    );

    let res = rt.block_on(async move {
        let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
        Listener::builder(cfg)
            .with_subscribers(subs)
            .build()
            .run_until_shutdown()
            .await
    });

    // A blocked stdin read would otherwise hold the runtime open.
    rt.shutdown_background();

    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_transport() => {
            tracing::error!(label = e.as_label(), "supervisor channel lost: {}", e.as_message());
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!(label = e.as_label(), "{}", e.as_message());
            ExitCode::FAILURE
        }
    }
}
