mod args;
mod config;
mod dirs;
mod logging;

use std::error::Error;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use app_api::AppContext;
use clap::Parser;
use http_api::HttpState;
use points_app::{AppConfig, AppPaths, AppState, ensure_app_data_dir};
use tracing::{info, warn};

use crate::args::CliArgs;

fn main() -> Result<(), Box<dyn Error>> {
    let args = CliArgs::parse();

    let config = config::load_or_create().map_err(io::Error::other)?;
    logging::init(args.log_format.unwrap_or(config.config.log_format));
    if config.created {
        info!(path = %config.paths.file.display(), "created default config");
    }

    let data_dir = dirs::resolve_data_dir(args.data_dir).map_err(io::Error::other)?;
    info!(data_dir = %data_dir.display(), "using data dir");
    let paths = AppPaths::new(data_dir);
    ensure_app_data_dir(&paths)?;

    let mut app_config = AppConfig::new(paths.db_path.clone());
    app_config.feed_endpoint = config.config.feed_endpoint.clone();
    // The feed wraps a blocking HTTP client: build it, and let its last
    // handle drop, outside the async runtime.
    let app_state = AppState::new(app_config)?;
    app_state
        .initialize()
        .map_err(|err| io::Error::other(format!("failed to initialize database: {}", err)))?;

    let port = args.port.unwrap_or(config.config.port);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(serve(app_state.clone(), paths.app_data_dir, port));
    app_state.services.scheduler.stop();
    drop(runtime);
    result
}

async fn serve(app_state: AppState, app_data_dir: PathBuf, port: u16) -> Result<(), Box<dyn Error>> {
    if let Err(err) = app_state.start_scheduler() {
        warn!(error = %err, "failed to start auto sync timer");
    }

    let context = AppContext {
        app_state,
        app_data_dir,
    };
    let router = http_api::router(HttpState::new(context));

    let (listener, actual_port, used_fallback) = bind_port(port).await?;
    if used_fallback {
        warn!(port, actual_port, "configured port unavailable; using fallback for this run");
    }

    println!("Points monitor is listening on http://127.0.0.1:{actual_port}");
    println!("Press Ctrl+C to stop.");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn bind_port(port: u16) -> Result<(tokio::net::TcpListener, u16, bool), io::Error> {
    if port == 0 {
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let actual_port = listener.local_addr()?.port();
        return Ok((listener, actual_port, false));
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => Ok((listener, port, false)),
        Err(_) => {
            let listener =
                tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
            let actual_port = listener.local_addr()?.port();
            Ok((listener, actual_port, true))
        }
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
