//! Waymark Daemon
//!
//! Serves the capture and admin HTTP surface and supervises the tunnel
//! provider cascade that makes the local listener publicly reachable.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use waymark_daemon::server::{self, AppState};
use waymark_daemon::storage::LocationStore;
use waymark_daemon::tunnel::{TunnelSettings, TunnelState, TunnelSupervisor};

#[derive(Parser, Debug)]
#[command(name = "waymark-daemon")]
#[command(version, about = "Waymark location collector daemon")]
struct Args {
    /// TCP port to bind (all interfaces).
    #[arg(long, default_value_t = 8080, env = "PORT")]
    port: u16,

    /// Skip the tunnel provider cascade and serve locally only.
    #[arg(long, env = "WAYMARK_NO_TUNNEL")]
    no_tunnel: bool,

    /// Log level filter for the daemon (e.g. "info", "debug", "warn").
    #[arg(long, default_value = "info", env = "WAYMARK_LOG_LEVEL")]
    log_level: String,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long, env = "WAYMARK_LOG_JSON")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    waymark_core::tracing_init::init_tracing(&args.log_level, args.log_json);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = args.port,
        tunnel = !args.no_tunnel,
        "Starting waymark-daemon"
    );

    let store = Arc::new(LocationStore::new());
    let tunnel = Arc::new(TunnelState::new());

    let state = AppState {
        store,
        tunnel: Arc::clone(&tunnel),
    };
    let app = server::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind listener on {addr}"))?;

    info!(addr = %addr, "Collector listening");
    info!(url = %format!("http://localhost:{}/admin", args.port), "Admin panel");

    // The cascade runs outside the request-handling pool; its failures only
    // ever reach handlers as an unestablished or stale URL.
    if args.no_tunnel {
        info!("Tunnel cascade disabled; serving locally only");
    } else {
        let supervisor =
            TunnelSupervisor::new(TunnelSettings::defaults(args.port), args.port, tunnel);
        tokio::spawn(supervisor.run());
    }

    // Notify systemd that the daemon is ready to serve (unix only). The
    // `true` parameter unsets $NOTIFY_SOCKET so tunnel provider subprocesses
    // don't accidentally notify systemd.
    #[cfg(unix)]
    sd_notify::notify(true, &[sd_notify::NotifyState::Ready])?;

    #[cfg(unix)]
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    #[cfg(unix)]
    let sigterm_future = sigterm.recv();
    #[cfg(not(unix))]
    let sigterm_future = std::future::pending::<Option<()>>();

    let serve = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    );

    tokio::select! {
        result = serve.into_future() => {
            result.context("HTTP server error")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C shutdown signal");
        }
        _ = sigterm_future => {
            info!("Received SIGTERM shutdown signal");
        }
    }

    info!("Daemon stopped");
    Ok(())
}
