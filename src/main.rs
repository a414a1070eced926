#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

use spotify_relay::config::Config;
use spotify_relay::{AppBuilder, telemetry};
use std::net::SocketAddr;
use tokio::sync::watch;
use tracing::Instrument;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();
    let telemetry_guard = telemetry::init_telemetry(&config.telemetry)?;

    spotify_relay::setup_panic_hook();

    let boot_span = tracing::info_span!("boot_server");
    let (listener, router, shutdown_rx) = async {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        spotify_relay::spawn_signal_handler(shutdown_tx);

        let router = AppBuilder::new(config.clone()).build()?;

        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(address = %addr, redirect_uri = %config.spotify.redirect_uri, "listening");

        Ok::<(tokio::net::TcpListener, axum::Router, watch::Receiver<bool>), anyhow::Error>((
            listener,
            router,
            shutdown_rx,
        ))
    }
    .instrument(boot_span)
    .await?;

    let mut server_rx = shutdown_rx;
    let server = axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async move {
            let _ = server_rx.wait_for(|&s| s).await;
        });

    if let Err(e) = server.await {
        tracing::error!(error = %e, "Server error");
    }

    tracing::info!("Server stopped");
    telemetry_guard.shutdown();
    Ok(())
}
