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

pub mod adapters;
pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod storage;
pub mod telemetry;

use crate::adapters::spotify::SpotifyClient;
use crate::api::ServiceContainer;
use crate::config::Config;
use crate::services::auth_service::AuthService;
use crate::services::library_service::LibraryService;
use crate::services::platform::MusicPlatform;
use crate::services::token_service::TokenService;
use crate::storage::SessionStore;
use std::sync::Arc;
use tokio::sync::watch;

/// Wires services together. Without an explicit platform the Spotify client is built from config.
#[derive(Debug)]
pub struct AppBuilder {
    config: Config,
    platform: Option<Arc<dyn MusicPlatform>>,
}

impl AppBuilder {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config, platform: None }
    }

    #[must_use]
    pub fn with_platform(mut self, platform: Arc<dyn MusicPlatform>) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Builds the application router.
    ///
    /// # Errors
    /// Returns an error if the default Spotify client cannot be constructed.
    pub fn build(self) -> anyhow::Result<axum::Router> {
        if self.config.spotify.credentials().is_none() {
            tracing::warn!("Spotify credentials not configured; /login will fail until they are set");
        }

        let platform: Arc<dyn MusicPlatform> = match self.platform {
            Some(platform) => platform,
            None => Arc::new(SpotifyClient::new(self.config.spotify.clone())?),
        };

        let sessions = SessionStore::new(self.config.session.session_ttl_secs);
        let services = ServiceContainer {
            sessions,
            auth_service: AuthService::new(self.config.spotify.clone(), Arc::clone(&platform)),
            token_service: TokenService::new(Arc::clone(&platform)),
            library_service: LibraryService::new(platform),
        };

        Ok(api::app_router(self.config, services))
    }
}

/// Routes panics through tracing so they land in the structured log.
pub fn setup_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let payload = panic_info.payload();
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        let location = panic_info.location().map(ToString::to_string).unwrap_or_default();

        tracing::error!(panic.message = %message, panic.location = %location, "Process panicked");
    }));
}

/// Flips `shutdown_tx` to `true` on Ctrl-C or, on Unix, SIGTERM.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to listen for SIGTERM");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => tracing::info!("Received Ctrl-C, shutting down"),
            () = terminate => tracing::info!("Received SIGTERM, shutting down"),
        }

        let _ = shutdown_tx.send(true);
    });
}
