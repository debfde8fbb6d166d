//! HTTP surface for prompt-to-UI generation.

pub mod error;
pub mod routes;

use std::future::IntoFuture;
use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::generate::GenerationBridge;
use crate::server::error::ApiError;
use crate::server::routes::{build_router, AppState};
use crate::shutdown::ShutdownHandle;

/// Attempted bind ports above the configured one before giving up.
const BIND_PORT_RANGE: u16 = 100;

pub fn init_tracing(log_level: Option<&str>, ansi: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.unwrap_or("info")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_ansi(ansi)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();
}

pub struct PreviewServer {
    state: AppState,
    bind_addr: String,
    shutdown: ShutdownHandle,
}

impl PreviewServer {
    /// Validates the configuration and prepares the shared state. The
    /// socket is bound by [`PreviewServer::run`].
    pub fn new(config: Config) -> Result<Self, ApiError> {
        config.validate()?;
        let bridge = GenerationBridge::new(config.provider.clone());
        Ok(Self {
            state: AppState::new(bridge),
            bind_addr: config.server.bind_addr.clone(),
            shutdown: ShutdownHandle::new(),
        })
    }

    pub fn handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Binds the configured address. When the port is taken, successive
    /// ports are tried up to [`BIND_PORT_RANGE`] above the configured one.
    async fn try_bind(&self) -> Result<TcpListener, ApiError> {
        let requested: SocketAddr = self.bind_addr.parse().map_err(|err| ApiError::Bind {
            addr: self.bind_addr.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, err),
        })?;

        let mut last_error = None;
        for offset in 0..=BIND_PORT_RANGE {
            let Some(port) = requested.port().checked_add(offset) else {
                break;
            };
            let candidate = SocketAddr::new(requested.ip(), port);
            match TcpListener::bind(candidate).await {
                Ok(listener) => {
                    if offset > 0 {
                        warn!(
                            requested = %requested,
                            bound = %candidate,
                            "Configured port was taken, bound the next free one"
                        );
                    }
                    return Ok(listener);
                }
                Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
                    last_error = Some(err);
                }
                Err(err) => {
                    return Err(ApiError::Bind {
                        addr: candidate.to_string(),
                        source: err,
                    });
                }
            }
        }

        Err(ApiError::Bind {
            addr: self.bind_addr.clone(),
            source: last_error.unwrap_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::AddrInUse, "no free port in range")
            }),
        })
    }

    pub async fn run(self) -> Result<(), ApiError> {
        let listener = self.try_bind().await?;
        let addr = listener.local_addr().map_err(|err| ApiError::Bind {
            addr: self.bind_addr.clone(),
            source: err,
        })?;
        info!("Preview server listening on {addr}");

        let app = build_router(self.state);
        let shutdown = self.shutdown.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.wait().await })
            .into_future()
            .await
            .map_err(|err| ApiError::Internal(format!("Server error: {err}")))?;

        info!("Shutting down gracefully");
        Ok(())
    }
}
