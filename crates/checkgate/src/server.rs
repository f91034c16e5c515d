//! `CheckgateServer` builder and server loop.
//!
//! This is the entry point for running a Checkgate server. It ties
//! together all the layers: HTTP → session → store.

use std::future::Future;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use checkgate_session::{SessionConfig, SessionLifecycleManager, ShutdownCoordinator, ShutdownReport};
use checkgate_store::KeyValueStore;

use crate::handler::router;
use crate::signal::shutdown_signal;
use crate::CheckgateError;

/// Builder for configuring and starting a Checkgate server.
///
/// # Example
///
/// ```rust,ignore
/// use checkgate::prelude::*;
///
/// let server = CheckgateServer::builder()
///     .bind("0.0.0.0:3001")
///     .build(MemoryStore::new())
///     .await?;
/// server.run().await
/// ```
pub struct CheckgateServerBuilder {
    bind_addr: String,
    session_config: SessionConfig,
    report_interval: Duration,
}

impl CheckgateServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3001".to_string(),
            session_config: SessionConfig::default(),
            report_interval: Duration::from_secs(30),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Sets how often the number of active sessions is logged.
    pub fn report_interval(mut self, interval: Duration) -> Self {
        self.report_interval = interval;
        self
    }

    /// Binds the listener and sets up the session layer on `store`.
    pub async fn build<S: KeyValueStore>(
        self,
        store: S,
    ) -> Result<CheckgateServer<S>, CheckgateError> {
        let listener = TcpListener::bind(&self.bind_addr).await.inspect_err(|e| {
            tracing::error!(addr = %self.bind_addr, error = %e, "failed to bind");
        })?;

        Ok(CheckgateServer {
            listener,
            manager: SessionLifecycleManager::new(store, self.session_config),
            report_interval: self.report_interval,
        })
    }
}

impl Default for CheckgateServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Checkgate server.
///
/// Call [`run()`](Self::run) to start serving requests.
pub struct CheckgateServer<S> {
    listener: TcpListener,
    manager: SessionLifecycleManager<S>,
    report_interval: Duration,
}

impl CheckgateServer<()> {
    /// Creates a new builder.
    pub fn builder() -> CheckgateServerBuilder {
        CheckgateServerBuilder::new()
    }
}

impl<S: KeyValueStore> CheckgateServer<S> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// The session layer behind the routes.
    pub fn manager(&self) -> &SessionLifecycleManager<S> {
        &self.manager
    }

    /// Serves until SIGINT or SIGTERM, then cleans up every session.
    pub async fn run(self) -> Result<(), CheckgateError> {
        self.run_until(shutdown_signal()).await.map(|_| ())
    }

    /// Serves until `shutdown` resolves, then cleans up every session.
    ///
    /// In-flight requests finish before cleanup starts. Returns what the
    /// cleanup did.
    pub async fn run_until<F>(self, shutdown: F) -> Result<ShutdownReport, CheckgateError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Self {
            listener,
            manager,
            report_interval,
        } = self;

        if let Ok(addr) = listener.local_addr() {
            tracing::info!(%addr, "Checkgate server running");
        }

        let reporter = spawn_reporter(manager.clone(), report_interval);
        let served = axum::serve(listener, router(manager.clone()))
            .with_graceful_shutdown(shutdown)
            .await;
        reporter.abort();

        tracing::info!("shutting down");
        // Clean up even if serving failed: the codes are still in the store.
        let report = ShutdownCoordinator::new(manager).run().await;
        served.inspect_err(|e| tracing::error!(error = %e, "server error"))?;
        Ok(report)
    }
}

/// Logs the number of active sessions every `interval`.
fn spawn_reporter<S: KeyValueStore>(
    manager: SessionLifecycleManager<S>,
    interval: Duration,
) -> JoinHandle<()> {
    let period = interval.max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            tracing::info!(active_sessions = manager.active_sessions(), "active sessions");
        }
    })
}
