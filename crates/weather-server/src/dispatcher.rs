//! Transport dispatcher: owns the process's listening resources.
//!
//! One dispatcher instance serves exactly one transport kind. The stdio
//! protocol needs exclusive control over its connection lifecycle, and
//! the HTTP router assumes stateless request/response semantics —
//! mounting one inside the other breaks session handling, so the two
//! are never combined on a listener. A deployment wanting both runs two
//! dispatcher instances on two listeners (in practice, two processes).

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::routes;
use crate::state::AppState;
use crate::stdio;

/// Which transport a dispatcher instance serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    /// JSON-RPC tool protocol over stdin/stdout.
    Stdio,
    /// REST routes over an HTTP listener.
    Http,
}

/// Dispatcher lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    Idle,
    Starting,
    Serving,
    Draining,
    Stopped,
}

/// Errors that prevent a transport from starting. All configuration
/// problems: nothing here is retryable at runtime.
#[derive(Debug, Error)]
pub enum ServeError {
    /// HTTP mode needs a bind address.
    #[error("http transport requires a bind address")]
    MissingBindAddress,

    /// A dispatcher serves one transport for its whole life; a second
    /// `start` would be a second transport on the same instance.
    #[error("dispatcher already started")]
    AlreadyStarted,

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
}

/// Owns the listening socket or stdio loop and the serving task.
pub struct Dispatcher {
    state: AppState,
    status_tx: watch::Sender<DispatcherState>,
    shutdown_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl Dispatcher {
    pub fn new(state: AppState) -> Self {
        let (status_tx, _) = watch::channel(DispatcherState::Idle);
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            state,
            status_tx,
            shutdown_tx,
            handle: None,
        }
    }

    /// Current lifecycle state.
    pub fn status(&self) -> DispatcherState {
        *self.status_tx.borrow()
    }

    /// Watch lifecycle transitions (used by `main` to notice the stdio
    /// transport ending on EOF).
    pub fn subscribe(&self) -> watch::Receiver<DispatcherState> {
        self.status_tx.subscribe()
    }

    /// Start serving the given transport.
    ///
    /// Fails closed: if the listener cannot be bound, no resource is
    /// left open and the state lands on `Stopped`.
    pub async fn start(
        &mut self,
        mode: TransportMode,
        bind_addr: Option<SocketAddr>,
    ) -> Result<(), ServeError> {
        if self.status() != DispatcherState::Idle {
            return Err(ServeError::AlreadyStarted);
        }
        self.status_tx.send_replace(DispatcherState::Starting);

        let shutdown_rx = self.shutdown_tx.subscribe();
        match mode {
            TransportMode::Http => {
                let Some(addr) = bind_addr else {
                    self.status_tx.send_replace(DispatcherState::Stopped);
                    return Err(ServeError::MissingBindAddress);
                };
                let listener = match TcpListener::bind(addr).await {
                    Ok(listener) => listener,
                    Err(source) => {
                        self.status_tx.send_replace(DispatcherState::Stopped);
                        return Err(ServeError::Bind { addr, source });
                    }
                };
                info!(%addr, "http transport listening");

                let app = routes::router(self.state.clone());
                let status_tx = self.status_tx.clone();
                let mut shutdown_rx = shutdown_rx;
                // Serving is declared before the task runs so a
                // transport that ends immediately still lands on
                // Stopped, not a stale Serving.
                self.status_tx.send_replace(DispatcherState::Serving);
                self.handle = Some(tokio::spawn(async move {
                    let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
                        // Either a stop() signal or the sender dropping
                        // ends the accept loop.
                        let _ = shutdown_rx.changed().await;
                    });
                    if let Err(e) = serve.await {
                        error!(error = %e, "http transport failed");
                    }
                    status_tx.send_replace(DispatcherState::Stopped);
                }));
            }
            TransportMode::Stdio => {
                let state = self.state.clone();
                let status_tx = self.status_tx.clone();
                self.status_tx.send_replace(DispatcherState::Serving);
                self.handle = Some(tokio::spawn(async move {
                    stdio::serve(state, shutdown_rx).await;
                    status_tx.send_replace(DispatcherState::Stopped);
                }));
            }
        }

        Ok(())
    }

    /// Stop accepting new calls, give in-flight ones `grace` to finish,
    /// then abort whatever remains.
    pub async fn stop(&mut self, grace: Duration) {
        match self.status() {
            DispatcherState::Serving => {}
            DispatcherState::Stopped => return,
            _ => {
                self.status_tx.send_replace(DispatcherState::Stopped);
                return;
            }
        }

        self.status_tx.send_replace(DispatcherState::Draining);
        let _ = self.shutdown_tx.send(true);

        if let Some(mut handle) = self.handle.take() {
            match tokio::time::timeout(grace, &mut handle).await {
                Ok(_) => info!("transport drained cleanly"),
                Err(_) => {
                    warn!(grace_secs = grace.as_secs(), "grace deadline passed, aborting in-flight calls");
                    handle.abort();
                }
            }
        }

        self.status_tx.send_replace(DispatcherState::Stopped);
    }
}
