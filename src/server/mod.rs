pub mod handlers;

use crate::overlay::{OverlayCommand, OverlayDispatcher};
use crate::shutdown::{listen_for_signals, Shutdown, ShutdownReason};
use crate::text::SharedText;
use anyhow::{anyhow, Context, Result};
use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

const JOIN_POLL: Duration = Duration::from_millis(10);
const ALLOWED_METHODS: &str = "GET, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type";

/// State shared by the handlers.
#[derive(Clone)]
pub struct DrawState {
    pub text: SharedText,
    pub dispatcher: OverlayDispatcher,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub enable_cors: bool,
}

/// Build the router serving `/draw`.
pub fn router(state: DrawState, enable_cors: bool) -> Router {
    let app = Router::new()
        .route("/draw", get(handlers::draw).options(handlers::preflight))
        .fallback(handlers::fallback)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        // CorsLayer only sends Allow-Methods / Allow-Headers on preflight;
        // every other response (200 and 404 alike) carries them as well.
        app.layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        ))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE]),
        )
    } else {
        app
    }
}

/// Running HTTP server thread.
pub struct ServerHandle {
    local_addr: SocketAddr,
    thread: JoinHandle<()>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait up to `timeout` for the server thread to exit. Returns `false` if it
    /// is still running; the thread is then left detached.
    pub fn join_timeout(self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.thread.is_finished() {
            if Instant::now() >= deadline {
                tracing::warn!("server thread did not stop within {:?}", timeout);
                return false;
            }
            thread::sleep(JOIN_POLL);
        }
        if self.thread.join().is_err() {
            tracing::error!("server thread panicked");
        }
        true
    }
}

/// Bind the listener and serve on a dedicated thread until `shutdown` fires.
///
/// Bind errors are returned here rather than from the thread. When the
/// server stops, shutdown is triggered (if nothing else did) and the overlay
/// is told to quit.
pub fn spawn(config: ServerConfig, state: DrawState, shutdown: Shutdown) -> Result<ServerHandle> {
    let (ready_tx, ready_rx) = mpsc::channel::<Result<SocketAddr>>();

    let thread = thread::Builder::new()
        .name("draw-server".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    let _ = ready_tx.send(Err(anyhow!("failed to build tokio runtime: {e}")));
                    return;
                }
            };

            runtime.block_on(async move {
                let listener = match tokio::net::TcpListener::bind(config.bind_addr)
                    .await
                    .with_context(|| format!("failed to bind {}", config.bind_addr))
                {
                    Ok(listener) => listener,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let local_addr = match listener.local_addr() {
                    Ok(addr) => addr,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.into()));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(local_addr));
                log_banner(local_addr);

                let dispatcher = state.dispatcher.clone();
                let app = router(state, config.enable_cors);

                let signals = tokio::spawn(listen_for_signals(shutdown.clone()));

                let graceful = shutdown.clone();
                let served = axum::serve(listener, app)
                    .with_graceful_shutdown(async move { graceful.wait().await })
                    .await;

                match served {
                    Ok(()) => tracing::info!("Server stopped"),
                    Err(e) => tracing::error!("Server error: {e}"),
                }
                shutdown.trigger(ShutdownReason::ServerFailed);
                dispatcher.send(OverlayCommand::Quit);

                match signals.await {
                    Ok(Err(e)) => tracing::warn!("signal listener failed: {e:#}"),
                    Err(e) => tracing::warn!("signal listener task failed: {e}"),
                    Ok(Ok(())) => {}
                }
            });
        })
        .context("failed to spawn server thread")?;

    let local_addr = ready_rx
        .recv()
        .map_err(|_| anyhow!("server thread exited before binding"))??;

    Ok(ServerHandle { local_addr, thread })
}

fn log_banner(addr: SocketAddr) {
    let port = addr.port();
    tracing::info!("Server started at http://localhost:{port}");
    tracing::info!("Use /draw?text=your_text to display text on the screen");
    tracing::info!("Example: curl 'http://localhost:{port}/draw?text=Hello%20World'");
    tracing::info!("Press Ctrl+C or Escape to quit");
}
