use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tokio::sync::watch;

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// SIGINT / SIGTERM (or Ctrl+C in a console on Windows).
    Signal,
    /// A quit hotkey was pressed.
    Hotkey,
    /// The overlay window went away.
    WindowClosed,
    /// The HTTP server stopped on its own.
    ServerFailed,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownReason::Signal => write!(f, "signal"),
            ShutdownReason::Hotkey => write!(f, "hotkey"),
            ShutdownReason::WindowClosed => write!(f, "window closed"),
            ShutdownReason::ServerFailed => write!(f, "server failed"),
        }
    }
}

struct ShutdownInner {
    flag: AtomicBool,
    reason: Mutex<Option<ShutdownReason>>,
    tx: watch::Sender<bool>,
}

/// Process-wide one-shot shutdown flag shared by the HTTP thread, the signal
/// listener and the overlay.
#[derive(Clone)]
pub struct Shutdown {
    inner: Arc<ShutdownInner>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            inner: Arc::new(ShutdownInner {
                flag: AtomicBool::new(false),
                reason: Mutex::new(None),
                tx,
            }),
        }
    }

    /// Request shutdown. Only the first call has an effect; it returns `true`
    /// for that call. The reason is recorded before the flag is raised, so
    /// `reason()` is always set once `is_triggered()` returns `true`.
    pub fn trigger(&self, reason: ShutdownReason) -> bool {
        let mut guard = self
            .inner
            .reason
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if guard.is_some() {
            tracing::debug!(%reason, "shutdown already requested");
            return false;
        }
        *guard = Some(reason);
        self.inner.flag.store(true, Ordering::SeqCst);
        drop(guard);

        tracing::info!(%reason, "shutting down");
        self.inner.tx.send_replace(true);
        true
    }

    pub fn is_triggered(&self) -> bool {
        self.inner.flag.load(Ordering::SeqCst)
    }

    pub fn reason(&self) -> Option<ShutdownReason> {
        *self
            .inner
            .reason
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Resolves once shutdown has been triggered.
    pub async fn wait(&self) {
        let mut rx = self.inner.tx.subscribe();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Block the calling thread until shutdown has been triggered.
    pub fn wait_blocking(&self) {
        while !self.is_triggered() {
            thread::sleep(WAIT_POLL_INTERVAL);
        }
    }
}

/// Trigger `shutdown` when the process receives SIGINT or SIGTERM.
#[cfg(unix)]
pub async fn listen_for_signals(shutdown: Shutdown) -> anyhow::Result<()> {
    use anyhow::Context;
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint =
        signal(SignalKind::interrupt()).context("failed to install SIGINT handler")?;
    let mut sigterm =
        signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;

    tokio::select! {
        _ = sigint.recv() => {
            tracing::info!("received SIGINT");
            shutdown.trigger(ShutdownReason::Signal);
        }
        _ = sigterm.recv() => {
            tracing::info!("received SIGTERM");
            shutdown.trigger(ShutdownReason::Signal);
        }
        _ = shutdown.wait() => {}
    }
    Ok(())
}

/// Trigger `shutdown` when the console receives Ctrl+C.
#[cfg(not(unix))]
pub async fn listen_for_signals(shutdown: Shutdown) -> anyhow::Result<()> {
    use anyhow::Context;

    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            res.context("failed to listen for Ctrl+C")?;
            tracing::info!("received Ctrl+C");
            shutdown.trigger(ShutdownReason::Signal);
        }
        _ = shutdown.wait() => {}
    }
    Ok(())
}
