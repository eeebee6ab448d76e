use eframe::egui;
use once_cell::sync::OnceCell;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayCommand {
    SetText(String),
    Quit,
}

/// Sender half used by the HTTP and signal threads to reach the UI thread.
///
/// Commands queue in a channel that the overlay drains every frame; once the
/// overlay has attached its [`egui::Context`], each send also requests a
/// repaint so the frame runs promptly.
#[derive(Clone)]
pub struct OverlayDispatcher {
    tx: Sender<OverlayCommand>,
    ctx: Arc<OnceCell<egui::Context>>,
}

impl OverlayDispatcher {
    pub fn channel() -> (Self, Receiver<OverlayCommand>) {
        let (tx, rx) = channel();
        (
            Self {
                tx,
                ctx: Arc::new(OnceCell::new()),
            },
            rx,
        )
    }

    /// Register the UI context. Later calls are ignored.
    pub fn attach(&self, ctx: egui::Context) {
        if self.ctx.set(ctx).is_err() {
            tracing::debug!("overlay context already attached");
        }
    }

    pub fn is_attached(&self) -> bool {
        self.ctx.get().is_some()
    }

    /// Queue `cmd` for the UI thread. Returns `false` if the overlay is gone.
    pub fn send(&self, cmd: OverlayCommand) -> bool {
        if self.tx.send(cmd).is_err() {
            return false;
        }
        if let Some(ctx) = self.ctx.get() {
            ctx.request_repaint();
        }
        true
    }
}
