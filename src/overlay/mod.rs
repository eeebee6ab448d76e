pub mod app;
pub mod dispatch;
pub mod layout;

pub use app::{OverlayApp, OverlayState};
pub use dispatch::{OverlayCommand, OverlayDispatcher};
pub use layout::{split_halves, OverlayGeometry};

use crate::hotkey::{start_global_listener, Hotkey, HotkeyTrigger};
use crate::settings::OverlaySettings;
use crate::shutdown::Shutdown;
use anyhow::anyhow;
use eframe::egui;
use std::sync::mpsc::Receiver;

const WINDOW_TITLE: &str = "text_overlay";
// Placeholder size until the first frame reports the monitor size.
const INITIAL_WIDTH: f32 = 800.0;

/// Everything the overlay needs from the rest of the process.
pub struct OverlayConfig {
    pub initial_text: String,
    pub settings: OverlaySettings,
    pub quit_hotkeys: Vec<Hotkey>,
    pub dispatcher: OverlayDispatcher,
    pub commands: Receiver<OverlayCommand>,
    pub shutdown: Shutdown,
}

/// Run the overlay event loop on the calling thread until the window closes.
pub fn run_overlay(config: OverlayConfig) -> anyhow::Result<()> {
    let global_trigger = HotkeyTrigger::new();
    let waker = config.dispatcher.clone();
    start_global_listener(config.quit_hotkeys.clone(), global_trigger.clone(), move || {
        waker.send(OverlayCommand::Quit);
    });

    let settings = &config.settings;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size([INITIAL_WIDTH, settings.height])
            .with_position([settings.margin, 0.0])
            .with_decorations(false)
            .with_transparent(true)
            .with_always_on_top()
            .with_mouse_passthrough(true)
            .with_resizable(false)
            .with_taskbar(false),
        ..Default::default()
    };

    eframe::run_native(
        WINDOW_TITLE,
        native_options,
        Box::new(move |cc| {
            Box::new(OverlayApp::new(&cc.egui_ctx, config, global_trigger))
        }),
    )
    .map_err(|e| anyhow!("failed to run overlay window: {e}"))
}
