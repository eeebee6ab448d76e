use crate::hotkey::{Hotkey, HotkeyTrigger};
use crate::overlay::dispatch::OverlayCommand;
use crate::overlay::layout::{split_halves, OverlayGeometry};
use crate::overlay::OverlayConfig;
use crate::settings::OverlaySettings;
use crate::shutdown::{Shutdown, ShutdownReason};
use eframe::egui;
use std::sync::mpsc::Receiver;
use std::time::Duration;

// Signals and global hotkeys only flip flags; this bounds how long the UI
// takes to notice them when no repaint was requested.
const IDLE_POLL: Duration = Duration::from_millis(250);

/// What the overlay currently shows, independent of any window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayState {
    text: String,
    quit_requested: bool,
}

impl OverlayState {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quit_requested: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn apply(&mut self, cmd: OverlayCommand) {
        match cmd {
            OverlayCommand::SetText(text) => {
                tracing::debug!(%text, "overlay text updated");
                self.text = text;
            }
            OverlayCommand::Quit => self.quit_requested = true,
        }
    }

    /// Apply every queued command. Returns the number applied.
    pub fn drain(&mut self, rx: &Receiver<OverlayCommand>) -> usize {
        let mut applied = 0;
        for cmd in rx.try_iter() {
            self.apply(cmd);
            applied += 1;
        }
        applied
    }
}

/// Whether any of `events` fires one of `hotkeys`.
pub fn hotkey_in_events(events: &[egui::Event], hotkeys: &[Hotkey]) -> bool {
    events.iter().any(|event| match event {
        egui::Event::Key {
            key,
            pressed: true,
            modifiers,
            ..
        } => hotkeys.iter().any(|hk| hk.matches(*modifiers, *key)),
        // Ctrl+C usually arrives as a copy event rather than a key press.
        egui::Event::Copy => hotkeys.iter().any(|hk| hk.key == egui::Key::C && hk.ctrl),
        _ => false,
    })
}

pub struct OverlayApp {
    state: OverlayState,
    rx: Receiver<OverlayCommand>,
    shutdown: Shutdown,
    quit_hotkeys: Vec<Hotkey>,
    global_trigger: HotkeyTrigger,
    settings: OverlaySettings,
    geometry: Option<OverlayGeometry>,
    closing: bool,
}

impl OverlayApp {
    /// Build the app for `ctx` and attach `ctx` to the dispatcher so later
    /// sends wake this window.
    pub fn new(ctx: &egui::Context, config: OverlayConfig, global_trigger: HotkeyTrigger) -> Self {
        let OverlayConfig {
            initial_text,
            settings,
            quit_hotkeys,
            dispatcher,
            commands,
            shutdown,
        } = config;

        dispatcher.attach(ctx.clone());
        tracing::info!(text = %initial_text, "overlay created");
        Self {
            state: OverlayState::new(initial_text),
            rx: commands,
            shutdown,
            quit_hotkeys,
            global_trigger,
            settings,
            geometry: None,
            closing: false,
        }
    }

    fn text_color(&self) -> egui::Color32 {
        let [r, g, b] = self.settings.text_color;
        egui::Color32::from_rgb(r, g, b).gamma_multiply(self.settings.alpha.clamp(0.0, 1.0))
    }

    /// Stretch the window across the monitor once its size is known.
    fn sync_geometry(&mut self, ctx: &egui::Context) {
        if self.geometry.is_some() {
            return;
        }
        let Some(monitor_size) = ctx.input(|i| i.viewport().monitor_size) else {
            return;
        };
        let geometry = OverlayGeometry::for_monitor(monitor_size, &self.settings);
        tracing::debug!(?geometry, "positioning overlay");
        ctx.send_viewport_cmd(egui::ViewportCommand::OuterPosition(geometry.position));
        ctx.send_viewport_cmd(egui::ViewportCommand::InnerSize(geometry.size));
        self.geometry = Some(geometry);
    }

    fn current_geometry(&self, ctx: &egui::Context) -> OverlayGeometry {
        self.geometry.unwrap_or_else(|| {
            let window = ctx.screen_rect().size();
            let mut geometry = OverlayGeometry::for_monitor(window, &self.settings);
            geometry.size = window;
            geometry
        })
    }

    fn paint(&self, ctx: &egui::Context) {
        let geometry = self.current_geometry(ctx);
        let (left, right) = split_halves(self.state.text());
        let color = self.text_color();
        let font = egui::FontId::proportional(self.settings.font_size);

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let painter = ui.painter();
                painter.with_clip_rect(geometry.left).text(
                    geometry.left.left_center(),
                    egui::Align2::LEFT_CENTER,
                    left,
                    font.clone(),
                    color,
                );
                painter.with_clip_rect(geometry.right).text(
                    geometry.right.right_center(),
                    egui::Align2::RIGHT_CENTER,
                    right,
                    font,
                    color,
                );
            });
    }
}

impl eframe::App for OverlayApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.drain(&self.rx);

        let local_hotkey = ctx.input(|i| hotkey_in_events(&i.events, &self.quit_hotkeys));
        if local_hotkey || self.global_trigger.take() {
            self.shutdown.trigger(ShutdownReason::Hotkey);
        }
        if self.shutdown.is_triggered() {
            self.state.apply(OverlayCommand::Quit);
        }

        if self.state.quit_requested() {
            if !self.closing {
                tracing::info!("closing overlay");
                self.closing = true;
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            return;
        }

        self.sync_geometry(ctx);
        self.paint(ctx);
        ctx.request_repaint_after(IDLE_POLL);
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        egui::Rgba::TRANSPARENT.to_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hotkey::parse_hotkey;
    use crate::overlay::dispatch::OverlayDispatcher;

    fn key_event(key: egui::Key, modifiers: egui::Modifiers) -> egui::Event {
        egui::Event::Key {
            key,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers,
        }
    }

    #[test]
    fn last_text_in_a_batch_wins() {
        let (dispatcher, rx) = OverlayDispatcher::channel();
        dispatcher.send(OverlayCommand::SetText("one".into()));
        dispatcher.send(OverlayCommand::SetText("two".into()));

        let mut state = OverlayState::new("READY");
        assert_eq!(state.drain(&rx), 2);
        assert_eq!(state.text(), "two");
        assert!(!state.quit_requested());
    }

    #[test]
    fn new_takes_its_pieces_from_one_config() {
        let (dispatcher, commands) = OverlayDispatcher::channel();
        let shutdown = Shutdown::new();
        let config = OverlayConfig {
            initial_text: "READY".into(),
            settings: OverlaySettings::default(),
            quit_hotkeys: vec![parse_hotkey("Escape").unwrap()],
            dispatcher: dispatcher.clone(),
            commands,
            shutdown: shutdown.clone(),
        };

        let ctx = egui::Context::default();
        let mut app = OverlayApp::new(&ctx, config, HotkeyTrigger::new());
        assert!(dispatcher.is_attached());
        assert_eq!(app.state.text(), "READY");
        assert_eq!(app.quit_hotkeys.len(), 1);

        dispatcher.send(OverlayCommand::SetText("next".into()));
        app.state.drain(&app.rx);
        assert_eq!(app.state.text(), "next");
        assert!(!shutdown.is_triggered());
    }

    #[test]
    fn quit_command_is_sticky() {
        let mut state = OverlayState::new("READY");
        state.apply(OverlayCommand::Quit);
        state.apply(OverlayCommand::SetText("later".into()));
        assert!(state.quit_requested());
        assert_eq!(state.text(), "later");
    }

    #[test]
    fn escape_and_ctrl_c_match_default_hotkeys() {
        let hotkeys = vec![parse_hotkey("Escape").unwrap(), parse_hotkey("Ctrl+C").unwrap()];

        let escape = [key_event(egui::Key::Escape, egui::Modifiers::NONE)];
        assert!(hotkey_in_events(&escape, &hotkeys));

        let ctrl_c = [key_event(egui::Key::C, egui::Modifiers::CTRL)];
        assert!(hotkey_in_events(&ctrl_c, &hotkeys));

        assert!(hotkey_in_events(&[egui::Event::Copy], &hotkeys));
    }

    #[test]
    fn plain_letters_do_not_quit() {
        let hotkeys = vec![parse_hotkey("Ctrl+C").unwrap()];
        let plain_c = [key_event(egui::Key::C, egui::Modifiers::NONE)];
        assert!(!hotkey_in_events(&plain_c, &hotkeys));
        assert!(!hotkey_in_events(&[egui::Event::Copy], &[parse_hotkey("Escape").unwrap()]));
    }
}
