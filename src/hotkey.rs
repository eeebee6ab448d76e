use eframe::egui::{Key, Modifiers};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hotkey {
    pub key: Key,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Default for Hotkey {
    fn default() -> Self {
        Self {
            key: Key::Escape,
            ctrl: false,
            shift: false,
            alt: false,
        }
    }
}

impl Hotkey {
    /// Whether `key` pressed with `modifiers` fires this hotkey. Modifiers the
    /// hotkey does not ask for are ignored.
    pub fn matches(&self, modifiers: Modifiers, key: Key) -> bool {
        key == self.key
            && (!self.ctrl || modifiers.ctrl || modifiers.command)
            && (!self.shift || modifiers.shift)
            && (!self.alt || modifiers.alt)
    }
}

/// Parse a hotkey string like "Ctrl+Shift+Space" into a [`Hotkey`].
pub fn parse_hotkey(s: &str) -> Option<Hotkey> {
    let mut ctrl = false;
    let mut shift = false;
    let mut alt = false;
    let mut key: Option<Key> = None;

    for part in s.split('+') {
        let upper = part.trim().to_ascii_uppercase();
        match upper.as_str() {
            "CTRL" | "CONTROL" => ctrl = true,
            "SHIFT" => shift = true,
            "ALT" => alt = true,
            "" => {}
            _ => {
                if let Some(k) = parse_key(&upper) {
                    key = Some(k);
                } else {
                    return None;
                }
            }
        }
    }

    key.map(|k| Hotkey {
        key: k,
        ctrl,
        shift,
        alt,
    })
}

fn parse_key(upper: &str) -> Option<Key> {
    match upper {
        "SPACE" => Some(Key::Space),
        "TAB" => Some(Key::Tab),
        "ENTER" | "RETURN" => Some(Key::Enter),
        "ESC" | "ESCAPE" => Some(Key::Escape),
        "DELETE" => Some(Key::Delete),
        "BACKSPACE" => Some(Key::Backspace),
        "HOME" => Some(Key::Home),
        "END" => Some(Key::End),
        "PAGEUP" => Some(Key::PageUp),
        "PAGEDOWN" => Some(Key::PageDown),
        "LEFT" | "LEFTARROW" => Some(Key::ArrowLeft),
        "RIGHT" | "RIGHTARROW" => Some(Key::ArrowRight),
        "UP" | "UPARROW" => Some(Key::ArrowUp),
        "DOWN" | "DOWNARROW" => Some(Key::ArrowDown),
        _ if upper.len() > 1 && upper.starts_with('F') => match upper[1..].parse::<u8>().ok() {
            Some(1) => Some(Key::F1),
            Some(2) => Some(Key::F2),
            Some(3) => Some(Key::F3),
            Some(4) => Some(Key::F4),
            Some(5) => Some(Key::F5),
            Some(6) => Some(Key::F6),
            Some(7) => Some(Key::F7),
            Some(8) => Some(Key::F8),
            Some(9) => Some(Key::F9),
            Some(10) => Some(Key::F10),
            Some(11) => Some(Key::F11),
            Some(12) => Some(Key::F12),
            _ => None,
        },
        _ if upper.len() == 1 => {
            let c = upper.chars().next()?;
            if c.is_ascii_digit() {
                Some(match c {
                    '0' => Key::Num0,
                    '1' => Key::Num1,
                    '2' => Key::Num2,
                    '3' => Key::Num3,
                    '4' => Key::Num4,
                    '5' => Key::Num5,
                    '6' => Key::Num6,
                    '7' => Key::Num7,
                    '8' => Key::Num8,
                    '9' => Key::Num9,
                    _ => return None,
                })
            } else if c.is_ascii_alphabetic() {
                Some(match c {
                    'A' => Key::A,
                    'B' => Key::B,
                    'C' => Key::C,
                    'D' => Key::D,
                    'E' => Key::E,
                    'F' => Key::F,
                    'G' => Key::G,
                    'H' => Key::H,
                    'I' => Key::I,
                    'J' => Key::J,
                    'K' => Key::K,
                    'L' => Key::L,
                    'M' => Key::M,
                    'N' => Key::N,
                    'O' => Key::O,
                    'P' => Key::P,
                    'Q' => Key::Q,
                    'R' => Key::R,
                    'S' => Key::S,
                    'T' => Key::T,
                    'U' => Key::U,
                    'V' => Key::V,
                    'W' => Key::W,
                    'X' => Key::X,
                    'Y' => Key::Y,
                    'Z' => Key::Z,
                    _ => return None,
                })
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Shared flag raised when a quit hotkey fires outside the UI thread.
#[derive(Clone, Default)]
pub struct HotkeyTrigger {
    pub fired: Arc<AtomicBool>,
}

impl HotkeyTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fire(&self) {
        self.fired.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once per firing.
    pub fn take(&self) -> bool {
        self.fired.swap(false, Ordering::SeqCst)
    }
}

/// Tracks modifier state from raw system key events and reports when one of
/// the watched hotkeys is pressed.
pub struct GlobalHotkeyMatcher {
    watched: Vec<(Hotkey, rdev::Key)>,
    modifiers: Modifiers,
}

impl GlobalHotkeyMatcher {
    /// Hotkeys whose key has no system-wide equivalent are dropped.
    pub fn new(hotkeys: &[Hotkey]) -> Self {
        Self {
            watched: hotkeys
                .iter()
                .filter_map(|hk| to_rdev_key(hk.key).map(|k| (*hk, k)))
                .collect(),
            modifiers: Modifiers::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.watched.is_empty()
    }

    /// Feed one event; returns `true` when it fires a watched hotkey.
    pub fn handle(&mut self, event: &rdev::EventType) -> bool {
        use rdev::{EventType, Key as R};
        match *event {
            EventType::KeyPress(k) => {
                match k {
                    R::ControlLeft | R::ControlRight => self.modifiers.ctrl = true,
                    R::ShiftLeft | R::ShiftRight => self.modifiers.shift = true,
                    R::Alt | R::AltGr => self.modifiers.alt = true,
                    _ => {}
                }
                let modifiers = self.modifiers;
                self.watched
                    .iter()
                    .any(|(hotkey, key)| *key == k && hotkey.matches(modifiers, hotkey.key))
            }
            EventType::KeyRelease(k) => {
                match k {
                    R::ControlLeft | R::ControlRight => self.modifiers.ctrl = false,
                    R::ShiftLeft | R::ShiftRight => self.modifiers.shift = false,
                    R::Alt | R::AltGr => self.modifiers.alt = false,
                    _ => {}
                }
                false
            }
            _ => false,
        }
    }
}

/// Listen for `hotkeys` system wide. The overlay never takes keyboard focus,
/// so this is how Escape / Ctrl+C reach it.
///
/// If the platform refuses the listener (Wayland, missing accessibility
/// permission) the error is logged and the app carries on with signals only.
pub fn start_global_listener(
    hotkeys: Vec<Hotkey>,
    trigger: HotkeyTrigger,
    on_fire: impl Fn() + Send + 'static,
) {
    use std::thread;
    use std::time::Duration;

    if GlobalHotkeyMatcher::new(&hotkeys).is_empty() {
        tracing::debug!("no global hotkeys to listen for");
        return;
    }
    tracing::debug!("starting global hotkey listener for {} hotkeys", hotkeys.len());

    let spawned = thread::Builder::new()
        .name("hotkey-listener".to_string())
        .spawn(move || {
            let on_fire = Arc::new(on_fire);
            loop {
                let mut matcher = GlobalHotkeyMatcher::new(&hotkeys);
                let trigger = trigger.clone();
                let on_fire = on_fire.clone();

                let result = rdev::listen(move |event| {
                    if matcher.handle(&event.event_type) {
                        tracing::debug!("global hotkey matched");
                        trigger.fire();
                        on_fire();
                    }
                });

                match result {
                    Ok(()) => {
                        tracing::warn!("Hotkey listener exited unexpectedly. Restarting shortly")
                    }
                    Err(e) => {
                        tracing::warn!(
                            "global hotkeys unavailable ({:?}); quit with Ctrl+C in the terminal or SIGTERM",
                            e
                        );
                        return;
                    }
                }

                thread::sleep(Duration::from_millis(500));
            }
        });
    if let Err(e) = spawned {
        tracing::error!("failed to spawn hotkey listener: {e}");
    }
}

fn to_rdev_key(key: Key) -> Option<rdev::Key> {
    use rdev::Key as R;
    Some(match key {
        Key::Escape => R::Escape,
        Key::Space => R::Space,
        Key::Tab => R::Tab,
        Key::Enter => R::Return,
        Key::Delete => R::Delete,
        Key::Backspace => R::Backspace,
        Key::Home => R::Home,
        Key::End => R::End,
        Key::PageUp => R::PageUp,
        Key::PageDown => R::PageDown,
        Key::ArrowLeft => R::LeftArrow,
        Key::ArrowRight => R::RightArrow,
        Key::ArrowUp => R::UpArrow,
        Key::ArrowDown => R::DownArrow,
        Key::F1 => R::F1,
        Key::F2 => R::F2,
        Key::F3 => R::F3,
        Key::F4 => R::F4,
        Key::F5 => R::F5,
        Key::F6 => R::F6,
        Key::F7 => R::F7,
        Key::F8 => R::F8,
        Key::F9 => R::F9,
        Key::F10 => R::F10,
        Key::F11 => R::F11,
        Key::F12 => R::F12,
        Key::Num0 => R::Num0,
        Key::Num1 => R::Num1,
        Key::Num2 => R::Num2,
        Key::Num3 => R::Num3,
        Key::Num4 => R::Num4,
        Key::Num5 => R::Num5,
        Key::Num6 => R::Num6,
        Key::Num7 => R::Num7,
        Key::Num8 => R::Num8,
        Key::Num9 => R::Num9,
        Key::A => R::KeyA,
        Key::B => R::KeyB,
        Key::C => R::KeyC,
        Key::D => R::KeyD,
        Key::E => R::KeyE,
        Key::F => R::KeyF,
        Key::G => R::KeyG,
        Key::H => R::KeyH,
        Key::I => R::KeyI,
        Key::J => R::KeyJ,
        Key::K => R::KeyK,
        Key::L => R::KeyL,
        Key::M => R::KeyM,
        Key::N => R::KeyN,
        Key::O => R::KeyO,
        Key::P => R::KeyP,
        Key::Q => R::KeyQ,
        Key::R => R::KeyR,
        Key::S => R::KeyS,
        Key::T => R::KeyT,
        Key::U => R::KeyU,
        Key::V => R::KeyV,
        Key::W => R::KeyW,
        Key::X => R::KeyX,
        Key::Y => R::KeyY,
        Key::Z => R::KeyZ,
        _ => return None,
    })
}
