use std::sync::{Arc, Mutex};

/// Text shown in the overlay when nothing has been drawn yet.
pub const DEFAULT_TEXT: &str = "READY";

/// Latest text received by the draw endpoint.
///
/// Clones share the same value. The HTTP thread writes it and the overlay
/// reads it once at start-up; later updates reach the overlay through the
/// dispatcher.
#[derive(Clone, Debug)]
pub struct SharedText {
    inner: Arc<Mutex<String>>,
}

impl Default for SharedText {
    fn default() -> Self {
        Self::new(DEFAULT_TEXT)
    }
}

impl SharedText {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(initial.into())),
        }
    }

    pub fn set(&self, text: impl Into<String>) {
        let text = text.into();
        match self.inner.lock() {
            Ok(mut guard) => *guard = text,
            // A panicked writer cannot leave a half-written String behind.
            Err(poisoned) => *poisoned.into_inner() = text,
        }
    }

    pub fn get(&self) -> String {
        match self.inner.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn defaults_to_ready() {
        assert_eq!(SharedText::default().get(), "READY");
    }

    #[test]
    fn clones_share_the_value() {
        let text = SharedText::new("a");
        let other = text.clone();
        other.set("b");
        assert_eq!(text.get(), "b");
    }

    #[test]
    fn writes_from_other_threads_are_visible() {
        let text = SharedText::default();
        let writer = text.clone();
        thread::spawn(move || writer.set("from thread"))
            .join()
            .unwrap();
        assert_eq!(text.get(), "from thread");
    }
}
