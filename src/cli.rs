use crate::settings::Settings;
use clap::Parser;
use std::path::PathBuf;

/// Show text sent to `GET /draw?text=...` in an always-on-top overlay.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Settings file; missing files fall back to defaults
    #[arg(long, env = "TEXT_OVERLAY_CONFIG", default_value = "settings.json")]
    pub config: PathBuf,

    /// Address to listen on, e.g. 127.0.0.1:8080
    #[arg(long)]
    pub bind: Option<String>,

    /// Text shown before the first request
    #[arg(long)]
    pub text: Option<String>,

    /// Serve the endpoint without opening the overlay window
    #[arg(long)]
    pub headless: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Overlay command line values on top of `settings`.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(bind) = &self.bind {
            settings.bind_addr = bind.clone();
        }
        if let Some(text) = &self.text {
            settings.initial_text = text.clone();
        }
        if self.headless {
            settings.headless = true;
        }
        if self.debug {
            settings.debug_logging = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_settings() {
        let args = Args::parse_from([
            "text_overlay",
            "--bind",
            "127.0.0.1:9000",
            "--text",
            "hi",
            "--headless",
        ]);
        let mut settings = Settings::default();
        args.apply(&mut settings);
        assert_eq!(settings.bind_addr, "127.0.0.1:9000");
        assert_eq!(settings.initial_text, "hi");
        assert!(settings.headless);
        assert!(!settings.debug_logging);
    }

    #[test]
    fn absent_flags_keep_file_values() {
        let args = Args::parse_from(["text_overlay"]);
        let mut settings = Settings {
            bind_addr: "127.0.0.1:1234".into(),
            ..Settings::default()
        };
        args.apply(&mut settings);
        assert_eq!(settings.bind_addr, "127.0.0.1:1234");
        assert_eq!(settings.initial_text, "READY");
    }
}
