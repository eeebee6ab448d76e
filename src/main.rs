use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use text_overlay::cli::Args;
use text_overlay::overlay::{self, OverlayConfig, OverlayDispatcher};
use text_overlay::server::{self, DrawState, ServerConfig};
use text_overlay::settings::Settings;
use text_overlay::shutdown::{Shutdown, ShutdownReason};
use text_overlay::{logging, text::SharedText};

const SERVER_JOIN_TIMEOUT: Duration = Duration::from_secs(2);

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut settings = Settings::load(&args.config)?;
    args.apply(&mut settings);

    logging::init(settings.debug_logging, settings.log_file.clone().map(PathBuf::from));

    let shutdown = Shutdown::new();
    let text = SharedText::new(settings.initial_text.clone());
    let (dispatcher, commands) = OverlayDispatcher::channel();

    let server = server::spawn(
        ServerConfig {
            bind_addr: settings.bind_addr()?,
            enable_cors: settings.enable_cors,
        },
        DrawState {
            text: text.clone(),
            dispatcher: dispatcher.clone(),
        },
        shutdown.clone(),
    )
    .context("failed to start draw server")?;
    tracing::debug!(addr = %server.local_addr(), "server thread running");

    if settings.headless {
        tracing::info!("Running in headless mode (no overlay)");
        shutdown.wait_blocking();
    } else {
        let result = overlay::run_overlay(OverlayConfig {
            initial_text: text.get(),
            settings: settings.overlay.clone(),
            quit_hotkeys: settings.quit_hotkeys(),
            dispatcher,
            commands,
            shutdown: shutdown.clone(),
        });
        match result {
            Ok(()) => {
                shutdown.trigger(ShutdownReason::WindowClosed);
            }
            Err(e) => {
                tracing::error!("{e:#}");
                tracing::info!("Running in headless mode (no overlay)");
                shutdown.wait_blocking();
            }
        }
    }

    server.join_timeout(SERVER_JOIN_TIMEOUT);
    tracing::info!(reason = ?shutdown.reason(), "exited");
    Ok(())
}
