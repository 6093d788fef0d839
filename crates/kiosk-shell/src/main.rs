//! Kiosk shell — entry point.
//!
//! Wires the display controller to its two command sources (the loopback
//! HTTP control server and the upstream WebSocket link) and to the window
//! host that renders content, then runs until Ctrl+C.
//!
//! # Usage
//!
//! ```text
//! kiosk-shell [OPTIONS]
//!
//! Options:
//!   --config       <PATH>  Configuration file path [default: platform config dir]
//!   --control-port <PORT>  Loopback HTTP control port [default: 8787]
//!   --upstream-url <URL>   ws:// endpoint of the remote controller [default: disabled]
//!   --user-type    <TYPE>  Deployment profile: ledcarewall or provider
//! ```
//!
//! # Environment variable overrides
//!
//! CLI args take precedence when both are present.
//!
//! | Variable               | Default       | Description                     |
//! |------------------------|---------------|---------------------------------|
//! | `KIOSK_CONFIG`         | platform dir  | Configuration file path         |
//! | `KIOSK_CONTROL_PORT`   | `8787`        | Loopback HTTP control port      |
//! | `KIOSK_UPSTREAM_WS_URL`| unset         | Upstream controller endpoint    |
//! | `KIOSK_USER_TYPE`      | `ledcarewall` | Deployment profile              |
//!
//! # Architecture overview
//!
//! ```text
//! remote controller (JSON over WebSocket)     local tools (HTTP, loopback)
//!             ↕                                        ↕
//!       upstream link client                  HTTP control server
//!             └──────────────┬───────────────────────┘
//!                    display controller
//!                            ↕
//!                       window host
//! ```
//!
//! The window host wired in here is the headless stand-in, which logs render
//! calls and reports fixed bounds.  A GUI deployment replaces it with an
//! adapter over the embedded-browser runtime; nothing else changes.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use kiosk_shell::application::display_controller::DisplayController;
use kiosk_shell::application::KioskContext;
use kiosk_shell::infrastructure::network::{run_control_server, run_upstream_link};
use kiosk_shell::infrastructure::storage::config::{self, AppConfig, ConfigError};
use kiosk_shell::infrastructure::window_host::{
    spawn_event_pump, Bounds, HeadlessWindowHost, WindowHost,
};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Kiosk shell control plane.
///
/// Displays remote web content full-screen and takes display commands from a
/// local HTTP control API and an upstream WebSocket controller.
#[derive(Debug, Parser)]
#[command(
    name = "kiosk-shell",
    about = "Display-state control plane for a full-screen web kiosk",
    version
)]
struct Cli {
    /// Path to the TOML configuration file.
    ///
    /// Defaults to the platform config directory
    /// (e.g. `~/.config/kioskshell/config.toml` on Linux).
    #[arg(long, env = "KIOSK_CONFIG")]
    config: Option<PathBuf>,

    /// TCP port for the loopback HTTP control server.
    #[arg(long, env = "KIOSK_CONTROL_PORT")]
    control_port: Option<u16>,

    /// WebSocket endpoint of the remote controller (`ws://` or `wss://`).
    ///
    /// When unset here and in the config file, the upstream link client is
    /// disabled entirely.
    #[arg(long, env = "KIOSK_UPSTREAM_WS_URL")]
    upstream_url: Option<String>,

    /// Deployment profile: `ledcarewall` or `provider`.
    ///
    /// Selects the built-in state catalog when the config file declares no
    /// explicit `[[states]]`.
    #[arg(long, env = "KIOSK_USER_TYPE")]
    user_type: Option<String>,
}

impl Cli {
    /// Loads the configuration file and applies the CLI/env overrides.
    ///
    /// # Errors
    ///
    /// Returns an error when an explicitly given config file cannot be read
    /// or parsed.  An undeterminable platform config directory only degrades
    /// to the built-in defaults.
    fn into_config(self) -> anyhow::Result<AppConfig> {
        let mut cfg = match &self.config {
            Some(path) => config::load_config_from(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => match config::load_config() {
                Ok(cfg) => cfg,
                Err(e @ ConfigError::NoPlatformConfigDir) => {
                    warn!("{e}; using built-in defaults");
                    AppConfig::default()
                }
                Err(e) => return Err(e).context("failed to load configuration"),
            },
        };

        if let Some(port) = self.control_port {
            cfg.control.port = port;
        }
        if let Some(url) = self.upstream_url {
            cfg.link.upstream_url = Some(url);
        }
        if let Some(user_type) = self.user_type {
            cfg.display.user_type = user_type;
        }

        Ok(cfg)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `RUST_LOG` controls the log level; default to `info`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = cli.into_config()?;

    let catalog = cfg.catalog().context("invalid state catalog")?;

    info!(
        "kiosk shell starting — user type '{}', control port {}",
        cfg.display.user_type, cfg.control.port
    );
    info!("available states: {:?}", catalog.state_names());

    // The headless host logs render calls and reports Ready immediately.  A
    // GUI deployment swaps in an adapter over the embedded-browser runtime.
    let mut host = HeadlessWindowHost::new(Bounds::full(1920, 1080));
    let host_events = host.subscribe();

    let controller = DisplayController::new(
        catalog,
        &cfg.display.user_type,
        &cfg.display.initial_state,
        Box::new(host),
    );
    let ctx = KioskContext::new(controller);

    // `Ready` enters the initial state; `Resized` re-fits the render target.
    let event_pump = spawn_event_pump(Arc::clone(&ctx), host_events);

    // One shutdown signal fans out to the control server and the link client.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C — initiating graceful shutdown");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => error!("failed to listen for Ctrl+C signal: {e}"),
        }
    });

    let link = tokio::spawn(run_upstream_link(
        cfg.link.upstream_url.clone(),
        Arc::clone(&ctx),
        shutdown_rx.clone(),
    ));

    run_control_server(cfg.control.port, Arc::clone(&ctx), shutdown_rx).await?;

    let _ = link.await;
    let _ = event_pump.await;

    info!("kiosk shell stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_leave_all_overrides_unset() {
        // Arrange: parse with no arguments (all defaults apply)
        let cli = Cli::parse_from(["kiosk-shell"]);

        // Assert
        assert_eq!(cli.control_port, None);
        assert_eq!(cli.upstream_url, None);
        assert_eq!(cli.user_type, None);
        assert_eq!(cli.config, None);
    }

    #[test]
    fn test_cli_control_port_override() {
        let cli = Cli::parse_from(["kiosk-shell", "--control-port", "9999"]);
        assert_eq!(cli.control_port, Some(9999));
    }

    #[test]
    fn test_cli_upstream_url_override() {
        let cli =
            Cli::parse_from(["kiosk-shell", "--upstream-url", "ws://workstation.local:9001"]);
        assert_eq!(
            cli.upstream_url.as_deref(),
            Some("ws://workstation.local:9001")
        );
    }

    #[test]
    fn test_cli_user_type_override() {
        let cli = Cli::parse_from(["kiosk-shell", "--user-type", "provider"]);
        assert_eq!(cli.user_type.as_deref(), Some("provider"));
    }

    #[test]
    fn test_into_config_applies_overrides_to_defaults() {
        // Arrange: no config file, overrides on the command line.
        let cli = Cli {
            config: Some(PathBuf::from("/nonexistent/kiosk-shell/config.toml")),
            control_port: Some(9000),
            upstream_url: Some("ws://10.0.0.5:9001".to_string()),
            user_type: Some("provider".to_string()),
        };

        // Act – the absent file loads as defaults, then overrides apply.
        let cfg = cli.into_config().expect("config must load");

        // Assert
        assert_eq!(cfg.control.port, 9000);
        assert_eq!(cfg.link.upstream_url.as_deref(), Some("ws://10.0.0.5:9001"));
        assert_eq!(cfg.display.user_type, "provider");
    }

    #[test]
    fn test_into_config_without_overrides_keeps_file_defaults() {
        let cli = Cli {
            config: Some(PathBuf::from("/nonexistent/kiosk-shell/config.toml")),
            control_port: None,
            upstream_url: None,
            user_type: None,
        };

        let cfg = cli.into_config().expect("config must load");

        assert_eq!(cfg.control.port, 8787);
        assert_eq!(cfg.link.upstream_url, None);
        assert_eq!(cfg.display.user_type, "ledcarewall");
    }

    #[test]
    fn test_provider_override_selects_two_state_catalog() {
        // The user-type override must reach catalog construction.
        let cli = Cli {
            config: Some(PathBuf::from("/nonexistent/kiosk-shell/config.toml")),
            control_port: None,
            upstream_url: None,
            user_type: Some("provider".to_string()),
        };

        let cfg = cli.into_config().expect("config must load");
        let catalog = cfg.catalog().expect("catalog must build");

        assert_eq!(catalog.state_names(), vec!["screensaver", "inSession"]);
    }
}
