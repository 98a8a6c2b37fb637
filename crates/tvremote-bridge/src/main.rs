//! tvremote-bridge daemon entry point.
//!
//! Loads the configuration, picks an injection backend, and runs the TCP
//! control server until Ctrl+C.
//!
//! # Usage
//!
//! ```text
//! tvremote-bridge [OPTIONS]
//!
//! Options:
//!   --config <PATH>        Config file [default: $XDG_CONFIG_HOME/tvremote-bridge/config.toml]
//!   --bind <ADDR>          Control server bind address
//!   --port <PORT>          Control server port
//!   --uinput-path <PATH>   uinput node
//!   --log-level <FILTER>   Log filter used when RUST_LOG is unset
//!   --dry-run              Record events in memory instead of creating devices
//!   --print-config         Print the effective config and exit
//! ```
//!
//! Every option can also be given through a `TVREMOTE_*` environment
//! variable.  Command-line values take precedence over the config file.
//!
//! # Architecture overview
//!
//! ```text
//! remote provider  (binary frames over TCP)
//!       ↕
//! ControlServer ── one task per connection
//!       ↓
//! BridgeRegistry ── token → EventTranslator → VirtualDevice
//!       ↓
//! UinputBackend ── /dev/uinput ioctls and input_event writes
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tokio::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tvremote_bridge::infrastructure::{
    network::ControlServer,
    storage::config::{load_config, AppConfig},
    uinput::MockInjectionBackend,
};
use tvremote_bridge::{BridgeRegistry, InjectionBackend};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Relays remote-control intents into virtual input devices.
#[derive(Debug, Parser)]
#[command(
    name = "tvremote-bridge",
    about = "Relays remote-control intents into Linux uinput virtual input devices",
    version
)]
struct Cli {
    /// Path of the TOML config file.
    #[arg(long, env = "TVREMOTE_CONFIG")]
    config: Option<PathBuf>,

    /// IP address the control server binds to.
    #[arg(long, env = "TVREMOTE_BIND")]
    bind: Option<String>,

    /// TCP port of the control server.
    #[arg(long, env = "TVREMOTE_PORT")]
    port: Option<u16>,

    /// uinput device node.
    #[arg(long, env = "TVREMOTE_UINPUT_PATH")]
    uinput_path: Option<PathBuf>,

    /// `tracing` filter used when `RUST_LOG` is unset (e.g. `debug`).
    #[arg(long, env = "TVREMOTE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Do not create kernel devices; record events in memory.
    #[arg(long, env = "TVREMOTE_DRY_RUN")]
    dry_run: bool,

    /// Print the effective configuration as TOML and exit.
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    /// Loads the config file and applies command-line overrides.
    fn into_app_config(self) -> anyhow::Result<(AppConfig, RunOptions)> {
        let mut config = load_config(self.config.as_deref()).context("failed to load config")?;

        if let Some(bind) = self.bind {
            config.network.bind_address = bind;
        }
        if let Some(port) = self.port {
            config.network.control_port = port;
        }
        if let Some(path) = self.uinput_path {
            config.uinput.device_path = path;
        }
        if let Some(level) = self.log_level {
            config.bridge.log_level = level;
        }

        Ok((
            config,
            RunOptions {
                dry_run: self.dry_run,
                print_config: self.print_config,
            },
        ))
    }
}

struct RunOptions {
    dry_run: bool,
    print_config: bool,
}

fn bind_addr(config: &AppConfig) -> anyhow::Result<SocketAddr> {
    let net = &config.network;
    format!("{}:{}", net.bind_address, net.control_port)
        .parse()
        .with_context(|| {
            format!(
                "invalid control bind address: '{}:{}'",
                net.bind_address, net.control_port
            )
        })
}

fn select_backend(config: &AppConfig, dry_run: bool) -> Arc<dyn InjectionBackend> {
    if dry_run {
        info!("dry run: events are recorded in memory, no devices are created");
        return Arc::new(MockInjectionBackend::new());
    }

    #[cfg(target_os = "linux")]
    {
        let backend = tvremote_bridge::infrastructure::uinput::UinputBackend::new(
            config.uinput.device_path.clone(),
        );
        info!("using uinput at {}", backend.device_path().display());
        Arc::new(backend)
    }

    #[cfg(not(target_os = "linux"))]
    {
        let _ = config;
        warn!("uinput is unavailable on this platform; falling back to the in-memory backend");
        Arc::new(MockInjectionBackend::new())
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (config, options) = Cli::parse().into_app_config()?;

    if options.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.bridge.log_level)),
        )
        .init();

    let addr = bind_addr(&config)?;
    info!("tvremote bridge starting on {addr}");

    let backend = select_backend(&config, options.dry_run);
    let registry = Arc::new(Mutex::new(BridgeRegistry::new(backend)));

    let server = ControlServer::bind(addr, Arc::clone(&registry), config.network.max_payload_bytes)
        .await
        .context("failed to start control server")?;

    // ── Graceful shutdown flag ────────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C; shutting down");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => tracing::error!("failed to listen for Ctrl+C signal: {e}"),
        }
    });

    server.serve(running).await?;

    let mut registry = registry.lock().await;
    if !registry.is_empty() {
        warn!("closing {} bridge(s) still open at shutdown", registry.len());
    }
    registry.close_all();

    info!("tvremote bridge stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_config() -> String {
        std::env::temp_dir()
            .join("tvremote-bridge-test-missing/config.toml")
            .display()
            .to_string()
    }

    #[test]
    fn test_cli_without_overrides_keeps_config_defaults() {
        // Arrange
        let cli = Cli::parse_from(["tvremote-bridge", "--config", &missing_config()]);

        // Act
        let (config, options) = cli.into_app_config().unwrap();

        // Assert
        assert_eq!(config, AppConfig::default());
        assert!(!options.dry_run);
    }

    #[test]
    fn test_cli_overrides_win_over_config() {
        let cli = Cli::parse_from([
            "tvremote-bridge",
            "--config",
            &missing_config(),
            "--port",
            "9000",
            "--bind",
            "0.0.0.0",
            "--uinput-path",
            "/tmp/uinput",
            "--dry-run",
        ]);

        let (config, options) = cli.into_app_config().unwrap();

        assert_eq!(config.network.control_port, 9000);
        assert_eq!(config.network.bind_address, "0.0.0.0");
        assert_eq!(config.uinput.device_path, PathBuf::from("/tmp/uinput"));
        assert!(options.dry_run);
    }

    #[test]
    fn test_bind_addr_rejects_garbage() {
        let mut config = AppConfig::default();
        config.network.bind_address = "not an ip".into();
        assert!(bind_addr(&config).is_err());
    }

    #[test]
    fn test_bind_addr_combines_address_and_port() {
        let addr = bind_addr(&AppConfig::default()).unwrap();
        assert_eq!(addr, "127.0.0.1:24900".parse().unwrap());
    }
}
