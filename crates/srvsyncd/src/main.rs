// # srvsyncd - service to SRV record daemon
//
// A thin integration layer: all registry logic lives in srvsync-core and the
// adapter crates.
//
// The daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Registering adapters and creating the one named by the registry URI
// 4. Publishing the configured services, then withdrawing them on shutdown
//
// ## Configuration
//
// - `SRVSYNC_REGISTRY_URI`: Registry URI (required), e.g. `route53://Z0123456789ABC/service.internal`
// - `SRVSYNC_SERVICES_FILE`: JSON array of services to publish (optional)
// - `SRVSYNC_DEREGISTER_ON_SHUTDOWN`: Withdraw published services on exit (default: true)
// - `SRVSYNC_MODE`: `live` or `dry-run` (default: live)
// - `SRVSYNC_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// AWS credentials and region are read by the AWS SDK from its usual sources.
//
// ## Example
//
// ```bash
// export SRVSYNC_REGISTRY_URI=route53://Z0123456789ABC/service.internal
// export SRVSYNC_SERVICES_FILE=/etc/srvsync/services.json
//
// srvsyncd
// ```

use anyhow::{Context, Result};
use srvsync_core::{
    AdapterConfig, AdapterRegistry, Bridge, BridgeConfig, RegistryAdapter, Service, ServiceEvent,
};
use std::env;
use std::process::ExitCode;
use tokio::sync::oneshot;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SrvsyncExitCode {
    CleanShutdown = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<SrvsyncExitCode> for ExitCode {
    fn from(code: SrvsyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    registry_uri: String,
    services_file: Option<String>,
    deregister_on_shutdown: bool,
    mode: String,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            registry_uri: env::var("SRVSYNC_REGISTRY_URI")
                .context("SRVSYNC_REGISTRY_URI is required")?,
            services_file: env::var("SRVSYNC_SERVICES_FILE")
                .ok()
                .filter(|s| !s.is_empty()),
            deregister_on_shutdown: match env::var("SRVSYNC_DEREGISTER_ON_SHUTDOWN") {
                Ok(value) => parse_bool("SRVSYNC_DEREGISTER_ON_SHUTDOWN", &value)?,
                Err(_) => true,
            },
            mode: env::var("SRVSYNC_MODE").unwrap_or_else(|_| "live".to_string()),
            log_level: env::var("SRVSYNC_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        let adapter = AdapterConfig::parse(&self.registry_uri)
            .with_context(|| format!("SRVSYNC_REGISTRY_URI '{}' is invalid", self.registry_uri))?;
        adapter.validate()?;

        match self.mode.to_lowercase().as_str() {
            "live" | "dry-run" => {}
            _ => anyhow::bail!(
                "SRVSYNC_MODE '{}' is not valid. Valid modes: live, dry-run",
                self.mode
            ),
        }

        if let Some(ref path) = self.services_file
            && !std::path::Path::new(path).is_file()
        {
            anyhow::bail!("SRVSYNC_SERVICES_FILE does not exist: {}", path);
        }

        parse_log_level(&self.log_level)?;

        Ok(())
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => anyhow::bail!("{} must be true or false. Got: {}", name, value),
    }
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "SRVSYNC_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            level
        ),
    }
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return SrvsyncExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return SrvsyncExitCode::ConfigError.into();
    }

    let log_level = parse_log_level(&config.log_level).unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return SrvsyncExitCode::ConfigError.into();
    }

    info!("Starting srvsyncd");

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return SrvsyncExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run_daemon(config).await {
            Ok(()) => SrvsyncExitCode::CleanShutdown,
            Err(e) => {
                error!("Daemon error: {:#}", e);
                e.exit_code()
            }
        }
    })
    .into()
}

/// Daemon failure, split by the phase it happened in
#[derive(Debug)]
enum DaemonError {
    /// Failed before the bridge started
    Startup(anyhow::Error),
    /// Failed while the bridge was running
    Runtime(anyhow::Error),
}

impl DaemonError {
    fn exit_code(&self) -> SrvsyncExitCode {
        match self {
            Self::Startup(_) => SrvsyncExitCode::ConfigError,
            Self::Runtime(_) => SrvsyncExitCode::RuntimeError,
        }
    }
}

impl std::fmt::Display for DaemonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Startup(e) => write!(f, "startup failed: {:#}", e),
            Self::Runtime(e) => write!(f, "{:#}", e),
        }
    }
}

/// Load services and create the adapter named by the registry URI
async fn startup(config: &Config) -> Result<(Box<dyn RegistryAdapter>, Vec<Service>)> {
    let services = match config.services_file {
        Some(ref path) => srvsync_core::load_services(path)
            .with_context(|| format!("Failed to load services from {}", path))?,
        None => {
            warn!("SRVSYNC_SERVICES_FILE not set, no services will be published");
            Vec::new()
        }
    };

    let registry = AdapterRegistry::new();

    #[cfg(feature = "route53")]
    {
        info!("Registering Route 53 adapter");
        srvsync_route53::register(&registry);
    }

    let adapter = registry.create_from_uri(&config.registry_uri).await?;
    adapter
        .ping()
        .await
        .with_context(|| format!("{} registry is not reachable", adapter.adapter_name()))?;
    info!("Using {} registry", adapter.adapter_name());

    Ok((adapter, services))
}

/// Run the daemon
async fn run_daemon(config: Config) -> std::result::Result<(), DaemonError> {
    let (adapter, services) = startup(&config).await.map_err(DaemonError::Startup)?;
    info!("Publishing {} service(s)", services.len());

    let (bridge, mut bridge_events) = Bridge::new(
        adapter,
        BridgeConfig {
            deregister_on_shutdown: config.deregister_on_shutdown,
            ..BridgeConfig::default()
        },
    )
    .map_err(|e| DaemonError::Startup(e.into()))?;

    // Drain bridge events so the channel never fills
    let drain = tokio::spawn(async move {
        while let Some(event) = bridge_events.recv().await {
            tracing::debug!("Bridge event: {:?}", event);
        }
    });

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let signals = tokio::spawn(async move {
        match wait_for_shutdown().await {
            Ok(signal) => info!("Received shutdown signal: {}", signal),
            Err(e) => error!("Signal handling failed, shutting down: {}", e),
        }
        let _ = shutdown_tx.send(());
    });

    let events = tokio_stream::iter(services.into_iter().map(ServiceEvent::Register));
    let result = bridge.run_with_shutdown(events, Some(shutdown_rx)).await;

    signals.abort();
    drop(bridge);
    let _ = drain.await;

    result.map_err(|e| DaemonError::Runtime(e.into()))?;
    info!("srvsyncd stopped");
    Ok(())
}

/// Wait for SIGTERM or SIGINT
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for CTRL-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .context("Failed to wait for CTRL-C")?;
    Ok("SIGINT")
}
