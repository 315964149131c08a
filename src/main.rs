use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use mcp_bridge::config::{Config, DEFAULT_SSE_URL, validate_config};
use mcp_bridge::installer::{DEFAULT_SERVER_KEY, Installer};
use mcp_bridge::{Bridge, ConnectionSettings, Shutdown};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Bridge between a stdio JSON-RPC client and an MCP server over HTTP + SSE.
#[derive(Debug, Parser)]
#[command(name = "mcp-bridge", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the bridge (stdio <-> MCP server over SSE)
    Connect(ConnectArgs),
    /// Register the bridge in the desktop host's configuration
    Install(InstallArgs),
}

#[derive(Debug, Args)]
struct ConnectArgs {
    /// MCP server SSE endpoint URL (e.g. http://localhost:8080/sse)
    #[arg(long)]
    url: Option<String>,

    /// Profile sent as X-Profile in debug mode
    #[arg(long)]
    profile: Option<String>,

    /// Enable debug logging to stderr
    #[arg(long)]
    debug: bool,

    /// Read settings from this YAML file instead of .mcp-bridge.yaml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct InstallArgs {
    /// MCP server URL written into the host configuration
    #[arg(long, default_value = DEFAULT_SSE_URL)]
    url: String,

    /// Profile exported to the bridge's environment
    #[arg(long, default_value = "default")]
    profile: String,

    /// Key of the entry under mcpServers
    #[arg(long, default_value = DEFAULT_SERVER_KEY)]
    name: String,

    /// Host configuration file (defaults to the platform location)
    #[arg(long, value_name = "PATH")]
    config_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Connect(args) => connect(args).await,
        Command::Install(args) => install(args),
    };

    let code = match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };

    // A blocking read on stdin can outlive the bridge and would keep the
    // runtime from shutting down, so leave without waiting for it.
    std::process::exit(code);
}

async fn connect(args: ConnectArgs) -> anyhow::Result<()> {
    let mut config = Config::load(args.config.as_deref()).context("load config")?;
    if let Some(url) = args.url {
        config.url = url;
    }
    if let Some(profile) = args.profile {
        config.profile = profile;
    }
    config.debug |= args.debug;

    init_tracing(config.debug);
    validate_config(&config)?;

    let settings = ConnectionSettings::from_config(&config)?;
    let bridge = Bridge::new(settings)?;
    let shutdown = Shutdown::new();
    tokio::spawn(forward_signals(shutdown.clone()));

    bridge.run(shutdown).await.context("proxy")?;
    Ok(())
}

fn install(args: InstallArgs) -> anyhow::Result<()> {
    let binary = std::env::current_exe().context("failed to resolve the bridge executable path")?;

    let mut installer = Installer::new().with_server_key(args.name);
    if let Some(path) = args.config_path {
        installer = installer.with_config_path(path);
    }
    let path = installer.install(&args.url, &args.profile, &binary)?;

    println!("Updated {}. Restart the desktop host to pick up the change.", path.display());
    Ok(())
}

/// Logs go to stderr: stdout carries the JSON-RPC stream.
fn init_tracing(debug: bool) {
    let default = if debug { "mcp_bridge=debug" } else { "mcp_bridge=error" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .init();
}

async fn forward_signals(shutdown: Shutdown) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
            (Ok(mut int), Ok(mut term)) => {
                tokio::select! {
                    _ = int.recv() => tracing::info!("Received SIGINT"),
                    _ = term.recv() => tracing::info!("Received SIGTERM"),
                }
            }
            _ => {
                tracing::warn!("Failed to install signal handlers, falling back to Ctrl-C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Received Ctrl-C");
    }

    shutdown.cancel();
}
