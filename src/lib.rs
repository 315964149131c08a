/*!
 # MCP Bridge

 Connects a desktop host that speaks newline-delimited JSON-RPC over
 stdio to an MCP server that exposes JSON-RPC over HTTP.

 ## Overview

 - Requests read from standard input are POSTed to `<base url>/mcp`, one per
   line; the response body (or a synthesized JSON-RPC error) is written back
   to standard output.
 - A long-lived Server-Sent Events subscription delivers server-pushed
   messages; JSON-RPC responses among them are written to standard output,
   transport metadata such as endpoint advertisements is dropped.
 - A single writer serializes both sources onto standard output.

 ## Basic Usage

 ```no_run
 use mcp_bridge::{Bridge, ConnectionSettings, Shutdown, config::{Config, validate_config}};

 #[tokio::main]
 async fn main() -> mcp_bridge::Result<()> {
     let config = Config::load(None)?;
     validate_config(&config)?;

     let bridge = Bridge::new(ConnectionSettings::from_config(&config)?)?;
     let shutdown = Shutdown::new();

     let trigger = shutdown.clone();
     tokio::spawn(async move {
         let _ = tokio::signal::ctrl_c().await;
         trigger.cancel();
     });

     bridge.run(shutdown).await
 }
 ```

 ## Features

 - **Duplex bridging**: HTTP POST for requests, SSE for server pushes
 - **Always answers**: local transport failures become JSON-RPC errors
 - **Reconnects**: the SSE subscription is retried with a fixed delay
 - **Configuration**: flags, `MCP_BRIDGE_*` variables and `.mcp-bridge.yaml`
 - **Installer**: registers the bridge in the host's configuration file
*/

pub mod bridge;
pub mod config;
pub mod error;
pub mod installer;
pub mod transport;

pub use bridge::{Bridge, BridgeState, ConnectionSettings, Shutdown};
pub use config::Config;
pub use error::{Error, Result};
pub use installer::Installer;
