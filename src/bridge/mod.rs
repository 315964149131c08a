//! The stdio ⇄ HTTP/SSE bridging engine.
//!
//! A [`Bridge`] runs three concurrent tasks around one bounded queue:
//!
//! - the [`OutboundWorker`] reads JSON-RPC requests from standard input and
//!   POSTs each one to the server,
//! - the [`InboundWorker`] holds an SSE subscription open and picks out the
//!   JSON-RPC responses the server pushes,
//! - the [`OutputMultiplexer`] writes everything both workers produce to
//!   standard output, one line per message.
//!
//! Cancellation is a single broadcast [`Shutdown`] handle.
//!
//! # Example
//!
//! ```no_run
//! use mcp_bridge::{Bridge, ConnectionSettings, Shutdown, config::Config};
//!
//! #[tokio::main]
//! async fn main() -> mcp_bridge::Result<()> {
//!     let settings = ConnectionSettings::from_config(&Config::default())?;
//!     let bridge = Bridge::new(settings)?;
//!     let shutdown = Shutdown::new();
//!
//!     let trigger = shutdown.clone();
//!     tokio::spawn(async move {
//!         let _ = tokio::signal::ctrl_c().await;
//!         trigger.cancel();
//!     });
//!
//!     bridge.run(shutdown).await
//! }
//! ```

pub mod classifier;
pub mod error_helpers;
pub mod inbound;
pub mod outbound;
pub mod output;
pub mod queue;
pub mod settings;
pub mod sse;

pub use inbound::InboundWorker;
pub use outbound::OutboundWorker;
pub use output::OutputMultiplexer;
pub use settings::ConnectionSettings;

use crate::error::{Error, Result};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// How long `run` waits for the tasks to wind down after cancellation.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Lifecycle of a bridge run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    /// Created, not yet running
    Idle,
    /// Workers and multiplexer are running
    Running,
    /// Cancellation observed or both workers finished; the queue is draining
    Draining,
    /// Workers returned and the queue has been drained
    Stopped,
}

/// Broadcast cancellation handle with an optional cause.
///
/// [`Shutdown::cancel`] is the ordinary shutdown and makes [`Bridge::run`]
/// return `Ok(())`. [`Shutdown::cancel_with`] records a reason that `run`
/// reports as [`Error::Cancelled`].
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    token: CancellationToken,
    cause: Arc<Mutex<Option<String>>>,
}

impl Shutdown {
    /// Create a fresh, uncancelled handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a clean shutdown.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Request shutdown because of `reason`. The first recorded reason wins.
    pub fn cancel_with(&self, reason: impl Into<String>) {
        if let Ok(mut cause) = self.cause.lock() {
            if cause.is_none() && !self.token.is_cancelled() {
                *cause = Some(reason.into());
            }
        }
        self.token.cancel();
    }

    /// Whether shutdown was requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once shutdown is requested.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// The token handed to workers.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    fn into_result(self) -> Result<()> {
        let cause = self.cause.lock().ok().and_then(|mut c| c.take());
        match cause {
            Some(reason) => Err(Error::Cancelled(reason)),
            None => Ok(()),
        }
    }
}

/// The bridge between a stdio JSON-RPC client and an HTTP/SSE MCP server.
pub struct Bridge {
    outbound: OutboundWorker,
    inbound: InboundWorker,
    queue_capacity: usize,
    state: Arc<watch::Sender<BridgeState>>,
}

impl Bridge {
    /// Create a bridge. Each worker gets its own HTTP client.
    pub fn new(settings: ConnectionSettings) -> Result<Self> {
        let (state, _) = watch::channel(BridgeState::Idle);
        Ok(Self {
            outbound: OutboundWorker::new(&settings)?,
            inbound: InboundWorker::new(&settings)?,
            queue_capacity: settings.queue_capacity.max(1),
            state: Arc::new(state),
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> BridgeState {
        *self.state.borrow()
    }

    /// Watch lifecycle transitions.
    pub fn subscribe(&self) -> watch::Receiver<BridgeState> {
        self.state.subscribe()
    }

    /// Bridge the process's standard input and output until `shutdown` fires.
    pub async fn run(&self, shutdown: Shutdown) -> Result<()> {
        self.run_with_io(BufReader::new(tokio::io::stdin()), tokio::io::stdout(), shutdown)
            .await
    }

    /// Bridge `input` and `output` until `shutdown` fires.
    ///
    /// Returns once cancellation has been observed and the workers and the
    /// multiplexer have finished (bounded by [`SHUTDOWN_TIMEOUT`]). A plain
    /// cancellation is a clean exit; a cancellation with a cause is reported
    /// as [`Error::Cancelled`].
    #[tracing::instrument(skip_all)]
    pub async fn run_with_io<R, W>(&self, input: R, output: W, shutdown: Shutdown) -> Result<()>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        if self.state() != BridgeState::Idle {
            return Err(Error::Other("bridge has already been run".to_string()));
        }
        self.state.send_replace(BridgeState::Running);
        tracing::info!(
            post_url = %self.outbound.post_url(),
            "Bridge running"
        );

        let (tx, rx) = queue::payload_channel(self.queue_capacity);
        let token = shutdown.token();

        let outbound = {
            let worker = self.outbound.clone();
            let (tx, token) = (tx.clone(), token.clone());
            tokio::spawn(async move { worker.run(input, tx, token).await })
        };
        let inbound = {
            let worker = self.inbound.clone();
            let token = token.clone();
            tokio::spawn(async move { worker.run(tx, token).await })
        };
        let writer = tokio::spawn(OutputMultiplexer::new(output).run(rx));

        // The queue closes when both workers have returned and dropped their
        // senders; the multiplexer then drains what is left and exits.
        let state = Arc::clone(&self.state);
        let watcher = tokio::spawn(async move {
            let (outbound, inbound) = tokio::join!(outbound, inbound);
            for (name, result) in [("outbound", outbound), ("inbound", inbound)] {
                if let Err(e) = result {
                    tracing::error!(worker = name, error = %e, "Worker task failed");
                }
            }
            state.send_replace(BridgeState::Draining);

            match writer.await {
                Ok(written) => tracing::debug!(written, "Output multiplexer finished"),
                Err(e) => tracing::error!(error = %e, "Output multiplexer task failed"),
            }
            state.send_replace(BridgeState::Stopped);
        });

        shutdown.cancelled().await;
        tracing::info!("Shutdown requested, draining bridge");
        self.state.send_if_modified(|s| {
            if *s == BridgeState::Running {
                *s = BridgeState::Draining;
                true
            } else {
                false
            }
        });

        match tokio::time::timeout(SHUTDOWN_TIMEOUT, watcher).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "Error while joining bridge tasks"),
            Err(_) => tracing::warn!("Timeout waiting for bridge tasks to finish"),
        }

        shutdown.into_result()
    }
}
