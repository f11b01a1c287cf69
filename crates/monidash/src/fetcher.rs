//! Build fetcher: owns the TCP connection to the status server.
//!
//! The server sends one JSON snapshot per line:
//!
//! ```text
//! {"failing":[{"name":"..","building":false,"user":".."}],"acknowledged":[..],"healthy":[..]}
//! ```
//!
//! A background task reads lines, turns each into a [`BuildUpdate`] and
//! publishes it on a single-consumer channel. The channel holds at most one
//! update, so the task waits for the dashboard instead of buffering.
//!
//! Failure handling:
//! - connect failure: [`ConnectError`], no task is started
//! - read failure: [`UpdateError::Network`] is published and reading resumes
//! - malformed frame: [`UpdateError::Parse`] is published and reading stops
//!   for good; the channel stays open until the receiver is dropped

use crate::compositor::display_len;
use crate::{Build, BuildState, BuildUpdate};
use serde::Deserialize;
use std::io;
use std::ops::ControlFlow;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

/// Capacity of the update channel.
pub const UPDATE_CHANNEL_CAPACITY: usize = 1;

/// Fatal failure to reach the status server.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("Error connecting to {addr}: {source}")]
    Connect {
        /// Address that was dialled.
        addr: String,
        #[source]
        source: io::Error,
    },
}

/// Failure carried inside a [`BuildUpdate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    /// Reading from the socket failed; the fetcher keeps reading.
    #[error("Network Error: {0}")]
    Network(String),
    /// A frame was not valid JSON; the fetcher has stopped.
    #[error("Cannot Parse JSON: {0}")]
    Parse(String),
}

/// Tunables for the read loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetcherConfig {
    /// Pause after publishing a network error before reading again.
    ///
    /// Zero reads again immediately.
    pub network_retry_delay: Duration,
}

/// Handle to a running fetch task.
#[derive(Debug)]
pub struct BuildFetcher {
    updates: mpsc::Receiver<BuildUpdate>,
}

impl BuildFetcher {
    /// Dials `addr` once and starts the read loop.
    ///
    /// There is no retry: if the dial fails no update is ever produced.
    pub async fn connect(addr: &str, config: FetcherConfig) -> Result<Self, ConnectError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|source| ConnectError::Connect {
                addr: addr.to_string(),
                source,
            })?;
        tracing::info!(addr, "connected to build server");
        Ok(Self::from_reader(BufReader::new(stream), config))
    }

    /// Starts the read loop over an already-open line source.
    ///
    /// Must be called from within a tokio runtime.
    pub fn from_reader<R>(reader: R, config: FetcherConfig) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let (tx, updates) = mpsc::channel(UPDATE_CHANNEL_CAPACITY);
        tokio::spawn(read_loop(reader, tx, config));
        Self { updates }
    }

    /// Waits for the next update; `None` once the fetch task has gone away.
    pub async fn next_update(&mut self) -> Option<BuildUpdate> {
        self.updates.recv().await
    }

    /// Hands the update stream to the consumer.
    ///
    /// The task keeps running until the receiver is dropped.
    pub fn into_receiver(self) -> mpsc::Receiver<BuildUpdate> {
        self.updates
    }
}

/// Reads frames until a parse failure or until nobody is listening.
///
/// After a parse failure the task idles holding the sender, so no further
/// update arrives but the channel never reports closed.
async fn read_loop<R>(mut reader: R, tx: mpsc::Sender<BuildUpdate>, config: FetcherConfig)
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();
    loop {
        line.clear();
        let read = reader.read_until(b'\n', &mut line).await;
        let (update, flow) = process_read(read, &line);

        let network_error = matches!(update.error, Some(UpdateError::Network(_)));
        if tx.send(update).await.is_err() {
            tracing::debug!("update receiver dropped, stopping fetcher");
            return;
        }
        if flow.is_break() {
            // Stop reading but keep the channel open, so the consumer keeps
            // showing the last error instead of seeing the source close.
            tx.closed().await;
            return;
        }
        if network_error && !config.network_retry_delay.is_zero() {
            tokio::time::sleep(config.network_retry_delay).await;
        }
    }
}

/// Turns the outcome of reading one line into the update to publish.
///
/// Only socket failures and end of stream count as network errors; bytes that
/// do not form a valid frame, invalid UTF-8 included, are a parse failure.
fn process_read(read: io::Result<usize>, line: &[u8]) -> (BuildUpdate, ControlFlow<()>) {
    match read {
        Ok(0) => {
            tracing::warn!("build server closed the connection");
            (
                BuildUpdate::failed(UpdateError::Network("connection closed".to_string())),
                ControlFlow::Continue(()),
            )
        }
        Err(e) => {
            tracing::warn!("failed to read from build server: {e}");
            (
                BuildUpdate::failed(UpdateError::Network(e.to_string())),
                ControlFlow::Continue(()),
            )
        }
        Ok(_) => match parse_frame(line) {
            Ok(builds) => {
                tracing::debug!(count = builds.len(), "received build snapshot");
                (BuildUpdate::builds(builds), ControlFlow::Continue(()))
            }
            Err(e) => {
                tracing::error!("failed to parse build snapshot, stopping fetcher: {e}");
                (
                    BuildUpdate::failed(UpdateError::Parse(e.to_string())),
                    ControlFlow::Break(()),
                )
            }
        },
    }
}

/// Wire shape of one snapshot. Unknown fields are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Frame {
    failing: Option<Vec<FrameBuild>>,
    acknowledged: Option<Vec<FrameBuild>>,
    healthy: Option<Vec<FrameBuild>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FrameBuild {
    name: String,
    building: bool,
    #[serde(rename = "user")]
    acknowledger: String,
}

/// Parses one line into a sorted build list.
///
/// Entries are tagged by the array they came from, concatenated in
/// failing, acknowledged, healthy order, then sorted with [`sort_builds`].
pub fn parse_frame(line: impl AsRef<[u8]>) -> Result<Vec<Build>, serde_json::Error> {
    let frame: Frame = serde_json::from_slice(line.as_ref())?;

    let mut builds = Vec::new();
    let groups = [
        (frame.failing, BuildState::Failed),
        (frame.acknowledged, BuildState::Acknowledged),
        (frame.healthy, BuildState::Passed),
    ];
    for (entries, state) in groups {
        builds.extend(entries.unwrap_or_default().into_iter().map(|entry| Build {
            name: entry.name,
            state,
            building: entry.building,
            acknowledger: entry.acknowledger,
        }));
    }

    sort_builds(&mut builds);
    Ok(builds)
}

/// Orders builds by the character count of their name, shortest first.
///
/// The sort is stable, so equal-length names keep their arrival order.
pub fn sort_builds(builds: &mut [Build]) {
    builds.sort_by_key(|build| display_len(&build.name));
}
