//! Tunnel provider lifecycle supervision.
//!
//! Runs the provider cascade: spawn an external tunnel process, scan its
//! output (or poll its local API) for the assigned public URL, publish the
//! URL, and fall back to the next provider when the attempt fails or the
//! process dies. Nothing here is fatal to the HTTP listener.

use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use waymark_core::scan;

use super::config::{Discovery, Provider, TunnelSettings};
use super::error::TunnelError;
use super::state::TunnelState;

/// Lifecycle of a single provider attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttemptState {
    Idle,
    Launching,
    Listening,
    Established,
    Failed,
    Terminated,
}

/// Events delivered from a provider's reader tasks to the attempt loop.
#[derive(Debug)]
enum AttemptEvent {
    /// One line from the provider's stdout or stderr.
    Line(String),
    /// The provider process exited.
    Exited(Option<ExitStatus>),
}

/// Result of one completed provider attempt.
#[derive(Debug, Clone, Copy)]
struct AttemptOutcome {
    /// Whether this attempt ever published a URL.
    established: bool,
}

/// Supervises the tunnel provider cascade.
///
/// Owns the [`TunnelState`] write side; request handlers hold the read side
/// through their shared `Arc`.
pub struct TunnelSupervisor {
    settings: TunnelSettings,
    port: u16,
    state: Arc<TunnelState>,
    http: reqwest::Client,
}

impl TunnelSupervisor {
    pub fn new(settings: TunnelSettings, port: u16, state: Arc<TunnelState>) -> Self {
        Self {
            settings,
            port,
            state,
            http: reqwest::Client::new(),
        }
    }

    /// Run the provider cascade to completion.
    ///
    /// Providers are attempted strictly one at a time; an attempt only ends
    /// when its process has exited (or never started). When the cascade is
    /// exhausted without any establishment, manual instructions go to the
    /// operator log and the state is left unset.
    pub async fn run(self) {
        let mut ever_established = false;

        for provider in &self.settings.providers {
            info!(
                provider = %provider.name,
                command = %provider.command_line(),
                "Attempting tunnel provider"
            );
            match self.attempt(provider).await {
                Ok(outcome) => {
                    ever_established |= outcome.established;
                    if outcome.established {
                        warn!(provider = %provider.name, "Established tunnel lost");
                    } else {
                        warn!(
                            provider = %provider.name,
                            "Provider terminated without reporting a URL"
                        );
                    }
                }
                Err(error) => {
                    warn!(provider = %provider.name, error = %error, "Provider failed");
                }
            }
        }

        if ever_established {
            // Deliberate: the last published URL stays visible even though
            // its provider is gone (see TunnelState).
            warn!("Provider cascade exhausted; last published URL left in place");
        } else {
            self.log_manual_instructions();
        }
    }

    /// Run one provider attempt to completion.
    async fn attempt(&self, provider: &Provider) -> Result<AttemptOutcome, TunnelError> {
        match &provider.discovery {
            Discovery::Stream => self.attempt_stream(provider).await,
            Discovery::QueryApi { endpoint, grace } => {
                self.attempt_query(provider, endpoint, *grace).await
            }
        }
    }

    /// Attempt a provider that streams its URL to stdout/stderr.
    async fn attempt_stream(&self, provider: &Provider) -> Result<AttemptOutcome, TunnelError> {
        let mut state = AttemptState::Idle;
        transition(&provider.name, &mut state, AttemptState::Launching);

        let mut child = Command::new(&provider.program)
            .args(&provider.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                transition(&provider.name, &mut state, AttemptState::Failed);
                TunnelError::Spawn(e.to_string())
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TunnelError::Stream("Failed to capture stdout".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| TunnelError::Stream("Failed to capture stderr".into()))?;

        let (event_tx, mut event_rx) = mpsc::channel::<AttemptEvent>(64);
        spawn_line_reader(stdout, event_tx.clone());
        spawn_line_reader(stderr, event_tx.clone());
        tokio::spawn(async move {
            let status = child.wait().await;
            let _ = event_tx.send(AttemptEvent::Exited(status.ok())).await;
        });

        transition(&provider.name, &mut state, AttemptState::Listening);

        let mut established = false;
        while let Some(event) = event_rx.recv().await {
            match event {
                AttemptEvent::Line(line) => {
                    debug!(provider = %provider.name, line = %line, "Provider output");
                    self.scan_line(provider, &line, &mut state, &mut established)
                        .await;
                }
                AttemptEvent::Exited(status) => {
                    // The exit notification can overtake the final output
                    // lines; the loop only ends once both streams reach EOF
                    // and every sender has dropped.
                    log_exit(&provider.name, status);
                }
            }
        }

        transition(&provider.name, &mut state, AttemptState::Terminated);
        Ok(AttemptOutcome { established })
    }

    /// Attempt a provider that exposes a local tunnel-listing API.
    async fn attempt_query(
        &self,
        provider: &Provider,
        endpoint: &str,
        grace: Duration,
    ) -> Result<AttemptOutcome, TunnelError> {
        let mut state = AttemptState::Idle;
        transition(&provider.name, &mut state, AttemptState::Launching);

        let mut child = Command::new(&provider.program)
            .args(&provider.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                transition(&provider.name, &mut state, AttemptState::Failed);
                TunnelError::Spawn(e.to_string())
            })?;

        transition(&provider.name, &mut state, AttemptState::Listening);

        // Give the provider time to register before asking for its tunnels.
        tokio::time::sleep(grace).await;

        match self.query_public_url(endpoint).await {
            Ok(url) => {
                if self.state.publish(&url).await {
                    info!(provider = %provider.name, url = %url, "Tunnel established");
                }
                transition(&provider.name, &mut state, AttemptState::Established);

                let status = child.wait().await.ok();
                log_exit(&provider.name, status);
                transition(&provider.name, &mut state, AttemptState::Terminated);
                Ok(AttemptOutcome { established: true })
            }
            Err(error) => {
                transition(&provider.name, &mut state, AttemptState::Failed);
                // Only one tunnel process may hold the port forward at a
                // time, so the cascade cannot advance past a live one.
                if let Err(kill_error) = child.kill().await {
                    warn!(
                        provider = %provider.name,
                        error = %kill_error,
                        "Failed to kill provider process"
                    );
                }
                Err(error)
            }
        }
    }

    /// Feed one output line through the URL scanner, publishing on a match.
    async fn scan_line(
        &self,
        provider: &Provider,
        line: &str,
        state: &mut AttemptState,
        established: &mut bool,
    ) {
        let Some(url) = scan::find_https_url(line) else {
            return;
        };
        if self.state.publish(url).await {
            info!(provider = %provider.name, url = %url, "Tunnel established");
        } else {
            debug!(provider = %provider.name, "Tunnel URL unchanged; notice suppressed");
        }
        *established = true;
        if *state != AttemptState::Established {
            transition(&provider.name, state, AttemptState::Established);
        }
    }

    /// Fetch the first public URL from a provider's tunnel-listing API.
    async fn query_public_url(&self, endpoint: &str) -> Result<String, TunnelError> {
        #[derive(Debug, Deserialize)]
        struct TunnelList {
            #[serde(default)]
            tunnels: Vec<TunnelDescriptor>,
        }

        #[derive(Debug, Deserialize)]
        struct TunnelDescriptor {
            public_url: String,
        }

        let response = self
            .http
            .get(endpoint)
            .send()
            .await
            .map_err(|e| TunnelError::QueryApi(e.to_string()))?;
        let list: TunnelList = response
            .json()
            .await
            .map_err(|e| TunnelError::QueryApi(e.to_string()))?;

        list.tunnels
            .into_iter()
            .next()
            .map(|t| t.public_url)
            .ok_or_else(|| TunnelError::QueryApi("no active tunnels reported".into()))
    }

    /// Operator guidance when no provider could establish a tunnel.
    fn log_manual_instructions(&self) {
        warn!("No tunnel provider could establish a public URL");
        warn!(
            port = self.port,
            "The collector is still serving on the local port"
        );
        for provider in &self.settings.providers {
            warn!(
                provider = %provider.name,
                command = %provider.command_line(),
                "Run manually and share the URL it prints"
            );
        }
    }
}

/// Scan one output stream line-by-line into the attempt's event channel.
fn spawn_line_reader<R>(stream: R, events: mpsc::Sender<AttemptEvent>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if events.send(AttemptEvent::Line(line)).await.is_err() {
                break;
            }
        }
    });
}

fn transition(provider: &str, state: &mut AttemptState, next: AttemptState) {
    debug!(provider, from = ?*state, to = ?next, "Attempt state change");
    *state = next;
}

fn log_exit(provider: &str, status: Option<ExitStatus>) {
    match status {
        Some(status) if status.success() => info!(provider, "Tunnel process exited cleanly"),
        Some(status) => warn!(provider, ?status, "Tunnel process exited"),
        None => warn!(provider, "Tunnel process exit status unavailable"),
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
#[path = "supervisor_tests.rs"]
mod tests;
