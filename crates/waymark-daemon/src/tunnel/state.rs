//! Shared tunnel state cell.

use tokio::sync::RwLock;

/// The currently published public URL, readable by any request handler.
///
/// Single writer (the supervisor), many readers. The URL is intentionally
/// never cleared when a provider dies: a stale-but-visible URL is more
/// useful for manual recovery than a blanked panel. A later fallback
/// establishment overwrites it.
#[derive(Debug, Default)]
pub struct TunnelState {
    url: RwLock<Option<String>>,
}

impl TunnelState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a discovered URL.
    ///
    /// Returns `true` when the value actually changed (a new establishment).
    /// Providers tend to print their URL more than once; republishing an
    /// unchanged value returns `false` so callers can suppress duplicate
    /// operator notices.
    pub async fn publish(&self, url: &str) -> bool {
        let mut current = self.url.write().await;
        if current.as_deref() == Some(url) {
            return false;
        }
        *current = Some(url.to_string());
        true
    }

    /// The published URL, or `None` while no provider has established.
    pub async fn current(&self) -> Option<String> {
        self.url.read().await.clone()
    }
}
