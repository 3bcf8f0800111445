//! In-memory storage for location reports.

use tokio::sync::RwLock;

use waymark_core::LocationReport;

/// Append-only log of received location reports.
///
/// Records are immutable once appended and live for the process lifetime;
/// the only mutation besides append is the administrative [`clear`].
/// Appends from concurrent request handlers are serialised by the write
/// lock, and [`snapshot`] copies under the read lock so no reader ever
/// observes a partially constructed record.
///
/// [`clear`]: LocationStore::clear
/// [`snapshot`]: LocationStore::snapshot
#[derive(Debug, Default)]
pub struct LocationStore {
    reports: RwLock<Vec<LocationReport>>,
}

impl LocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one report.
    pub async fn append(&self, report: LocationReport) {
        self.reports.write().await.push(report);
    }

    /// Point-in-time copy of every stored report, oldest first.
    pub async fn snapshot(&self) -> Vec<LocationReport> {
        self.reports.read().await.clone()
    }

    /// Number of stored reports.
    pub async fn count(&self) -> usize {
        self.reports.read().await.len()
    }

    /// Drop every stored report.
    pub async fn clear(&self) {
        self.reports.write().await.clear();
    }
}
