//! The current set of reachable peer endpoints.

use std::net::SocketAddr;
use std::sync::Mutex;

use tracing::info;

use crate::config::PeerScanConfig;
use crate::peers::scan::PeerScanner;

/// The set of `host:port` peers this node currently believes are
/// reachable, refreshed on its own timer.
///
/// Guarded by a dedicated [`std::sync::Mutex`], independent of the
/// ledger's mutex, so a scan in progress never blocks mining or
/// admission and vice versa.
pub struct PeerDirectory {
    peers: Mutex<Vec<String>>,
}

impl PeerDirectory {
    pub fn new() -> Self {
        Self {
            peers: Mutex::new(Vec::new()),
        }
    }

    /// The current peer list, as of the most recent [`Self::refresh`].
    pub fn peers(&self) -> Vec<String> {
        self.peers.lock().expect("peer directory mutex poisoned").clone()
    }

    /// Recomputes the peer set using `scanner` and swaps it in. Holds the
    /// directory's mutex only for the duration of the swap, not for the
    /// scan itself.
    pub async fn refresh(
        &self,
        scanner: &dyn PeerScanner,
        self_addr: SocketAddr,
        window: &PeerScanConfig,
    ) {
        let found = scanner.scan(self_addr, window).await;
        let count = found.len();
        {
            let mut guard = self.peers.lock().expect("peer directory mutex poisoned");
            *guard = found;
        }
        info!(peer_count = count, "refreshed peer directory");
    }
}

impl Default for PeerDirectory {
    fn default() -> Self {
        Self::new()
    }
}
