//! Ties the ledger, the peer directory, and the outbound peer client
//! together behind the periodic mining and peer-sync timers.
//!
//! `NodeScheduler` is the one long-lived object a binary needs to
//! construct: it owns the mutex-guarded [`Ledger`], spawns its own
//! background tasks, and exposes the operations the HTTP surface calls
//! into directly.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::NodeConfig;
use crate::ledger::{Ledger, SignedSubmission};
use crate::peers::{PeerClient, PeerDirectory, PeerScanner};
use crate::types::{Block, SignedSubmissionWire};

/// Owns the ledger mutex, the peer directory, and the peer client; runs
/// the mining and peer-sync timers.
pub struct NodeScheduler {
    ledger: Mutex<Ledger>,
    directory: PeerDirectory,
    peer_client: PeerClient,
    scanner: Box<dyn PeerScanner>,
    self_addr: SocketAddr,
    config: NodeConfig,
}

impl NodeScheduler {
    pub fn new(config: NodeConfig, miner_address: impl Into<String>, scanner: Box<dyn PeerScanner>) -> Self {
        let self_addr = config.listen_addr;
        let ledger = Ledger::new(&config, miner_address);
        let peer_client = PeerClient::new(config.peer_request_timeout);
        Self {
            ledger: Mutex::new(ledger),
            directory: PeerDirectory::new(),
            peer_client,
            scanner,
            self_addr,
            config,
        }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Snapshot of the current chain, for `GET /chain`.
    pub async fn chain_snapshot(&self) -> Vec<Block> {
        self.ledger.lock().await.chain().to_vec()
    }

    /// Snapshot of the current pool, for `GET /transactions`.
    pub async fn pool_snapshot(&self) -> Vec<crate::types::TransactionRecord> {
        self.ledger.lock().await.pool().to_vec()
    }

    pub async fn balance(&self, address: &str) -> f32 {
        self.ledger.lock().await.balance(address)
    }

    /// Admits a locally-submitted transaction (`POST /transactions`) and,
    /// on success, announces it to every known peer.
    pub async fn submit_local_transaction(
        &self,
        submission: SignedSubmission,
        wire: SignedSubmissionWire,
    ) -> Result<(), crate::error::LedgerError> {
        {
            let mut ledger = self.ledger.lock().await;
            ledger.add_transaction(submission)?;
        }
        for peer in self.directory.peers() {
            self.peer_client.announce_transaction(&peer, &wire).await;
        }
        Ok(())
    }

    /// Admits a peer-originated transaction (`PUT /transactions`). Does
    /// not re-announce: the originating peer already owns that fan-out.
    pub async fn admit_peer_transaction(
        &self,
        submission: SignedSubmission,
    ) -> Result<(), crate::error::LedgerError> {
        let mut ledger = self.ledger.lock().await;
        ledger.add_transaction(submission)
    }

    /// Clears the local pool. Used by `DELETE /transactions`, and called
    /// by peers right after they mine a block.
    pub async fn clear_pool(&self) {
        self.ledger.lock().await.clear_pool();
    }

    /// Runs exactly one mining round, then broadcasts clear-pool and
    /// consensus-request to every known peer, outside the ledger lock.
    pub async fn mine_once(&self) -> Block {
        let block = {
            let mut ledger = self.ledger.lock().await;
            ledger.mine()
        };

        let peers = self.directory.peers();
        for peer in &peers {
            self.peer_client.clear_pool(peer).await;
        }
        for peer in &peers {
            self.peer_client.request_consensus(peer).await;
        }

        block
    }

    /// Fetches every known peer's chain and, among the candidates that are
    /// both strictly longer than the local chain and themselves pass
    /// [`crate::ledger::Ledger::valid_chain`], replaces the local chain
    /// with the longest one. A longer-but-invalid candidate is skipped, not
    /// treated as the winner — a shorter valid candidate still beats it.
    /// Returns whether a replacement happened.
    pub async fn resolve_conflicts(&self) -> bool {
        let peers = self.directory.peers();
        let mut candidates: Vec<Vec<Block>> = Vec::new();

        for peer in &peers {
            match self.peer_client.fetch_chain(peer).await {
                Ok(candidate) => candidates.push(candidate),
                Err(err) => warn!(peer, error = %err, "failed to fetch chain from peer"),
            }
        }

        let mut ledger = self.ledger.lock().await;
        let local_len = ledger.chain().len();

        let mut best: Option<Vec<Block>> = None;
        for candidate in candidates {
            if candidate.len() <= local_len {
                continue;
            }
            if !ledger.valid_chain(&candidate) {
                continue;
            }
            let better = match &best {
                Some(current_best) => candidate.len() > current_best.len(),
                None => true,
            };
            if better {
                best = Some(candidate);
            }
        }

        let Some(candidate) = best else {
            return false;
        };

        ledger.resolve_with_candidate(candidate)
    }

    /// Refreshes the peer directory from a single scan.
    pub async fn refresh_peers(&self) {
        self.directory
            .refresh(self.scanner.as_ref(), self.self_addr, &self.config.peer_scan)
            .await;
    }

    /// Spawns the periodic mining timer: mine, then sleep, then mine
    /// again. The next round starts `mining_period` after the previous
    /// one *returns*, so a slow round cannot cause two rounds to
    /// overlap.
    pub fn spawn_mining_timer(self: Arc<Self>) {
        tokio::spawn(async move {
            loop {
                self.mine_once().await;
                sleep(self.config.mining_period).await;
            }
        });
    }

    /// Spawns the periodic peer-sync timer: refresh the peer directory,
    /// then run consensus resolution, then sleep.
    pub fn spawn_peer_sync_timer(self: Arc<Self>) {
        tokio::spawn(async move {
            loop {
                self.refresh_peers().await;
                if self.resolve_conflicts().await {
                    info!("adopted a longer chain from a peer during scheduled sync");
                }
                sleep(self.config.peer_sync_period).await;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peers::scan::tests::FakeScanner;

    fn scheduler(scanner_peers: Vec<String>) -> NodeScheduler {
        let config = NodeConfig {
            difficulty: 1,
            ..NodeConfig::default()
        };
        NodeScheduler::new(config, "miner", Box::new(FakeScanner(scanner_peers)))
    }

    #[tokio::test]
    async fn mine_once_grows_the_chain_with_no_peers() {
        let node = scheduler(vec![]);
        let before = node.chain_snapshot().await.len();
        node.mine_once().await;
        let after = node.chain_snapshot().await.len();
        assert_eq!(after, before + 1);
    }

    #[tokio::test]
    async fn resolve_conflicts_with_no_peers_is_a_no_op() {
        let node = scheduler(vec![]);
        let replaced = node.resolve_conflicts().await;
        assert!(!replaced);
    }

    #[tokio::test]
    async fn refresh_peers_populates_directory_from_scanner() {
        let node = scheduler(vec!["127.0.0.1:5999".to_string()]);
        node.refresh_peers().await;
        assert_eq!(node.directory.peers(), vec!["127.0.0.1:5999".to_string()]);
    }

    #[tokio::test]
    async fn balance_reports_zero_for_unknown_address() {
        let node = scheduler(vec![]);
        assert_eq!(node.balance("nobody").await, 0.0);
    }

    /// A longer-but-invalid peer chain must not win over a shorter peer
    /// chain that is both longer than local and itself valid — the longer
    /// candidate is skipped entirely, not treated as the best available.
    #[tokio::test]
    async fn resolve_conflicts_skips_a_longer_invalid_chain_for_a_shorter_valid_one() {
        let cfg = NodeConfig {
            difficulty: 1,
            ..NodeConfig::default()
        };

        let mut valid_source = Ledger::new(&cfg, "valid-miner");
        valid_source.mine();
        let valid_chain = valid_source.chain().to_vec();
        assert_eq!(valid_chain.len(), 2);

        // Same prefix, but the appended block's prev_hash does not match
        // the tip above it, so valid_chain() must reject it regardless of
        // its greater length.
        let mut invalid_chain = valid_chain.clone();
        invalid_chain.push(Block::new(0, [0xFFu8; crate::crypto::HASH_LEN]));
        assert_eq!(invalid_chain.len(), 3);

        let invalid_addr = spawn_chain_responder(invalid_chain);
        let valid_addr = spawn_chain_responder(valid_chain.clone());

        let node = scheduler(vec![invalid_addr.to_string(), valid_addr.to_string()]);
        node.refresh_peers().await;

        let replaced = node.resolve_conflicts().await;
        assert!(replaced);
        assert_eq!(node.chain_snapshot().await, valid_chain);
    }

    /// Spawns a background thread that accepts exactly one connection and
    /// answers any request with a fixed `GET /chain` response, so
    /// `PeerClient::fetch_chain` (a real `reqwest` HTTP call) has something
    /// to talk to without pulling in an HTTP server framework just for
    /// this test.
    fn spawn_chain_responder(chain: Vec<Block>) -> std::net::SocketAddr {
        use std::io::{Read, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        let addr = listener.local_addr().expect("listener has a local addr");

        let wire = crate::types::ChainWire { chain };
        let json = serde_json::to_string(&wire).expect("ChainWire is always serializable");

        std::thread::spawn(move || {
            if let Ok((mut socket, _)) = listener.accept() {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf);
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    json.len(),
                    json
                );
                let _ = socket.write_all(response.as_bytes());
            }
        });

        addr
    }
}
