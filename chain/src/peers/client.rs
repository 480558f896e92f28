//! Outbound HTTP operations against peers: announcing transactions,
//! clearing pools, requesting chains, and prompting consensus.
//!
//! Every operation here is fire-and-forget from the caller's point of
//! view: failures are logged and swallowed, never propagated, matching
//! the "a peer being unreachable is never fatal" rule.

use std::time::Duration;

use reqwest::Client;
use tracing::warn;

use crate::error::PeerError;
use crate::types::{Block, ChainWire, SignedSubmissionWire};

/// A thin HTTP client for talking to other nodes in the mesh.
pub struct PeerClient {
    http: Client,
}

impl PeerClient {
    pub fn new(request_timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(request_timeout)
            .build()
            .expect("reqwest client with a fixed timeout should always build");
        Self { http }
    }

    fn endpoint(peer: &str, path: &str) -> String {
        format!("http://{peer}{path}")
    }

    /// Writes a new signed submission into `peer`'s pool.
    pub async fn announce_transaction(&self, peer: &str, submission: &SignedSubmissionWire) {
        let url = Self::endpoint(peer, "/transactions");
        if let Err(err) = self.http.put(&url).json(submission).send().await {
            warn!(peer, error = %err, "failed to announce transaction to peer");
        }
    }

    /// Instructs `peer` to drop its pool, used right after local block
    /// creation.
    pub async fn clear_pool(&self, peer: &str) {
        let url = Self::endpoint(peer, "/transactions");
        if let Err(err) = self.http.delete(&url).send().await {
            warn!(peer, error = %err, "failed to clear pool on peer");
        }
    }

    /// Prompts `peer` to run longest-chain resolution.
    pub async fn request_consensus(&self, peer: &str) {
        let url = Self::endpoint(peer, "/consensus");
        if let Err(err) = self.http.put(&url).send().await {
            warn!(peer, error = %err, "failed to request consensus on peer");
        }
    }

    /// Fetches `peer`'s current chain.
    pub async fn fetch_chain(&self, peer: &str) -> Result<Vec<Block>, PeerError> {
        let url = Self::endpoint(peer, "/chain");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| PeerError::ChainFetchFailed(peer.to_string(), err))?;

        if !response.status().is_success() {
            return Err(PeerError::InvalidChain(peer.to_string()));
        }

        let wire: ChainWire = response
            .json()
            .await
            .map_err(|err| PeerError::ChainFetchFailed(peer.to_string(), err))?;

        Ok(wire.chain)
    }
}
