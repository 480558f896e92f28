//! Typed error enums for ledger admission and peer communication.

use thiserror::Error;

/// Reasons a submitted transaction, or an attempt to read the ledger, can
/// fail.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("signature does not verify against the claimed sender key")]
    InvalidSignature,

    #[error("sender balance is insufficient for this transfer")]
    InsufficientBalance,
}

/// Reasons a peer interaction can fail. Never fatal to the caller:
/// callers log and move on to the next peer.
#[derive(Debug, Error)]
pub enum PeerError {
    #[error("peer {0} unreachable: {1}")]
    Unreachable(String, reqwest::Error),

    #[error("failed to fetch chain from peer {0}: {1}")]
    ChainFetchFailed(String, reqwest::Error),

    #[error("peer {0} returned a chain that failed validation")]
    InvalidChain(String),
}
