//! Core domain types: transactions and blocks, their canonical wire form,
//! and content-hash identity.
//!
//! "Canonical" here means: the JSON produced by [`serde_json`] for these
//! structs, in field-declaration order. That encoding is used both as the
//! hash pre-image and as the ECDSA signing pre-image, so it must stay
//! byte-for-byte stable across nodes.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::crypto::{self, HASH_LEN};

/// A single sender-to-recipient value transfer.
///
/// Immutable once constructed; two records with identical fields always
/// produce identical canonical bytes and therefore identical hashes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(rename = "sender_blockchain_address")]
    pub sender: String,
    #[serde(rename = "recipient_blockchain_address")]
    pub recipient: String,
    pub value: f32,
}

impl TransactionRecord {
    /// Constructs a new record. No validation is performed here; admission
    /// rules (signature, balance) live in [`crate::ledger::Ledger`].
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, value: f32) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            value,
        }
    }

    /// The canonical JSON bytes used both for hashing and as the signing
    /// pre-image.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("TransactionRecord is always serializable")
    }

    /// SHA-256 of [`Self::canonical_bytes`].
    pub fn hash(&self) -> [u8; HASH_LEN] {
        crypto::sha256(&self.canonical_bytes())
    }
}

pub(crate) fn now_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as i64)
        .unwrap_or(0)
}

/// Serializes/deserializes a `[u8; 32]` as a lowercase 64-char hex string.
mod hash_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 32], D::Error> {
        let hex_str = String::deserialize(d)?;
        let decoded = hex::decode(&hex_str).map_err(serde::de::Error::custom)?;
        if decoded.len() != 32 {
            return Err(serde::de::Error::custom(format!(
                "expected 32 bytes, got {}",
                decoded.len()
            )));
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&decoded);
        Ok(out)
    }
}

/// A nonce, a link to the previous block, a creation timestamp, and an
/// ordered list of transactions.
///
/// The content hash ([`Self::hash`]) is the SHA-256 of the canonical JSON
/// encoding, including the real timestamp. See [`valid_proof`] for the
/// deliberately different, timestamp-zeroed form used during mining.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub nonce: u64,
    #[serde(with = "hash_hex")]
    pub prev_hash: [u8; HASH_LEN],
    pub timestamp: i64,
    pub transactions: Vec<TransactionRecord>,
}

impl Block {
    /// Constructs a block with the given nonce and previous-block hash,
    /// stamped with the current wall-clock time and an empty transaction
    /// list.
    pub fn new(nonce: u64, prev_hash: [u8; HASH_LEN]) -> Self {
        Self {
            nonce,
            prev_hash,
            timestamp: now_nanos(),
            transactions: Vec::new(),
        }
    }

    /// Attaches the block's transaction list.
    ///
    /// Intended to be called exactly once, immediately before the block is
    /// appended to the chain; the type does not enforce this beyond the
    /// documented contract (mirroring the reference node, which has no
    /// runtime guard either).
    pub fn set_transactions(&mut self, transactions: Vec<TransactionRecord>) {
        self.transactions = transactions;
    }

    /// The canonical JSON bytes of this block, including its real
    /// timestamp.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("Block is always serializable")
    }

    /// SHA-256 of [`Self::canonical_bytes`]. Used both for chain linking
    /// (the next block's `prev_hash`) and as the block's identity.
    pub fn hash(&self) -> [u8; HASH_LEN] {
        crypto::sha256(&self.canonical_bytes())
    }
}

/// Synthetic, PoW-only view of a block with `timestamp` pinned to zero.
#[derive(Serialize)]
struct PowPreimage<'a> {
    nonce: u64,
    #[serde(with = "hash_hex")]
    prev_hash: [u8; HASH_LEN],
    timestamp: i64,
    transactions: &'a [TransactionRecord],
}

/// `valid_proof(nonce, prev_hash, transactions, difficulty)`: true iff the
/// hex-encoded SHA-256 of the timestamp-zeroed synthetic block starts with
/// `difficulty` ASCII `'0'` characters.
///
/// This is a deliberate asymmetry, preserved from the reference node: the
/// search is over `(nonce, prev_hash, transactions)` with the timestamp
/// pinned to zero, but the block that actually gets appended to the chain
/// keeps its real timestamp, and the *real* block's hash — not this
/// synthetic one — is what the next block links to via `prev_hash`. Two
/// miners racing on an identical pool can find the same winning nonce yet
/// commit blocks with different link hashes, because their wall clocks
/// differ. This is not a bug to silently fix; it is a documented
/// consensus rule (see spec.md §4.2 / §9).
pub fn valid_proof(
    nonce: u64,
    prev_hash: [u8; HASH_LEN],
    transactions: &[TransactionRecord],
    difficulty: usize,
) -> bool {
    let preimage = PowPreimage {
        nonce,
        prev_hash,
        timestamp: 0,
        transactions,
    };
    let bytes = serde_json::to_vec(&preimage).expect("PoW preimage is always serializable");
    let hash = crypto::sha256(&bytes);
    let hex_hash = hex::encode(hash);
    difficulty <= hex_hash.len() && hex_hash.as_bytes()[..difficulty].iter().all(|&b| b == b'0')
}

/// Wire form of the chain, as returned by `GET /chain` and consumed by
/// peers during consensus resolution.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainWire {
    pub chain: Vec<Block>,
}

/// Wire form of a signed submission, as POSTed/PUT to `/transactions`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignedSubmissionWire {
    #[serde(flatten)]
    pub record: TransactionRecord,
    pub public_key: String,
    pub signature: String,
}

/// Wire form of `GET /transactions`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransactionPoolWire {
    pub transactions: Vec<TransactionRecord>,
    pub length: usize,
}

/// Wire form of `GET /amount`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AmountWire {
    pub amount: f32,
}

/// Generic status response used by several endpoints.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatusWire {
    pub message: String,
}

impl StatusWire {
    pub fn success() -> Self {
        Self { message: "success".to_string() }
    }
    pub fn fail() -> Self {
        Self { message: "fail".to_string() }
    }
    pub fn failed() -> Self {
        Self { message: "failed".to_string() }
    }
}
