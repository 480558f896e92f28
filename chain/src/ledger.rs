//! The in-memory chain, its pending-transaction pool, admission logic,
//! proof-of-work search, and longest-chain consensus.
//!
//! All chain and pool mutation goes through [`Ledger`]'s methods; callers
//! that need cross-operation atomicity (the mining round, consensus
//! resolution) wrap a `Ledger` in a single `tokio::sync::Mutex` and hold
//! the guard across the whole operation, never just a field access.

use tracing::{info, warn};

use crate::config::NodeConfig;
use crate::crypto::{self, CryptoError};
use crate::error::LedgerError;
use crate::types::{valid_proof, Block, SignedSubmissionWire, TransactionRecord};

/// The mining-reward transaction's synthetic sender.
pub const REWARD_SENDER: &str = "THE BLOCKCHAIN";

/// A signed transaction submission, as admitted through [`Ledger::add_transaction`].
pub struct SignedSubmission {
    pub record: TransactionRecord,
    pub public_key: String,
    pub signature: String,
}

impl From<SignedSubmissionWire> for SignedSubmission {
    fn from(wire: SignedSubmissionWire) -> Self {
        Self {
            record: wire.record,
            public_key: wire.public_key,
            signature: wire.signature,
        }
    }
}

/// The in-memory chain and pending pool for one node.
pub struct Ledger {
    chain: Vec<Block>,
    pool: Vec<TransactionRecord>,
    difficulty: usize,
    mining_reward: f32,
    mining_reward_sender: &'static str,
    miner_address: String,
}

impl Ledger {
    /// Seeds a fresh chain: one genesis block whose `prev_hash` is the
    /// content hash of the all-zero block (nonce 0, all-zero prev_hash,
    /// timestamp 0, no transactions). Every node that derives this
    /// independently arrives at the same genesis.
    pub fn new(config: &NodeConfig, miner_address: impl Into<String>) -> Self {
        let zero_block = Block {
            nonce: 0,
            prev_hash: [0u8; crypto::HASH_LEN],
            timestamp: 0,
            transactions: Vec::new(),
        };
        let genesis = Block::new(0, zero_block.hash());

        info!(hash = %hex::encode(genesis.hash()), "seeded genesis block");

        Self {
            chain: vec![genesis],
            pool: Vec::new(),
            difficulty: config.difficulty,
            mining_reward: config.mining_reward,
            mining_reward_sender: config.mining_reward_sender,
            miner_address: miner_address.into(),
        }
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn pool(&self) -> &[TransactionRecord] {
        &self.pool
    }

    /// Clears the pending pool. Called after a local mining round, and on
    /// inbound "clear pool" notifications from mining peers.
    pub fn clear_pool(&mut self) {
        self.pool.clear();
    }

    /// Replaces the chain wholesale. Does not touch the pool.
    fn replace_chain(&mut self, chain: Vec<Block>) {
        self.chain = chain;
    }

    /// Computes `address`'s balance by scanning every transaction in every
    /// block: `+value` for each incoming transfer, `-value` for each
    /// outgoing one.
    pub fn balance(&self, address: &str) -> f32 {
        let mut total = 0.0f32;
        for block in &self.chain {
            for tx in &block.transactions {
                if tx.recipient == address {
                    total += tx.value;
                }
                if tx.sender == address {
                    total -= tx.value;
                }
            }
        }
        total
    }

    /// Admits a signed submission into the pool.
    ///
    /// Rules, in order: the reserved reward sender is admitted
    /// unconditionally; everything else must carry a signature that
    /// verifies over the transaction's canonical bytes under the claimed
    /// public key, and the claimed sender must have sufficient balance.
    pub fn add_transaction(&mut self, submission: SignedSubmission) -> Result<(), LedgerError> {
        let SignedSubmission {
            record,
            public_key,
            signature,
        } = submission;

        if record.sender == self.mining_reward_sender {
            self.pool.push(record);
            return Ok(());
        }

        let verifying_key = crypto::verifying_key_from_hex(&public_key).map_err(|err| {
            warn!(reason = %err, "rejected transaction: malformed public key");
            malformed_key_error(err)
        })?;
        let sig = crypto::signature_from_hex(&signature).map_err(|err| {
            warn!(reason = %err, "rejected transaction: malformed signature");
            malformed_key_error(err)
        })?;

        if !crypto::verify_message(&verifying_key, &record.canonical_bytes(), &sig) {
            warn!(sender = %record.sender, "rejected transaction: invalid signature");
            return Err(LedgerError::InvalidSignature);
        }

        let balance = self.balance(&record.sender);
        if balance < record.value {
            warn!(
                sender = %record.sender,
                balance,
                requested = record.value,
                "rejected transaction: insufficient balance"
            );
            return Err(LedgerError::InsufficientBalance);
        }

        self.pool.push(record);
        Ok(())
    }

    /// Searches for the first `nonce` (starting at 0) for which
    /// [`valid_proof`] holds against `prev_hash` and `transactions` at this
    /// ledger's difficulty.
    pub fn proof_of_work(&self, prev_hash: [u8; crypto::HASH_LEN], transactions: &[TransactionRecord]) -> u64 {
        let mut nonce = 0u64;
        while !valid_proof(nonce, prev_hash, transactions, self.difficulty) {
            nonce += 1;
        }
        nonce
    }

    /// Runs one full mining round: append the reward transaction, search
    /// for a winning nonce over the current pool, append the new block,
    /// and clear the pool. Returns the newly mined block.
    ///
    /// The caller is expected to hold this ledger behind a mutex for the
    /// duration of the round; no method here takes a lock itself.
    pub fn mine(&mut self) -> Block {
        let reward = TransactionRecord::new(self.mining_reward_sender, self.miner_address.clone(), self.mining_reward);
        self.pool.push(reward);

        let prev_hash = self.chain.last().expect("chain always has at least genesis").hash();
        let transactions = self.pool.clone();

        let nonce = self.proof_of_work(prev_hash, &transactions);

        let mut block = Block::new(nonce, prev_hash);
        block.set_transactions(transactions);
        let hash = block.hash();
        self.chain.push(block.clone());
        self.pool.clear();

        info!(
            height = self.chain.len(),
            hash = %hex::encode(hash),
            nonce,
            tx_count = block.transactions.len(),
            "mined block"
        );

        block
    }

    /// `valid_chain(candidate)`: every non-genesis block's `prev_hash`
    /// equals the hash of the block before it, and satisfies
    /// [`valid_proof`] at this ledger's difficulty. The genesis element is
    /// never checked.
    pub fn valid_chain(&self, candidate: &[Block]) -> bool {
        if candidate.is_empty() {
            return false;
        }
        for i in 1..candidate.len() {
            let prev = &candidate[i - 1];
            let curr = &candidate[i];
            if curr.prev_hash != prev.hash() {
                return false;
            }
            if !valid_proof(curr.nonce, curr.prev_hash, &curr.transactions, self.difficulty) {
                return false;
            }
        }
        true
    }

    /// Accepts `candidate` as the new chain iff it is strictly longer than
    /// the current chain and passes [`Self::valid_chain`]. Ties are broken
    /// toward the currently held chain. Returns whether the replacement
    /// happened. Never touches the pool.
    pub fn resolve_with_candidate(&mut self, candidate: Vec<Block>) -> bool {
        if candidate.len() <= self.chain.len() {
            return false;
        }
        if !self.valid_chain(&candidate) {
            return false;
        }
        self.replace_chain(candidate);
        true
    }
}

fn malformed_key_error(err: CryptoError) -> LedgerError {
    LedgerError::MalformedRequest(err.to_string())
}
