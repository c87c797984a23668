use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub mod chain;
pub mod config;
pub mod consensus;
pub mod constants;
pub mod error;
pub mod nodes;
pub mod pow;
pub mod service;

pub use chain::{is_valid, validate_chain, Ledger};
pub use config::LedgerConfig;
pub use consensus::{ChainFetcher, PeerChain, PeerOutcome};
pub use error::{ChainViolation, FetchError, LedgerError, Result};
pub use nodes::NodeRegistry;
pub use service::{LedgerService, MineOutcome};

/// Puzzle solution carried by every block.
pub type Proof = i64;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub receiver: String,
    pub amount: f64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, receiver: impl Into<String>, amount: f64) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            amount,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: String,
    pub proof: Proof,
    pub previous_hash: String,
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Builds a block stamped with the current local time.
    pub fn new(
        index: u64,
        proof: Proof,
        previous_hash: impl Into<String>,
        transactions: Vec<Transaction>,
    ) -> Self {
        Self {
            index,
            timestamp: timestamp_now(),
            proof,
            previous_hash: previous_hash.into(),
            transactions,
        }
    }

    pub fn hash(&self) -> Result<String> {
        digest(self)
    }
}

/// Hex SHA-256 of any value's canonical (RFC 8785) JSON encoding.
///
/// Keys are sorted and whitespace is dropped, so two structurally equal values
/// hash identically regardless of field declaration order.
pub fn digest<T: Serialize>(value: &T) -> Result<String> {
    let canonical = serde_jcs::to_vec(value)?;
    Ok(sha256_hex(&canonical))
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

pub fn timestamp_now() -> String {
    chrono::Local::now()
        .format(constants::TIMESTAMP_FORMAT)
        .to_string()
}
