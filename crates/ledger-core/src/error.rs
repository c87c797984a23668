use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// The chain holds no blocks. Unreachable while the genesis invariant holds.
    #[error("chain has no blocks")]
    EmptyChain,

    #[error("block cannot be canonically encoded: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("amount {0} has no JSON representation")]
    NonFiniteAmount(f64),

    #[error("invalid node address `{0}`")]
    InvalidAddress(String),

    #[error("proof search task failed: {0}")]
    MiningTask(String),
}

/// Why fetching a peer's chain failed. Recovered inside the resolver: the peer
/// is skipped and the scan continues.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("peer unreachable: {0}")]
    Unreachable(String),

    #[error("malformed peer response: {0}")]
    Malformed(String),
}

/// First violation found while walking a candidate chain.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainViolation {
    #[error("block {index} does not link to the digest of its predecessor")]
    PreviousHashMismatch { index: u64 },

    #[error("block {index} carries a proof that does not solve the puzzle")]
    InvalidProof { index: u64 },

    #[error("block {index} cannot be canonically encoded")]
    Unhashable { index: u64 },
}
