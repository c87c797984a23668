use crate::{
    config::LedgerConfig,
    constants::{GENESIS_PREVIOUS_HASH, GENESIS_PROOF},
    digest,
    error::{ChainViolation, LedgerError, Result},
    pow, Block, Proof, Transaction,
};
use tracing::{debug, info};

/// The chain plus the pool of transactions waiting for the next block.
#[derive(Clone, Debug)]
pub struct Ledger {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
    difficulty: usize,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

impl Ledger {
    /// Creates a ledger holding only the genesis block.
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            chain: vec![genesis_block()],
            pending: Vec::new(),
            difficulty: config.difficulty,
        }
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    /// Queues a transaction and returns the index of the block it will land in.
    ///
    /// Parties and the sign of the amount are taken as given. NaN and
    /// infinities are refused: they encode as `null`, which would make blocks
    /// hash alike and leave the chain undecodable for peers.
    pub fn add_transaction(
        &mut self,
        sender: impl Into<String>,
        receiver: impl Into<String>,
        amount: f64,
    ) -> Result<u64> {
        if !amount.is_finite() {
            return Err(LedgerError::NonFiniteAmount(amount));
        }
        let tx = Transaction::new(sender, receiver, amount);
        debug!(sender = %tx.sender, receiver = %tx.receiver, amount = tx.amount, "transaction queued");
        self.pending.push(tx);
        Ok(self.next_index())
    }

    /// Appends a block carrying every pending transaction and empties the pool.
    ///
    /// `proof` and `previous_hash` are trusted as supplied; nothing here checks
    /// them against the current tail.
    pub fn create_block(&mut self, proof: Proof, previous_hash: impl Into<String>) -> &Block {
        let transactions = std::mem::take(&mut self.pending);
        let block = Block::new(self.next_index(), proof, previous_hash, transactions);
        info!(
            index = block.index,
            proof = block.proof,
            txs = block.transactions.len(),
            "block appended"
        );
        self.chain.push(block);
        &self.chain[self.chain.len() - 1]
    }

    pub fn previous_block(&self) -> Result<&Block> {
        self.chain.last().ok_or(LedgerError::EmptyChain)
    }

    /// Validates `candidate` with this ledger's difficulty. Never touches the
    /// local chain.
    pub fn is_valid(&self, candidate: &[Block]) -> bool {
        is_valid(candidate, self.difficulty)
    }

    pub fn is_own_chain_valid(&self) -> bool {
        self.is_valid(&self.chain)
    }

    /// Swaps in `candidate` wholesale. Only reconciliation does this.
    pub(crate) fn replace_chain(&mut self, candidate: Vec<Block>) {
        info!(
            old_len = self.chain.len(),
            new_len = candidate.len(),
            "local chain replaced"
        );
        self.chain = candidate;
    }

    fn next_index(&self) -> u64 {
        self.chain.len() as u64 + 1
    }
}

/// The first block of every chain.
pub fn genesis_block() -> Block {
    Block::new(1, GENESIS_PROOF, GENESIS_PREVIOUS_HASH, vec![])
}

/// Walks adjacent pairs and reports the first broken link or proof.
///
/// Chains with fewer than two blocks are trivially valid.
pub fn validate_chain(chain: &[Block], difficulty: usize) -> std::result::Result<(), ChainViolation> {
    for pair in chain.windows(2) {
        let (previous, block) = (&pair[0], &pair[1]);
        let previous_hash = digest(previous).map_err(|_| ChainViolation::Unhashable {
            index: previous.index,
        })?;
        if block.previous_hash != previous_hash {
            return Err(ChainViolation::PreviousHashMismatch { index: block.index });
        }
        if !pow::check(previous.proof, block.proof, difficulty) {
            return Err(ChainViolation::InvalidProof { index: block.index });
        }
    }
    Ok(())
}

pub fn is_valid(chain: &[Block], difficulty: usize) -> bool {
    validate_chain(chain, difficulty).is_ok()
}
