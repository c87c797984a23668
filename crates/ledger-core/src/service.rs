//! Shared ledger facade for concurrent hosts.
//!
//! All chain and pool mutations go through one write lock. Proof searches and
//! peer fetches run without holding it.
use crate::{
    consensus::{fetch_all, select_longest_valid, ChainFetcher},
    error::{LedgerError, Result},
    nodes::NodeRegistry,
    pow::{self, CancelFlag},
    Block, Ledger, LedgerConfig, Proof, Transaction,
};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

#[derive(Clone, Debug, PartialEq)]
pub enum MineOutcome {
    Mined(Block),
    /// The tail moved or the search was abandoned before the proof was found.
    Stale,
}

/// Tail snapshot a proof search works against.
#[derive(Clone, Debug)]
pub struct MiningJob {
    pub previous_proof: Proof,
    pub previous_hash: String,
    pub difficulty: usize,
    cancel: CancelFlag,
}

pub struct LedgerService {
    ledger: RwLock<Ledger>,
    nodes: RwLock<NodeRegistry>,
    fetcher: Arc<dyn ChainFetcher>,
    /// Shared by every search started since the last supersession.
    epoch: Mutex<CancelFlag>,
}

impl LedgerService {
    pub fn new(config: LedgerConfig, fetcher: Arc<dyn ChainFetcher>) -> Self {
        Self {
            ledger: RwLock::new(Ledger::new(config)),
            nodes: RwLock::new(NodeRegistry::new()),
            fetcher,
            epoch: Mutex::new(CancelFlag::new()),
        }
    }

    pub async fn add_transaction(
        &self,
        sender: impl Into<String>,
        receiver: impl Into<String>,
        amount: f64,
    ) -> Result<u64> {
        self.ledger
            .write()
            .await
            .add_transaction(sender, receiver, amount)
    }

    /// Appends a block with a caller-computed proof and hash.
    pub async fn create_block(&self, proof: Proof, previous_hash: impl Into<String>) -> Block {
        self.ledger
            .write()
            .await
            .create_block(proof, previous_hash)
            .clone()
    }

    pub async fn previous_block(&self) -> Result<Block> {
        self.ledger.read().await.previous_block().cloned()
    }

    pub async fn chain_snapshot(&self) -> Vec<Block> {
        self.ledger.read().await.chain().to_vec()
    }

    pub async fn pending_snapshot(&self) -> Vec<Transaction> {
        self.ledger.read().await.pending().to_vec()
    }

    pub async fn is_valid(&self, candidate: &[Block]) -> bool {
        self.ledger.read().await.is_valid(candidate)
    }

    pub async fn is_chain_valid(&self) -> bool {
        self.ledger.read().await.is_own_chain_valid()
    }

    pub async fn add_node(&self, address: &str) -> Result<bool> {
        self.nodes.write().await.add(address)
    }

    /// Registers every address or, if any is invalid, none of them.
    pub async fn add_nodes<S: AsRef<str>>(&self, addresses: &[S]) -> Result<usize> {
        self.nodes.write().await.add_all(addresses)
    }

    pub async fn nodes(&self) -> Vec<String> {
        self.nodes.read().await.iter().map(str::to_owned).collect()
    }

    /// Finds the next proof in the background and appends a block on top of
    /// the tail it was mined against.
    pub async fn mine(&self) -> Result<MineOutcome> {
        let job = self.start_job().await?;
        let proof = pow::spawn_solve(job.previous_proof, job.difficulty, job.cancel.clone())
            .await
            .map_err(|e| LedgerError::MiningTask(e.to_string()))?;

        match proof {
            Some(proof) => self.commit(job, proof).await,
            None => {
                warn!(previous_proof = job.previous_proof, "proof search abandoned");
                Ok(MineOutcome::Stale)
            }
        }
    }

    pub async fn start_job(&self) -> Result<MiningJob> {
        // Same order as `reconcile`: ledger first, then the epoch. Holding the
        // read lock keeps the flag in step with the tail it guards.
        let ledger = self.ledger.read().await;
        let cancel = self.epoch.lock().await.clone();
        let tail = ledger.previous_block()?;
        Ok(MiningJob {
            previous_proof: tail.proof,
            previous_hash: tail.hash()?,
            difficulty: ledger.difficulty(),
            cancel,
        })
    }

    /// Appends the mined block unless the tail changed since `job` was taken.
    pub async fn commit(&self, job: MiningJob, proof: Proof) -> Result<MineOutcome> {
        let mut ledger = self.ledger.write().await;
        let tail = ledger.previous_block()?;
        if tail.proof != job.previous_proof || tail.hash()? != job.previous_hash {
            warn!(proof, "tail moved during proof search, discarding result");
            return Ok(MineOutcome::Stale);
        }
        let block = ledger.create_block(proof, job.previous_hash).clone();
        info!(index = block.index, proof, "mined block");
        Ok(MineOutcome::Mined(block))
    }

    /// Cancels every search in flight. New searches are unaffected.
    pub async fn abandon_mining(&self) {
        let mut epoch = self.epoch.lock().await;
        epoch.cancel();
        *epoch = CancelFlag::new();
    }

    /// Runs one reconciliation pass. Returns whether the chain was replaced.
    pub async fn reconcile(&self) -> bool {
        let peers = self.nodes().await;
        let outcomes = fetch_all(&peers, self.fetcher.as_ref()).await;
        let (local_len, difficulty) = {
            let ledger = self.ledger.read().await;
            (ledger.len(), ledger.difficulty())
        };
        let Some(candidate) = select_longest_valid(local_len, outcomes, difficulty) else {
            return false;
        };

        let mut ledger = self.ledger.write().await;
        if candidate.chain.len() <= ledger.len() {
            info!(
                peer = %candidate.peer,
                local_len = ledger.len(),
                "local chain caught up during scan, keeping it"
            );
            return false;
        }
        info!(peer = %candidate.peer, length = candidate.chain.len(), "adopting peer chain");
        ledger.replace_chain(candidate.chain);
        self.abandon_mining().await;
        true
    }
}
