//! Proof-of-work puzzle linking consecutive blocks.
//!
//! A candidate solves the puzzle when the SHA-256 hex digest of the decimal
//! string of `candidate^2 - previous^2` starts with `difficulty` zero
//! characters. Checking is one hash; finding takes about `16^difficulty`.
use crate::{constants::SEARCH_BATCH, sha256_hex, Proof};
use rayon::prelude::*;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Shared flag used to abandon an in-flight search.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// `candidate^2 - previous^2`, exact for every pair of 64-bit proofs.
pub fn puzzle_value(previous: Proof, candidate: Proof) -> i128 {
    let previous = previous as i128;
    let candidate = candidate as i128;
    candidate * candidate - previous * previous
}

pub fn has_zero_prefix(hash: &str, difficulty: usize) -> bool {
    hash.len() >= difficulty && hash.bytes().take(difficulty).all(|b| b == b'0')
}

pub fn check(previous: Proof, candidate: Proof, difficulty: usize) -> bool {
    let hash = sha256_hex(puzzle_value(previous, candidate).to_string().as_bytes());
    has_zero_prefix(&hash, difficulty)
}

/// Linear search from 1 upwards; returns the smallest satisfying candidate.
pub fn solve(previous: Proof, difficulty: usize) -> Proof {
    let mut candidate: Proof = 1;
    while !check(previous, candidate, difficulty) {
        candidate += 1;
    }
    candidate
}

/// Searches consecutive batches of candidates across the rayon pool.
///
/// Each batch keeps the lowest hit, so the result is the same proof `solve`
/// would return. Returns `None` once `cancel` is raised or the proof space
/// runs out.
pub fn solve_parallel(previous: Proof, difficulty: usize, cancel: &CancelFlag) -> Option<Proof> {
    let mut start: Proof = 1;
    loop {
        if cancel.is_cancelled() {
            debug!("proof search over {previous} cancelled at {start}");
            return None;
        }
        let end = start.saturating_add(SEARCH_BATCH);
        let found = (start..end)
            .into_par_iter()
            .find_first(|candidate| cancel.is_cancelled() || check(previous, *candidate, difficulty));

        match found {
            Some(_) if cancel.is_cancelled() => return None,
            Some(proof) => {
                info!("solved puzzle after {previous}: proof {proof}");
                return Some(proof);
            }
            None if end == Proof::MAX => return None,
            None => start = end,
        }
    }
}

/// Runs [`solve_parallel`] on the blocking pool. Dropping the handle does not
/// stop the search; raise `cancel` for that.
pub fn spawn_solve(
    previous: Proof,
    difficulty: usize,
    cancel: CancelFlag,
) -> JoinHandle<Option<Proof>> {
    tokio::task::spawn_blocking(move || solve_parallel(previous, difficulty, &cancel))
}
