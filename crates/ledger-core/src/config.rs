use crate::constants::{DEFAULT_DIFFICULTY, HASH_HEX_SIZE};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Leading zero hex characters a proof digest must carry.
    #[serde(default = "default_difficulty")]
    pub difficulty: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
        }
    }
}

impl LedgerConfig {
    pub fn with_difficulty(difficulty: usize) -> Self {
        Self { difficulty }
    }

    /// A difficulty beyond the digest width can never be met.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.difficulty <= HASH_HEX_SIZE,
            "difficulty {} exceeds digest width of {HASH_HEX_SIZE} hex chars",
            self.difficulty
        );
        Ok(())
    }
}

fn default_difficulty() -> usize {
    DEFAULT_DIFFICULTY
}
