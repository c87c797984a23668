pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
pub const DEFAULT_DIFFICULTY: usize = 4;
pub const GENESIS_PROOF: i64 = 1;
pub const GENESIS_PREVIOUS_HASH: &str = "0";
/// Candidates handed to the worker pool per round of the parallel search.
pub const SEARCH_BATCH: i64 = 1 << 14;
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
