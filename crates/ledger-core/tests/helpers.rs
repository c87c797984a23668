use ledger_core::{pow, Block, Ledger, LedgerConfig};

pub const DIFFICULTY: usize = 3;

pub fn new_ledger() -> Ledger {
    Ledger::new(LedgerConfig::with_difficulty(DIFFICULTY))
}

/// Solves the next proof against the current tail and appends a block.
pub fn mine_next(ledger: &mut Ledger) -> Block {
    let previous = ledger.previous_block().expect("genesis always present");
    let proof = pow::solve(previous.proof, ledger.difficulty());
    let previous_hash = previous.hash().expect("block hashes");
    ledger.create_block(proof, previous_hash).clone()
}
