use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::BlockHeight;

/// Logical-clock port. The ledger reads the current height once per
/// successful CreatePolicy and stores it as the policy's start marker;
/// it never schedules against it.
pub trait LedgerClock {
    fn current_block(&self) -> BlockHeight;
}

/// A shared clock handle reads through to the inner clock, so a driver can
/// keep advancing a counter the ledger already owns a handle to.
impl<C: LedgerClock + ?Sized> LedgerClock for Arc<C> {
    fn current_block(&self) -> BlockHeight {
        (**self).current_block()
    }
}

/// Clock pinned at a constant height. The default for a bare ledger is
/// `FixedClock::genesis()` — every policy starts at block 0, matching a
/// deployment where the embedder has not wired a real chain height yet.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub BlockHeight);

impl FixedClock {
    pub fn genesis() -> Self {
        FixedClock(BlockHeight(0))
    }
}

impl LedgerClock for FixedClock {
    fn current_block(&self) -> BlockHeight {
        self.0
    }
}

/// Monotonic clock for workloads and tests: the driver advances it between
/// operations to simulate block production.
#[derive(Debug)]
pub struct BlockCounter {
    height: AtomicU64,
}

impl BlockCounter {
    pub fn starting_at(height: BlockHeight) -> Self {
        BlockCounter { height: AtomicU64::new(height.0) }
    }

    /// Move the chain forward by `blocks`.
    pub fn advance(&self, blocks: u64) {
        self.height.fetch_add(blocks, Ordering::Relaxed);
    }
}

impl LedgerClock for BlockCounter {
    fn current_block(&self) -> BlockHeight {
        BlockHeight(self.height.load(Ordering::Relaxed))
    }
}
