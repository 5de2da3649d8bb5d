//! The position sequencer: hands out monotonically increasing log positions
//! to clients racing to append. Consensus/failover among sequencer replicas
//! is explicitly out of scope — this crate supplies the trait every striper
//! talks to, an in-process fake sufficient for tests, and the TCP wire
//! contract modeled on `src/sequencer/{client.cc,seqd.cc}`.

mod error;
mod tcp;

use async_trait::async_trait;

pub use error::{Result, SequencerError};
pub use tcp::{TcpSequencerClient, TcpSequencerServer};

use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out the next unused log position. Implementations must never hand
/// out the same position twice to two different callers; beyond that,
/// nothing about ordering between concurrent callers is guaranteed.
#[async_trait]
pub trait Sequencer: Send + Sync {
    async fn next(&self) -> Result<u64>;
}

/// In-process sequencer backed by an atomic counter — no persistence, no
/// recovery, not shared across processes. Grounded on `seqd.cc`'s
/// `counter_state`, which is exactly this: an in-memory `counter++` with no
/// durability story of its own.
#[derive(Debug, Default)]
pub struct FakeSequencer {
    counter: AtomicU64,
}

impl FakeSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start handing out positions from `start` rather than 0.
    pub fn starting_at(start: u64) -> Self {
        Self {
            counter: AtomicU64::new(start),
        }
    }

    pub fn current(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Sequencer for FakeSequencer {
    async fn next(&self) -> Result<u64> {
        Ok(self.counter.fetch_add(1, Ordering::SeqCst))
    }
}
