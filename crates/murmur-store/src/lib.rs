//! In-memory, channel-partitioned chat state.
//!
//! [`Store`] holds every channel's message ledger and presence registry. It
//! starts empty, lives for the whole process and is shared by handlers
//! behind an `Arc`. Each channel's ledger and presence map sit behind their
//! own mutex, so writers to one channel serialize while other channels
//! proceed untouched. Readers always get clones, never references into the
//! canonical state.

pub mod clock;
pub mod error;
pub mod ids;
pub mod ledger;
mod partition;
pub mod presence;
pub mod reactions;

use std::sync::Arc;
use std::time::Duration;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Result, StoreError};
pub use ledger::NewMessage;
pub use reactions::ToggleOutcome;

use crate::ledger::ChannelLedger;
use crate::partition::Partitions;
use crate::presence::PresencePartition;

/// Retention and presence tuning.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Messages kept per channel; older ones are evicted first.
    pub max_messages_per_channel: usize,
    /// Presence entries idle longer than this are swept.
    pub presence_ttl: Duration,
    /// Presence entries seen within this window read as online.
    pub online_window: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_messages_per_channel: 100,
            presence_ttl: Duration::from_secs(5 * 60),
            online_window: Duration::from_secs(30),
        }
    }
}

pub struct Store {
    config: StoreConfig,
    clock: Arc<dyn Clock>,
    ledgers: Partitions<ChannelLedger>,
    presence: Partitions<PresencePartition>,
}

impl Store {
    pub fn new(config: StoreConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: StoreConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            ledgers: Partitions::new(),
            presence: Partitions::new(),
        }
    }

    fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

/// The empty-string check every required text field goes through.
pub(crate) fn require(value: &str, field: &'static str) -> Result<()> {
    if value.is_empty() {
        return Err(StoreError::Validation(field));
    }
    Ok(())
}

fn duration_ms(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}
