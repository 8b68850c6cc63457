use serde::{Deserialize, Serialize};

use crate::crypto::Identity;
use crate::time::TimestampSeconds;

/// Per-beneficiary vesting totals.
/// Both totals only grow, and `claimed <= vested` at all times.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingEntry {
    pub vested: u64,
    pub claimed: u64,
}

impl VestingEntry {
    /// Vested amount not yet claimed, regardless of the window
    pub fn remaining(&self) -> u64 {
        self.vested.saturating_sub(self.claimed)
    }

    pub fn is_fully_claimed(&self) -> bool {
        self.claimed >= self.vested
    }
}

/// The single release window shared by all beneficiaries: `[start, end]`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingWindow {
    pub start: TimestampSeconds,
    pub end: TimestampSeconds,
}

impl VestingWindow {
    /// Returns `None` when the window would be empty or overflow
    pub fn new(start: TimestampSeconds, duration: u64) -> Option<Self> {
        if duration == 0 {
            return None;
        }
        let end = start.checked_add(duration)?;
        Some(Self { start, end })
    }

    pub fn duration(&self) -> u64 {
        self.end - self.start
    }
}

/// Amount the balance ledger must mint to the beneficiary after a claim
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintInstruction {
    pub beneficiary: Identity,
    pub amount: u64,
}
