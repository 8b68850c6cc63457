// Vesting ledger
//
// Every beneficiary shares one release window [start, end]. Between the
// two bounds the unlocked part of a grant grows linearly:
//
//   unlocked = vested * (now - start) / (end - start)
//
// computed with integers, multiplication first, truncating. At or after
// `end` everything is unlocked. Claims never exceed the unlocked part,
// which keeps `claimed <= vested` for every entry.
//
// Grants are capped together with the circulating supply:
//   current_supply + total_vested + amount <= max_supply

use indexmap::IndexMap;
use log::debug;
use twist_common::{
    crypto::Identity,
    error::{CoreError, CoreResult},
    roles::Capability,
    time::TimestampSeconds,
    vesting::{MintInstruction, VestingEntry, VestingWindow},
};

use super::{
    events::{CoreEvent, EventLog},
    roles::RoleRegistry,
};

#[derive(Clone, Debug)]
pub struct VestingLedger {
    window: VestingWindow,
    max_supply: u64,
    total_vested: u64,
    entries: IndexMap<Identity, VestingEntry>,
    paused: bool,
}

impl VestingLedger {
    pub fn new(window: VestingWindow, max_supply: u64) -> Self {
        Self {
            window,
            max_supply,
            total_vested: 0,
            entries: IndexMap::new(),
            paused: false,
        }
    }

    // Returns None if the vested totals don't fit in a u64
    pub(crate) fn from_entries(
        window: VestingWindow,
        max_supply: u64,
        entries: IndexMap<Identity, VestingEntry>,
        paused: bool,
    ) -> Option<Self> {
        let total_vested = entries
            .values()
            .try_fold(0u64, |total, entry| total.checked_add(entry.vested))?;
        Some(Self {
            window,
            max_supply,
            total_vested,
            entries,
            paused,
        })
    }

    fn ensure_not_paused(&self) -> CoreResult<()> {
        if self.paused {
            Err(CoreError::Paused)
        } else {
            Ok(())
        }
    }

    /// Grant `amount` more to `beneficiary`. Administrator only.
    ///
    /// `current_supply` is the circulating supply reported by the balance
    /// ledger at the time of the call.
    pub fn add_vesting(
        &mut self,
        roles: &RoleRegistry,
        caller: &Identity,
        beneficiary: &Identity,
        amount: u64,
        current_supply: u64,
        events: &mut EventLog,
    ) -> CoreResult<()> {
        roles.require(caller, Capability::Administrator)?;
        self.ensure_not_paused()?;

        if beneficiary.is_zero() {
            return Err(CoreError::InvalidBeneficiary);
        }
        if amount == 0 {
            return Err(CoreError::InvalidAmount);
        }

        let committed = current_supply
            .checked_add(self.total_vested)
            .and_then(|value| value.checked_add(amount))
            .ok_or(CoreError::ExceedsMaxSupply)?;
        if committed > self.max_supply {
            if log::log_enabled!(log::Level::Debug) {
                debug!(
                    "Rejecting grant of {} to {}: {} committed, max supply {}",
                    amount, beneficiary, committed, self.max_supply
                );
            }
            return Err(CoreError::ExceedsMaxSupply);
        }

        // Cannot overflow: entry.vested <= total_vested < committed
        let new_total = self.total_vested + amount;
        let entry = self.entries.entry(*beneficiary).or_default();
        entry.vested += amount;
        self.total_vested = new_total;

        if log::log_enabled!(log::Level::Debug) {
            debug!(
                "Vesting {} added for {} (vested {}, total {})",
                amount, beneficiary, entry.vested, self.total_vested
            );
        }
        events.push(CoreEvent::VestingAdded {
            beneficiary: *beneficiary,
            amount,
        });

        Ok(())
    }

    /// Part of the grants unlocked at `now`, claimed or not
    pub fn vested_amount(&self, beneficiary: &Identity, now: TimestampSeconds) -> u64 {
        let vested = match self.entries.get(beneficiary) {
            Some(entry) => entry.vested,
            None => return 0,
        };

        if now >= self.window.end {
            return vested;
        }
        if now <= self.window.start {
            return 0;
        }

        // u128: vested * elapsed can exceed u64
        let elapsed = (now - self.window.start) as u128;
        let duration = self.window.duration() as u128;
        // Result is below `vested` since elapsed < duration
        ((vested as u128 * elapsed) / duration) as u64
    }

    /// Amount `beneficiary` could claim at `now`
    pub fn claimable(&self, beneficiary: &Identity, now: TimestampSeconds) -> u64 {
        let claimed = match self.entries.get(beneficiary) {
            Some(entry) if !entry.is_fully_claimed() => entry.claimed,
            _ => return 0,
        };
        self.vested_amount(beneficiary, now).saturating_sub(claimed)
    }

    /// Record a claim of everything currently claimable.
    ///
    /// The returned instruction must be applied by the balance ledger;
    /// this ledger does not track circulating supply.
    pub fn claim(
        &mut self,
        beneficiary: &Identity,
        now: TimestampSeconds,
        events: &mut EventLog,
    ) -> CoreResult<MintInstruction> {
        self.ensure_not_paused()?;

        let amount = self.claimable(beneficiary, now);
        if amount == 0 {
            return Err(CoreError::NothingToClaim);
        }

        let entry = self
            .entries
            .get_mut(beneficiary)
            .ok_or(CoreError::NothingToClaim)?;
        // amount <= vested - claimed
        entry.claimed += amount;

        if log::log_enabled!(log::Level::Debug) {
            debug!(
                "{} claimed {} at {} ({} of {} released)",
                beneficiary, amount, now, entry.claimed, entry.vested
            );
        }
        events.push(CoreEvent::VestingClaimed {
            beneficiary: *beneficiary,
            amount,
            at: now,
        });

        Ok(MintInstruction {
            beneficiary: *beneficiary,
            amount,
        })
    }

    /// Stop grants and claims. Pauser only, idempotent.
    pub fn pause(
        &mut self,
        roles: &RoleRegistry,
        caller: &Identity,
        events: &mut EventLog,
    ) -> CoreResult<()> {
        roles.require(caller, Capability::Pauser)?;
        if !self.paused {
            self.paused = true;
            debug!("Vesting paused by {}", caller);
            events.push(CoreEvent::Paused { by: *caller });
        }
        Ok(())
    }

    pub fn unpause(
        &mut self,
        roles: &RoleRegistry,
        caller: &Identity,
        events: &mut EventLog,
    ) -> CoreResult<()> {
        roles.require(caller, Capability::Pauser)?;
        if self.paused {
            self.paused = false;
            debug!("Vesting unpaused by {}", caller);
            events.push(CoreEvent::Unpaused { by: *caller });
        }
        Ok(())
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Entry of `beneficiary`, zeroed if it never received a grant
    pub fn vesting_of(&self, beneficiary: &Identity) -> VestingEntry {
        self.entries.get(beneficiary).cloned().unwrap_or_default()
    }

    pub fn total_vested(&self) -> u64 {
        self.total_vested
    }

    pub fn max_supply(&self) -> u64 {
        self.max_supply
    }

    pub fn window(&self) -> VestingWindow {
        self.window
    }

    /// Beneficiaries in order of their first grant
    pub fn beneficiaries(&self) -> impl Iterator<Item = &Identity> {
        self.entries.keys()
    }

    pub(crate) fn entries(&self) -> &IndexMap<Identity, VestingEntry> {
        &self.entries
    }
}
