// Role registry
//
// Set membership of (identity, capability) pairs. Granting a held
// capability or revoking an unheld one succeeds without changing anything
// and without emitting an event.

use std::collections::BTreeSet;

use log::{debug, warn};
use twist_common::{
    crypto::Identity,
    error::{CoreError, CoreResult},
    roles::{Capability, RoleGrant},
};

use super::events::{CoreEvent, EventLog};

#[derive(Clone, Debug)]
pub struct RoleRegistry {
    grants: BTreeSet<RoleGrant>,
}

impl RoleRegistry {
    /// Create the registry with its initial administrator
    pub fn new(admin: Identity) -> Self {
        let mut grants = BTreeSet::new();
        grants.insert(RoleGrant::new(admin, Capability::Administrator));
        Self { grants }
    }

    pub(crate) fn from_grants(grants: impl IntoIterator<Item = RoleGrant>) -> Self {
        Self {
            grants: grants.into_iter().collect(),
        }
    }

    pub fn has(&self, account: &Identity, capability: Capability) -> bool {
        self.grants.contains(&RoleGrant::new(*account, capability))
    }

    /// Fails with `Unauthorized` unless `account` holds `capability`
    pub fn require(&self, account: &Identity, capability: Capability) -> CoreResult<()> {
        if self.has(account, capability) {
            Ok(())
        } else {
            Err(CoreError::Unauthorized)
        }
    }

    /// Give `capability` to `account`.
    /// Returns whether the membership changed.
    pub fn grant(
        &mut self,
        invoker: &Identity,
        account: &Identity,
        capability: Capability,
        events: &mut EventLog,
    ) -> CoreResult<bool> {
        self.require(invoker, Capability::Administrator)?;

        let inserted = self.grants.insert(RoleGrant::new(*account, capability));
        if inserted {
            if log::log_enabled!(log::Level::Debug) {
                debug!("{} granted {} to {}", invoker, capability, account);
            }
            events.push(CoreEvent::RoleGranted {
                account: *account,
                capability,
                by: *invoker,
            });
        }
        Ok(inserted)
    }

    /// Remove `capability` from `account`.
    /// Returns whether the membership changed.
    pub fn revoke(
        &mut self,
        invoker: &Identity,
        account: &Identity,
        capability: Capability,
        events: &mut EventLog,
    ) -> CoreResult<bool> {
        self.require(invoker, Capability::Administrator)?;

        let removed = self.grants.remove(&RoleGrant::new(*account, capability));
        if removed {
            if log::log_enabled!(log::Level::Debug) {
                debug!("{} revoked {} from {}", invoker, capability, account);
            }
            // Not enforced: the caller owns this decision
            if capability == Capability::Administrator
                && self.holder_count(Capability::Administrator) == 0
            {
                warn!(
                    "Last administrator {} was revoked, roles can no longer be managed",
                    account
                );
            }
            events.push(CoreEvent::RoleRevoked {
                account: *account,
                capability,
                by: *invoker,
            });
        }
        Ok(removed)
    }

    /// Holders of `capability`, sorted
    pub fn holders(&self, capability: Capability) -> Vec<Identity> {
        self.grants
            .iter()
            .filter(|grant| grant.capability == capability)
            .map(|grant| grant.account)
            .collect()
    }

    pub fn holder_count(&self, capability: Capability) -> usize {
        self.grants
            .iter()
            .filter(|grant| grant.capability == capability)
            .count()
    }

    pub fn grants(&self) -> impl Iterator<Item = &RoleGrant> {
        self.grants.iter()
    }
}
