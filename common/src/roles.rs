//! Capability System
//!
//! Role-based access control for the node registry and the vesting ledger.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::crypto::Identity;

/// A named permission held by an identity
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Capability {
    /// Can grant/revoke every capability and manage vesting grants
    Administrator,
    /// Can apply mint instructions on the balance ledger
    Minter,
    /// Can pause/unpause vesting
    Pauser,
}

/// Role member entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoleGrant {
    pub account: Identity,
    pub capability: Capability,
}

impl RoleGrant {
    pub fn new(account: Identity, capability: Capability) -> Self {
        Self {
            account,
            capability,
        }
    }
}
