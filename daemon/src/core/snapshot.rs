// State snapshots
//
// A snapshot is a serde image of one `CoreState`: nodes keyed by id in
// registration order, the owner index, per-chain counters, vesting entries
// keyed by beneficiary, role grants, the vesting configuration, the pause
// flag and the event log.
//
// Derived data is stored so that a damaged or hand-edited snapshot can be
// detected: `restore` rebuilds every index from the records and refuses the
// snapshot if anything disagrees.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use twist_common::{
    crypto::Identity,
    node::{ChainType, NodeId, NodeRecord},
    roles::{Capability, RoleGrant},
    vesting::{VestingEntry, VestingWindow},
};

use super::{
    events::{EventLog, EventRecord},
    registry::NodeRegistry,
    roles::RoleRegistry,
    state::CoreState,
    vesting::VestingLedger,
};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
    #[error("Node stored under {key} has id {id}")]
    MismatchedNodeId { key: NodeId, id: NodeId },
    #[error("Duplicate node id {0}")]
    DuplicateNodeId(NodeId),
    #[error("Owner index does not match the node records")]
    OwnerIndexMismatch,
    #[error("Chain counter for {chain_type} is {stored}, records give {expected}")]
    ChainCounterMismatch {
        chain_type: ChainType,
        stored: u64,
        expected: u64,
    },
    #[error("Vesting entry of {0} claims more than it vested")]
    ClaimExceedsVested(Identity),
    #[error("Vesting entry for the null identity")]
    NullBeneficiary,
    #[error("Sum of vested amounts overflows")]
    VestedOverflow,
    #[error("Total vested is {stored}, entries sum to {expected}")]
    TotalVestedMismatch { stored: u64, expected: u64 },
    #[error("Total vested {total} exceeds max supply {max_supply}")]
    ExceedsMaxSupply { total: u64, max_supply: u64 },
    #[error("Invalid vesting window [{start}, {end}]")]
    InvalidWindow { start: u64, end: u64 },
    #[error("Event log sequence numbers are not contiguous")]
    EventSequenceGap,
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub version: u32,
    pub nodes: IndexMap<NodeId, NodeRecord>,
    pub owners: IndexMap<Identity, Vec<NodeId>>,
    pub chain_counts: BTreeMap<ChainType, u64>,
    pub vesting: IndexMap<Identity, VestingEntry>,
    pub total_vested: u64,
    pub roles: Vec<RoleGrant>,
    pub window: VestingWindow,
    pub max_supply: u64,
    pub paused: bool,
    pub events: Vec<EventRecord>,
}

impl StateSnapshot {
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}

// Counters at zero carry no information
fn non_zero(counts: &BTreeMap<ChainType, u64>) -> BTreeMap<ChainType, u64> {
    counts
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(chain_type, count)| (*chain_type, *count))
        .collect()
}

fn restore_registry(snapshot: &StateSnapshot) -> Result<NodeRegistry, SnapshotError> {
    for (key, record) in snapshot.nodes.iter() {
        if *key != record.id {
            return Err(SnapshotError::MismatchedNodeId {
                key: key.clone(),
                id: record.id.clone(),
            });
        }
    }

    let records = snapshot.nodes.values().cloned().collect();
    let registry = NodeRegistry::from_records(records).map_err(SnapshotError::DuplicateNodeId)?;

    if *registry.owner_index() != snapshot.owners {
        return Err(SnapshotError::OwnerIndexMismatch);
    }

    let stored = non_zero(&snapshot.chain_counts);
    let expected = non_zero(registry.chain_counts());
    for chain_type in stored.keys().chain(expected.keys()) {
        let stored_count = stored.get(chain_type).copied().unwrap_or(0);
        let expected_count = expected.get(chain_type).copied().unwrap_or(0);
        if stored_count != expected_count {
            return Err(SnapshotError::ChainCounterMismatch {
                chain_type: *chain_type,
                stored: stored_count,
                expected: expected_count,
            });
        }
    }

    Ok(registry)
}

fn restore_vesting(snapshot: &StateSnapshot) -> Result<VestingLedger, SnapshotError> {
    let window = snapshot.window;
    if window.end <= window.start {
        return Err(SnapshotError::InvalidWindow {
            start: window.start,
            end: window.end,
        });
    }

    for (beneficiary, entry) in snapshot.vesting.iter() {
        if beneficiary.is_zero() {
            return Err(SnapshotError::NullBeneficiary);
        }
        if entry.claimed > entry.vested {
            return Err(SnapshotError::ClaimExceedsVested(*beneficiary));
        }
    }

    let ledger = VestingLedger::from_entries(
        window,
        snapshot.max_supply,
        snapshot.vesting.clone(),
        snapshot.paused,
    )
    .ok_or(SnapshotError::VestedOverflow)?;

    if ledger.total_vested() != snapshot.total_vested {
        return Err(SnapshotError::TotalVestedMismatch {
            stored: snapshot.total_vested,
            expected: ledger.total_vested(),
        });
    }
    if ledger.total_vested() > snapshot.max_supply {
        return Err(SnapshotError::ExceedsMaxSupply {
            total: ledger.total_vested(),
            max_supply: snapshot.max_supply,
        });
    }

    Ok(ledger)
}

impl CoreState {
    pub fn snapshot(&self) -> StateSnapshot {
        let registry = self.registry();
        let vesting = self.vesting();

        StateSnapshot {
            version: SNAPSHOT_VERSION,
            nodes: registry
                .records()
                .map(|record| (record.id.clone(), record.clone()))
                .collect(),
            owners: registry.owner_index().clone(),
            chain_counts: registry.chain_counts().clone(),
            vesting: vesting.entries().clone(),
            total_vested: vesting.total_vested(),
            roles: self.roles().grants().copied().collect(),
            window: vesting.window(),
            max_supply: vesting.max_supply(),
            paused: vesting.is_paused(),
            events: self.events().records().to_vec(),
        }
    }

    /// Rebuild a state from `snapshot`, refusing any snapshot whose
    /// derived data disagrees with its records
    pub fn restore(snapshot: StateSnapshot) -> Result<Self, SnapshotError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(snapshot.version));
        }

        let registry = restore_registry(&snapshot)?;
        let vesting = restore_vesting(&snapshot)?;

        let roles = RoleRegistry::from_grants(snapshot.roles);
        if roles.holder_count(Capability::Administrator) == 0 {
            warn!("Restored state has no administrator, roles can no longer be managed");
        }

        let events = EventLog::from_records(snapshot.events).ok_or(SnapshotError::EventSequenceGap)?;

        if log::log_enabled!(log::Level::Debug) {
            debug!(
                "Restored snapshot: {} nodes, {} beneficiaries, {} events",
                registry.count(),
                vesting.beneficiaries().count(),
                events.len()
            );
        }

        Ok(CoreState::from_parts(roles, registry, vesting, events))
    }
}
