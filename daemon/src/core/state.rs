// Composed state engine
//
// `CoreState` owns the role registry, node registry, vesting ledger and
// event log of one instance. Every mutation either commits fully and
// appends its events, or fails before touching anything.
//
// `SharedState` puts one instance behind a single tokio RwLock: the write
// guard is held for the whole of each mutation, so concurrent callers are
// linearized, while queries only take the read guard.

use std::sync::Arc;

use log::debug;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use twist_common::{
    crypto::Identity,
    error::CoreResult,
    node::{NodeId, NodeRegistration, NodeStatus},
    roles::Capability,
    time::TimestampSeconds,
    vesting::MintInstruction,
};

use super::{
    config::{ConfigError, CoreConfig},
    events::{EventLog, EventRecord},
    registry::NodeRegistry,
    roles::RoleRegistry,
    vesting::VestingLedger,
};

// Log a rejected operation with its error kind
fn trace_rejection<T>(operation: &str, caller: &Identity, result: CoreResult<T>) -> CoreResult<T> {
    if let Err(e) = &result {
        if log::log_enabled!(log::Level::Debug) {
            debug!("{} by {} rejected: {} ({:#06x})", operation, caller, e, e.to_code());
        }
    }
    result
}

#[derive(Clone, Debug)]
pub struct CoreState {
    roles: RoleRegistry,
    registry: NodeRegistry,
    vesting: VestingLedger,
    events: EventLog,
}

impl CoreState {
    pub fn new(config: &CoreConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let admin = config.admin()?;
        let window = config.window()?;

        debug!(
            "Creating state: admin {}, window [{}, {}], max supply {}",
            admin, window.start, window.end, config.max_supply
        );
        Ok(Self {
            roles: RoleRegistry::new(admin),
            registry: NodeRegistry::new(),
            vesting: VestingLedger::new(window, config.max_supply),
            events: EventLog::new(),
        })
    }

    pub(crate) fn from_parts(
        roles: RoleRegistry,
        registry: NodeRegistry,
        vesting: VestingLedger,
        events: EventLog,
    ) -> Self {
        Self {
            roles,
            registry,
            vesting,
            events,
        }
    }

    pub fn roles(&self) -> &RoleRegistry {
        &self.roles
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn vesting(&self) -> &VestingLedger {
        &self.vesting
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Events committed after `sequence`
    pub fn events_since(&self, sequence: u64) -> &[EventRecord] {
        self.events.since(sequence)
    }

    pub fn grant_role(
        &mut self,
        invoker: &Identity,
        account: &Identity,
        capability: Capability,
    ) -> CoreResult<bool> {
        let result = self
            .roles
            .grant(invoker, account, capability, &mut self.events);
        trace_rejection("Role grant", invoker, result)
    }

    pub fn revoke_role(
        &mut self,
        invoker: &Identity,
        account: &Identity,
        capability: Capability,
    ) -> CoreResult<bool> {
        let result = self
            .roles
            .revoke(invoker, account, capability, &mut self.events);
        trace_rejection("Role revocation", invoker, result)
    }

    pub fn register_node(
        &mut self,
        caller: &Identity,
        registration: NodeRegistration,
        now: TimestampSeconds,
    ) -> CoreResult<NodeId> {
        let result = self
            .registry
            .register(caller, registration, now, &mut self.events);
        trace_rejection("Node registration", caller, result)
    }

    pub fn update_node_status(
        &mut self,
        caller: &Identity,
        id: &NodeId,
        status: NodeStatus,
        current_block: u64,
        highest_block: u64,
        now: TimestampSeconds,
    ) -> CoreResult<()> {
        let result = self.registry.update_status(
            caller,
            id,
            status,
            current_block,
            highest_block,
            now,
            &mut self.events,
        );
        trace_rejection("Status update", caller, result)
    }

    pub fn deregister_node(&mut self, caller: &Identity, id: &NodeId) -> CoreResult<()> {
        let result = self.registry.deregister(caller, id, &mut self.events);
        trace_rejection("Node deregistration", caller, result)
    }

    pub fn add_vesting(
        &mut self,
        caller: &Identity,
        beneficiary: &Identity,
        amount: u64,
        current_supply: u64,
    ) -> CoreResult<()> {
        let result = self.vesting.add_vesting(
            &self.roles,
            caller,
            beneficiary,
            amount,
            current_supply,
            &mut self.events,
        );
        trace_rejection("Vesting grant", caller, result)
    }

    pub fn claim(
        &mut self,
        beneficiary: &Identity,
        now: TimestampSeconds,
    ) -> CoreResult<MintInstruction> {
        let result = self.vesting.claim(beneficiary, now, &mut self.events);
        trace_rejection("Claim", beneficiary, result)
    }

    pub fn pause(&mut self, caller: &Identity) -> CoreResult<()> {
        let result = self.vesting.pause(&self.roles, caller, &mut self.events);
        trace_rejection("Pause", caller, result)
    }

    pub fn unpause(&mut self, caller: &Identity) -> CoreResult<()> {
        let result = self.vesting.unpause(&self.roles, caller, &mut self.events);
        trace_rejection("Unpause", caller, result)
    }
}

/// Cloneable handle on one `CoreState`
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<RwLock<CoreState>>,
}

impl SharedState {
    pub fn new(state: CoreState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    /// Read guard for queries
    pub async fn read(&self) -> RwLockReadGuard<'_, CoreState> {
        self.inner.read().await
    }

    /// Write guard, for callers that need several mutations in one step
    pub async fn write(&self) -> RwLockWriteGuard<'_, CoreState> {
        self.inner.write().await
    }

    pub async fn grant_role(
        &self,
        invoker: &Identity,
        account: &Identity,
        capability: Capability,
    ) -> CoreResult<bool> {
        let mut state = self.inner.write().await;
        state.grant_role(invoker, account, capability)
    }

    pub async fn revoke_role(
        &self,
        invoker: &Identity,
        account: &Identity,
        capability: Capability,
    ) -> CoreResult<bool> {
        let mut state = self.inner.write().await;
        state.revoke_role(invoker, account, capability)
    }

    pub async fn register_node(
        &self,
        caller: &Identity,
        registration: NodeRegistration,
        now: TimestampSeconds,
    ) -> CoreResult<NodeId> {
        let mut state = self.inner.write().await;
        state.register_node(caller, registration, now)
    }

    pub async fn update_node_status(
        &self,
        caller: &Identity,
        id: &NodeId,
        status: NodeStatus,
        current_block: u64,
        highest_block: u64,
        now: TimestampSeconds,
    ) -> CoreResult<()> {
        let mut state = self.inner.write().await;
        state.update_node_status(caller, id, status, current_block, highest_block, now)
    }

    pub async fn deregister_node(&self, caller: &Identity, id: &NodeId) -> CoreResult<()> {
        let mut state = self.inner.write().await;
        state.deregister_node(caller, id)
    }

    pub async fn add_vesting(
        &self,
        caller: &Identity,
        beneficiary: &Identity,
        amount: u64,
        current_supply: u64,
    ) -> CoreResult<()> {
        let mut state = self.inner.write().await;
        state.add_vesting(caller, beneficiary, amount, current_supply)
    }

    pub async fn claim(
        &self,
        beneficiary: &Identity,
        now: TimestampSeconds,
    ) -> CoreResult<MintInstruction> {
        let mut state = self.inner.write().await;
        state.claim(beneficiary, now)
    }

    pub async fn pause(&self, caller: &Identity) -> CoreResult<()> {
        let mut state = self.inner.write().await;
        state.pause(caller)
    }

    pub async fn unpause(&self, caller: &Identity) -> CoreResult<()> {
        let mut state = self.inner.write().await;
        state.unpause(caller)
    }

    /// Copy of the events committed after `sequence`
    pub async fn events_since(&self, sequence: u64) -> Vec<EventRecord> {
        let state = self.inner.read().await;
        state.events_since(sequence).to_vec()
    }
}
