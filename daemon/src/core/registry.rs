// Node lifecycle store
//
// Owns every node record plus two derived indexes:
// - owner -> node ids, in registration order
// - chain type -> number of active nodes
//
// Records are never removed. Deregistration flips `active` once and
// decrements the chain counter once; a second attempt is rejected.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use log::{debug, trace, warn};
use twist_common::{
    config::MAX_PAGE_SIZE,
    crypto::Identity,
    error::{CoreError, CoreResult},
    node::{
        ChainType, NodeId, NodePage, NodeRecord, NodeRegistration, NodeStatus, SyncStatus,
    },
    time::TimestampSeconds,
};

use super::{
    events::{CoreEvent, EventLog},
    identity::generate_node_id,
};

#[derive(Clone, Debug, Default)]
pub struct NodeRegistry {
    nodes: IndexMap<NodeId, NodeRecord>,
    owners: IndexMap<Identity, Vec<NodeId>>,
    chain_counts: BTreeMap<ChainType, u64>,
    active_count: u64,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Rebuild all indexes from records in registration order
    // Returns the offending id if two records share one
    pub(crate) fn from_records(records: Vec<NodeRecord>) -> Result<Self, NodeId> {
        let mut registry = Self::new();
        for record in records {
            if registry.nodes.contains_key(&record.id) {
                return Err(record.id);
            }
            registry.index(record);
        }
        Ok(registry)
    }

    fn index(&mut self, record: NodeRecord) {
        self.owners
            .entry(record.owner)
            .or_default()
            .push(record.id.clone());
        if record.active {
            *self.chain_counts.entry(record.chain_type).or_insert(0) += 1;
            self.active_count += 1;
        }
        self.nodes.insert(record.id.clone(), record);
    }

    // Load a record for a mutation by `caller`
    fn owned_record_mut(
        &mut self,
        caller: &Identity,
        id: &NodeId,
    ) -> CoreResult<&mut NodeRecord> {
        let record = self.nodes.get_mut(id).ok_or(CoreError::NotFound)?;
        if record.owner != *caller {
            return Err(CoreError::Unauthorized);
        }
        if !record.active {
            return Err(CoreError::AlreadyInactive);
        }
        Ok(record)
    }

    /// Register a new node owned by `caller`.
    /// Any identity may register; no capability is required.
    pub fn register(
        &mut self,
        caller: &Identity,
        registration: NodeRegistration,
        now: TimestampSeconds,
        events: &mut EventLog,
    ) -> CoreResult<NodeId> {
        let id = generate_node_id(caller, &registration.name, now);
        if self.nodes.contains_key(&id) {
            if log::log_enabled!(log::Level::Debug) {
                debug!(
                    "Rejecting registration of '{}' by {}: id {} already exists",
                    registration.name, caller, id
                );
            }
            return Err(CoreError::DuplicateIdentifier);
        }

        let record = NodeRecord {
            id: id.clone(),
            name: registration.name,
            chain_type: registration.chain_type,
            endpoint_url: registration.endpoint_url,
            status: NodeStatus::Starting,
            version: registration.version,
            current_block: 0,
            highest_block: 0,
            region: registration.region,
            provider: registration.provider,
            owner: *caller,
            registered_at: now,
            updated_at: now,
            active: true,
        };

        if log::log_enabled!(log::Level::Debug) {
            debug!(
                "Registered node {} ({}) on {} for {}",
                id, record.name, record.chain_type, caller
            );
        }

        events.push(CoreEvent::NodeRegistered {
            id: id.clone(),
            owner: *caller,
            chain_type: record.chain_type,
            at: now,
        });
        self.index(record);

        Ok(id)
    }

    /// Report the status and block heights of a node.
    ///
    /// Block counters and `updated_at` are always written. The status
    /// change event is only emitted when the status differs.
    pub fn update_status(
        &mut self,
        caller: &Identity,
        id: &NodeId,
        status: NodeStatus,
        current_block: u64,
        highest_block: u64,
        now: TimestampSeconds,
        events: &mut EventLog,
    ) -> CoreResult<()> {
        let record = self.owned_record_mut(caller, id)?;

        if highest_block != 0 && current_block > highest_block {
            warn!(
                "Node {} reports current block {} above highest block {}",
                id, current_block, highest_block
            );
        }

        record.current_block = current_block;
        record.highest_block = highest_block;
        record.updated_at = now;

        if record.status != status {
            let from = record.status;
            record.status = status;
            if log::log_enabled!(log::Level::Debug) {
                debug!("Node {} status changed from {} to {}", id, from, status);
            }
            events.push(CoreEvent::NodeStatusChanged {
                id: id.clone(),
                from,
                to: status,
                at: now,
            });
        } else if log::log_enabled!(log::Level::Trace) {
            trace!(
                "Node {} heights updated to {}/{}",
                id,
                current_block,
                highest_block
            );
        }

        Ok(())
    }

    /// Soft-delete a node. The record stays queryable.
    pub fn deregister(
        &mut self,
        caller: &Identity,
        id: &NodeId,
        events: &mut EventLog,
    ) -> CoreResult<()> {
        let record = self.owned_record_mut(caller, id)?;
        let chain_type = record.chain_type;

        // Counters are derived from active records, they can't be zero here
        let counter = self
            .chain_counts
            .get_mut(&chain_type)
            .filter(|count| **count > 0)
            .ok_or(CoreError::Overflow)?;
        if self.active_count == 0 {
            return Err(CoreError::Overflow);
        }

        *counter -= 1;
        self.active_count -= 1;
        if let Some(record) = self.nodes.get_mut(id) {
            record.active = false;
        }

        if log::log_enabled!(log::Level::Debug) {
            debug!("Deregistered node {} on {}", id, chain_type);
        }
        events.push(CoreEvent::NodeDeregistered {
            id: id.clone(),
            owner: *caller,
        });

        Ok(())
    }

    pub fn get(&self, id: &NodeId) -> CoreResult<&NodeRecord> {
        self.nodes.get(id).ok_or(CoreError::NotFound)
    }

    /// Ids owned by `owner` in registration order, inactive ones included
    pub fn list_by_owner(&self, owner: &Identity) -> &[NodeId] {
        self.owners
            .get(owner)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every node ever registered
    pub fn count(&self) -> u64 {
        self.nodes.len() as u64
    }

    pub fn active_count(&self) -> u64 {
        self.active_count
    }

    /// Active nodes serving `chain_type`
    pub fn count_by_chain(&self, chain_type: ChainType) -> u64 {
        self.chain_counts.get(&chain_type).copied().unwrap_or(0)
    }

    pub fn sync_percentage(&self, id: &NodeId) -> CoreResult<u8> {
        self.get(id).map(NodeRecord::sync_percentage)
    }

    pub fn sync_status(&self, id: &NodeId) -> CoreResult<SyncStatus> {
        self.get(id).map(NodeRecord::sync_status)
    }

    /// 1-based page of all records in registration order
    pub fn list(&self, page: u64, page_size: u64) -> NodePage {
        let page = page.max(1);
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        let total = self.count();
        let total_pages = total.div_ceil(page_size);

        let skip = (page - 1).saturating_mul(page_size);
        let items = self
            .nodes
            .values()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(page_size as usize)
            .cloned()
            .collect();

        NodePage {
            items,
            total,
            page,
            page_size,
            total_pages,
        }
    }

    pub fn records(&self) -> impl Iterator<Item = &NodeRecord> {
        self.nodes.values()
    }

    pub(crate) fn owner_index(&self) -> &IndexMap<Identity, Vec<NodeId>> {
        &self.owners
    }

    pub(crate) fn chain_counts(&self) -> &BTreeMap<ChainType, u64> {
        &self.chain_counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twist_common::node::CloudProvider;

    fn id(byte: u8) -> Identity {
        Identity::new([byte; 32])
    }

    fn registration(name: &str, chain_type: ChainType) -> NodeRegistration {
        NodeRegistration {
            name: name.to_string(),
            chain_type,
            endpoint_url: format!("https://{}.example.org", name),
            version: "1.13.0".to_string(),
            region: "us-east-1".to_string(),
            provider: CloudProvider::Aws,
        }
    }

    #[test]
    fn test_register_initial_state() -> Result<(), CoreError> {
        let mut registry = NodeRegistry::new();
        let mut events = EventLog::new();

        let node = registry.register(&id(1), registration("N1", ChainType::Ethereum), 7, &mut events)?;
        let record = registry.get(&node)?;

        assert_eq!(record.status, NodeStatus::Starting);
        assert!(record.active);
        assert_eq!(record.current_block, 0);
        assert_eq!(record.highest_block, 0);
        assert_eq!(record.registered_at, 7);
        assert_eq!(record.updated_at, 7);
        assert_eq!(record.owner, id(1));
        assert_eq!(registry.count(), 1);
        assert_eq!(registry.count_by_chain(ChainType::Ethereum), 1);
        assert_eq!(registry.count_by_chain(ChainType::Polygon), 0);
        assert_eq!(events.len(), 1);
        Ok(())
    }

    #[test]
    fn test_duplicate_identifier() -> Result<(), CoreError> {
        let mut registry = NodeRegistry::new();
        let mut events = EventLog::new();

        registry.register(&id(1), registration("N1", ChainType::Ethereum), 0, &mut events)?;
        let result = registry.register(&id(1), registration("N1", ChainType::Ethereum), 0, &mut events);

        assert_eq!(result, Err(CoreError::DuplicateIdentifier));
        assert_eq!(registry.count(), 1);
        assert_eq!(registry.count_by_chain(ChainType::Ethereum), 1);
        assert_eq!(events.len(), 1);

        // Same name later is a different node
        registry.register(&id(1), registration("N1", ChainType::Ethereum), 1, &mut events)?;
        assert_eq!(registry.count(), 2);
        Ok(())
    }

    #[test]
    fn test_update_status_edge_triggered() -> Result<(), CoreError> {
        let mut registry = NodeRegistry::new();
        let mut events = EventLog::new();
        let node = registry.register(&id(1), registration("N1", ChainType::Ethereum), 0, &mut events)?;

        registry.update_status(&id(1), &node, NodeStatus::Syncing, 750_000, 1_000_000, 5, &mut events)?;
        assert_eq!(registry.sync_percentage(&node)?, 75);
        assert_eq!(events.len(), 2);

        // Same status: heights and timestamp move, no new event
        registry.update_status(&id(1), &node, NodeStatus::Syncing, 900_000, 1_000_000, 9, &mut events)?;
        let record = registry.get(&node)?;
        assert_eq!(record.current_block, 900_000);
        assert_eq!(record.updated_at, 9);
        assert_eq!(events.len(), 2);

        // Heights may go backwards
        registry.update_status(&id(1), &node, NodeStatus::Running, 10, 20, 10, &mut events)?;
        assert_eq!(registry.sync_percentage(&node)?, 50);
        assert_eq!(events.len(), 3);
        assert!(matches!(
            events.records()[2].event,
            CoreEvent::NodeStatusChanged {
                from: NodeStatus::Syncing,
                to: NodeStatus::Running,
                ..
            }
        ));
        Ok(())
    }

    #[test]
    fn test_non_owner_rejected() -> Result<(), CoreError> {
        let mut registry = NodeRegistry::new();
        let mut events = EventLog::new();
        let node = registry.register(&id(1), registration("N1", ChainType::Ethereum), 0, &mut events)?;
        let before = registry.get(&node)?.clone();

        assert_eq!(
            registry.update_status(&id(3), &node, NodeStatus::Error, 1, 2, 1, &mut events),
            Err(CoreError::Unauthorized)
        );
        assert_eq!(
            registry.deregister(&id(3), &node, &mut events),
            Err(CoreError::Unauthorized)
        );

        assert_eq!(registry.get(&node)?, &before);
        assert_eq!(registry.count_by_chain(ChainType::Ethereum), 1);
        assert_eq!(events.len(), 1);
        Ok(())
    }

    #[test]
    fn test_unknown_node() {
        let mut registry = NodeRegistry::new();
        let mut events = EventLog::new();
        let missing = NodeId::zero();

        assert_eq!(registry.get(&missing).err(), Some(CoreError::NotFound));
        assert_eq!(registry.sync_percentage(&missing), Err(CoreError::NotFound));
        assert_eq!(
            registry.update_status(&id(1), &missing, NodeStatus::Running, 0, 0, 0, &mut events),
            Err(CoreError::NotFound)
        );
        assert_eq!(
            registry.deregister(&id(1), &missing, &mut events),
            Err(CoreError::NotFound)
        );
    }

    #[test]
    fn test_deregister_once() -> Result<(), CoreError> {
        let mut registry = NodeRegistry::new();
        let mut events = EventLog::new();
        let node = registry.register(&id(1), registration("N1", ChainType::Polygon), 0, &mut events)?;
        registry.register(&id(2), registration("N2", ChainType::Polygon), 0, &mut events)?;
        assert_eq!(registry.count_by_chain(ChainType::Polygon), 2);

        registry.deregister(&id(1), &node, &mut events)?;
        assert!(!registry.get(&node)?.active);
        assert_eq!(registry.count_by_chain(ChainType::Polygon), 1);
        assert_eq!(registry.active_count(), 1);
        assert_eq!(registry.count(), 2);

        assert_eq!(
            registry.deregister(&id(1), &node, &mut events),
            Err(CoreError::AlreadyInactive)
        );
        assert_eq!(
            registry.update_status(&id(1), &node, NodeStatus::Running, 1, 1, 1, &mut events),
            Err(CoreError::AlreadyInactive)
        );
        assert_eq!(registry.count_by_chain(ChainType::Polygon), 1);
        // Inactive records stay listed for their owner
        assert_eq!(registry.list_by_owner(&id(1)), &[node]);
        Ok(())
    }

    #[test]
    fn test_list_by_owner_order() -> Result<(), CoreError> {
        let mut registry = NodeRegistry::new();
        let mut events = EventLog::new();
        let a = registry.register(&id(1), registration("a", ChainType::Bsc), 0, &mut events)?;
        registry.register(&id(2), registration("x", ChainType::Bsc), 0, &mut events)?;
        let b = registry.register(&id(1), registration("b", ChainType::Custom), 1, &mut events)?;

        assert_eq!(registry.list_by_owner(&id(1)), &[a, b]);
        assert!(registry.list_by_owner(&id(9)).is_empty());
        Ok(())
    }

    #[test]
    fn test_list_pages() -> Result<(), CoreError> {
        let mut registry = NodeRegistry::new();
        let mut events = EventLog::new();
        for i in 0..5u64 {
            registry.register(&id(1), registration(&format!("n{}", i), ChainType::Arbitrum), i, &mut events)?;
        }

        let page = registry.list(1, 2);
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].name, "n0");

        let last = registry.list(3, 2);
        assert_eq!(last.items.len(), 1);
        assert_eq!(last.items[0].name, "n4");

        assert!(registry.list(4, 2).items.is_empty());

        // Page 0 and size 0 are clamped
        let clamped = registry.list(0, 0);
        assert_eq!(clamped.page, 1);
        assert_eq!(clamped.page_size, 1);
        assert_eq!(registry.list(1, 10_000).page_size, MAX_PAGE_SIZE);
        assert!(registry.list(u64::MAX, MAX_PAGE_SIZE).items.is_empty());
        Ok(())
    }

    #[test]
    fn test_from_records_rebuilds_counters() -> Result<(), CoreError> {
        let mut registry = NodeRegistry::new();
        let mut events = EventLog::new();
        let a = registry.register(&id(1), registration("a", ChainType::Ethereum), 0, &mut events)?;
        registry.register(&id(1), registration("b", ChainType::Ethereum), 0, &mut events)?;
        registry.deregister(&id(1), &a, &mut events)?;

        let records: Vec<NodeRecord> = registry.records().cloned().collect();
        let rebuilt = NodeRegistry::from_records(records.clone()).map_err(|_| CoreError::DuplicateIdentifier)?;
        assert_eq!(rebuilt.count_by_chain(ChainType::Ethereum), 1);
        assert_eq!(rebuilt.active_count(), 1);
        assert_eq!(rebuilt.owner_index(), registry.owner_index());

        let mut doubled = records.clone();
        doubled.push(records[0].clone());
        assert!(NodeRegistry::from_records(doubled).is_err());
        Ok(())
    }
}
