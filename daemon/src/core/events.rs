// Append-only log of committed mutations
//
// Events are only pushed after an operation has passed all of its checks,
// so a rejected operation never leaves a trace here. Entries are never
// rewritten or removed.

use serde::{Deserialize, Serialize};
use twist_common::{
    crypto::Identity,
    node::{ChainType, NodeId, NodeStatus},
    roles::Capability,
    time::TimestampSeconds,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoreEvent {
    NodeRegistered {
        id: NodeId,
        owner: Identity,
        chain_type: ChainType,
        at: TimestampSeconds,
    },
    // Edge-triggered: only emitted when the stored status actually changes
    NodeStatusChanged {
        id: NodeId,
        from: NodeStatus,
        to: NodeStatus,
        at: TimestampSeconds,
    },
    NodeDeregistered {
        id: NodeId,
        owner: Identity,
    },
    VestingAdded {
        beneficiary: Identity,
        amount: u64,
    },
    VestingClaimed {
        beneficiary: Identity,
        amount: u64,
        at: TimestampSeconds,
    },
    RoleGranted {
        account: Identity,
        capability: Capability,
        by: Identity,
    },
    RoleRevoked {
        account: Identity,
        capability: Capability,
        by: Identity,
    },
    Paused {
        by: Identity,
    },
    Unpaused {
        by: Identity,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub sequence: u64,
    pub event: CoreEvent,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    // Sequence numbers start at 1 and have no gaps
    pub fn push(&mut self, event: CoreEvent) -> u64 {
        let sequence = self.records.len() as u64 + 1;
        self.records.push(EventRecord { sequence, event });
        sequence
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last_sequence(&self) -> u64 {
        self.records.len() as u64
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Events with a sequence strictly greater than `sequence`
    pub fn since(&self, sequence: u64) -> &[EventRecord] {
        let start = (sequence as usize).min(self.records.len());
        &self.records[start..]
    }

    pub(crate) fn from_records(records: Vec<EventRecord>) -> Option<Self> {
        let contiguous = records
            .iter()
            .enumerate()
            .all(|(i, record)| record.sequence == i as u64 + 1);
        contiguous.then_some(Self { records })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paused(byte: u8) -> CoreEvent {
        CoreEvent::Paused {
            by: Identity::new([byte; 32]),
        }
    }

    #[test]
    fn test_sequence_is_contiguous() {
        let mut log = EventLog::new();
        assert!(log.is_empty());
        assert_eq!(log.push(paused(1)), 1);
        assert_eq!(log.push(paused(2)), 2);
        assert_eq!(log.push(paused(3)), 3);
        assert_eq!(log.last_sequence(), 3);
    }

    #[test]
    fn test_since() {
        let mut log = EventLog::new();
        log.push(paused(1));
        log.push(paused(2));
        log.push(paused(3));

        assert_eq!(log.since(0).len(), 3);
        assert_eq!(log.since(2).len(), 1);
        assert_eq!(log.since(2)[0].sequence, 3);
        assert!(log.since(3).is_empty());
        assert!(log.since(100).is_empty());
    }

    #[test]
    fn test_from_records_rejects_gaps() {
        let records = vec![
            EventRecord {
                sequence: 1,
                event: paused(1),
            },
            EventRecord {
                sequence: 3,
                event: paused(2),
            },
        ];
        assert!(EventLog::from_records(records).is_none());
        assert!(EventLog::from_records(Vec::new()).is_some());
    }
}
