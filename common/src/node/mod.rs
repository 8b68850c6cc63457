//! Blockchain node records
//!
//! Types shared between the state core and the request layer. Names are
//! serialized lowercase so the JSON stays compatible with the gateway API.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::crypto::{Hash, Identity};
use crate::time::TimestampSeconds;

/// Node identifier, derived from (owner, name, registration time)
pub type NodeId = Hash;

/// Target blockchain network served by a node
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
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChainType {
    Ethereum,
    Polygon,
    Arbitrum,
    Bsc,
    Custom,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NodeStatus {
    Running,
    Stopped,
    Starting,
    Syncing,
    Error,
    Maintenance,
}

/// Where the node is hosted
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CloudProvider {
    Aws,
    Gcp,
    Azure,
    DigitalOcean,
    OnPremise,
}

/// A registered node.
///
/// `id` never changes once assigned, and a record with `active == false`
/// stays inactive forever. Block counters are reported by the operator
/// and may go backwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub name: String,
    pub chain_type: ChainType,
    pub endpoint_url: String,
    pub status: NodeStatus,
    pub version: String,
    pub current_block: u64,
    pub highest_block: u64,
    pub region: String,
    pub provider: CloudProvider,
    pub owner: Identity,
    pub registered_at: TimestampSeconds,
    pub updated_at: TimestampSeconds,
    pub active: bool,
}

impl NodeRecord {
    pub fn sync_percentage(&self) -> u8 {
        sync_percentage(self.current_block, self.highest_block)
    }

    pub fn sync_status(&self) -> SyncStatus {
        SyncStatus {
            is_syncing: self.status == NodeStatus::Syncing
                || self.current_block < self.highest_block,
            current_block: self.current_block,
            highest_block: self.highest_block,
            progress_percentage: self.sync_percentage(),
        }
    }
}

/// Parameters of a new node, as submitted by its owner
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeRegistration {
    pub name: String,
    pub chain_type: ChainType,
    pub endpoint_url: String,
    pub version: String,
    pub region: String,
    pub provider: CloudProvider,
}

/// Synchronization view of a node
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    pub is_syncing: bool,
    pub current_block: u64,
    pub highest_block: u64,
    pub progress_percentage: u8,
}

/// One page of the global node listing
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodePage {
    pub items: Vec<NodeRecord>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

/// Progress of `current` towards `highest`, in whole percent.
///
/// A zero `highest`, or a `current` above it, counts as fully synced.
/// Integer only: the result must be identical on every platform.
pub fn sync_percentage(current: u64, highest: u64) -> u8 {
    if highest == 0 || current > highest {
        return 100;
    }

    // u128 so that current * 100 cannot overflow
    let percent = (current as u128 * 100) / highest as u128;
    percent as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_sync_percentage() {
        assert_eq!(sync_percentage(750_000, 1_000_000), 75);
        assert_eq!(sync_percentage(0, 1_000_000), 0);
        assert_eq!(sync_percentage(999_999, 1_000_000), 99);
        assert_eq!(sync_percentage(1_000_000, 1_000_000), 100);
        assert_eq!(sync_percentage(5, 0), 100);
        assert_eq!(sync_percentage(0, 0), 100);
        assert_eq!(sync_percentage(11, 10), 100);
        assert_eq!(sync_percentage(u64::MAX - 1, u64::MAX), 99);
    }

    #[test]
    fn test_enum_names_match_api() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!(serde_json::to_string(&ChainType::Bsc)?, "\"bsc\"");
        assert_eq!(
            serde_json::to_string(&CloudProvider::DigitalOcean)?,
            "\"digitalocean\""
        );
        assert_eq!(
            serde_json::to_string(&CloudProvider::OnPremise)?,
            "\"onpremise\""
        );
        assert_eq!(NodeStatus::Maintenance.to_string(), "maintenance");
        assert_eq!(ChainType::from_str("arbitrum")?, ChainType::Arbitrum);
        Ok(())
    }

    #[test]
    fn test_strum_and_serde_agree() -> Result<(), Box<dyn std::error::Error>> {
        for chain in ChainType::iter() {
            let json = serde_json::to_string(&chain)?;
            assert_eq!(json, format!("\"{}\"", chain));
        }
        for provider in CloudProvider::iter() {
            let json = serde_json::to_string(&provider)?;
            assert_eq!(json, format!("\"{}\"", provider));
        }
        Ok(())
    }

    #[test]
    fn test_sync_status_view() {
        let record = NodeRecord {
            id: Hash::zero(),
            name: "n".to_string(),
            chain_type: ChainType::Polygon,
            endpoint_url: "http://localhost:8545".to_string(),
            status: NodeStatus::Running,
            version: "1.0".to_string(),
            current_block: 50,
            highest_block: 200,
            region: "eu-west-1".to_string(),
            provider: CloudProvider::Aws,
            owner: Identity::new([1u8; 32]),
            registered_at: 0,
            updated_at: 0,
            active: true,
        };
        let status = record.sync_status();
        assert!(status.is_syncing);
        assert_eq!(status.progress_percentage, 25);
    }
}
