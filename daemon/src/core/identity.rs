// Node identifier derivation
//
// id = blake3(NODE_ID_DOMAIN || len(owner) || owner || len(name) || name || len(ts) || ts_le)
//
// Pure and deterministic: the same owner registering the same name at the
// same logical time always gets the same id. The registry is responsible
// for rejecting such repeats.

use twist_common::{
    config::NODE_ID_DOMAIN,
    crypto::{hash_parts, Identity},
    node::NodeId,
    time::TimestampSeconds,
};

pub fn generate_node_id(caller: &Identity, name: &str, now: TimestampSeconds) -> NodeId {
    hash_parts(
        NODE_ID_DOMAIN,
        &[caller.as_bytes(), name.as_bytes(), &now.to_le_bytes()],
    )
}
