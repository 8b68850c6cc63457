use crate::time::{TimestampSeconds, SECONDS_PER_DAY};

pub const VERSION: &str = env!("BUILD_VERSION");

// 8 decimals numbers
pub const COIN_DECIMALS: u8 = 8;
// 100 000 000 to represent 1 token
pub const COIN_VALUE: u64 = 10u64.pow(COIN_DECIMALS as u32);
// 1B full coin, shared between minted supply and vesting grants
pub const MAXIMUM_SUPPLY: u64 = 1_000_000_000 * COIN_VALUE;

// Vesting window used when no duration is configured
pub const DEFAULT_VESTING_DURATION: TimestampSeconds = 365 * SECONDS_PER_DAY;

// Domain tag used to derive node identifiers
pub const NODE_ID_DOMAIN: &[u8] = b"TWIST_NODE_ID:";

// Upper bound for a single page of node listing
pub const MAX_PAGE_SIZE: u64 = 100;
// Page size used by the request layer when none is given
pub const DEFAULT_PAGE_SIZE: u64 = 20;
