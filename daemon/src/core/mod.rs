pub mod config;
pub mod events;
pub mod identity;
pub mod registry;
pub mod roles;
pub mod snapshot;
pub mod state;
pub mod vesting;

pub use config::{ConfigError, CoreConfig};
pub use events::{CoreEvent, EventLog, EventRecord};
pub use snapshot::{SnapshotError, StateSnapshot};
pub use state::{CoreState, SharedState};
