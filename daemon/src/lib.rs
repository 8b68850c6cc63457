// Twist state core
// Node registry and vesting ledger behind one single-writer state

// Allow some clippy lints shared with the common crate
#![allow(clippy::too_many_arguments)]
#![allow(clippy::uninlined_format_args)]

pub mod config;
pub mod core;
