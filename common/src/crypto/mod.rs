mod hash;
mod identity;

pub use hash::*;
pub use identity::*;
