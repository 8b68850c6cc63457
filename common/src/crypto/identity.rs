//! Caller identity
//!
//! The request layer authenticates callers and hands the core a trusted
//! 32-byte identity. The all-zero identity is reserved as the null identity
//! and is never a valid beneficiary.

use serde::de::Error as SerdeError;
use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

pub const IDENTITY_SIZE: usize = 32;

#[derive(Eq, PartialEq, PartialOrd, Ord, Clone, Copy, Hash, Debug)]
pub struct Identity([u8; IDENTITY_SIZE]);

impl Identity {
    pub const fn new(bytes: [u8; IDENTITY_SIZE]) -> Self {
        Identity(bytes)
    }

    /// The null identity
    pub const fn zero() -> Self {
        Identity([0; IDENTITY_SIZE])
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    pub fn as_bytes(&self) -> &[u8; IDENTITY_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for Identity {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim_start_matches("0x")).map_err(|_| "Invalid hex string")?;
        let bytes: [u8; IDENTITY_SIZE] = bytes.try_into().map_err(|_| "Invalid identity length")?;
        Ok(Identity(bytes))
    }
}

impl Display for Identity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl AsRef<[u8]> for Identity {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Identity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'a> Deserialize<'a> for Identity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'a>,
    {
        let hex = String::deserialize(deserializer)?;
        Identity::from_str(&hex).map_err(SerdeError::custom)
    }
}
