use serde::{Deserialize, Serialize};
use thiserror::Error;
use twist_common::{
    config::{DEFAULT_VESTING_DURATION, MAXIMUM_SUPPLY},
    crypto::Identity,
    time::TimestampSeconds,
    vesting::VestingWindow,
};

use crate::config::{ENV_ADMIN, ENV_MAX_SUPPLY};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No administrator identity configured")]
    MissingAdmin,
    #[error("The administrator identity cannot be the null identity")]
    NullAdmin,
    #[error("Vesting duration must be greater than zero")]
    ZeroDuration,
    #[error("Vesting window overflows: start {start} + duration {duration}")]
    WindowOverflow {
        start: TimestampSeconds,
        duration: u64,
    },
    #[error("Maximum supply must be greater than zero")]
    ZeroMaxSupply,
}

const fn default_max_supply() -> u64 {
    MAXIMUM_SUPPLY
}

const fn default_vesting_duration() -> u64 {
    DEFAULT_VESTING_DURATION
}

/// Parameters injected into the state engine at construction
#[derive(Debug, Clone, clap::Args, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Identity holding the administrator capability at startup (hex)
    #[clap(long, env = ENV_ADMIN)]
    #[serde(default)]
    pub admin: Option<Identity>,
    /// Cap on circulating supply plus all vesting grants, in atomic units
    #[clap(long, env = ENV_MAX_SUPPLY, default_value_t = MAXIMUM_SUPPLY)]
    #[serde(default = "default_max_supply")]
    pub max_supply: u64,
    /// Start of the vesting window, in seconds
    #[clap(long, default_value_t = 0)]
    #[serde(default)]
    pub vesting_start: TimestampSeconds,
    /// Length of the vesting window, in seconds
    #[clap(long, default_value_t = DEFAULT_VESTING_DURATION)]
    #[serde(default = "default_vesting_duration")]
    pub vesting_duration: u64,
}

impl CoreConfig {
    pub fn new(admin: Identity, start: TimestampSeconds, duration: u64) -> Self {
        Self {
            admin: Some(admin),
            max_supply: MAXIMUM_SUPPLY,
            vesting_start: start,
            vesting_duration: duration,
        }
    }

    pub fn with_max_supply(mut self, max_supply: u64) -> Self {
        self.max_supply = max_supply;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.admin()?;
        self.window()?;
        if self.max_supply == 0 {
            return Err(ConfigError::ZeroMaxSupply);
        }
        Ok(())
    }

    pub fn admin(&self) -> Result<Identity, ConfigError> {
        match self.admin {
            None => Err(ConfigError::MissingAdmin),
            Some(admin) if admin.is_zero() => Err(ConfigError::NullAdmin),
            Some(admin) => Ok(admin),
        }
    }

    pub fn window(&self) -> Result<VestingWindow, ConfigError> {
        if self.vesting_duration == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        VestingWindow::new(self.vesting_start, self.vesting_duration).ok_or(
            ConfigError::WindowOverflow {
                start: self.vesting_start,
                duration: self.vesting_duration,
            },
        )
    }
}
