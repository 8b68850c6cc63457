//! Core Error Codes
//!
//! Range: 0x0300 - 0x03FF
//! Format: CORE_ERROR_<CATEGORY>_<SPECIFIC>
//!
//! The core only classifies failures. Presentation (status code, message
//! shown to the user) belongs to the request layer, which can start from
//! [`CoreError::http_status`].

use thiserror::Error;

// ===== Node Errors (0x0300 - 0x030F) =====

pub const CORE_ERROR_NOT_FOUND: u64 = 0x0300;
pub const CORE_ERROR_DUPLICATE_IDENTIFIER: u64 = 0x0301;
pub const CORE_ERROR_ALREADY_INACTIVE: u64 = 0x0302;

// ===== Authorization Errors (0x0310 - 0x031F) =====

pub const CORE_ERROR_UNAUTHORIZED: u64 = 0x0310;

// ===== Vesting Errors (0x0320 - 0x032F) =====

pub const CORE_ERROR_INVALID_BENEFICIARY: u64 = 0x0320;
pub const CORE_ERROR_INVALID_AMOUNT: u64 = 0x0321;
pub const CORE_ERROR_EXCEEDS_MAX_SUPPLY: u64 = 0x0322;
pub const CORE_ERROR_NOTHING_TO_CLAIM: u64 = 0x0323;
pub const CORE_ERROR_PAUSED: u64 = 0x0324;

// ===== Arithmetic Errors (0x0330 - 0x033F) =====

pub const CORE_ERROR_OVERFLOW: u64 = 0x0330;

/// Failure of a single core operation.
/// Returning one of these guarantees that no state was modified.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    #[error("Node not found")]
    NotFound,

    #[error("Caller is not authorized")]
    Unauthorized,

    #[error("Node identifier already registered")]
    DuplicateIdentifier,

    #[error("Node is already inactive")]
    AlreadyInactive,

    #[error("Invalid beneficiary")]
    InvalidBeneficiary,

    #[error("Invalid amount")]
    InvalidAmount,

    #[error("Max supply exceeded")]
    ExceedsMaxSupply,

    #[error("Nothing to claim")]
    NothingToClaim,

    #[error("Vesting is paused")]
    Paused,

    #[error("Arithmetic overflow")]
    Overflow,
}

impl CoreError {
    /// Convert error to u64 error code
    pub fn to_code(self) -> u64 {
        match self {
            Self::NotFound => CORE_ERROR_NOT_FOUND,
            Self::Unauthorized => CORE_ERROR_UNAUTHORIZED,
            Self::DuplicateIdentifier => CORE_ERROR_DUPLICATE_IDENTIFIER,
            Self::AlreadyInactive => CORE_ERROR_ALREADY_INACTIVE,
            Self::InvalidBeneficiary => CORE_ERROR_INVALID_BENEFICIARY,
            Self::InvalidAmount => CORE_ERROR_INVALID_AMOUNT,
            Self::ExceedsMaxSupply => CORE_ERROR_EXCEEDS_MAX_SUPPLY,
            Self::NothingToClaim => CORE_ERROR_NOTHING_TO_CLAIM,
            Self::Paused => CORE_ERROR_PAUSED,
            Self::Overflow => CORE_ERROR_OVERFLOW,
        }
    }

    /// Create error from u64 error code
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            CORE_ERROR_NOT_FOUND => Some(Self::NotFound),
            CORE_ERROR_UNAUTHORIZED => Some(Self::Unauthorized),
            CORE_ERROR_DUPLICATE_IDENTIFIER => Some(Self::DuplicateIdentifier),
            CORE_ERROR_ALREADY_INACTIVE => Some(Self::AlreadyInactive),
            CORE_ERROR_INVALID_BENEFICIARY => Some(Self::InvalidBeneficiary),
            CORE_ERROR_INVALID_AMOUNT => Some(Self::InvalidAmount),
            CORE_ERROR_EXCEEDS_MAX_SUPPLY => Some(Self::ExceedsMaxSupply),
            CORE_ERROR_NOTHING_TO_CLAIM => Some(Self::NothingToClaim),
            CORE_ERROR_PAUSED => Some(Self::Paused),
            CORE_ERROR_OVERFLOW => Some(Self::Overflow),
            _ => None,
        }
    }

    /// Default HTTP status for the request layer
    pub fn http_status(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::Unauthorized => 403,
            Self::DuplicateIdentifier | Self::AlreadyInactive => 409,
            Self::InvalidBeneficiary | Self::InvalidAmount => 400,
            Self::ExceedsMaxSupply | Self::NothingToClaim => 422,
            Self::Paused => 423,
            Self::Overflow => 500,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
