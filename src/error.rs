// Error types: shop purchases and player commands

use crate::types::BaseId;
use thiserror::Error;

/// Shop Errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShopError {
    #[error("Unknown upgrade '{0}'")]
    UnknownUpgrade(String),
    #[error("Unknown vehicle type '{0}'")]
    UnknownVehicle(String),
    #[error("Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },
    #[error("Upgrade '{0}' is sold out")]
    SoldOut(String),
}

/// Command Errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown base: {0}")]
    UnknownBase(BaseId),
    #[error(transparent)]
    Shop(#[from] ShopError),
}

impl CommandError {
    /// Unknown ids are worth a warning; running out of money is routine.
    pub fn is_routine(&self) -> bool {
        matches!(
            self,
            CommandError::Shop(ShopError::InsufficientFunds { .. }) | CommandError::Shop(ShopError::SoldOut(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shop_error_converts_into_command_error() {
        let err: CommandError = ShopError::UnknownUpgrade("warp".to_string()).into();
        assert_eq!(err.to_string(), "Unknown upgrade 'warp'");
        assert!(!err.is_routine());

        let broke: CommandError = ShopError::InsufficientFunds {
            needed: 150,
            available: 20,
        }
        .into();
        assert!(broke.is_routine());
    }
}
