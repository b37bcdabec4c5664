use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RiskError {
    #[error("Risk thresholds from configuration are invalid: {0}")]
    InvalidThresholds(String),

    #[error("The loss-month share threshold ({0}) must lie between 0 and 1.")]
    InvalidLossShare(Decimal),
}
