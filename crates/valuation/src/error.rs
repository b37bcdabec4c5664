use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValuationError {
    #[error("Not enough data to perform valuation: {0}")]
    NotEnoughData(String),

    #[error("An unexpected error occurred during valuation: {0}")]
    InternalError(String),
}
