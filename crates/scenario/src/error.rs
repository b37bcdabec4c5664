use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Projection failed within scenario comparison: {0}")]
    Projection(#[from] projection::error::ProjectionError),

    #[error("Valuation failed within scenario comparison: {0}")]
    Valuation(#[from] valuation::ValuationError),
}
