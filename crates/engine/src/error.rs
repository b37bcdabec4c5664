use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Projection error: {0}")]
    Projection(#[from] projection::error::ProjectionError),

    #[error("Storage error: {0}")]
    Store(#[from] store::StoreError),
}
