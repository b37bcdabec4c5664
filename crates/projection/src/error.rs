use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectionError {
    #[error("No products defined for this project. Create products first.")]
    NoProducts,

    #[error("No sales projections defined for this project. Create sales projections first.")]
    NoSalesProjections,
}
