use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Invalid calendar month {0}: must be between 1 and 12")]
    InvalidMonth(u32),
}
