use thiserror::Error;

#[derive(Debug, Error)]
pub enum StriperError {
    #[error("position {0} is not covered by any known view")]
    OutOfRange(u64),

    #[error("failed to extend the view sequence: {0}")]
    Extend(String),
}

pub type Result<T> = std::result::Result<T, StriperError>;
