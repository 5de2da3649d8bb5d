use thiserror::Error;

#[derive(Debug, Error)]
pub enum SequencerError {
    #[error("sequencer connection error: {0}")]
    Connection(#[from] std::io::Error),

    #[error("sequencer closed the connection without a reply")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, SequencerError>;
