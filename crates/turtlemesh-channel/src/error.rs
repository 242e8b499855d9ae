use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("socket I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("peer did not respond within the retry budget")]
    Unreachable,
}
