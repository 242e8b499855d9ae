use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("channel error: {0}")]
    Channel(#[from] turtlemesh_channel::ChannelError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("coordinator is unreachable during registration")]
    RegistrationFailed,
}
