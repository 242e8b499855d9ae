use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("channel error: {0}")]
    Channel(#[from] turtlemesh_channel::ChannelError),
    #[error("canvas error: {0}")]
    Canvas(#[from] turtlemesh_canvas::CanvasError),
    #[error("registration barrier requires at least one node")]
    NoNodesConfigured,
}
