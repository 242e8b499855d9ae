use thiserror::Error;

#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("could not read config file {path}: {source}")]
    ConfigRead {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("canvas dimensions {width}x{height} are not a multiple of tile size {tile}")]
    UntileableCanvas {
        width: u32,
        height: u32,
        tile: u32,
    },
}
