use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid dataset JSON")]
    Json(#[from] serde_json::Error),

    #[error("map bounds are degenerate: north {north} / south {south}, east {east} / west {west}")]
    InvalidBounds {
        north: f32,
        south: f32,
        east: f32,
        west: f32,
    },

    #[error("surface size must be finite and positive, got {0}")]
    InvalidSurface(f32),

    #[error("cluster id `{0}` is declared more than once")]
    DuplicateCluster(String),
}

pub type Result<T> = std::result::Result<T, DatasetError>;
