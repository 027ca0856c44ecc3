use thiserror::Error;

/// Top-level error type for block assembly processing.
#[derive(Debug, Error)]
pub enum RbeError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Io(#[from] IoError),
}

/// Errors related to geometric computations.
///
/// These are data-quality problems: the offending face (or face pair) is
/// skipped during identification and the error is reported as a diagnostic.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("zero-length vector")]
    ZeroVector,

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("invalid face: {0}")]
    InvalidFace(String),

    #[error("singular face frame")]
    SingularFrame,

    #[error("malformed polygon intersection: {0}")]
    MalformedIntersection(String),
}

/// Errors raised while validating identification parameters.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("neighbor count must be positive, got {0}")]
    InvalidNeighborCount(usize),

    #[error("{name} must be a finite non-negative value, got {value}")]
    InvalidTolerance { name: &'static str, value: f64 },
}

/// Errors related to the assembly graph.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("block not found: {0}")]
    BlockNotFound(String),

    #[error("block {0} cannot interface with itself")]
    SelfInterface(String),

    #[error("an interface already exists between {from} and {to}")]
    InconsistentGraph { from: String, to: String },
}

/// Errors raised while exchanging assembly data.
#[derive(Debug, Error)]
pub enum IoError {
    #[error(transparent)]
    File(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("invalid assembly data: {0}")]
    InvalidData(String),
}

/// Convenience type alias for results using [`RbeError`].
pub type Result<T> = std::result::Result<T, RbeError>;
