use thiserror::Error;

#[derive(Error, Debug)]
/// Batch error
pub enum BatchError {
    /// The source object could not be retrieved from the object store.
    #[error("Fetch from: {0}")]
    Fetch(String),

    /// A record could not be read or mapped (malformed line).
    #[error("ItemReader from: {0}")]
    ItemReader(String),

    /// An item could not be rendered to its output representation.
    #[error("Serialization from: {0}")]
    Serialization(String),

    #[error("ItemWriter from: {0}")]
    ItemWriter(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A step ended with a non-success status.
    #[error("Step failed: {0}")]
    Step(String),
}
