/// Error type for building a question sequence from a fetch payload.
#[derive(Debug, thiserror::Error)]
pub enum SequenceError {
    /// The payload is not valid JSON or does not have the expected shape.
    #[error("Malformed question payload: {0}")]
    Malformed(#[from] serde_json::Error),
}
