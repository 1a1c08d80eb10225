use restbase_core::RestError;

#[derive(Debug, thiserror::Error)]
pub enum RealtimeError {
    /// The operation needs a live realtime transport, which this client lacks.
    #[error("Realtime operation not supported: {0}")]
    Unsupported(String),
}

impl From<RealtimeError> for RestError {
    fn from(e: RealtimeError) -> Self {
        RestError::Realtime(e.to_string())
    }
}
