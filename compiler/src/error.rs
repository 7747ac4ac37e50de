use protoboil_ir::IrError;
use thiserror::Error;

/// Fatal errors: any of these stops the run before a response is produced.
#[derive(Debug, Error)]
pub enum BoilError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Request decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error(transparent)]
    Ir(#[from] IrError),

    #[error("Generator \"{module}\" aborted the run: {source}")]
    Integrity {
        module: String,
        source: GeneratorError,
    },
}

/// Failure of a single generator module. Recorded against its artifact; the
/// rest of the batch carries on.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("No generator can be discovered for {pattern}: {reason}")]
    Discover {
        pattern: String,
        reason:  String,
    },

    #[error("Unable to load generator \"{module}\": {reason}")]
    Load {
        module: String,
        reason: String,
    },

    #[error("Unable to load the snapshot: {0}")]
    Snapshot(#[from] IrError),

    #[error("Generator failed: {0}")]
    Execution(String),

    /// The generator looked up an id missing from the IR. Fatal for the
    /// whole run.
    #[error("Dangling id: {0}")]
    Integrity(String),
}

impl GeneratorError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, GeneratorError::Integrity(_))
    }
}
