use thiserror::Error;

/// Failure to turn a SAT model back into program state.
///
/// Every variant means the formula producer and the decoder disagree on the
/// literal naming scheme; none of them is recoverable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("location digits '{digits}' contain '{found}', only 0 or 1 allowed")]
    InvalidLocationDigits { digits: String, found: char },
    #[error("location digits '{digits}' do not fit in a machine word")]
    LocationOverflow { digits: String },
    #[error("process {process} at timestep {timestep}: {source}")]
    Location {
        timestep: usize,
        process: usize,
        #[source]
        source: Box<DecodeError>,
    },
    #[error("path refers to process {process} but the model has {processes} process(es)")]
    UnknownProcess { process: usize, processes: usize },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Oracle failure at timestep {timestep}: {message}")]
    Oracle { timestep: usize, message: String },
    #[error("Oracle answered SAT without a model at timestep {timestep}")]
    MissingModel { timestep: usize },
    #[error("Decoding error at bound {bound}: {source}")]
    Decode {
        bound: usize,
        #[source]
        source: DecodeError,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration document: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl EngineError {
    pub(crate) fn oracle(timestep: usize, err: impl std::error::Error) -> Self {
        EngineError::Oracle {
            timestep,
            message: err.to_string(),
        }
    }
}
