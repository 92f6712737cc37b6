use std::error::Error;
use std::fmt;
use std::io;

/// Custom error type for classifier failures.
#[derive(Debug)]
pub enum LogRegError {
    /// An operation required trained or loaded parameters and none were present.
    NotFitted,
    /// Inference input has the wrong number of feature columns.
    InvalidInput { expected: usize, found: usize },
    /// Malformed training data passed to `fit`.
    InvalidTrainingData(String),
    /// Out-of-range training hyper-parameter.
    InvalidHyperparameter(String),
    /// A persisted model file failed structural or value validation.
    CorruptFile(String),
    /// Underlying file I/O failure while saving or loading a model.
    Io(io::Error),
}

impl fmt::Display for LogRegError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LogRegError::NotFitted => {
                write!(f, "Parameters have not been specified (fit or load first)")
            }
            LogRegError::InvalidInput { expected, found } => write!(
                f,
                "Input data are wrong: expected {} feature columns, found {}",
                expected, found
            ),
            LogRegError::InvalidTrainingData(msg) => write!(f, "Train data are wrong: {}", msg),
            LogRegError::InvalidHyperparameter(msg) => {
                write!(f, "Train parameters are wrong: {}", msg)
            }
            LogRegError::CorruptFile(msg) => {
                write!(f, "Parameters cannot be loaded from the file: {}", msg)
            }
            LogRegError::Io(err) => write!(f, "Model file I/O failed: {}", err),
        }
    }
}

impl Error for LogRegError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LogRegError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for LogRegError {
    fn from(err: io::Error) -> Self {
        LogRegError::Io(err)
    }
}
