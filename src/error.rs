//! Error types.
//!
//! Two layers:
//!
//! - [`FisherError`]: failures of the numerical core (inversion, derivatives,
//!   aggregation). These never carry process concerns.
//! - [`AppError`]: what the binary reports, a message plus a process exit code.
//!
//! Exit codes: `2` for input/output problems, `4` for computation failures.

use thiserror::Error;

pub type FisherResult<T> = Result<T, FisherError>;

/// Failures raised by the numerical core.
///
/// None of these are retried. An invalid covariance estimate would silently
/// corrupt downstream results, so every variant propagates to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FisherError {
    /// A diagonal entry of a matrix fed to the pseudo-inverse is not strictly positive.
    #[error("degenerate Fisher matrix: diagonal entry {index} is {value}")]
    DegenerateMatrix { index: usize, value: f64 },

    /// A parameter was requested that the parameter vector does not contain.
    #[error("unknown parameter '{name}'")]
    UnknownParameter { name: String },

    #[error("the Fisher parameter list is empty")]
    EmptyParameterList,

    #[error("no signals to analyze")]
    EmptySignalSet,

    /// Mismatched dimensions between two structures that must agree.
    #[error("incompatible shapes for {what}: expected {expected}, found {found}")]
    IncompatibleShapes {
        what: String,
        expected: usize,
        found: usize,
    },

    #[error("detector index {index} out of range (network has {available} detectors)")]
    UnknownDetector { index: usize, available: usize },

    /// An external collaborator (waveform, projection, inner product) failed.
    #[error("{stage} failed: {message}")]
    Collaborator { stage: &'static str, message: String },

    /// Any of the above, attributed to one signal of a subnetwork or detector.
    #[error("signal {index} in '{scope}': {source}")]
    Signal {
        index: usize,
        scope: String,
        #[source]
        source: Box<FisherError>,
    },
}

impl FisherError {
    pub fn shapes(what: impl Into<String>, expected: usize, found: usize) -> Self {
        Self::IncompatibleShapes {
            what: what.into(),
            expected,
            found,
        }
    }

    pub fn unknown_parameter(name: impl Into<String>) -> Self {
        Self::UnknownParameter { name: name.into() }
    }

    /// Attach the signal index and the subnetwork (or detector) name to an error.
    pub fn for_signal(self, index: usize, scope: impl Into<String>) -> Self {
        Self::Signal {
            index,
            scope: scope.into(),
            source: Box::new(self),
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<FisherError> for AppError {
    fn from(err: FisherError) -> Self {
        AppError::new(4, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
