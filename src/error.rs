use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("{what}: expected {expected} values, got {actual}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("Stack has no layers")]
    EmptyStack,
    #[error("Layer {index} has invalid thickness {thickness} m")]
    InvalidThickness { index: usize, thickness: f64 },
    #[error("Layer {index} needs at least 2 grid points, got {points}")]
    TooFewPoints { index: usize, points: usize },
    #[error("Layer index {index} out of range for a stack of {layers} layers")]
    NoSuchLayer { index: usize, layers: usize },
    #[error("Stack needs at least {needed} layers to track its interfaces, got {layers}")]
    TooFewLayers { needed: usize, layers: usize },
    #[error("Time weighting theta must be within [0, 1], got {0}")]
    InvalidTheta(f64),
    #[error("Invalid time step {0} s")]
    InvalidTimeStep(f64),
    #[error("Invalid simulation duration {0} s")]
    InvalidDuration(f64),
    #[error("Solver was not initialized with a stack")]
    NotInitialized,
    #[error("Initial temperature was not set")]
    InitialTemperatureMissing,
    #[error("Boundary conditions must be set on both ends before stepping")]
    BoundaryConditionsMissing,
    #[error("Simulation already finished")]
    AlreadyFinished,
    #[error("Non-finite temperature at grid index {index} after step {step}")]
    NonFiniteTemperature { index: usize, step: usize },
    #[error("Index range {start}..={end} is outside a field of {len} values")]
    OutOfRange { start: usize, end: usize, len: usize },
    #[error("Invalid thickness bracket [{min}, {max}] m with tolerance {tolerance} m")]
    InvalidBracket { min: f64, max: f64, tolerance: f64 },
    #[error("Bisection did not converge within {iterations} iterations (bracket width {width} m)")]
    NotConverged { iterations: usize, width: f64 },
    #[error("Even the maximum thickness {thickness} m violates a temperature ceiling")]
    CeilingsUnreachable { thickness: f64 },
}
