//! Transient 1D heat conduction through layered material stacks, with a
//! bisection search for the outer layer thickness that keeps every tracked
//! interface below its temperature limit.

pub mod boundary;
pub mod config;
pub mod error;
pub mod model;
pub mod optimizer;
pub mod profile;
pub mod slices;
pub mod solver;
pub mod time;
pub mod tridiagonal;

pub use boundary::{BoundaryCondition, BoundaryKind};
pub use error::{Error, Result};
pub use model::{Layer, Material, Stack, StackDescription};
pub use optimizer::{RunSettings, Suggestion, ThicknessOptimizer};
pub use solver::{SolverState, TemperatureField, TransientSolver};
pub use time::TimeController;
