use itertools::Itertools;
use log::{debug, trace, warn};

use crate::boundary::BoundaryCondition;
use crate::error::{Error, Result};
use crate::model::Stack;
use crate::time::TimeController;
use crate::tridiagonal::TridiagonalSolver;

/// Uniform starting temperature [K] used when no initial field is supplied.
pub const DEFAULT_INITIAL_TEMPERATURE: f64 = 300.0;

/// RMS step-doubling error [K] above which the Crank-Nicolson step is halved.
pub const DEFAULT_ERROR_THRESHOLD: f64 = 0.01;

pub const BACKWARD_EULER: f64 = 1.0;
pub const CRANK_NICOLSON: f64 = 0.5;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SolverState {
    Uninitialized,
    Ready,
    Stepping,
    Finished,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SolverSettings {
    pub error_threshold: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        SolverSettings {
            error_threshold: DEFAULT_ERROR_THRESHOLD,
        }
    }
}

/// Temperatures [K], one per grid point.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TemperatureField(Vec<f64>);

impl TemperatureField {
    pub fn uniform(len: usize, temperature: f64) -> Self {
        TemperatureField(vec![temperature; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }

    pub fn at(&self, index: usize) -> Result<f64> {
        self.0.get(index).copied().ok_or(Error::OutOfRange {
            start: index,
            end: index,
            len: self.0.len(),
        })
    }

    /// Values from `start` to `end`, both inclusive.
    pub fn range(&self, start: usize, end: usize) -> Result<&[f64]> {
        if start > end || end >= self.0.len() {
            return Err(Error::OutOfRange {
                start,
                end,
                len: self.0.len(),
            });
        }
        Ok(&self.0[start..=end])
    }

    /// Temperatures at the given grid indices, e.g. the tracked interfaces.
    pub fn sample<const N: usize>(&self, indices: [usize; N]) -> Result<[f64; N]> {
        let mut values = [0.0; N];
        for (value, index) in values.iter_mut().zip(indices) {
            *value = self.at(index)?;
        }
        Ok(values)
    }

    pub fn max(&self) -> f64 {
        self.0.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn min(&self) -> f64 {
        self.0.iter().copied().fold(f64::INFINITY, f64::min)
    }
}

impl From<Vec<f64>> for TemperatureField {
    fn from(values: Vec<f64>) -> Self {
        TemperatureField(values)
    }
}

/// Per-point coefficients derived once from the stack geometry.
#[derive(Clone, Debug)]
struct Discretization {
    /// `alpha / dx²` [1/s]; interior points use the mean of the two adjacent
    /// spacings, end points the single adjacent spacing.
    coefficient: Vec<f64>,
    /// `2 dx / k` at the outer and inner ends, scaling a boundary flux into
    /// the mirrored ghost point.
    ghost_factor: [f64; 2],
    alpha_max: f64,
    dx_min: f64,
}

impl Discretization {
    fn new(stack: &Stack) -> Self {
        let x = stack.x_grid();
        let n = x.len();
        let coefficient = (0..n)
            .map(|i| {
                let dx = if i == 0 {
                    x[1] - x[0]
                } else if i == n - 1 {
                    x[n - 1] - x[n - 2]
                } else {
                    ((x[i] - x[i - 1]) + (x[i + 1] - x[i])) / 2.0
                };
                stack.diffusivity_at(i) / (dx * dx)
            })
            .collect();
        let outer_dx = x[1] - x[0];
        let inner_dx = x[n - 1] - x[n - 2];
        Discretization {
            coefficient,
            ghost_factor: [
                2.0 * outer_dx / stack.conductivity_at(0),
                2.0 * inner_dx / stack.conductivity_at(n - 1),
            ],
            alpha_max: (0..n)
                .map(|i| stack.diffusivity_at(i))
                .fold(0.0, f64::max),
            dx_min: stack.min_spacing(),
        }
    }

    fn len(&self) -> usize {
        self.coefficient.len()
    }

    /// Step cap keeping the implicit scheme's truncation error bounded.
    fn stability_limit(&self) -> f64 {
        0.5 * self.dx_min * self.dx_min / self.alpha_max
    }
}

/// Tridiagonal system buffers reused across steps.
#[derive(Clone, Debug)]
struct System {
    lower: Vec<f64>,
    diag: Vec<f64>,
    upper: Vec<f64>,
    rhs: Vec<f64>,
    tridiagonal: TridiagonalSolver,
}

impl System {
    fn new(n: usize) -> Self {
        System {
            lower: vec![0.0; n - 1],
            diag: vec![0.0; n],
            upper: vec![0.0; n - 1],
            rhs: vec![0.0; n],
            tridiagonal: TridiagonalSolver::new(n),
        }
    }

    fn solve(&mut self) -> Result<Vec<f64>> {
        self.tridiagonal
            .solve(&self.lower, &self.diag, &self.upper, &self.rhs)
    }
}

#[derive(Copy, Clone, Debug)]
enum End {
    Outer,
    Inner,
}

/// Everything needed to advance a field by one step, without touching solver
/// state.
struct Assembly<'a> {
    discretization: &'a Discretization,
    theta: f64,
    outer: &'a BoundaryCondition,
    inner: &'a BoundaryCondition,
    position: f64,
}

impl Assembly<'_> {
    fn advance(&self, field: &[f64], dt: f64, system: &mut System) -> Result<Vec<f64>> {
        let n = self.discretization.len();
        let theta = self.theta;

        for i in 1..n - 1 {
            let r = self.discretization.coefficient[i] * dt;
            system.lower[i - 1] = -theta * r;
            system.diag[i] = 1.0 + 2.0 * theta * r;
            system.upper[i] = -theta * r;
            system.rhs[i] =
                field[i] + (1.0 - theta) * r * (field[i - 1] - 2.0 * field[i] + field[i + 1]);
        }

        self.boundary_row(End::Outer, field, dt, system);
        self.boundary_row(End::Inner, field, dt, system);

        system.solve()
    }

    /// Overwrite the row of one end point. Flux and exchange ends mirror the
    /// neighbour about the boundary point, shifted by the imposed gradient.
    fn boundary_row(&self, end: End, field: &[f64], dt: f64, system: &mut System) {
        let n = field.len();
        let (condition, b, nb, ghost_factor) = match end {
            End::Outer => (self.outer, 0, 1, self.discretization.ghost_factor[0]),
            End::Inner => (self.inner, n - 1, n - 2, self.discretization.ghost_factor[1]),
        };
        let theta = self.theta;
        let r = self.discretization.coefficient[b] * dt;

        let (diag, off, rhs) = match *condition {
            BoundaryCondition::Fixed { .. } => (1.0, 0.0, condition.value_at(self.position)),
            BoundaryCondition::Flux { .. } => {
                let q = condition.value_at(self.position);
                (
                    1.0 + 2.0 * theta * r,
                    -2.0 * theta * r,
                    field[b]
                        + (1.0 - theta) * r * (2.0 * field[nb] - 2.0 * field[b])
                        + r * ghost_factor * q,
                )
            }
            BoundaryCondition::Exchange { coefficient, .. } => {
                let ambient = condition.value_at(self.position);
                let beta = ghost_factor * coefficient;
                (
                    1.0 + 2.0 * theta * r + theta * r * beta,
                    -2.0 * theta * r,
                    field[b]
                        + (1.0 - theta)
                            * r
                            * (2.0 * field[nb] - 2.0 * field[b] - beta * field[b])
                        + r * beta * ambient,
                )
            }
        };

        system.diag[b] = diag;
        system.rhs[b] = rhs;
        match end {
            End::Outer => system.upper[0] = off,
            End::Inner => system.lower[n - 2] = off,
        }
    }
}

/// Step-doubling error: RMS difference between one full step and two half
/// steps taken from the same starting field.
fn step_doubling_error(
    assembly: &Assembly,
    previous: &[f64],
    full_step: &[f64],
    dt: f64,
    system: &mut System,
) -> Result<f64> {
    let half = assembly.advance(previous, dt / 2.0, system)?;
    let two_halves = assembly.advance(&half, dt / 2.0, system)?;
    let sum_sq: f64 = two_halves
        .iter()
        .zip_eq(full_step)
        .map(|(a, b)| (a - b).powi(2))
        .sum();
    Ok((sum_sq / full_step.len() as f64).sqrt())
}

fn is_crank_nicolson(theta: f64) -> bool {
    (theta - CRANK_NICOLSON).abs() < 1e-12
}

#[derive(Clone, Debug)]
struct Problem {
    stack: Stack,
    discretization: Discretization,
    time: TimeController,
    system: System,
}

/// Transient conduction solver for one stack.
///
/// Lifecycle: [`initialize`](Self::initialize) with a stack and clock, set the
/// initial field (state becomes `Ready`) and both boundary conditions, then
/// [`step`](Self::step) until `Finished`.
#[derive(Clone, Debug)]
pub struct TransientSolver {
    theta: f64,
    settings: SolverSettings,
    position: f64,
    state: SolverState,
    problem: Option<Problem>,
    temperature: TemperatureField,
    boundaries: Option<(BoundaryCondition, BoundaryCondition)>,
}

impl TransientSolver {
    /// `theta = 1` is backward Euler, `theta = 0.5` Crank-Nicolson.
    pub fn new(theta: f64) -> Result<Self> {
        Self::with_settings(theta, SolverSettings::default())
    }

    pub fn with_settings(theta: f64, settings: SolverSettings) -> Result<Self> {
        if !(0.0..=1.0).contains(&theta) {
            return Err(Error::InvalidTheta(theta));
        }
        Ok(TransientSolver {
            theta,
            settings,
            position: 0.0,
            state: SolverState::Uninitialized,
            problem: None,
            temperature: TemperatureField::default(),
            boundaries: None,
        })
    }

    pub fn theta(&self) -> f64 {
        self.theta
    }

    pub fn state(&self) -> SolverState {
        self.state
    }

    /// Non-dimensional position `l/L` used to evaluate boundary driving values.
    pub fn set_position(&mut self, position: f64) {
        self.position = position;
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    /// Take ownership of the stack and clock; the field is reset to zero and
    /// has to be set before stepping.
    pub fn initialize(&mut self, stack: Stack, time: TimeController) {
        let n = stack.len();
        let discretization = Discretization::new(&stack);
        if self.theta < CRANK_NICOLSON && time.time_step() > discretization.stability_limit() {
            warn!(
                "time step {:.3e} s is above the explicit stability limit {:.3e} s (theta {})",
                time.time_step(),
                discretization.stability_limit(),
                self.theta
            );
        }
        self.problem = Some(Problem {
            discretization,
            system: System::new(n),
            stack,
            time,
        });
        self.temperature = TemperatureField::uniform(n, 0.0);
        self.state = SolverState::Uninitialized;
    }

    pub fn set_initial_temperature(&mut self, initial: Vec<f64>) -> Result<()> {
        let problem = self.problem.as_ref().ok_or(Error::NotInitialized)?;
        if initial.len() != problem.stack.len() {
            return Err(Error::SizeMismatch {
                what: "initial temperature",
                expected: problem.stack.len(),
                actual: initial.len(),
            });
        }
        self.temperature = initial.into();
        self.state = SolverState::Ready;
        Ok(())
    }

    pub fn set_uniform_temperature(&mut self, temperature: f64) -> Result<()> {
        let n = self.problem.as_ref().ok_or(Error::NotInitialized)?.stack.len();
        self.set_initial_temperature(vec![temperature; n])
    }

    /// Replace both end conditions; the previous ones are dropped.
    pub fn set_boundary_conditions(&mut self, outer: BoundaryCondition, inner: BoundaryCondition) {
        self.boundaries = Some((outer, inner));
    }

    pub fn boundary_conditions(&self) -> Option<&(BoundaryCondition, BoundaryCondition)> {
        self.boundaries.as_ref()
    }

    pub fn temperature(&self) -> &TemperatureField {
        &self.temperature
    }

    pub fn into_temperature(self) -> TemperatureField {
        self.temperature
    }

    pub fn stack(&self) -> Option<&Stack> {
        self.problem.as_ref().map(|p| &p.stack)
    }

    pub fn time(&self) -> Option<&TimeController> {
        self.problem.as_ref().map(|p| &p.time)
    }

    pub fn is_finished(&self) -> bool {
        self.time().map_or(false, TimeController::is_finished)
    }

    /// Advance the field by one time step.
    pub fn step(&mut self) -> Result<SolverState> {
        match self.state {
            SolverState::Uninitialized if self.problem.is_none() => {
                return Err(Error::NotInitialized)
            }
            SolverState::Uninitialized => return Err(Error::InitialTemperatureMissing),
            SolverState::Finished => return Err(Error::AlreadyFinished),
            SolverState::Ready | SolverState::Stepping => {}
        }
        let (outer, inner) = self.boundaries.ok_or(Error::BoundaryConditionsMissing)?;
        let problem = self.problem.as_mut().ok_or(Error::NotInitialized)?;
        if problem.time.is_finished() {
            self.state = SolverState::Finished;
            return Err(Error::AlreadyFinished);
        }

        let dt = problem.time.time_step();
        let assembly = Assembly {
            discretization: &problem.discretization,
            theta: self.theta,
            outer: &outer,
            inner: &inner,
            position: self.position,
        };
        let next = assembly.advance(self.temperature.as_slice(), dt, &mut problem.system)?;
        if let Some(index) = next.iter().position(|t| !t.is_finite()) {
            return Err(Error::NonFiniteTemperature {
                index,
                step: problem.time.step_count() + 1,
            });
        }
        let previous = std::mem::replace(&mut self.temperature, next.into());
        problem.time.advance();
        trace!(
            "step {} t={:.6} s dt={:.3e} s",
            problem.time.step_count(),
            problem.time.elapsed(),
            dt
        );

        if problem.time.is_adaptive() {
            let adjusted = if is_crank_nicolson(self.theta) {
                let error = step_doubling_error(
                    &assembly,
                    previous.as_slice(),
                    self.temperature.as_slice(),
                    dt,
                    &mut problem.system,
                )?;
                if error > self.settings.error_threshold {
                    Some(dt / 2.0)
                } else if error < self.settings.error_threshold / 2.0 {
                    Some(dt * 2.0)
                } else {
                    None
                }
            } else {
                let limit = problem.discretization.stability_limit();
                (problem.time.time_step() > limit).then_some(limit)
            };
            if let Some(new_dt) = adjusted {
                debug!("time step {:.3e} s -> {:.3e} s", dt, new_dt);
                problem.time.adjust_time_step(new_dt)?;
            }
        }

        self.state = if problem.time.is_finished() {
            SolverState::Finished
        } else {
            SolverState::Stepping
        };
        Ok(self.state)
    }

    /// Step until the clock reaches its duration.
    pub fn run(&mut self) -> Result<&TemperatureField> {
        while !self.is_finished() {
            self.step()?;
        }
        self.state = SolverState::Finished;
        Ok(&self.temperature)
    }

    /// Step-doubling error estimate for a step of `dt` from `previous` that
    /// produced `full_step`. Solver temperatures and clock are left untouched.
    pub fn estimate_error(
        &mut self,
        previous: &TemperatureField,
        full_step: &TemperatureField,
        dt: f64,
    ) -> Result<f64> {
        let (outer, inner) = self.boundaries.ok_or(Error::BoundaryConditionsMissing)?;
        let problem = self.problem.as_mut().ok_or(Error::NotInitialized)?;
        for field in [previous, full_step] {
            if field.len() != problem.stack.len() {
                return Err(Error::SizeMismatch {
                    what: "temperature field",
                    expected: problem.stack.len(),
                    actual: field.len(),
                });
            }
        }
        let assembly = Assembly {
            discretization: &problem.discretization,
            theta: self.theta,
            outer: &outer,
            inner: &inner,
            position: self.position,
        };
        step_doubling_error(
            &assembly,
            previous.as_slice(),
            full_step.as_slice(),
            dt,
            &mut problem.system,
        )
    }
}
