use log::debug;
use serde::Deserialize;
use uom::si::{f64::Length, length::meter};

use crate::boundary::BoundaryCondition;
use crate::error::{Error, Result};
use crate::model::{Stack, TRACKED_INTERFACES};
use crate::profile::Drive;
use crate::solver::{
    SolverSettings, TemperatureField, TransientSolver, CRANK_NICOLSON,
    DEFAULT_ERROR_THRESHOLD, DEFAULT_INITIAL_TEMPERATURE,
};
use crate::time::TimeController;

/// Index of the layer whose thickness is optimized.
pub const OPTIMIZED_LAYER: usize = 0;

/// Parameters of one full transient solve.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSettings {
    /// Simulated time in s.
    pub duration: f64,
    /// Initial (or fixed) time step in s.
    pub time_step: f64,
    pub theta: f64,
    pub adaptive: bool,
    pub error_threshold: f64,
    /// Starting field; a uniform 300 K field when absent.
    pub initial_temperature: Option<Vec<f64>>,
}

impl Default for RunSettings {
    fn default() -> Self {
        RunSettings {
            duration: 10.0,
            time_step: 0.1,
            theta: CRANK_NICOLSON,
            adaptive: true,
            error_threshold: DEFAULT_ERROR_THRESHOLD,
            initial_temperature: None,
        }
    }
}

impl RunSettings {
    /// Run one transient solve of `stack` to completion and return the final
    /// field.
    pub fn simulate(
        &self,
        stack: Stack,
        position: f64,
        outer: BoundaryCondition,
        inner: BoundaryCondition,
    ) -> Result<TemperatureField> {
        let mut solver = TransientSolver::with_settings(
            self.theta,
            SolverSettings {
                error_threshold: self.error_threshold,
            },
        )?;
        let time = TimeController::new(self.duration, self.time_step, self.adaptive)?;
        solver.initialize(stack, time);
        match &self.initial_temperature {
            Some(initial) => solver.set_initial_temperature(initial.clone())?,
            None => solver.set_uniform_temperature(DEFAULT_INITIAL_TEMPERATURE)?,
        }
        solver.set_position(position);
        solver.set_boundary_conditions(outer, inner);
        solver.run()?;
        Ok(solver.into_temperature())
    }

    /// Exhaust gas on the outer face, insulated inner face.
    pub fn simulate_exhaust(&self, stack: Stack, position: f64) -> Result<TemperatureField> {
        self.simulate(
            stack,
            position,
            BoundaryCondition::fixed(Drive::exhaust_temperature()),
            BoundaryCondition::insulated(),
        )
    }
}

/// True when every sampled temperature is strictly below its ceiling.
pub fn meets_ceilings(
    field: &TemperatureField,
    indices: [usize; TRACKED_INTERFACES],
    ceilings: [f64; TRACKED_INTERFACES],
) -> Result<bool> {
    let temperatures = field.sample(indices)?;
    Ok(temperatures
        .iter()
        .zip(ceilings.iter())
        .all(|(temperature, ceiling)| temperature < ceiling))
}

#[derive(Clone, Debug, PartialEq)]
pub struct Suggestion {
    pub thickness: Length,
    /// Tracked interface temperatures [K] at the suggested thickness.
    pub interface_temperatures: [f64; TRACKED_INTERFACES],
    /// Number of transient solves performed.
    pub iterations: usize,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ThicknessOptimizer {
    /// Lower end of the search bracket in m.
    pub min_thickness: f64,
    /// Upper end of the search bracket in m.
    pub max_thickness: f64,
    /// Bracket width in m at which the search stops.
    pub tolerance: f64,
    pub max_iterations: usize,
    #[serde(skip)]
    pub run: RunSettings,
}

impl Default for ThicknessOptimizer {
    fn default() -> Self {
        ThicknessOptimizer {
            min_thickness: 1e-4,
            max_thickness: 1e-2,
            tolerance: 1e-5,
            max_iterations: 200,
            run: RunSettings::default(),
        }
    }
}

struct Trial {
    feasible: bool,
    temperatures: [f64; TRACKED_INTERFACES],
}

impl ThicknessOptimizer {
    /// Find the thinnest outer layer for which a full run ends with every
    /// tracked interface below `ceilings`.
    ///
    /// The returned thickness is the smallest one evaluated as feasible, so
    /// anything thinner by more than the tolerance fails at least one
    /// ceiling. `stack` itself is left untouched.
    pub fn suggest_thickness(
        &self,
        stack: &Stack,
        ceilings: [f64; TRACKED_INTERFACES],
        position: f64,
    ) -> Result<Suggestion> {
        if !(self.tolerance.is_finite()
            && self.tolerance > 0.0
            && self.min_thickness > 0.0
            && self.max_thickness.is_finite()
            && self.min_thickness < self.max_thickness)
        {
            return Err(Error::InvalidBracket {
                min: self.min_thickness,
                max: self.max_thickness,
                tolerance: self.tolerance,
            });
        }

        let mut lo = self.min_thickness;
        let mut hi = self.max_thickness;
        let mut best: Option<[f64; TRACKED_INTERFACES]> = None;
        let mut iterations = 0;

        while hi - lo > self.tolerance {
            if iterations >= self.max_iterations {
                return Err(Error::NotConverged {
                    iterations,
                    width: hi - lo,
                });
            }
            let mid = lo + (hi - lo) / 2.0;
            if mid <= lo || mid >= hi {
                debug!("bracket [{:e}, {:e}] m stopped shrinking", lo, hi);
                break;
            }
            iterations += 1;

            let trial = self.evaluate(stack, mid, ceilings, position)?;
            debug!(
                "iteration {}: {:.6e} m -> {:?} K ({})",
                iterations,
                mid,
                trial.temperatures,
                if trial.feasible { "feasible" } else { "too hot" }
            );
            if trial.feasible {
                hi = mid;
                best = Some(trial.temperatures);
            } else {
                lo = mid;
            }
        }

        let interface_temperatures = match best {
            Some(temperatures) => temperatures,
            None => {
                iterations += 1;
                let trial = self.evaluate(stack, hi, ceilings, position)?;
                if !trial.feasible {
                    return Err(Error::CeilingsUnreachable { thickness: hi });
                }
                trial.temperatures
            }
        };

        debug!("suggested thickness {:.6e} m after {} runs", hi, iterations);
        Ok(Suggestion {
            thickness: Length::new::<meter>(hi),
            interface_temperatures,
            iterations,
        })
    }

    fn evaluate(
        &self,
        stack: &Stack,
        thickness: f64,
        ceilings: [f64; TRACKED_INTERFACES],
        position: f64,
    ) -> Result<Trial> {
        let mut stack = stack.clone();
        stack.set_layer_thickness(OPTIMIZED_LAYER, Length::new::<meter>(thickness))?;
        let indices = stack.tracked_interfaces()?;
        let field = self.run.simulate_exhaust(stack, position)?;
        Ok(Trial {
            feasible: meets_ceilings(&field, indices, ceilings)?,
            temperatures: field.sample(indices)?,
        })
    }
}
