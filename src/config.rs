use std::fs;
use std::path::Path;

use log::LevelFilter;

use crate::model::StackDescription;
use crate::optimizer::RunSettings;
use crate::slices::SliceSettings;

/// Everything a batch run needs, loaded from a json5 file.
#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    pub log_level: LevelFilter,
    pub stack: StackDescription,
    pub slices: SliceSettings,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            log_level: LevelFilter::Info,
            stack: StackDescription::builtin(),
            slices: SliceSettings::default(),
        }
    }
}

impl RunConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let string = fs::read_to_string(path)?;
        Self::from_json(&string)
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let loaded: as_loaded::RunConfig = json5::from_str(json)?;
        let converted = loaded.try_into()?;
        Ok(converted)
    }
}

impl TryFrom<as_loaded::RunConfig> for RunConfig {
    type Error = anyhow::Error;
    fn try_from(value: as_loaded::RunConfig) -> anyhow::Result<Self> {
        let log_level = match value.log_level {
            Some(level) => level
                .parse::<LevelFilter>()
                .map_err(|_| anyhow::anyhow!("Unknown log level {:?}", level))?,
            None => LevelFilter::Info,
        };

        let stack = match value.stack {
            Some(stack) => stack.try_into()?,
            None => StackDescription::builtin(),
        };

        let simulation = value.simulation;
        if simulation.points_per_layer < 2 {
            anyhow::bail!(
                "Each layer needs at least 2 points, got {}",
                simulation.points_per_layer
            );
        }
        if let Some(initial) = &value.initial_temperature {
            let expected = 1 + stack.layers.len() * (simulation.points_per_layer - 1);
            if initial.len() != expected {
                anyhow::bail!(
                    "Initial temperature has {} values, the grid has {} points",
                    initial.len(),
                    expected
                );
            }
        }

        let run = RunSettings {
            duration: simulation.duration,
            time_step: simulation.time_step,
            theta: simulation.theta,
            adaptive: simulation.adaptive,
            error_threshold: simulation.error_threshold,
            initial_temperature: value.initial_temperature,
        };
        let optimize = value.optimizer.map(|mut optimizer| {
            optimizer.run = run.clone();
            optimizer
        });

        Ok(RunConfig {
            log_level,
            stack,
            slices: SliceSettings {
                slices: simulation.slices,
                points_per_layer: simulation.points_per_layer,
                run,
                optimize,
                parallel: simulation.parallel,
            },
        })
    }
}

mod as_loaded {
    use serde::Deserialize;

    use crate::model;
    use crate::optimizer::{RunSettings, ThicknessOptimizer};
    use crate::slices::SliceSettings;

    #[derive(Clone, Debug, Deserialize)]
    pub struct RunConfig {
        #[serde(default)]
        pub log_level: Option<String>,
        #[serde(default)]
        pub stack: Option<model::as_loaded::StackDescription>,
        #[serde(default)]
        pub simulation: Simulation,
        #[serde(default)]
        pub optimizer: Option<ThicknessOptimizer>,
        #[serde(default)]
        pub initial_temperature: Option<Vec<f64>>,
    }

    #[derive(Clone, Debug, Deserialize)]
    #[serde(default)]
    pub struct Simulation {
        pub slices: usize,
        pub points_per_layer: usize,
        pub parallel: bool,
        pub duration: f64,
        pub time_step: f64,
        pub theta: f64,
        pub adaptive: bool,
        pub error_threshold: f64,
    }

    impl Default for Simulation {
        fn default() -> Self {
            let slices = SliceSettings::default();
            let run = RunSettings::default();
            Simulation {
                slices: slices.slices,
                points_per_layer: slices.points_per_layer,
                parallel: slices.parallel,
                duration: run.duration,
                time_step: run.time_step,
                theta: run.theta,
                adaptive: run.adaptive,
                error_threshold: run.error_threshold,
            }
        }
    }
}
