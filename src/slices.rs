use log::debug;
use rayon::prelude::*;
use uom::si::{f64::Length, length::millimeter};

use crate::error::Result;
use crate::model::{StackDescription, TRACKED_INTERFACES};
use crate::optimizer::{RunSettings, Suggestion, ThicknessOptimizer};
use crate::solver::TemperatureField;

#[derive(Clone, Debug, PartialEq)]
pub struct SliceSettings {
    pub slices: usize,
    pub points_per_layer: usize,
    pub run: RunSettings,
    /// Search for the outer layer thickness of every slice when set.
    pub optimize: Option<ThicknessOptimizer>,
    pub parallel: bool,
}

impl Default for SliceSettings {
    fn default() -> Self {
        SliceSettings {
            slices: 20,
            points_per_layer: 10,
            run: RunSettings::default(),
            optimize: None,
            parallel: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SliceResult {
    pub index: usize,
    /// Non-dimensional position `l/L`.
    pub position: f64,
    pub layer_thicknesses: Vec<Length>,
    pub interface_temperatures: [f64; TRACKED_INTERFACES],
    pub final_field: TemperatureField,
    pub suggestion: Option<Suggestion>,
}

/// `l/L` of slice `index` out of `slices`, spreading them evenly over [0, 1].
pub fn slice_position(index: usize, slices: usize) -> f64 {
    if slices <= 1 {
        0.0
    } else {
        index as f64 / (slices - 1) as f64
    }
}

/// Run every slice; results are in slice order.
pub fn process_slices(
    description: &StackDescription,
    settings: &SliceSettings,
) -> Result<Vec<SliceResult>> {
    let run = |index| process_slice(description, settings, index);
    if settings.parallel {
        (0..settings.slices).into_par_iter().map(run).collect()
    } else {
        (0..settings.slices).map(run).collect()
    }
}

fn process_slice(
    description: &StackDescription,
    settings: &SliceSettings,
    index: usize,
) -> Result<SliceResult> {
    let position = slice_position(index, settings.slices);
    let stack = description.build(position, settings.points_per_layer)?;
    let indices = stack.tracked_interfaces()?;
    let layer_thicknesses = stack.layers().iter().map(|layer| layer.thickness).collect();

    let suggestion = settings
        .optimize
        .as_ref()
        .map(|optimizer| {
            optimizer.suggest_thickness(&stack, stack.default_ceilings()?, position)
        })
        .transpose()?;

    let final_field = settings.run.simulate_exhaust(stack, position)?;
    let interface_temperatures = final_field.sample(indices)?;

    debug!(
        "slice {} (l/L = {:.3}): interfaces {:.1?} K{}",
        index,
        position,
        interface_temperatures,
        suggestion
            .as_ref()
            .map(|s| format!(", suggested outer layer {:.3} mm", s.thickness.get::<millimeter>()))
            .unwrap_or_default()
    );

    Ok(SliceResult {
        index,
        position,
        layer_thicknesses,
        interface_temperatures,
        final_field,
        suggestion,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::BACKWARD_EULER;
    use test_case::test_case;
    use uom::si::length::meter;

    fn settings(slices: usize, parallel: bool) -> SliceSettings {
        SliceSettings {
            slices,
            points_per_layer: 6,
            run: RunSettings {
                duration: 1.0,
                time_step: 0.1,
                theta: BACKWARD_EULER,
                adaptive: false,
                ..RunSettings::default()
            },
            optimize: None,
            parallel,
        }
    }

    #[test_case(0, 1, 0.0)]
    #[test_case(0, 5, 0.0)]
    #[test_case(2, 5, 0.5)]
    #[test_case(4, 5, 1.0)]
    fn positions(index: usize, slices: usize, expected: f64) {
        assert_eq!(slice_position(index, slices), expected);
    }

    #[test]
    fn parallel_matches_sequential() {
        let description = StackDescription::builtin();
        let sequential = process_slices(&description, &settings(7, false)).unwrap();
        let parallel = process_slices(&description, &settings(7, true)).unwrap();
        assert_eq!(sequential, parallel);
        assert_eq!(
            parallel.iter().map(|r| r.index).collect::<Vec<_>>(),
            (0..7).collect::<Vec<_>>()
        );
    }

    #[test]
    fn slice_geometry_follows_description() {
        let description = StackDescription::builtin();
        let results = process_slices(&description, &settings(3, false)).unwrap();
        for result in &results {
            let stack = description.build(result.position, 6).unwrap();
            let expected: Vec<_> = stack.layers().iter().map(|l| l.thickness).collect();
            assert_eq!(result.layer_thicknesses, expected);
            assert_eq!(result.final_field.len(), stack.len());
            assert!(result.suggestion.is_none());
        }
        assert_eq!(results[1].position, 0.5);
    }

    #[test]
    fn optimized_slices() {
        let description = StackDescription::builtin();
        let mut settings = settings(2, true);
        settings.optimize = Some(ThicknessOptimizer {
            run: settings.run.clone(),
            ..ThicknessOptimizer::default()
        });
        let results = process_slices(&description, &settings).unwrap();
        for result in results {
            let suggestion = result.suggestion.unwrap();
            assert!(suggestion.thickness.get::<meter>() > 0.0);
        }
    }

    #[test]
    fn no_slices() {
        let results = process_slices(&StackDescription::builtin(), &settings(0, true)).unwrap();
        assert!(results.is_empty());
    }
}
