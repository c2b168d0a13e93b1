use std::collections::HashMap;
use std::fs;
use std::path::Path;

use itertools::Itertools;
use uom::si::{
    f64::{Length, MassDensity, SpecificHeatCapacity, ThermalConductivity, ThermodynamicTemperature},
    length::meter,
    mass_density::kilogram_per_cubic_meter,
    specific_heat_capacity::joule_per_kilogram_kelvin,
    thermal_conductivity::watt_per_meter_kelvin,
    thermodynamic_temperature::kelvin,
};

#[cfg(test)]
use proptest::{
    arbitrary::Arbitrary,
    prelude::prop,
    strategy::{BoxedStrategy, Strategy},
};

use crate::error::{Error, Result};
use crate::profile::ThicknessProfile;

/// Number of layer interfaces tracked against temperature ceilings:
/// outer/second layer, second/third layer and the innermost surface.
pub const TRACKED_INTERFACES: usize = 3;

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    pub thermal_conductivity: ThermalConductivity,
    pub density: MassDensity,
    pub specific_heat_capacity: SpecificHeatCapacity,
    pub max_temperature: Option<ThermodynamicTemperature>,
    pub glass_transition: Option<ThermodynamicTemperature>,
}

impl Material {
    /// Plain SI values: W/(m K), kg/m³, J/(kg K) and K.
    pub fn new(
        name: &str,
        thermal_conductivity: f64,
        density: f64,
        specific_heat_capacity: f64,
        max_temperature: Option<f64>,
        glass_transition: Option<f64>,
    ) -> Material {
        Material {
            name: name.into(),
            thermal_conductivity: ThermalConductivity::new::<watt_per_meter_kelvin>(
                thermal_conductivity,
            ),
            density: MassDensity::new::<kilogram_per_cubic_meter>(density),
            specific_heat_capacity: SpecificHeatCapacity::new::<joule_per_kilogram_kelvin>(
                specific_heat_capacity,
            ),
            max_temperature: max_temperature.map(ThermodynamicTemperature::new::<kelvin>),
            glass_transition: glass_transition.map(ThermodynamicTemperature::new::<kelvin>),
        }
    }

    pub fn tps() -> Material {
        Material::new("TPS", 0.2, 160.0, 1200.0, None, Some(1200.0))
    }

    pub fn carbon_fiber() -> Material {
        Material::new("CarbonFiber", 500.0, 1600.0, 700.0, None, Some(350.0))
    }

    pub fn glue() -> Material {
        Material::new("Glue", 200.0, 1300.0, 900.0, None, Some(400.0))
    }

    pub fn steel() -> Material {
        Material::new("Steel", 100.0, 7850.0, 500.0, Some(800.0), None)
    }

    pub fn builtin() -> Vec<Material> {
        vec![
            Material::tps(),
            Material::carbon_fiber(),
            Material::glue(),
            Material::steel(),
        ]
    }

    /// Thermal conductivity in W/(m K).
    pub fn conductivity(&self) -> f64 {
        self.thermal_conductivity.get::<watt_per_meter_kelvin>()
    }

    /// Thermal diffusivity `k / (rho c)` in m²/s.
    pub fn diffusivity(&self) -> f64 {
        // Kept outside of UOM, the kernels work on plain SI numbers
        self.conductivity()
            / (self.density.get::<kilogram_per_cubic_meter>()
                * self
                    .specific_heat_capacity
                    .get::<joule_per_kilogram_kelvin>())
    }

    /// Lowest applicable temperature limit in K, if the material has any.
    pub fn temperature_limit(&self) -> Option<f64> {
        [self.max_temperature, self.glass_transition]
            .into_iter()
            .flatten()
            .map(|t| t.get::<kelvin>())
            .reduce(f64::min)
    }
}

#[cfg(test)]
impl Arbitrary for Material {
    type Parameters = ();
    type Strategy = BoxedStrategy<Material>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        ("[a-z]*", 1e-3f64..500f64, 1f64..10000f64, 100f64..5000f64)
            .prop_map(|tuple| Material::new(&tuple.0, tuple.1, tuple.2, tuple.3, None, None))
            .boxed()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub material: Material,
    pub thickness: Length,
    /// Grid points in this layer, including both of its faces.
    pub points: usize,
}

impl Layer {
    pub fn new(material: Material, thickness: Length, points: usize) -> Layer {
        Layer {
            material,
            thickness,
            points,
        }
    }

    fn thickness_m(&self) -> f64 {
        self.thickness.get::<meter>()
    }
}

#[cfg(test)]
impl Arbitrary for Layer {
    type Parameters = ();
    type Strategy = BoxedStrategy<Layer>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (Material::arbitrary(), 1e-6f64..0.1f64, 2usize..30)
            .prop_map(|tuple| Layer::new(tuple.0, Length::new::<meter>(tuple.1), tuple.2))
            .boxed()
    }
}

/// Layers ordered from the outer (heated) side to the inner side, together
/// with the 1D grid spanning them.
#[derive(Clone, Debug, PartialEq)]
pub struct Stack {
    layers: Vec<Layer>,
    x_grid: Vec<f64>,
    total_thickness: f64,
}

impl Stack {
    pub fn new(layers: Vec<Layer>) -> Result<Stack> {
        let mut stack = Stack {
            layers,
            x_grid: Vec::new(),
            total_thickness: 0.0,
        };
        stack.regenerate()?;
        Ok(stack)
    }

    /// Four 1 mm layers of the built-in materials with 10 points each.
    pub fn default_stack() -> Stack {
        let layers = Material::builtin()
            .into_iter()
            .map(|material| Layer::new(material, Length::new::<meter>(1e-3), 10))
            .collect();
        Stack::new(layers).expect("built-in stack is valid")
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn x_grid(&self) -> &[f64] {
        &self.x_grid
    }

    pub fn len(&self) -> usize {
        self.x_grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x_grid.is_empty()
    }

    /// Total stack thickness in m, as recorded by the last grid generation.
    pub fn total_thickness(&self) -> f64 {
        self.total_thickness
    }

    /// Recompute the grid from the current layer thicknesses and point counts.
    ///
    /// Layer faces land exactly on the running sum of layer thicknesses, so
    /// interface lookups never need interpolation.
    pub fn regenerate(&mut self) -> Result<()> {
        let (x_grid, total_thickness) = generate_grid(&self.layers)?;
        self.x_grid = x_grid;
        self.total_thickness = total_thickness;
        Ok(())
    }

    /// Swap in a new layer list; on error the stack keeps its previous layers
    /// and grid.
    fn replace_layers(&mut self, layers: Vec<Layer>) -> Result<()> {
        let (x_grid, total_thickness) = generate_grid(&layers)?;
        self.layers = layers;
        self.x_grid = x_grid;
        self.total_thickness = total_thickness;
        Ok(())
    }

    pub fn set_layer_thickness(&mut self, index: usize, thickness: Length) -> Result<()> {
        let mut layers = self.layers.clone();
        let count = layers.len();
        layers
            .get_mut(index)
            .ok_or(Error::NoSuchLayer {
                index,
                layers: count,
            })?
            .thickness = thickness;
        self.replace_layers(layers)
    }

    /// Give every layer the same point count, for refinement studies.
    pub fn set_points_per_layer(&mut self, points: usize) -> Result<()> {
        let mut layers = self.layers.clone();
        for layer in layers.iter_mut() {
            layer.points = points;
        }
        self.replace_layers(layers)
    }

    /// Layer owning grid index `i`: the first whose far face has not been
    /// passed, falling back to the last layer for boundary ties.
    pub fn layer_at(&self, i: usize) -> &Layer {
        let x = self.x_grid[i];
        let mut x_start = 0.0;
        for layer in &self.layers {
            if x <= x_start + layer.thickness_m() {
                return layer;
            }
            x_start += layer.thickness_m();
        }
        self.layers.last().expect("stack has layers")
    }

    pub fn diffusivity_at(&self, i: usize) -> f64 {
        self.layer_at(i).material.diffusivity()
    }

    pub fn conductivity_at(&self, i: usize) -> f64 {
        self.layer_at(i).material.conductivity()
    }

    /// Running sums of layer thicknesses, i.e. the coordinate of each layer's
    /// inner face.
    pub fn layer_boundaries(&self) -> Vec<f64> {
        self.layers
            .iter()
            .scan(0.0, |x, layer| {
                *x += layer.thickness_m();
                Some(*x)
            })
            .collect()
    }

    /// First grid index at or beyond `boundary`.
    pub fn interface_index(&self, boundary: f64) -> usize {
        self.x_grid
            .iter()
            .position(|&x| x >= boundary)
            .unwrap_or(self.x_grid.len() - 1)
    }

    /// Grid indices of the tracked interfaces.
    pub fn tracked_interfaces(&self) -> Result<[usize; TRACKED_INTERFACES]> {
        let boundaries = self.layer_boundaries();
        if boundaries.len() < TRACKED_INTERFACES - 1 {
            return Err(Error::TooFewLayers {
                needed: TRACKED_INTERFACES - 1,
                layers: boundaries.len(),
            });
        }
        Ok([
            self.interface_index(boundaries[0]),
            self.interface_index(boundaries[1]),
            self.x_grid.len() - 1,
        ])
    }

    /// Temperature limit of the layer just downstream of each tracked
    /// interface. Layers without a limit get an infinite ceiling.
    pub fn default_ceilings(&self) -> Result<[f64; TRACKED_INTERFACES]> {
        if self.layers.len() < TRACKED_INTERFACES - 1 {
            return Err(Error::TooFewLayers {
                needed: TRACKED_INTERFACES - 1,
                layers: self.layers.len(),
            });
        }
        let limit = |layer: &Layer| layer.material.temperature_limit().unwrap_or(f64::INFINITY);
        let downstream = self.layers.get(2).unwrap_or(&self.layers[1]);
        Ok([
            limit(&self.layers[1]),
            limit(downstream),
            limit(self.layers.last().expect("stack has layers")),
        ])
    }

    /// Smallest grid spacing in m.
    pub fn min_spacing(&self) -> f64 {
        self.x_grid
            .iter()
            .tuple_windows()
            .map(|(a, b)| b - a)
            .fold(f64::INFINITY, f64::min)
    }
}

/// Grid coordinates and total thickness for `layers`, after validating them.
fn generate_grid(layers: &[Layer]) -> Result<(Vec<f64>, f64)> {
    if layers.is_empty() {
        return Err(Error::EmptyStack);
    }
    for (index, layer) in layers.iter().enumerate() {
        let thickness = layer.thickness_m();
        if !(thickness.is_finite() && thickness > 0.0) {
            return Err(Error::InvalidThickness { index, thickness });
        }
        if layer.points < 2 {
            return Err(Error::TooFewPoints {
                index,
                points: layer.points,
            });
        }
    }

    let size = 1 + layers.iter().map(|l| l.points - 1).sum::<usize>();
    let mut x_grid = Vec::with_capacity(size);
    let mut start = 0.0;
    x_grid.push(start);
    for layer in layers {
        let thickness = layer.thickness_m();
        let intervals = layer.points - 1;
        let dx = thickness / intervals as f64;
        let end = start + thickness;
        x_grid.extend((1..intervals).map(|i| start + i as f64 * dx));
        x_grid.push(end);
        start = end;
    }
    Ok((x_grid, start))
}

#[cfg(test)]
impl Arbitrary for Stack {
    type Parameters = ();
    type Strategy = BoxedStrategy<Stack>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        prop::collection::vec(Layer::arbitrary(), 1..6)
            .prop_map(|layers| Stack::new(layers).unwrap())
            .boxed()
    }
}

/// Layer list whose thicknesses may depend on the position along the surface.
#[derive(Clone, Debug, PartialEq)]
pub struct StackDescription {
    pub layers: Vec<LayerDescription>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayerDescription {
    pub material: Material,
    pub thickness: ThicknessProfile,
}

impl StackDescription {
    /// The built-in four layer stack: TPS (optimized), carbon fiber, glue and
    /// steel with position dependent thicknesses.
    pub fn builtin() -> StackDescription {
        let tps = ThicknessProfile::Constant {
            thickness: Length::new::<meter>(1e-3),
        };
        StackDescription {
            layers: vec![
                LayerDescription {
                    material: Material::tps(),
                    thickness: tps,
                },
                LayerDescription {
                    material: Material::carbon_fiber(),
                    thickness: ThicknessProfile::carbon_fiber(),
                },
                LayerDescription {
                    material: Material::glue(),
                    thickness: ThicknessProfile::glue(),
                },
                LayerDescription {
                    material: Material::steel(),
                    thickness: ThicknessProfile::steel(),
                },
            ],
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let string = fs::read_to_string(path)?;
        Self::from_json(&string)
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let loaded: as_loaded::StackDescription = json5::from_str(json)?;
        loaded.try_into()
    }

    /// Build the stack for one slice at non-dimensional position `position`.
    pub fn build(&self, position: f64, points_per_layer: usize) -> Result<Stack> {
        Stack::new(
            self.layers
                .iter()
                .map(|layer| {
                    Layer::new(
                        layer.material.clone(),
                        layer.thickness.at(position),
                        points_per_layer,
                    )
                })
                .collect(),
        )
    }
}

impl TryFrom<as_loaded::StackDescription> for StackDescription {
    type Error = anyhow::Error;
    fn try_from(value: as_loaded::StackDescription) -> anyhow::Result<Self> {
        let mut materials: HashMap<_, _> = Material::builtin()
            .into_iter()
            .map(|material| (material.name.clone(), material))
            .collect();
        for (name, material) in value.materials {
            materials.insert(name.clone(), material.convert(name)?);
        }

        if value.layers.is_empty() {
            anyhow::bail!("Stack description has empty layer list")
        }

        let layers = value
            .layers
            .into_iter()
            .map(|layer| layer.convert(&materials))
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(StackDescription { layers })
    }
}

pub(crate) mod as_loaded {
    use std::collections::HashMap;

    use serde::Deserialize;
    use uom::si::f64::{
        Length, MassDensity, SpecificHeatCapacity, ThermalConductivity, ThermodynamicTemperature,
    };

    use crate::profile::ThicknessProfile;

    #[derive(Clone, Debug, Deserialize)]
    pub struct StackDescription {
        #[serde(default)]
        pub materials: HashMap<String, Material>,
        pub layers: Vec<LayerDescription>,
    }

    #[derive(Clone, Debug, Deserialize, PartialEq)]
    #[serde(untagged)]
    pub enum LayerDescription {
        Fixed {
            material: String,
            thickness: Length,
        },
        Profiled {
            material: String,
            profile: ThicknessProfile,
        },
    }

    impl LayerDescription {
        pub fn convert(
            self,
            materials: &HashMap<String, super::Material>,
        ) -> anyhow::Result<super::LayerDescription> {
            let (name, thickness) = match self {
                LayerDescription::Fixed {
                    material,
                    thickness,
                } => (material, ThicknessProfile::Constant { thickness }),
                LayerDescription::Profiled { material, profile } => (material, profile),
            };
            let material = materials
                .get(&name)
                .ok_or_else(|| anyhow::anyhow!("Could not find material {:?}", name))?
                .clone();
            Ok(super::LayerDescription {
                material,
                thickness,
            })
        }
    }

    #[derive(Clone, Debug, Deserialize, PartialEq)]
    pub struct Material {
        pub thermal_conductivity: ThermalConductivity,
        pub density: MassDensity,
        pub specific_heat_capacity: SpecificHeatCapacity,
        #[serde(default)]
        pub max_temperature: Option<ThermodynamicTemperature>,
        #[serde(default)]
        pub glass_transition: Option<ThermodynamicTemperature>,
    }

    impl Material {
        pub fn convert(self, name: String) -> anyhow::Result<super::Material> {
            let properties = [
                ("thermal_conductivity", self.thermal_conductivity.value),
                ("density", self.density.value),
                ("specific_heat_capacity", self.specific_heat_capacity.value),
            ];
            for (property, value) in properties {
                if !(value.is_finite() && value > 0.0) {
                    anyhow::bail!("Material {:?} has invalid {} {}", name, property, value);
                }
            }
            Ok(super::Material {
                name,
                thermal_conductivity: self.thermal_conductivity,
                density: self.density,
                specific_heat_capacity: self.specific_heat_capacity,
                max_temperature: self.max_temperature,
                glass_transition: self.glass_transition,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use assert_matches::assert_matches;
    use test_case::test_case;
    use test_strategy::proptest;

    fn stack_of(thicknesses: &[f64], points: usize) -> Stack {
        Stack::new(
            thicknesses
                .iter()
                .zip(Material::builtin().into_iter().cycle())
                .map(|(&t, material)| Layer::new(material, Length::new::<meter>(t), points))
                .collect(),
        )
        .unwrap()
    }

    #[proptest]
    fn grid_invariant(stack: Stack) {
        let grid = stack.x_grid();
        assert_eq!(grid[0], 0.0);
        assert!(grid.iter().tuple_windows().all(|(a, b)| b > a));

        let expected_total: f64 = stack.layers().iter().map(|l| l.thickness.get::<meter>()).sum();
        assert_eq!(*grid.last().unwrap(), expected_total);
        assert_eq!(stack.total_thickness(), expected_total);

        let expected_len = 1 + stack.layers().iter().map(|l| l.points - 1).sum::<usize>();
        assert_eq!(grid.len(), expected_len);
    }

    #[proptest]
    fn layer_faces_are_grid_points(stack: Stack) {
        let mut index = 0;
        for (layer, boundary) in stack.layers().iter().zip(stack.layer_boundaries()) {
            index += layer.points - 1;
            assert_eq!(stack.x_grid()[index], boundary);
            assert_eq!(stack.interface_index(boundary), index);
        }
    }

    #[proptest]
    fn regeneration_is_idempotent(stack: Stack) {
        let mut regenerated = stack.clone();
        regenerated.regenerate().unwrap();
        let bits = |s: &Stack| s.x_grid().iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&regenerated), bits(&stack));
    }

    #[test]
    fn uniform_spacing_within_layer() {
        let stack = stack_of(&[0.009, 0.002], 10);
        assert_eq!(stack.len(), 19);
        for (a, b) in stack.x_grid()[..10].iter().tuple_windows() {
            assert_relative_eq!(b - a, 0.001, max_relative = 1e-9);
        }
        for (a, b) in stack.x_grid()[9..].iter().tuple_windows() {
            assert_relative_eq!(b - a, 0.002 / 9.0, max_relative = 1e-9);
        }
    }

    #[test]
    fn thickness_change_regenerates_grid() {
        let mut stack = Stack::default_stack();
        let before = stack.len();
        stack
            .set_layer_thickness(0, Length::new::<meter>(0.005))
            .unwrap();
        assert_eq!(stack.len(), before);
        assert_relative_eq!(stack.total_thickness(), 0.008, max_relative = 1e-12);
        assert_relative_eq!(stack.x_grid()[9], 0.005);

        stack.set_points_per_layer(5).unwrap();
        assert_eq!(stack.len(), 17);
        assert_relative_eq!(stack.total_thickness(), 0.008, max_relative = 1e-12);
    }

    #[test]
    fn diffusivity_lookup_prefers_outer_layer_at_interface() {
        let stack = Stack::default_stack();
        let tps = Material::tps().diffusivity();
        let cf = Material::carbon_fiber().diffusivity();
        assert_eq!(stack.diffusivity_at(0), tps);
        assert_eq!(stack.diffusivity_at(9), tps);
        assert_eq!(stack.diffusivity_at(10), cf);
        assert_eq!(
            stack.diffusivity_at(stack.len() - 1),
            Material::steel().diffusivity()
        );
    }

    #[test_case(Material::tps(), 0.2 / (160.0 * 1200.0); "tps")]
    #[test_case(Material::steel(), 100.0 / (7850.0 * 500.0); "steel")]
    fn material_diffusivity(material: Material, expected: f64) {
        assert_relative_eq!(material.diffusivity(), expected);
    }

    #[test]
    fn tracked_interfaces_and_ceilings() {
        let stack = Stack::default_stack();
        assert_eq!(stack.tracked_interfaces().unwrap(), [9, 18, 36]);
        assert_eq!(stack.default_ceilings().unwrap(), [350.0, 400.0, 800.0]);
    }

    #[test]
    fn single_layer_cannot_track_interfaces() {
        let stack = stack_of(&[0.01], 5);
        assert_matches!(
            stack.tracked_interfaces(),
            Err(Error::TooFewLayers { needed: 2, layers: 1 })
        );
    }

    #[test]
    fn invalid_layers_are_rejected() {
        let material = Material::tps();
        assert_matches!(Stack::new(vec![]), Err(Error::EmptyStack));
        assert_matches!(
            Stack::new(vec![Layer::new(material.clone(), Length::new::<meter>(0.0), 10)]),
            Err(Error::InvalidThickness { index: 0, .. })
        );
        assert_matches!(
            Stack::new(vec![Layer::new(material, Length::new::<meter>(0.01), 1)]),
            Err(Error::TooFewPoints { index: 0, points: 1 })
        );
        assert_matches!(
            Stack::default_stack().set_layer_thickness(7, Length::new::<meter>(0.01)),
            Err(Error::NoSuchLayer { index: 7, layers: 4 })
        );
    }

    #[test]
    fn rejected_change_keeps_stack() {
        let mut stack = Stack::default_stack();
        let before = stack.clone();

        assert_matches!(
            stack.set_layer_thickness(0, Length::new::<meter>(0.0)),
            Err(Error::InvalidThickness { index: 0, .. })
        );
        assert_eq!(stack, before);

        assert_matches!(
            stack.set_points_per_layer(1),
            Err(Error::TooFewPoints { index: 0, points: 1 })
        );
        assert_eq!(stack, before);
        assert_eq!(stack.len(), 37);
        assert_eq!(*stack.x_grid().last().unwrap(), stack.total_thickness());
    }

    #[test]
    fn description_builds_slice_stack() {
        let description = StackDescription::builtin();
        let stack = description.build(0.1, 5).unwrap();
        assert_eq!(stack.len(), 17);
        assert_relative_eq!(
            stack.layers()[1].thickness.get::<meter>(),
            1.6e-4,
            max_relative = 1e-9
        );
    }

    #[test]
    fn description_from_json() {
        let description = StackDescription::from_json(
            r#"{
            materials: {
                foam: {
                    thermal_conductivity: 0.05,
                    density: 30,
                    specific_heat_capacity: 1400,
                    glass_transition: 380,
                },
            },
            layers: [
                { material: "foam", thickness: 0.004 },
                { material: "CarbonFiber", profile: { kind: "rectified_sine", amplitude: 0.00015, frequency: 1, span: 2.5, offset: 0.00001 } },
                { material: "Steel", thickness: 0.002 },
            ],
        }"#,
        )
        .unwrap();

        assert_eq!(description.layers.len(), 3);
        assert_eq!(description.layers[0].material.name, "foam");
        assert_eq!(
            description.layers[0].material.temperature_limit(),
            Some(380.0)
        );
        assert_eq!(description.layers[1].material, Material::carbon_fiber());
        assert_eq!(
            description.layers[1].thickness,
            ThicknessProfile::carbon_fiber()
        );
    }

    #[test]
    fn description_missing_material() {
        let message = format!(
            "{}",
            StackDescription::from_json(r#"{ layers: [{ material: "unobtainium", thickness: 1 }] }"#)
                .unwrap_err()
        );

        message
            .find("material")
            .expect("Error message should contain what type of object was missing");
        message
            .find("unobtainium")
            .expect("Error message should contain the name of the object");
    }

    #[test_case("thermal_conductivity: 0, density: 30, specific_heat_capacity: 1400"; "zero conductivity")]
    #[test_case("thermal_conductivity: 0.05, density: 0, specific_heat_capacity: 1400"; "zero density")]
    #[test_case("thermal_conductivity: 0.05, density: 30, specific_heat_capacity: -1"; "negative heat capacity")]
    fn description_rejects_invalid_material(properties: &str) {
        let json = format!(
            "{{ materials: {{ foam: {{ {} }} }}, layers: [{{ material: 'foam', thickness: 0.001 }}] }}",
            properties
        );
        let message = StackDescription::from_json(&json).unwrap_err().to_string();
        assert!(message.contains("foam"), "{}", message);
    }

    #[test]
    fn description_empty_layers() {
        assert!(StackDescription::from_json("{ layers: [] }").is_err());
    }
}
