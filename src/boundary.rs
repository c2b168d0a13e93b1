use serde::Deserialize;

use crate::profile::Drive;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BoundaryKind {
    Fixed,
    Flux,
    Exchange,
}

/// Condition applied at one end of the stack.
///
/// Boundary conditions hold no simulation state; their driving values are
/// functions of the non-dimensional position along the surface only.
#[derive(Copy, Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundaryCondition {
    /// Dirichlet: the end point is held at `temperature` [K].
    Fixed { temperature: Drive },
    /// Neumann: `heat_flux` [W/m²], positive into the stack.
    Flux { heat_flux: Drive },
    /// Robin: `q = coefficient * (ambient - T_surface)`, with `coefficient`
    /// in W/(m² K) and `ambient` in K.
    Exchange { coefficient: f64, ambient: Drive },
}

impl BoundaryCondition {
    pub fn fixed(temperature: impl Into<Drive>) -> Self {
        BoundaryCondition::Fixed {
            temperature: temperature.into(),
        }
    }

    pub fn flux(heat_flux: impl Into<Drive>) -> Self {
        BoundaryCondition::Flux {
            heat_flux: heat_flux.into(),
        }
    }

    /// Zero-gradient end, mirrored about the boundary point.
    pub fn insulated() -> Self {
        Self::flux(0.0)
    }

    pub fn exchange(coefficient: f64, ambient: impl Into<Drive>) -> Self {
        BoundaryCondition::Exchange {
            coefficient,
            ambient: ambient.into(),
        }
    }

    pub fn kind(&self) -> BoundaryKind {
        match self {
            BoundaryCondition::Fixed { .. } => BoundaryKind::Fixed,
            BoundaryCondition::Flux { .. } => BoundaryKind::Flux,
            BoundaryCondition::Exchange { .. } => BoundaryKind::Exchange,
        }
    }

    /// Driving value at `position`: the held temperature, the imposed flux or
    /// the ambient temperature of an exchange.
    pub fn value_at(&self, position: f64) -> f64 {
        match self {
            BoundaryCondition::Fixed { temperature } => temperature.at(position),
            BoundaryCondition::Flux { heat_flux } => heat_flux.at(position),
            BoundaryCondition::Exchange { ambient, .. } => ambient.at(position),
        }
    }

    /// Heat flux into the stack for a given surface temperature.
    ///
    /// Returns `None` for fixed-temperature ends, whose flux is whatever the
    /// solve makes it.
    pub fn flux_at(&self, position: f64, surface_temperature: f64) -> Option<f64> {
        match self {
            BoundaryCondition::Fixed { .. } => None,
            BoundaryCondition::Flux { heat_flux } => Some(heat_flux.at(position)),
            BoundaryCondition::Exchange {
                coefficient,
                ambient,
            } => Some(coefficient * (ambient.at(position) - surface_temperature)),
        }
    }
}
