use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::conversion::{self as c, prefix};
use crate::dimension::Dimension;
use crate::error::UnitError;

/// The family a unit system belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnitType {
    Metric,
    Field,
    Lab,
    PvtM,
    Input,
    Custom,
}

impl UnitType {
    /// The deck keyword that selects this family, if any.
    pub fn deck_name(self) -> Option<&'static str> {
        match self {
            UnitType::Metric => Some("METRIC"),
            UnitType::Field => Some("FIELD"),
            UnitType::Lab => Some("LAB"),
            UnitType::PvtM => Some("PVT-M"),
            UnitType::Input => Some("INPUT"),
            UnitType::Custom => None,
        }
    }

    pub fn from_deck_name(name: &str) -> Option<UnitType> {
        match name.trim().to_ascii_uppercase().as_str() {
            "METRIC" => Some(UnitType::Metric),
            "FIELD" => Some(UnitType::Field),
            "LAB" => Some(UnitType::Lab),
            "PVT-M" => Some(UnitType::PvtM),
            "INPUT" => Some(UnitType::Input),
            _ => None,
        }
    }
}

/// A closed mapping from dimension name to [`Dimension`].
///
/// Systems are immutable once built. Composite expressions such as
/// `Length*Length/Time` are resolved on demand by [`UnitSystem::dimension`]
/// and never cached into the system, so a system name always yields the
/// same conversions for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitSystem {
    name: String,
    unit_type: UnitType,
    dimensions: BTreeMap<String, Dimension>,
}

static METRIC: Lazy<UnitSystem> = Lazy::new(UnitSystem::new_metric);
static FIELD: Lazy<UnitSystem> = Lazy::new(UnitSystem::new_field);
static LAB: Lazy<UnitSystem> = Lazy::new(UnitSystem::new_lab);
static PVT_M: Lazy<UnitSystem> = Lazy::new(UnitSystem::new_pvt_m);
static INPUT: Lazy<UnitSystem> = Lazy::new(UnitSystem::new_input);

/// Per-family magnitudes from which the built-in tables are generated.
struct Scales {
    pressure: f64,
    temperature: f64,
    temperature_offset: f64,
    length: f64,
    time: f64,
    mass: f64,
    liquid_surface_volume: f64,
    gas_surface_volume: f64,
    reservoir_volume: f64,
    density: f64,
    concentration: f64,
    energy: f64,
}

impl UnitSystem {
    /// The shared, process-wide instance of a built-in system.
    ///
    /// Returns `None` for [`UnitType::Custom`], which has no built-in table.
    pub fn builtin(unit_type: UnitType) -> Option<&'static UnitSystem> {
        match unit_type {
            UnitType::Metric => Some(&METRIC),
            UnitType::Field => Some(&FIELD),
            UnitType::Lab => Some(&LAB),
            UnitType::PvtM => Some(&PVT_M),
            UnitType::Input => Some(&INPUT),
            UnitType::Custom => None,
        }
    }

    /// Look up a built-in system by its deck name ("METRIC", "FIELD", "LAB",
    /// "PVT-M" or "INPUT"), case-insensitively.
    pub fn from_name(name: &str) -> Result<&'static UnitSystem, UnitError> {
        UnitType::from_deck_name(name)
            .and_then(UnitSystem::builtin)
            .ok_or_else(|| UnitError::UnknownSystem(name.to_string()))
    }

    pub fn new_metric() -> Self {
        Self::from_scales(
            "Metric",
            UnitType::Metric,
            Scales {
                pressure: c::BARSA,
                temperature: c::DEG_CELSIUS,
                temperature_offset: c::DEG_CELSIUS_OFFSET,
                length: c::METER,
                time: c::DAY,
                mass: c::KILOGRAM,
                liquid_surface_volume: c::METER * c::METER * c::METER,
                gas_surface_volume: c::METER * c::METER * c::METER,
                reservoir_volume: c::METER * c::METER * c::METER,
                density: c::KILOGRAM / (c::METER * c::METER * c::METER),
                concentration: c::KILOGRAM / (c::METER * c::METER * c::METER),
                energy: prefix::KILO * c::JOULE,
            },
        )
    }

    pub fn new_field() -> Self {
        let feet3 = c::FEET * c::FEET * c::FEET;
        Self::from_scales(
            "Field",
            UnitType::Field,
            Scales {
                pressure: c::PSIA,
                temperature: c::DEG_FAHRENHEIT,
                temperature_offset: c::DEG_FAHRENHEIT_OFFSET,
                length: c::FEET,
                time: c::DAY,
                mass: c::POUND,
                liquid_surface_volume: c::STB,
                gas_surface_volume: 1000.0 * feet3,
                reservoir_volume: c::STB,
                density: c::POUND / feet3,
                concentration: c::POUND / c::STB,
                energy: c::BTU,
            },
        )
    }

    pub fn new_lab() -> Self {
        let cm = prefix::CENTI * c::METER;
        let cm3 = cm * cm * cm;
        Self::from_scales(
            "Lab",
            UnitType::Lab,
            Scales {
                pressure: c::ATM,
                temperature: c::DEG_CELSIUS,
                temperature_offset: c::DEG_CELSIUS_OFFSET,
                length: cm,
                time: c::HOUR,
                mass: c::GRAM,
                liquid_surface_volume: cm3,
                gas_surface_volume: cm3,
                reservoir_volume: cm3,
                density: c::GRAM / cm3,
                concentration: c::GRAM / cm3,
                energy: c::JOULE,
            },
        )
    }

    pub fn new_pvt_m() -> Self {
        let m3 = c::METER * c::METER * c::METER;
        Self::from_scales(
            "PVT-M",
            UnitType::PvtM,
            Scales {
                pressure: c::ATM,
                temperature: c::DEG_CELSIUS,
                temperature_offset: c::DEG_CELSIUS_OFFSET,
                length: c::METER,
                time: c::DAY,
                mass: c::KILOGRAM,
                liquid_surface_volume: m3,
                gas_surface_volume: m3,
                reservoir_volume: m3,
                density: c::KILOGRAM / m3,
                concentration: c::KILOGRAM / m3,
                energy: prefix::KILO * c::JOULE,
            },
        )
    }

    /// The identity system: every dimension converts with factor 1 and no
    /// offset, so values stay in whatever units the deck author used.
    pub fn new_input() -> Self {
        let mut system = UnitSystem {
            name: "Input".to_string(),
            unit_type: UnitType::Input,
            dimensions: BTreeMap::new(),
        };
        for name in BUILTIN_DIMENSIONS {
            system
                .dimensions
                .insert(name.to_string(), Dimension::new(*name, 1.0, 0.0));
        }
        system
    }

    fn from_scales(name: &str, unit_type: UnitType, s: Scales) -> Self {
        let permeability = prefix::MILLI * c::DARCY;
        let viscosity = prefix::CENTI * c::POISE;
        let entries: [(&str, f64, f64); 24] = [
            ("1", 1.0, 0.0),
            ("Pressure", s.pressure, 0.0),
            ("PressureDrop", s.pressure, 0.0),
            ("Temperature", s.temperature, s.temperature_offset),
            ("AbsoluteTemperature", s.temperature, 0.0),
            ("Length", s.length, 0.0),
            ("Area", s.length * s.length, 0.0),
            ("GeomVolume", s.length * s.length * s.length, 0.0),
            ("Time", s.time, 0.0),
            ("Timestep", s.time, 0.0),
            ("Mass", s.mass, 0.0),
            ("Permeability", permeability, 0.0),
            (
                "Transmissibility",
                viscosity * s.reservoir_volume / (s.time * s.pressure),
                0.0,
            ),
            ("LiquidSurfaceVolume", s.liquid_surface_volume, 0.0),
            ("GasSurfaceVolume", s.gas_surface_volume, 0.0),
            ("ReservoirVolume", s.reservoir_volume, 0.0),
            (
                "GasDissolutionFactor",
                s.gas_surface_volume / s.liquid_surface_volume,
                0.0,
            ),
            (
                "OilDissolutionFactor",
                s.liquid_surface_volume / s.gas_surface_volume,
                0.0,
            ),
            ("Density", s.density, 0.0),
            ("PolymerDensity", s.concentration, 0.0),
            ("Salinity", s.concentration, 0.0),
            ("Viscosity", viscosity, 0.0),
            ("SurfaceTension", c::DYNE / (prefix::CENTI * c::METER), 0.0),
            ("Energy", s.energy, 0.0),
        ];

        let dimensions = entries
            .iter()
            .map(|(dim, scaling, offset)| (dim.to_string(), Dimension::new(*dim, *scaling, *offset)))
            .collect();
        UnitSystem {
            name: name.to_string(),
            unit_type,
            dimensions,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit_type(&self) -> UnitType {
        self.unit_type
    }

    pub fn has_dimension(&self, name: &str) -> bool {
        self.dimensions.contains_key(name)
    }

    pub fn dimension_names(&self) -> impl Iterator<Item = &str> {
        self.dimensions.keys().map(String::as_str)
    }

    /// An atomic dimension registered in this system.
    pub fn get_dimension(&self, name: &str) -> Result<&Dimension, UnitError> {
        self.dimensions
            .get(name)
            .ok_or_else(|| UnitError::UnknownDimension {
                system: self.name.clone(),
                dimension: name.to_string(),
            })
    }

    /// Resolve a dimension expression: an atomic name, or a composite of
    /// the form `A*B/C*D` with at most one `/`.
    pub fn dimension(&self, expression: &str) -> Result<Dimension, UnitError> {
        let expression = expression.trim();
        let parts: Vec<&str> = expression.split('/').collect();
        match parts.as_slice() {
            [single] => self.parse_factor(expression, single),
            [dividend, divisor] => {
                let top = self.parse_factor(expression, dividend)?;
                let bottom = self.parse_factor(expression, divisor)?;
                if !top.is_compositable() || !bottom.is_compositable() {
                    return Err(invalid(
                        expression,
                        "dimensions with an offset cannot be combined",
                    ));
                }
                Ok(Dimension::composite(
                    expression,
                    top.si_scaling() / bottom.si_scaling(),
                ))
            }
            _ => Err(invalid(expression, "at most one '/' is allowed")),
        }
    }

    fn parse_factor(&self, expression: &str, factor: &str) -> Result<Dimension, UnitError> {
        let names: Vec<&str> = factor.split('*').map(str::trim).collect();
        if names.iter().any(|n| n.is_empty()) {
            return Err(invalid(expression, "empty dimension name"));
        }
        if let [single] = names.as_slice() {
            return self.get_dimension(single).cloned();
        }

        let mut scaling = 1.0;
        for name in &names {
            let dim = self.get_dimension(name)?;
            if !dim.is_compositable() {
                return Err(invalid(
                    expression,
                    "dimensions with an offset cannot be combined",
                ));
            }
            scaling *= dim.si_scaling();
        }
        Ok(Dimension::composite(factor.trim(), scaling))
    }

    /// Convert a value in this system's units of `dimension` to SI.
    pub fn to_si(&self, dimension: &str, value: f64) -> Result<f64, UnitError> {
        Ok(self.dimension(dimension)?.convert_raw_to_si(value))
    }

    /// Convert an SI value to this system's units of `dimension`.
    pub fn from_si(&self, dimension: &str, value: f64) -> Result<f64, UnitError> {
        Ok(self.dimension(dimension)?.convert_si_to_raw(value))
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

fn invalid(expression: &str, reason: &str) -> UnitError {
    UnitError::InvalidDimension {
        expression: expression.to_string(),
        reason: reason.to_string(),
    }
}

/// Names every built-in system defines.
pub const BUILTIN_DIMENSIONS: &[&str] = &[
    "1",
    "Pressure",
    "PressureDrop",
    "Temperature",
    "AbsoluteTemperature",
    "Length",
    "Area",
    "GeomVolume",
    "Time",
    "Timestep",
    "Mass",
    "Permeability",
    "Transmissibility",
    "LiquidSurfaceVolume",
    "GasSurfaceVolume",
    "ReservoirVolume",
    "GasDissolutionFactor",
    "OilDissolutionFactor",
    "Density",
    "PolymerDensity",
    "Salinity",
    "Viscosity",
    "SurfaceTension",
    "Energy",
];

/// Assembles a custom [`UnitSystem`]. The system is frozen by [`build`].
///
/// [`build`]: UnitSystemBuilder::build
#[derive(Debug)]
pub struct UnitSystemBuilder {
    name: String,
    dimensions: BTreeMap<String, Dimension>,
}

impl UnitSystemBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        let mut dimensions = BTreeMap::new();
        dimensions.insert("1".to_string(), Dimension::new("1", 1.0, 0.0));
        UnitSystemBuilder {
            name: name.into(),
            dimensions,
        }
    }

    pub fn dimension(
        mut self,
        name: &str,
        si_scaling: f64,
        si_offset: f64,
    ) -> Result<Self, UnitError> {
        if self.dimensions.contains_key(name) {
            return Err(UnitError::DuplicateDimension {
                system: self.name,
                dimension: name.to_string(),
            });
        }
        self.dimensions
            .insert(name.to_string(), Dimension::new(name, si_scaling, si_offset));
        Ok(self)
    }

    pub fn build(self) -> UnitSystem {
        UnitSystem {
            name: self.name,
            unit_type: UnitType::Custom,
            dimensions: self.dimensions,
        }
    }
}
