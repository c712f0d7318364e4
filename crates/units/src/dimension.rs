use serde::{Deserialize, Serialize};

/// A physical quantity expressed in one unit system: the SI magnitude of one
/// unit and, for temperatures, the SI value of the unit's zero point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    name: String,
    si_scaling: f64,
    si_offset: f64,
}

impl Dimension {
    pub fn new(name: impl Into<String>, si_scaling: f64, si_offset: f64) -> Self {
        Dimension {
            name: name.into(),
            si_scaling,
            si_offset,
        }
    }

    /// A dimension derived from products and quotients of other dimensions.
    /// Composites never carry an offset.
    pub fn composite(name: impl Into<String>, si_scaling: f64) -> Self {
        Dimension::new(name, si_scaling, 0.0)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn si_scaling(&self) -> f64 {
        self.si_scaling
    }

    pub fn si_offset(&self) -> f64 {
        self.si_offset
    }

    pub fn convert_raw_to_si(&self, raw: f64) -> f64 {
        raw * self.si_scaling + self.si_offset
    }

    pub fn convert_si_to_raw(&self, si: f64) -> f64 {
        (si - self.si_offset) / self.si_scaling
    }

    /// Only offset-free dimensions may take part in a composite.
    pub fn is_compositable(&self) -> bool {
        self.si_offset == 0.0
    }

    pub fn is_dimensionless(&self) -> bool {
        self.si_scaling == 1.0 && self.si_offset == 0.0
    }
}
