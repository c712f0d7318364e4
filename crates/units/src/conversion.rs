//! Conversion constants to SI (m, s, kg, Pa, K).
//!
//! Every constant is the SI magnitude of one unit of the named quantity, so
//! a value `x` expressed in that unit is `x * CONSTANT` in SI.

/// Decimal unit prefixes.
pub mod prefix {
    pub const MICRO: f64 = 1.0e-6;
    pub const MILLI: f64 = 1.0e-3;
    pub const CENTI: f64 = 1.0e-2;
    pub const DECI: f64 = 1.0e-1;
    pub const KILO: f64 = 1.0e3;
    pub const MEGA: f64 = 1.0e6;
    pub const GIGA: f64 = 1.0e9;
}

// ── Length / time ────────────────────────────────────────────────────

pub const METER: f64 = 1.0;
pub const INCH: f64 = 2.54 * prefix::CENTI * METER;
pub const FEET: f64 = 12.0 * INCH;

pub const SECOND: f64 = 1.0;
pub const MINUTE: f64 = 60.0 * SECOND;
pub const HOUR: f64 = 60.0 * MINUTE;
pub const DAY: f64 = 24.0 * HOUR;

// ── Volume / mass / energy ───────────────────────────────────────────

pub const GALLON: f64 = 231.0 * INCH * INCH * INCH;
pub const STB: f64 = 42.0 * GALLON;
pub const LITER: f64 = (prefix::DECI * METER) * (prefix::DECI * METER) * (prefix::DECI * METER);

pub const KILOGRAM: f64 = 1.0;
pub const GRAM: f64 = 1.0e-3 * KILOGRAM;
pub const POUND: f64 = 0.45359237 * KILOGRAM;

pub const JOULE: f64 = 1.0;
/// British thermal unit.
pub const BTU: f64 = 1054.3503 * JOULE;

// ── Force / pressure ─────────────────────────────────────────────────

pub const GRAVITY: f64 = 9.80665 * METER / (SECOND * SECOND);
pub const NEWTON: f64 = KILOGRAM * METER / (SECOND * SECOND);
pub const DYNE: f64 = 1e-5 * NEWTON;
/// Pound-force.
pub const LBF: f64 = POUND * GRAVITY;

pub const PASCAL: f64 = NEWTON / (METER * METER);
pub const BARSA: f64 = 100_000.0 * PASCAL;
pub const ATM: f64 = 101_325.0 * PASCAL;
pub const PSIA: f64 = LBF / (INCH * INCH);

// ── Temperature ──────────────────────────────────────────────────────

/// Scale of a Celsius difference in kelvin.
pub const DEG_CELSIUS: f64 = 1.0;
/// Kelvin value of 0 °C.
pub const DEG_CELSIUS_OFFSET: f64 = 273.15;
/// Scale of a Fahrenheit difference in kelvin.
pub const DEG_FAHRENHEIT: f64 = 5.0 / 9.0;
/// Kelvin value of 0 °F.
pub const DEG_FAHRENHEIT_OFFSET: f64 = 459.67 * DEG_FAHRENHEIT;

// ── Viscosity / permeability ─────────────────────────────────────────

pub const PASCAL_SECOND: f64 = PASCAL * SECOND;
pub const POISE: f64 = prefix::DECI * PASCAL_SECOND;

/// One darcy: the permeability passing 1 cm³/s of a 1 cP fluid through
/// 1 cm² under a gradient of 1 atm/cm.
pub const DARCY: f64 = {
    let cm = prefix::CENTI * METER;
    let p_grad = ATM / cm;
    let area = cm * cm;
    let flux = cm * cm * cm / SECOND;
    let velocity = flux / area;
    let visc = prefix::CENTI * POISE;
    (velocity * visc) / p_grad
};
