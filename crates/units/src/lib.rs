//! ecldeck-units: unit systems and SI conversion for simulation decks.
//!
//! A [`UnitSystem`] maps dimension names (`Pressure`, `Length`, ...) to a
//! [`Dimension`] carrying an SI scaling factor and offset. The built-in
//! systems are constructed once per process and shared:
//!
//! - [`UnitSystem::builtin`] -- `&'static` METRIC, FIELD, LAB, PVT-M, INPUT
//! - [`UnitSystem::from_name`] -- lookup by deck keyword name
//! - [`UnitSystemBuilder`] -- custom systems, immutable once built

pub mod conversion;
pub mod dimension;
pub mod error;
pub mod system;

pub use dimension::Dimension;
pub use error::UnitError;
pub use system::{UnitSystem, UnitSystemBuilder, UnitType, BUILTIN_DIMENSIONS};
