//! Units of measure: conversion factor and offset against a base unit.

use crate::dimension::DimId;

/// Index of a unit inside a registry.
///
/// Unit ids are assigned in bootstrap phase 1 and stay stable through the
/// phase-2 replacement, so a dimension's unit list never needs rewriting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitId(pub(crate) u32);

impl UnitId {
    /// Index into the registry's unit table.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A unit of measure.
///
/// Conversion against the base unit of the dimension is affine:
/// `to_base(v) = v * factor + offset`. The offset is zero for every
/// linear unit; temperature scales (Celsius, Fahrenheit) are the
/// canonical nonzero-offset case.
///
/// During bootstrap phase 1 every referenced unit exists only as a
/// placeholder (`factor = 1`, `offset = 0`, no dimension back-reference,
/// `bootstrap = true`). Phase 2 replaces the placeholder in place; no
/// bootstrap unit survives into a sealed registry.
#[derive(Clone, Debug, PartialEq)]
pub struct Unit {
    pub(crate) id: UnitId,
    pub(crate) name: String,
    pub(crate) symbol: String,
    pub(crate) system: String,
    pub(crate) to_base_factor: f64,
    pub(crate) to_base_offset: f64,
    pub(crate) dimension: Option<DimId>,
    pub(crate) bootstrap: bool,
}

impl Unit {
    /// Registry id.
    pub fn id(&self) -> UnitId {
        self.id
    }

    /// Unit name, unique within a registry.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Printable symbol appended by display formatting.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Unit system tag (e.g. `SI`, `Imperial`).
    pub fn system(&self) -> &str {
        &self.system
    }

    /// Multiplicative conversion factor to the base unit. Never zero in a
    /// sealed registry.
    pub fn to_base_factor(&self) -> f64 {
        self.to_base_factor
    }

    /// Additive conversion offset to the base unit.
    pub fn to_base_offset(&self) -> f64 {
        self.to_base_offset
    }

    /// Owning dimension. `None` only while bootstrapping, or for unit
    /// metadata no dimension references.
    pub fn dimension(&self) -> Option<DimId> {
        self.dimension
    }

    /// True only for phase-1 placeholder units.
    pub fn is_bootstrap(&self) -> bool {
        self.bootstrap
    }

    /// Converts a value in this unit to the base unit.
    pub fn to_base(&self, value: f64) -> f64 {
        value * self.to_base_factor + self.to_base_offset
    }

    /// Converts a base-unit value to this unit.
    pub fn from_base(&self, value: f64) -> f64 {
        (value - self.to_base_offset) / self.to_base_factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn unit(factor: f64, offset: f64) -> Unit {
        Unit {
            id: UnitId(0),
            name: "Test".into(),
            symbol: "t".into(),
            system: "SI".into(),
            to_base_factor: factor,
            to_base_offset: offset,
            dimension: None,
            bootstrap: false,
        }
    }

    #[test]
    fn linear_roundtrip() {
        let km = unit(1000.0, 0.0);
        assert_abs_diff_eq!(km.to_base(2.5), 2500.0);
        assert_abs_diff_eq!(km.from_base(km.to_base(2.5)), 2.5, epsilon = 1e-12);
    }

    #[test]
    fn fahrenheit_to_kelvin() {
        // °F -> K: factor 5/9, offset 459.67 * 5/9.
        let fahrenheit = unit(5.0 / 9.0, 459.67 * 5.0 / 9.0);
        assert_abs_diff_eq!(fahrenheit.to_base(32.0), 273.15, epsilon = 1e-9);
        assert_abs_diff_eq!(fahrenheit.to_base(212.0), 373.15, epsilon = 1e-9);
    }

    #[test]
    fn offset_roundtrip() {
        let celsius = unit(1.0, 273.15);
        assert_abs_diff_eq!(celsius.from_base(celsius.to_base(100.0)), 100.0, epsilon = 1e-12);
    }
}
