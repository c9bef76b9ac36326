//! The sealed registry: dimensions, units, derived operators, and
//! quantity-type descriptors.
//!
//! A registry is built exclusively by the bootstrap sequencer and is
//! immutable afterwards; every accessor takes `&self`, so unrestricted
//! concurrent reads are safe without locking.

use std::collections::HashMap;

use crate::closure::{OperatorSet, TypeRef};
use crate::dimension::{DimId, Dimension, VectorForm};
use crate::error::{Error, Result};
use crate::quantity::Quantity;
use crate::relationship::Relationship;
use crate::unit::{Unit, UnitId};

/// Descriptor of one emitted quantity type: a (dimension, form) pair or a
/// named overload of one.
#[derive(Clone, Debug, PartialEq)]
pub struct QuantityType {
    /// Emitted type name.
    pub name: String,
    /// Owning dimension.
    pub dim: DimId,
    /// Value shape.
    pub form: VectorForm,
    /// Name of the wrapped base type when this is a semantic overload.
    pub overload_of: Option<String>,
}

/// The sealed output of the bootstrap sequencer.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    pub(crate) dimensions: Vec<Dimension>,
    pub(crate) dim_by_name: HashMap<String, DimId>,
    pub(crate) units: Vec<Unit>,
    pub(crate) unit_by_name: HashMap<String, UnitId>,
    pub(crate) relationships: Vec<Relationship>,
    pub(crate) operators: OperatorSet,
    pub(crate) types: Vec<QuantityType>,
    pub(crate) type_by_name: HashMap<String, usize>,
}

impl Registry {
    /// All dimensions, indexed by [`DimId`].
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    /// Dimension lookup by name.
    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dim_by_name.get(name).map(|&id| &self.dimensions[id.index()])
    }

    /// Dimension lookup by id.
    pub fn dimension_by_id(&self, id: DimId) -> &Dimension {
        &self.dimensions[id.index()]
    }

    /// All units, indexed by [`UnitId`].
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Unit lookup by name.
    pub fn unit(&self, name: &str) -> Option<&Unit> {
        self.unit_by_name.get(name).map(|&id| &self.units[id.index()])
    }

    /// Unit lookup by id.
    pub fn unit_by_id(&self, id: UnitId) -> &Unit {
        &self.units[id.index()]
    }

    /// The resolved relationship list the closure ran over.
    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// The cached derived operator set.
    pub fn operators(&self) -> &OperatorSet {
        &self.operators
    }

    /// All quantity-type descriptors.
    pub fn quantity_types(&self) -> &[QuantityType] {
        &self.types
    }

    /// Quantity-type descriptor by emitted name.
    pub fn quantity_type(&self, name: &str) -> Option<&QuantityType> {
        self.type_by_name.get(name).map(|&i| &self.types[i])
    }

    /// Type reference for a (dimension name, form) pair.
    pub fn type_ref(&self, dimension: &str, form: VectorForm) -> Result<TypeRef> {
        let dim = self
            .dimension(dimension)
            .ok_or_else(|| Error::UnknownDimension {
                dimension: dimension.to_owned(),
                name: dimension.to_owned(),
                kind: "lookup".to_owned(),
            })?;
        if !dim.declares(form) {
            return Err(Error::MissingForm {
                dimension: dimension.to_owned(),
                form: form.index(),
            });
        }
        Ok(TypeRef::new(dim.id(), form))
    }

    /// Human-readable name of a type reference: the declared base type
    /// name, or `Dimension(form)` for undeclared pairs.
    pub fn describe(&self, type_ref: TypeRef) -> String {
        let dim = self.dimension_by_id(type_ref.dim);
        match dim.form(type_ref.form) {
            Some(decl) => decl.type_name.clone(),
            None => format!("{}({})", dim.name(), type_ref.form),
        }
    }

    /// Builds a quantity with components in the base unit.
    ///
    /// Checks that the form is declared, the component count matches, and
    /// magnitude (form 0) values are non-negative.
    pub fn quantity(&self, type_ref: TypeRef, components: &[f64]) -> Result<Quantity> {
        let dim = self.dimension_by_id(type_ref.dim);
        if !dim.declares(type_ref.form) {
            return Err(Error::MissingForm {
                dimension: dim.name().to_owned(),
                form: type_ref.form.index(),
            });
        }
        let expected = type_ref.form.components();
        if components.len() != expected {
            return Err(Error::ComponentCount {
                type_name: self.describe(type_ref),
                expected,
                got: components.len(),
            });
        }
        if type_ref.form == VectorForm::Magnitude && components[0] < 0.0 {
            return Err(Error::NegativeMagnitude {
                type_name: self.describe(type_ref),
                value: components[0],
            });
        }
        Ok(Quantity::from_parts(type_ref, components))
    }

    /// The zero value of a quantity type.
    pub fn zero(&self, type_ref: TypeRef) -> Result<Quantity> {
        self.quantity(type_ref, &[0.0; 4][..type_ref.form.components()])
    }

    /// Builds a magnitude (form 0) quantity from a value in the named
    /// unit.
    pub fn from_unit(&self, unit: &str, value: f64) -> Result<Quantity> {
        self.from_unit_as(unit, VectorForm::Magnitude, &[value])
    }

    /// Builds a quantity of any declared form from per-component values
    /// in the named unit.
    pub fn from_unit_as(&self, unit: &str, form: VectorForm, components: &[f64]) -> Result<Quantity> {
        let unit = self.unit(unit).ok_or_else(|| Error::UnknownUnit {
            dimension: String::new(),
            name: unit.to_owned(),
        })?;
        let dim = unit.dimension().ok_or_else(|| Error::UnknownUnit {
            dimension: String::new(),
            name: unit.name().to_owned(),
        })?;
        let ty = TypeRef::new(dim, form);
        // Checked before the fixed-size conversion buffer is touched.
        if components.len() != form.components() {
            return Err(Error::ComponentCount {
                type_name: self.describe(ty),
                expected: form.components(),
                got: components.len(),
            });
        }
        let mut base = [0.0; 4];
        for (slot, &component) in base.iter_mut().zip(components) {
            *slot = unit.to_base(component);
        }
        self.quantity(ty, &base[..components.len()])
    }

    /// Reads a quantity back in the named unit (per component).
    ///
    /// The unit must belong to a dimension with the same exponent map as
    /// the quantity's; unattached unit metadata has no dimension to
    /// check against and never reads quantities.
    pub fn in_unit(&self, quantity: &Quantity, unit: &str) -> Result<Vec<f64>> {
        let unit = self.unit(unit).ok_or_else(|| Error::UnknownUnit {
            dimension: String::new(),
            name: unit.to_owned(),
        })?;
        let exponents = self.dimension_by_id(quantity.type_ref().dim).exponents();
        let compatible = unit
            .dimension()
            .map(|id| self.dimension_by_id(id).exponents() == exponents)
            .unwrap_or(false);
        if !compatible {
            return Err(Error::IncompatibleDimensions {
                left: self.describe(quantity.type_ref()),
                right: unit.name().to_owned(),
            });
        }
        Ok(quantity.components().iter().map(|&c| unit.from_base(c)).collect())
    }

    /// Formats a quantity with the symbol of its dimension's base unit.
    pub fn format_quantity(&self, quantity: &Quantity) -> String {
        let dim = self.dimension_by_id(quantity.type_ref().dim);
        let symbol = dim
            .base_unit()
            .map(|id| self.unit_by_id(id).symbol().to_owned())
            .unwrap_or_default();
        let comps = quantity.components();
        let body = if comps.len() == 1 {
            format!("{}", comps[0])
        } else {
            let parts: Vec<String> = comps.iter().map(|c| c.to_string()).collect();
            format!("({})", parts.join(", "))
        };
        if symbol.is_empty() {
            body
        } else {
            format!("{body} {symbol}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::Sequencer;
    use crate::catalog::Catalog;
    use approx::assert_abs_diff_eq;

    fn registry() -> Registry {
        let catalog = Catalog::from_json_str(
            r#"{
                "dimensions": [
                    {
                        "name": "Length", "symbol": "L",
                        "exponents": { "Length": 1 },
                        "vectorForms": [
                            { "form": 0, "baseTypeName": "Distance" },
                            { "form": 3, "baseTypeName": "Displacement3D" }
                        ],
                        "availableUnits": ["Meter", "Kilometer"]
                    },
                    {
                        "name": "Time", "symbol": "T",
                        "exponents": { "Time": 1 },
                        "vectorForms": [ { "form": 0, "baseTypeName": "Duration" } ],
                        "availableUnits": ["Second", "Hour"]
                    }
                ],
                "units": [
                    { "name": "Meter", "symbol": "m", "toBaseFactor": 1.0 },
                    { "name": "Kilometer", "symbol": "km", "toBaseFactor": 1000.0 },
                    { "name": "Second", "symbol": "s", "toBaseFactor": 1.0 },
                    { "name": "Hour", "symbol": "h", "toBaseFactor": 3600.0 },
                    { "name": "Furlong", "symbol": "fur", "toBaseFactor": 201.168 }
                ]
            }"#,
        )
        .unwrap();
        Sequencer::initialize(&catalog).unwrap()
    }

    #[test]
    fn in_unit_reads_compatible_units() {
        let registry = registry();
        let distance = registry.from_unit("Kilometer", 2.5).unwrap();
        let km = registry.in_unit(&distance, "Kilometer").unwrap();
        assert_abs_diff_eq!(km[0], 2.5);
        let m = registry.in_unit(&distance, "Meter").unwrap();
        assert_abs_diff_eq!(m[0], 2500.0);
    }

    #[test]
    fn in_unit_rejects_a_foreign_dimension_unit() {
        let registry = registry();
        let distance = registry.from_unit("Kilometer", 1.0).unwrap();
        assert!(matches!(
            registry.in_unit(&distance, "Hour"),
            Err(Error::IncompatibleDimensions { .. })
        ));
    }

    #[test]
    fn in_unit_rejects_unattached_unit_metadata() {
        let registry = registry();
        // Furlong carries no dimension: nothing to check a reading
        // against.
        let distance = registry.from_unit("Meter", 100.0).unwrap();
        assert!(matches!(
            registry.in_unit(&distance, "Furlong"),
            Err(Error::IncompatibleDimensions { .. })
        ));
    }

    #[test]
    fn from_unit_as_checks_the_component_count_up_front() {
        let registry = registry();
        let err = registry
            .from_unit_as("Meter", VectorForm::Vector3, &[1.0, 2.0, 3.0, 4.0, 5.0])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ComponentCount { expected: 3, got: 5, .. }
        ));
    }
}
