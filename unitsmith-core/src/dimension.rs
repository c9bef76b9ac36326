//! Dimensions, vector forms, and semantic overloads.

use core::fmt;

use crate::base::Exponents;
use crate::unit::UnitId;

/// Index of a dimension inside a registry.
///
/// Ids are dense: a registry stores dimensions in a `Vec` indexed by id,
/// so lookups never hash.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DimId(pub(crate) u32);

impl DimId {
    /// Index into the registry's dimension table.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// The value "shape" of a quantity: magnitude, signed scalar, or a
/// 2/3/4-component vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VectorForm {
    /// Form 0: non-negative scalar.
    Magnitude,
    /// Form 1: signed scalar.
    Scalar,
    /// Form 2: two-component vector.
    Vector2,
    /// Form 3: three-component vector.
    Vector3,
    /// Form 4: four-component vector.
    Vector4,
}

impl VectorForm {
    /// All forms, ascending.
    pub const ALL: [VectorForm; 5] = [
        VectorForm::Magnitude,
        VectorForm::Scalar,
        VectorForm::Vector2,
        VectorForm::Vector3,
        VectorForm::Vector4,
    ];

    /// Numeric form index (0-4).
    pub const fn index(self) -> u8 {
        match self {
            VectorForm::Magnitude => 0,
            VectorForm::Scalar => 1,
            VectorForm::Vector2 => 2,
            VectorForm::Vector3 => 3,
            VectorForm::Vector4 => 4,
        }
    }

    /// Form for a metadata index, if valid.
    pub const fn from_index(index: u8) -> Option<VectorForm> {
        match index {
            0 => Some(VectorForm::Magnitude),
            1 => Some(VectorForm::Scalar),
            2 => Some(VectorForm::Vector2),
            3 => Some(VectorForm::Vector3),
            4 => Some(VectorForm::Vector4),
            _ => None,
        }
    }

    /// Number of stored components (1 for both scalar forms).
    pub const fn components(self) -> usize {
        match self {
            VectorForm::Magnitude | VectorForm::Scalar => 1,
            VectorForm::Vector2 => 2,
            VectorForm::Vector3 => 3,
            VectorForm::Vector4 => 4,
        }
    }

    /// True for the two scalar forms.
    pub const fn is_scalar(self) -> bool {
        matches!(self, VectorForm::Magnitude | VectorForm::Scalar)
    }

    /// True for the vector forms (2-4).
    pub const fn is_vector(self) -> bool {
        !self.is_scalar()
    }
}

impl fmt::Display for VectorForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// A named conversion between two sibling overloads of the same
/// (dimension, form) pair.
///
/// Expressions are over the variable `value` and are embedded verbatim by
/// the type emitter; they are never evaluated at runtime.
#[derive(Clone, Debug, PartialEq)]
pub struct OverloadConversion {
    /// Sibling overload name.
    pub target: String,
    /// Expression mapping `value` of this overload to the target.
    pub to_expr: String,
    /// Expression mapping `value` of the target back to this overload.
    pub from_expr: String,
}

/// A semantic overload: a named, validated wrapper around an existing
/// (dimension, form) pair, e.g. `Radius` over Length's magnitude form.
#[derive(Clone, Debug, PartialEq)]
pub struct OverloadDecl {
    /// Emitted type name.
    pub name: String,
    /// Doc text carried into the emitted type.
    pub description: String,
    /// Conversions to sibling overloads.
    pub conversions: Vec<OverloadConversion>,
}

/// One declared vector form of a dimension.
#[derive(Clone, Debug, PartialEq)]
pub struct FormDecl {
    /// The form this declaration covers.
    pub form: VectorForm,
    /// Base type name emitted for this (dimension, form) pair.
    pub type_name: String,
    /// Named semantic overloads wrapping this pair.
    pub overloads: Vec<OverloadDecl>,
}

/// A physical dimension: integer exponents over the seven base
/// quantities plus its declared quantity forms and available units.
///
/// Dimensions are constructed only by the bootstrap sequencer and are
/// immutable once the registry is sealed.
#[derive(Clone, Debug)]
pub struct Dimension {
    pub(crate) id: DimId,
    pub(crate) name: String,
    pub(crate) symbol: String,
    pub(crate) exponents: Exponents,
    pub(crate) forms: Vec<FormDecl>,
    pub(crate) units: Vec<UnitId>,
}

impl Dimension {
    /// Registry id.
    pub fn id(&self) -> DimId {
        self.id
    }

    /// Dimension name, unique within a registry.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Short display symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Exponent map over the base quantities.
    pub fn exponents(&self) -> Exponents {
        self.exponents
    }

    /// Declared forms, in declaration order.
    pub fn forms(&self) -> &[FormDecl] {
        &self.forms
    }

    /// Declaration for one form, if present.
    pub fn form(&self, form: VectorForm) -> Option<&FormDecl> {
        self.forms.iter().find(|decl| decl.form == form)
    }

    /// True iff this dimension declares the given form.
    pub fn declares(&self, form: VectorForm) -> bool {
        self.form(form).is_some()
    }

    /// Unit ids in declaration order; the first entry is the base unit.
    pub fn units(&self) -> &[UnitId] {
        &self.units
    }

    /// The base (SI) unit: first declared unit.
    pub fn base_unit(&self) -> Option<UnitId> {
        self.units.first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_index_roundtrip() {
        for form in VectorForm::ALL {
            assert_eq!(VectorForm::from_index(form.index()), Some(form));
        }
        assert_eq!(VectorForm::from_index(5), None);
    }

    #[test]
    fn component_counts() {
        assert_eq!(VectorForm::Magnitude.components(), 1);
        assert_eq!(VectorForm::Scalar.components(), 1);
        assert_eq!(VectorForm::Vector2.components(), 2);
        assert_eq!(VectorForm::Vector3.components(), 3);
        assert_eq!(VectorForm::Vector4.components(), 4);
    }

    #[test]
    fn scalar_vector_split() {
        assert!(VectorForm::Magnitude.is_scalar());
        assert!(VectorForm::Scalar.is_scalar());
        assert!(VectorForm::Vector3.is_vector());
        assert!(!VectorForm::Vector3.is_scalar());
    }
}
