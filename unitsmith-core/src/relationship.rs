//! Declarative physics relationships between dimensions.

use core::fmt;

use crate::dimension::DimId;

/// Kind of a declared relationship edge.
///
/// Each edge is declared once on its left dimension; the closure engine
/// derives the commutative and inverse operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RelationshipKind {
    /// `Self * Other = Result` (e.g. Velocity × Time = Length).
    Integral,
    /// `Self / Other = Result` (e.g. Length ÷ Time = Velocity).
    Derivative,
    /// `Self(vn) · Other(vn) = Result(0)` for forms 1-4.
    DotProduct,
    /// `Self(3) × Other(3) = Result(3)`, form 3 only.
    CrossProduct,
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RelationshipKind::Integral => "integral",
            RelationshipKind::Derivative => "derivative",
            RelationshipKind::DotProduct => "dot-product",
            RelationshipKind::CrossProduct => "cross-product",
        };
        f.write_str(name)
    }
}

/// A resolved relationship edge: `left <kind> other = result`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Relationship {
    /// Edge kind.
    pub kind: RelationshipKind,
    /// Declaring dimension ("Self").
    pub left: DimId,
    /// The non-vector multiplicand/divisor ("Other").
    pub other: DimId,
    /// Result dimension.
    pub result: DimId,
}
