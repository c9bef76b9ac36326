//! Operator closure engine.
//!
//! Consumes the resolved relationship list and the per-dimension form
//! declarations and derives the complete, non-redundant operator set:
//! forward, commutative, and inverse entries across all form
//! combinations. The engine is pure, idempotent, and order independent;
//! its output is computed once during bootstrap and cached in the
//! registry.

use std::collections::HashMap;

use log::{debug, trace};

use crate::dimension::{DimId, Dimension, VectorForm};
use crate::error::{Error, Result};
use crate::relationship::{Relationship, RelationshipKind};

/// Operator symbol of a derived entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Op {
    /// Multiplication.
    Mul,
    /// Division.
    Div,
    /// Dot product (forms 1-4).
    Dot,
    /// Cross product (form 3 only).
    Cross,
}

impl Op {
    /// Printable symbol.
    pub const fn symbol(self) -> &'static str {
        match self {
            Op::Mul => "*",
            Op::Div => "/",
            Op::Dot => "·",
            Op::Cross => "×",
        }
    }
}

/// Reference to one emitted quantity type: a (dimension, form) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeRef {
    /// Owning dimension.
    pub dim: DimId,
    /// Value shape.
    pub form: VectorForm,
}

impl TypeRef {
    /// Builds a reference.
    pub const fn new(dim: DimId, form: VectorForm) -> TypeRef {
        TypeRef { dim, form }
    }
}

/// One derived operator.
///
/// Uniqueness key is (op, left, right, result); `owner` always equals
/// `left` or `right` and decides which emitted type carries the impl.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DerivedOp {
    /// Operator symbol.
    pub op: Op,
    /// Left operand type.
    pub left: TypeRef,
    /// Right operand type.
    pub right: TypeRef,
    /// Result type.
    pub result: TypeRef,
    /// Owning operand type.
    pub owner: TypeRef,
}

/// The complete derived operator set, deduplicated and indexed by
/// (op, left, right).
#[derive(Clone, Debug, Default)]
pub struct OperatorSet {
    ops: Vec<DerivedOp>,
    index: HashMap<(Op, TypeRef, TypeRef), usize>,
}

impl OperatorSet {
    /// Number of derived operators.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// True if no operator was derived.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// All derived operators, in derivation order.
    pub fn iter(&self) -> impl Iterator<Item = &DerivedOp> {
        self.ops.iter()
    }

    /// Lookup by (op, left, right).
    pub fn lookup(&self, op: Op, left: TypeRef, right: TypeRef) -> Option<&DerivedOp> {
        self.index.get(&(op, left, right)).map(|&i| &self.ops[i])
    }

    /// Operators assigned to one owner type.
    pub fn owned_by<'a>(&'a self, owner: TypeRef) -> impl Iterator<Item = &'a DerivedOp> {
        self.ops.iter().filter(move |op| op.owner == owner)
    }

    /// Sorted copy, for order-independent comparison.
    pub fn to_sorted_vec(&self) -> Vec<DerivedOp> {
        let mut ops = self.ops.clone();
        ops.sort_unstable();
        ops
    }
}

impl PartialEq for OperatorSet {
    /// Compared as unordered collections.
    fn eq(&self, other: &Self) -> bool {
        self.to_sorted_vec() == other.to_sorted_vec()
    }
}

/// The closure engine. Borrows the dimension table (indexed by [`DimId`])
/// for the duration of one derivation.
pub struct ClosureEngine<'a> {
    dims: &'a [Dimension],
}

impl<'a> ClosureEngine<'a> {
    /// Creates an engine over a dimension table.
    pub fn new(dims: &'a [Dimension]) -> ClosureEngine<'a> {
        ClosureEngine { dims }
    }

    /// Derives the full operator set for a relationship list.
    ///
    /// Re-running on an unchanged graph yields a set-equal result; the
    /// relationship order never matters. Conflicting declarations (same
    /// (op, left, right) key, different results) abort with
    /// [`Error::AmbiguousOperator`].
    pub fn derive(&self, relationships: &[Relationship]) -> Result<OperatorSet> {
        let mut set = OperatorSet::default();
        for rel in relationships {
            match rel.kind {
                RelationshipKind::Integral => self.derive_integral(rel, &mut set)?,
                RelationshipKind::Derivative => self.derive_derivative(rel, &mut set)?,
                RelationshipKind::DotProduct => self.derive_dot(rel, &mut set)?,
                RelationshipKind::CrossProduct => self.derive_cross(rel, &mut set)?,
            }
        }
        debug!("closure derived {} operator(s)", set.len());
        Ok(set)
    }

    fn dim(&self, id: DimId) -> &Dimension {
        &self.dims[id.index()]
    }

    /// `Self * Other = Result`: forward, commutative, inverse, and (for
    /// magnitudes) the symmetric inverse.
    fn derive_integral(&self, rel: &Relationship, set: &mut OperatorSet) -> Result<()> {
        let (left, other, result) = (self.dim(rel.left), self.dim(rel.other), self.dim(rel.result));
        if !other.declares(VectorForm::Magnitude) {
            trace!(
                "skipping integral {} * {}: `{}` has no magnitude form",
                left.name(),
                other.name(),
                other.name()
            );
            return Ok(());
        }
        let other0 = TypeRef::new(rel.other, VectorForm::Magnitude);
        for decl in left.forms() {
            let vn = decl.form;
            if !result.declares(vn) {
                trace!(
                    "skipping integral {}({vn}) * {}: `{}` lacks form {vn}",
                    left.name(),
                    other.name(),
                    result.name()
                );
                continue;
            }
            let self_vn = TypeRef::new(rel.left, vn);
            let result_vn = TypeRef::new(rel.result, vn);
            self.insert(set, Op::Mul, self_vn, other0, result_vn)?;
            self.insert(set, Op::Mul, other0, self_vn, result_vn)?;
            self.insert(set, Op::Div, result_vn, other0, self_vn)?;
            if vn == VectorForm::Magnitude && left.declares(VectorForm::Magnitude) {
                let self0 = TypeRef::new(rel.left, VectorForm::Magnitude);
                self.insert(set, Op::Div, result_vn, self0, other0)?;
            }
        }
        Ok(())
    }

    /// `Self / Other = Result`: forward divide, inverse multiply, and the
    /// commutative inverse.
    fn derive_derivative(&self, rel: &Relationship, set: &mut OperatorSet) -> Result<()> {
        let (left, other, result) = (self.dim(rel.left), self.dim(rel.other), self.dim(rel.result));
        if !other.declares(VectorForm::Magnitude) {
            trace!(
                "skipping derivative {} / {}: `{}` has no magnitude form",
                left.name(),
                other.name(),
                other.name()
            );
            return Ok(());
        }
        let other0 = TypeRef::new(rel.other, VectorForm::Magnitude);
        for decl in left.forms() {
            let vn = decl.form;
            if !result.declares(vn) {
                trace!(
                    "skipping derivative {}({vn}) / {}: `{}` lacks form {vn}",
                    left.name(),
                    other.name(),
                    result.name()
                );
                continue;
            }
            let self_vn = TypeRef::new(rel.left, vn);
            let result_vn = TypeRef::new(rel.result, vn);
            self.insert(set, Op::Div, self_vn, other0, result_vn)?;
            self.insert(set, Op::Mul, result_vn, other0, self_vn)?;
            self.insert(set, Op::Mul, other0, result_vn, self_vn)?;
        }
        Ok(())
    }

    /// `Self(vn) · Other(vn) = Result(0)` for every shared form 1-4.
    fn derive_dot(&self, rel: &Relationship, set: &mut OperatorSet) -> Result<()> {
        let (left, other, result) = (self.dim(rel.left), self.dim(rel.other), self.dim(rel.result));
        if !result.declares(VectorForm::Magnitude) {
            trace!(
                "skipping dot-product {} · {}: `{}` has no magnitude form",
                left.name(),
                other.name(),
                result.name()
            );
            return Ok(());
        }
        let result0 = TypeRef::new(rel.result, VectorForm::Magnitude);
        for vn in [
            VectorForm::Scalar,
            VectorForm::Vector2,
            VectorForm::Vector3,
            VectorForm::Vector4,
        ] {
            if left.declares(vn) && other.declares(vn) {
                self.insert(
                    set,
                    Op::Dot,
                    TypeRef::new(rel.left, vn),
                    TypeRef::new(rel.other, vn),
                    result0,
                )?;
            }
        }
        Ok(())
    }

    /// `Self(3) × Other(3) = Result(3)`. Never generated for any other
    /// form: the component expansion only exists in three dimensions.
    fn derive_cross(&self, rel: &Relationship, set: &mut OperatorSet) -> Result<()> {
        let (left, other, result) = (self.dim(rel.left), self.dim(rel.other), self.dim(rel.result));
        let v3 = VectorForm::Vector3;
        if !(left.declares(v3) && other.declares(v3) && result.declares(v3)) {
            trace!(
                "skipping cross-product {} × {}: form 3 not declared everywhere",
                left.name(),
                other.name()
            );
            return Ok(());
        }
        self.insert(
            set,
            Op::Cross,
            TypeRef::new(rel.left, v3),
            TypeRef::new(rel.other, v3),
            TypeRef::new(rel.result, v3),
        )
    }

    /// Inserts one derived entry. Re-inserting an identical entry is a
    /// no-op; an entry whose key maps to a different result is a
    /// configuration error. Division of same-dimension operands is never
    /// inserted: the base value type handles it and yields a raw
    /// dimensionless number.
    fn insert(
        &self,
        set: &mut OperatorSet,
        op: Op,
        left: TypeRef,
        right: TypeRef,
        result: TypeRef,
    ) -> Result<()> {
        if op == Op::Div && left.dim == right.dim {
            trace!("skipping self-division on `{}`", self.dim(left.dim).name());
            return Ok(());
        }
        let owner = match op {
            // Component-wise expansion of dot/cross is dimensionality
            // specific, so the left (receiver) vector type inlines it.
            Op::Dot | Op::Cross => left,
            Op::Mul | Op::Div => {
                if right.form < left.form {
                    right
                } else {
                    left
                }
            }
        };
        let entry = DerivedOp {
            op,
            left,
            right,
            result,
            owner,
        };
        if let Some(&existing) = set.index.get(&(op, left, right)) {
            let existing = set.ops[existing];
            if existing.result == result {
                return Ok(());
            }
            return Err(Error::AmbiguousOperator {
                op: op.symbol().to_owned(),
                left: self.describe(left),
                right: self.describe(right),
                first: self.describe(existing.result),
                second: self.describe(result),
            });
        }
        debug!(
            "derived {} {} {} = {}",
            self.describe(left),
            op.symbol(),
            self.describe(right),
            self.describe(result)
        );
        set.index.insert((op, left, right), set.ops.len());
        set.ops.push(entry);
        Ok(())
    }

    fn describe(&self, type_ref: TypeRef) -> String {
        format!("{}({})", self.dim(type_ref.dim).name(), type_ref.form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{BaseQuantity, Exponents};
    use crate::dimension::FormDecl;

    fn dim(id: u32, name: &str, exponents: Exponents, forms: &[VectorForm]) -> Dimension {
        Dimension {
            id: DimId(id),
            name: name.to_owned(),
            symbol: name[..1].to_owned(),
            exponents,
            forms: forms
                .iter()
                .map(|&form| FormDecl {
                    form,
                    type_name: format!("{name}{}", form.index()),
                    overloads: Vec::new(),
                })
                .collect(),
            units: Vec::new(),
        }
    }

    /// Length (forms 0-3), Time (form 0), Velocity (forms 0-3),
    /// Area (forms 0 and 3).
    fn kinematics() -> Vec<Dimension> {
        use VectorForm::*;
        let l = Exponents::DIMENSIONLESS.with(BaseQuantity::Length, 1);
        let t = Exponents::DIMENSIONLESS.with(BaseQuantity::Time, 1);
        vec![
            dim(0, "Length", l, &[Magnitude, Scalar, Vector2, Vector3]),
            dim(1, "Time", t, &[Magnitude]),
            dim(2, "Velocity", l.div(t), &[Magnitude, Scalar, Vector2, Vector3]),
            dim(3, "Area", l.mul(l), &[Magnitude, Vector3]),
        ]
    }

    const LENGTH: DimId = DimId(0);
    const TIME: DimId = DimId(1);
    const VELOCITY: DimId = DimId(2);
    const AREA: DimId = DimId(3);

    fn rel(kind: RelationshipKind, left: DimId, other: DimId, result: DimId) -> Relationship {
        Relationship {
            kind,
            left,
            other,
            result,
        }
    }

    #[test]
    fn integral_derives_forward_commutative_inverse() {
        let dims = kinematics();
        let engine = ClosureEngine::new(&dims);
        let set = engine
            .derive(&[rel(RelationshipKind::Integral, VELOCITY, TIME, LENGTH)])
            .unwrap();

        use VectorForm::*;
        for vn in [Magnitude, Scalar, Vector2, Vector3] {
            let v = TypeRef::new(VELOCITY, vn);
            let t0 = TypeRef::new(TIME, Magnitude);
            let l = TypeRef::new(LENGTH, vn);
            assert_eq!(set.lookup(Op::Mul, v, t0).unwrap().result, l);
            assert_eq!(set.lookup(Op::Mul, t0, v).unwrap().result, l);
            assert_eq!(set.lookup(Op::Div, l, t0).unwrap().result, v);
        }
        // Symmetric inverse only for the magnitude form.
        let l0 = TypeRef::new(LENGTH, Magnitude);
        let v0 = TypeRef::new(VELOCITY, Magnitude);
        let t0 = TypeRef::new(TIME, Magnitude);
        assert_eq!(set.lookup(Op::Div, l0, v0).unwrap().result, t0);
        assert!(set
            .lookup(
                Op::Div,
                TypeRef::new(LENGTH, Vector3),
                TypeRef::new(VELOCITY, Vector3)
            )
            .is_none());
    }

    #[test]
    fn derivative_mirrors_integral() {
        let dims = kinematics();
        let engine = ClosureEngine::new(&dims);
        let set = engine
            .derive(&[rel(RelationshipKind::Derivative, LENGTH, TIME, VELOCITY)])
            .unwrap();

        use VectorForm::*;
        for vn in [Magnitude, Scalar, Vector2, Vector3] {
            let l = TypeRef::new(LENGTH, vn);
            let t0 = TypeRef::new(TIME, Magnitude);
            let v = TypeRef::new(VELOCITY, vn);
            assert_eq!(set.lookup(Op::Div, l, t0).unwrap().result, v);
            assert_eq!(set.lookup(Op::Mul, v, t0).unwrap().result, l);
            assert_eq!(set.lookup(Op::Mul, t0, v).unwrap().result, l);
        }
    }

    #[test]
    fn consistent_redeclaration_is_a_noop() {
        let dims = kinematics();
        let engine = ClosureEngine::new(&dims);
        // Velocity * Time = Length declared from both ends; every derived
        // entry coincides, so the set is the same as either alone.
        let both = engine
            .derive(&[
                rel(RelationshipKind::Integral, VELOCITY, TIME, LENGTH),
                rel(RelationshipKind::Derivative, LENGTH, TIME, VELOCITY),
            ])
            .unwrap();
        let integral_only = engine
            .derive(&[rel(RelationshipKind::Integral, VELOCITY, TIME, LENGTH)])
            .unwrap();
        assert_eq!(both, integral_only);
    }

    #[test]
    fn closure_is_idempotent_and_order_independent() {
        let dims = kinematics();
        let engine = ClosureEngine::new(&dims);
        let rels = [
            rel(RelationshipKind::Integral, VELOCITY, TIME, LENGTH),
            rel(RelationshipKind::DotProduct, LENGTH, LENGTH, AREA),
            rel(RelationshipKind::CrossProduct, LENGTH, LENGTH, AREA),
        ];
        let mut reversed = rels;
        reversed.reverse();
        let a = engine.derive(&rels).unwrap();
        let b = engine.derive(&reversed).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_sorted_vec(), engine.derive(&rels).unwrap().to_sorted_vec());
    }

    #[test]
    fn ambiguous_result_is_flagged() {
        let dims = kinematics();
        let engine = ClosureEngine::new(&dims);
        // Velocity * Time mapped to both Length and Area.
        let err = engine
            .derive(&[
                rel(RelationshipKind::Integral, VELOCITY, TIME, LENGTH),
                rel(RelationshipKind::Integral, VELOCITY, TIME, AREA),
            ])
            .unwrap_err();
        match err {
            Error::AmbiguousOperator { first, second, .. } => {
                assert!(first.contains("Length"), "first = {first}");
                assert!(second.contains("Area"), "second = {second}");
            }
            other => panic!("expected AmbiguousOperator, got {other}"),
        }
    }

    #[test]
    fn vector_other_operand_is_skipped() {
        use VectorForm::*;
        let l = Exponents::DIMENSIONLESS.with(BaseQuantity::Length, 1);
        // "Other" without a magnitude form: the whole edge is skipped.
        let dims = vec![
            dim(0, "A", l, &[Magnitude, Vector3]),
            dim(1, "B", l, &[Vector3]),
            dim(2, "C", l.mul(l), &[Magnitude, Vector3]),
        ];
        let engine = ClosureEngine::new(&dims);
        let set = engine
            .derive(&[rel(RelationshipKind::Integral, DimId(0), DimId(1), DimId(2))])
            .unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn dot_requires_form_on_both_operands() {
        use VectorForm::*;
        let l = Exponents::DIMENSIONLESS.with(BaseQuantity::Length, 1);
        let dims = vec![
            dim(0, "A", l, &[Magnitude, Vector2, Vector3]),
            dim(1, "B", l, &[Magnitude, Vector3, Vector4]),
            dim(2, "C", l.mul(l), &[Magnitude]),
        ];
        let engine = ClosureEngine::new(&dims);
        let set = engine
            .derive(&[rel(RelationshipKind::DotProduct, DimId(0), DimId(1), DimId(2))])
            .unwrap();
        // Only form 3 is shared.
        assert_eq!(set.len(), 1);
        assert!(set
            .lookup(
                Op::Dot,
                TypeRef::new(DimId(0), Vector3),
                TypeRef::new(DimId(1), Vector3)
            )
            .is_some());
    }

    #[test]
    fn cross_exists_only_for_form_three() {
        use VectorForm::*;
        let l = Exponents::DIMENSIONLESS.with(BaseQuantity::Length, 1);
        let dims = vec![
            dim(0, "A", l, &[Magnitude, Vector2, Vector3, Vector4]),
            dim(1, "B", l, &[Magnitude, Vector2, Vector3, Vector4]),
            dim(2, "C", l.mul(l), &[Magnitude, Vector2, Vector3, Vector4]),
        ];
        let engine = ClosureEngine::new(&dims);
        let set = engine
            .derive(&[rel(RelationshipKind::CrossProduct, DimId(0), DimId(1), DimId(2))])
            .unwrap();
        for op in set.iter() {
            assert_eq!(op.op, Op::Cross);
            assert_eq!(op.left.form, Vector3);
            assert_eq!(op.right.form, Vector3);
            assert_eq!(op.result.form, Vector3);
        }
        for vn in [Vector2, Vector4] {
            assert!(set
                .lookup(Op::Cross, TypeRef::new(DimId(0), vn), TypeRef::new(DimId(1), vn))
                .is_none());
        }
    }

    #[test]
    fn ownership_goes_to_the_lower_form() {
        let dims = kinematics();
        let engine = ClosureEngine::new(&dims);
        let set = engine
            .derive(&[rel(RelationshipKind::Integral, VELOCITY, TIME, LENGTH)])
            .unwrap();
        use VectorForm::*;
        let v3 = TypeRef::new(VELOCITY, Vector3);
        let t0 = TypeRef::new(TIME, Magnitude);
        // Vector * scalar: the scalar (lower form) owns.
        assert_eq!(set.lookup(Op::Mul, v3, t0).unwrap().owner, t0);
        // Equal forms: ties go to the left operand.
        let v0 = TypeRef::new(VELOCITY, Magnitude);
        assert_eq!(set.lookup(Op::Mul, v0, t0).unwrap().owner, v0);
    }
}
