//! Runtime quantity values.
//!
//! A [`Quantity`] is a tagged value: a [`TypeRef`] plus up to four
//! components held in the dimension's base unit. Arithmetic validity is
//! decided against the registry's derived operator set at runtime; the
//! statically-typed surface over the same registry is produced by the
//! type emitter.
//!
//! Checked operations (`try_add`, `try_mul`, …) take the registry
//! explicitly and return `Result`. The `std::ops` operator impls consult
//! the installed global registry and panic with a descriptive message on
//! a dimension violation; that panic is the documented runtime
//! dimension-compatibility assertion.

use core::ops::{Add, Div, Mul, Neg, Sub};

use crate::bootstrap;
use crate::closure::{Op, TypeRef};
use crate::dimension::VectorForm;
use crate::error::{Error, Result};
use crate::registry::Registry;

/// A value tagged with its quantity type.
///
/// Components are stored in the base unit of the dimension; unused lanes
/// are zero. Scalar forms use lane 0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quantity {
    ty: TypeRef,
    comps: [f64; 4],
}

impl Quantity {
    pub(crate) fn from_parts(ty: TypeRef, components: &[f64]) -> Quantity {
        let mut comps = [0.0; 4];
        comps[..components.len()].copy_from_slice(components);
        Quantity { ty, comps }
    }

    /// The (dimension, form) pair of this value.
    pub fn type_ref(&self) -> TypeRef {
        self.ty
    }

    /// Value shape.
    pub fn form(&self) -> VectorForm {
        self.ty.form
    }

    /// Active components, in the base unit.
    pub fn components(&self) -> &[f64] {
        &self.comps[..self.ty.form.components()]
    }

    /// Scalar value in the base unit (lane 0).
    pub fn value(&self) -> f64 {
        self.comps[0]
    }

    /// Sum of squared components. Raw number: the squared dimension is
    /// not looked up.
    pub fn length_squared(&self) -> f64 {
        self.components().iter().map(|c| c * c).sum()
    }

    /// Component-wise scaling by a raw number.
    pub fn scaled(&self, factor: f64) -> Quantity {
        let mut comps = self.comps;
        for c in &mut comps {
            *c *= factor;
        }
        Quantity { ty: self.ty, comps }
    }

    /// Same direction, norm 1. The zero vector normalizes to itself.
    pub fn normalized(&self) -> Quantity {
        let norm = self.length_squared().sqrt();
        if norm == 0.0 {
            *self
        } else {
            self.scaled(1.0 / norm)
        }
    }

    /// Checked addition: both operands must share dimension and form.
    pub fn try_add(&self, rhs: &Quantity, registry: &Registry) -> Result<Quantity> {
        self.require_same_type(rhs, registry)?;
        let mut comps = self.comps;
        for (c, r) in comps.iter_mut().zip(rhs.comps) {
            *c += r;
        }
        Ok(Quantity { ty: self.ty, comps })
    }

    /// Checked subtraction.
    ///
    /// Subtracting two magnitudes yields the signed (form 1) sibling,
    /// never a magnitude: the difference of non-negative values can be
    /// negative. Every other form subtracts within its own type.
    pub fn try_sub(&self, rhs: &Quantity, registry: &Registry) -> Result<Quantity> {
        self.require_same_type(rhs, registry)?;
        let mut comps = self.comps;
        for (c, r) in comps.iter_mut().zip(rhs.comps) {
            *c -= r;
        }
        let ty = if self.ty.form == VectorForm::Magnitude {
            let dim = registry.dimension_by_id(self.ty.dim);
            if !dim.declares(VectorForm::Scalar) {
                return Err(Error::MissingForm {
                    dimension: dim.name().to_owned(),
                    form: VectorForm::Scalar.index(),
                });
            }
            TypeRef::new(self.ty.dim, VectorForm::Scalar)
        } else {
            self.ty
        };
        Ok(Quantity { ty, comps })
    }

    /// Checked negation. Magnitudes negate into their signed sibling.
    pub fn try_neg(&self, registry: &Registry) -> Result<Quantity> {
        let zero = registry.zero(self.ty)?;
        zero.try_sub(self, registry)
    }

    /// Checked multiplication against the derived operator set.
    pub fn try_mul(&self, rhs: &Quantity, registry: &Registry) -> Result<Quantity> {
        let op = registry
            .operators()
            .lookup(Op::Mul, self.ty, rhs.ty)
            .ok_or_else(|| no_operator(Op::Mul, self, rhs, registry))?;
        // Derived Mul entries always pair a scalar with the other
        // operand; scale the non-scalar side component-wise.
        let (scalar, carrier) = if self.ty.form.is_scalar() && !rhs.ty.form.is_scalar() {
            (self.value(), rhs)
        } else {
            (rhs.value(), self)
        };
        Ok(Quantity::from_parts(
            op.result,
            &carrier.scaled(scalar).comps[..op.result.form.components()],
        ))
    }

    /// Checked division.
    ///
    /// Dividing two same-dimension scalar quantities is handled by the
    /// value type itself and yields a dimensionless quantity; everything
    /// else consults the derived operator set.
    pub fn try_div(&self, rhs: &Quantity, registry: &Registry) -> Result<Quantity> {
        let same_dim = self.ty.dim == rhs.ty.dim;
        if same_dim && self.ty.form.is_scalar() && rhs.ty.form.is_scalar() {
            let form = if self.ty.form == VectorForm::Magnitude
                && rhs.ty.form == VectorForm::Magnitude
            {
                VectorForm::Magnitude
            } else {
                VectorForm::Scalar
            };
            let ty = registry.type_ref(crate::bootstrap::DIMENSIONLESS, form)?;
            return registry.quantity(ty, &[self.value() / rhs.value()]);
        }
        let op = registry
            .operators()
            .lookup(Op::Div, self.ty, rhs.ty)
            .ok_or_else(|| no_operator(Op::Div, self, rhs, registry))?;
        // Derived Div entries always divide by a magnitude.
        Ok(Quantity::from_parts(
            op.result,
            &self.scaled(1.0 / rhs.value()).comps[..op.result.form.components()],
        ))
    }

    /// Dot product against the derived operator set.
    ///
    /// A dot product can be negative, so the result lands on the signed
    /// (form 1) sibling of the result dimension when one is declared.
    /// A dimension declaring only the magnitude form keeps that form and
    /// rejects negative products.
    pub fn dot(&self, rhs: &Quantity, registry: &Registry) -> Result<Quantity> {
        let op = registry
            .operators()
            .lookup(Op::Dot, self.ty, rhs.ty)
            .ok_or_else(|| no_operator(Op::Dot, self, rhs, registry))?;
        let value: f64 = self
            .components()
            .iter()
            .zip(rhs.components())
            .map(|(a, b)| a * b)
            .sum();
        let ty = if registry.dimension_by_id(op.result.dim).declares(VectorForm::Scalar) {
            TypeRef::new(op.result.dim, VectorForm::Scalar)
        } else {
            op.result
        };
        registry.quantity(ty, &[value])
    }

    /// Cross product against the derived operator set; only ever
    /// derived for form 3.
    pub fn cross(&self, rhs: &Quantity, registry: &Registry) -> Result<Quantity> {
        let op = registry
            .operators()
            .lookup(Op::Cross, self.ty, rhs.ty)
            .ok_or_else(|| no_operator(Op::Cross, self, rhs, registry))?;
        let [a1, a2, a3, _] = self.comps;
        let [b1, b2, b3, _] = rhs.comps;
        Quantity::from_parts(
            op.result,
            &[a2 * b3 - a3 * b2, a3 * b1 - a1 * b3, a1 * b2 - a2 * b1],
        )
        .validated(registry)
    }

    /// The magnitude (form 0) sibling of this value: Euclidean norm for
    /// vectors, absolute value for signed scalars, identity for
    /// magnitudes.
    pub fn magnitude(&self, registry: &Registry) -> Result<Quantity> {
        if self.ty.form == VectorForm::Magnitude {
            return Ok(*self);
        }
        let dim = registry.dimension_by_id(self.ty.dim);
        if !dim.declares(VectorForm::Magnitude) {
            return Err(Error::MissingForm {
                dimension: dim.name().to_owned(),
                form: VectorForm::Magnitude.index(),
            });
        }
        let ty = TypeRef::new(self.ty.dim, VectorForm::Magnitude);
        registry.quantity(ty, &[self.length_squared().sqrt()])
    }

    /// Distance to another value of the same type: magnitude of the
    /// difference.
    pub fn distance(&self, rhs: &Quantity, registry: &Registry) -> Result<Quantity> {
        self.try_sub(rhs, registry)?.magnitude(registry)
    }

    /// Squared distance, as a raw number.
    pub fn distance_squared(&self, rhs: &Quantity, registry: &Registry) -> Result<f64> {
        Ok(self.try_sub(rhs, registry)?.length_squared())
    }

    fn require_same_type(&self, rhs: &Quantity, registry: &Registry) -> Result<()> {
        let left = registry.dimension_by_id(self.ty.dim);
        let right = registry.dimension_by_id(rhs.ty.dim);
        // Compatibility is equality of exponent maps; the form must
        // match as well for component-wise operations.
        if left.exponents() != right.exponents() || self.ty.form != rhs.ty.form {
            return Err(Error::IncompatibleDimensions {
                left: registry.describe(self.ty),
                right: registry.describe(rhs.ty),
            });
        }
        Ok(())
    }

    fn validated(self, registry: &Registry) -> Result<Quantity> {
        registry.quantity(self.ty, self.components())
    }
}

fn no_operator(op: Op, left: &Quantity, right: &Quantity, registry: &Registry) -> Error {
    Error::NoDerivedOperator {
        op: op.symbol().to_owned(),
        left: registry.describe(left.type_ref()),
        right: registry.describe(right.type_ref()),
    }
}

fn global() -> &'static Registry {
    match bootstrap::global() {
        Ok(registry) => registry,
        Err(err) => panic!("{err}"),
    }
}

fn assert_ok(result: Result<Quantity>) -> Quantity {
    match result {
        Ok(quantity) => quantity,
        Err(err) => panic!("quantity arithmetic: {err}"),
    }
}

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Quantity) -> Quantity {
        assert_ok(self.try_add(&rhs, global()))
    }
}

impl Sub for Quantity {
    type Output = Quantity;

    fn sub(self, rhs: Quantity) -> Quantity {
        assert_ok(self.try_sub(&rhs, global()))
    }
}

impl Mul for Quantity {
    type Output = Quantity;

    fn mul(self, rhs: Quantity) -> Quantity {
        assert_ok(self.try_mul(&rhs, global()))
    }
}

impl Div for Quantity {
    type Output = Quantity;

    fn div(self, rhs: Quantity) -> Quantity {
        assert_ok(self.try_div(&rhs, global()))
    }
}

impl Mul<f64> for Quantity {
    type Output = Quantity;

    fn mul(self, rhs: f64) -> Quantity {
        self.scaled(rhs)
    }
}

impl Mul<Quantity> for f64 {
    type Output = Quantity;

    fn mul(self, rhs: Quantity) -> Quantity {
        rhs.scaled(self)
    }
}

impl Div<f64> for Quantity {
    type Output = Quantity;

    fn div(self, rhs: f64) -> Quantity {
        self.scaled(1.0 / rhs)
    }
}

impl Neg for Quantity {
    type Output = Quantity;

    fn neg(self) -> Quantity {
        assert_ok(self.try_neg(global()))
    }
}
