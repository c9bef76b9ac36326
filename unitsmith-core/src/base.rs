//! The seven SI base quantities and integer exponent maps over them.

use core::fmt;

use serde::{Deserialize, Serialize};

/// One of the seven SI base quantities.
///
/// Every [`Exponents`] value is an integer exponent per base quantity;
/// every dimension is identified by such a map. The set is fixed: this
/// crate performs no unit inference and supports no user-defined base
/// quantities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BaseQuantity {
    /// Length (metre), symbol `L`.
    Length,
    /// Mass (kilogram), symbol `M`.
    Mass,
    /// Time (second), symbol `T`.
    Time,
    /// Electric current (ampere), symbol `I`.
    Current,
    /// Thermodynamic temperature (kelvin), symbol `Θ`.
    Temperature,
    /// Amount of substance (mole), symbol `N`.
    AmountOfSubstance,
    /// Luminous intensity (candela), symbol `J`.
    LuminousIntensity,
}

impl BaseQuantity {
    /// All seven base quantities, in canonical order.
    pub const ALL: [BaseQuantity; 7] = [
        BaseQuantity::Length,
        BaseQuantity::Mass,
        BaseQuantity::Time,
        BaseQuantity::Current,
        BaseQuantity::Temperature,
        BaseQuantity::AmountOfSubstance,
        BaseQuantity::LuminousIntensity,
    ];

    /// Conventional dimension symbol.
    pub const fn symbol(self) -> &'static str {
        match self {
            BaseQuantity::Length => "L",
            BaseQuantity::Mass => "M",
            BaseQuantity::Time => "T",
            BaseQuantity::Current => "I",
            BaseQuantity::Temperature => "Θ",
            BaseQuantity::AmountOfSubstance => "N",
            BaseQuantity::LuminousIntensity => "J",
        }
    }

    const fn index(self) -> usize {
        match self {
            BaseQuantity::Length => 0,
            BaseQuantity::Mass => 1,
            BaseQuantity::Time => 2,
            BaseQuantity::Current => 3,
            BaseQuantity::Temperature => 4,
            BaseQuantity::AmountOfSubstance => 5,
            BaseQuantity::LuminousIntensity => 6,
        }
    }
}

impl fmt::Display for BaseQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Integer exponents over the seven base quantities.
///
/// Stored as a compact `[i8; 7]` behind a map-like API. Two dimensions
/// are compatible (their quantities may be added) iff their exponent maps
/// are equal.
///
/// ```rust
/// use unitsmith_core::{BaseQuantity, Exponents};
///
/// let velocity = Exponents::DIMENSIONLESS
///     .with(BaseQuantity::Length, 1)
///     .with(BaseQuantity::Time, -1);
/// assert_eq!(velocity.get(BaseQuantity::Length), 1);
/// assert_eq!(velocity.to_string(), "L·T⁻¹");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Exponents([i8; 7]);

impl Exponents {
    /// The all-zero exponent map.
    pub const DIMENSIONLESS: Exponents = Exponents([0; 7]);

    /// Exponent for one base quantity.
    pub const fn get(self, quantity: BaseQuantity) -> i8 {
        self.0[quantity.index()]
    }

    /// Copy of `self` with one exponent replaced.
    pub const fn with(mut self, quantity: BaseQuantity, exponent: i8) -> Self {
        self.0[quantity.index()] = exponent;
        self
    }

    /// Multiplication of dimensions adds exponents.
    pub fn mul(self, rhs: Exponents) -> Exponents {
        let mut out = [0i8; 7];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.0[i] + rhs.0[i];
        }
        Exponents(out)
    }

    /// Division of dimensions subtracts exponents.
    pub fn div(self, rhs: Exponents) -> Exponents {
        let mut out = [0i8; 7];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.0[i] - rhs.0[i];
        }
        Exponents(out)
    }

    /// True iff every exponent is zero.
    pub fn is_dimensionless(self) -> bool {
        self.0 == [0; 7]
    }
}

fn superscript(exponent: i8, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if exponent < 0 {
        f.write_str("⁻")?;
    }
    for digit in exponent.unsigned_abs().to_string().bytes() {
        const DIGITS: [&str; 10] = ["⁰", "¹", "²", "³", "⁴", "⁵", "⁶", "⁷", "⁸", "⁹"];
        f.write_str(DIGITS[(digit - b'0') as usize])?;
    }
    Ok(())
}

impl fmt::Display for Exponents {
    /// Formats as `L·T⁻²` style; the all-zero map formats as `1`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return f.write_str("1");
        }
        let mut first = true;
        for quantity in BaseQuantity::ALL {
            let exponent = self.get(quantity);
            if exponent == 0 {
                continue;
            }
            if !first {
                f.write_str("·")?;
            }
            first = false;
            f.write_str(quantity.symbol())?;
            if exponent != 1 {
                superscript(exponent, f)?;
            }
        }
        Ok(())
    }
}
