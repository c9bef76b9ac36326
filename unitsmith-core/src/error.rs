//! Error types for catalog loading, bootstrap, and runtime arithmetic.

/// Result type used throughout `unitsmith-core`.
pub type Result<T> = core::result::Result<T, Error>;

/// Error type covering configuration failures (detected once at load or
/// bootstrap time) and runtime dimension violations.
///
/// Configuration errors always name the offending dimension, unit, or
/// relationship; a partially-built registry is never observable.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Two dimensions share a name.
    #[error("duplicate dimension `{0}`")]
    DuplicateDimension(String),

    /// Two units share a name.
    #[error("duplicate unit `{0}`")]
    DuplicateUnit(String),

    /// Two quantity types (forms or overloads) share a name.
    #[error("duplicate quantity type name `{name}` (declared by dimension `{dimension}`)")]
    DuplicateTypeName {
        /// Colliding type name.
        name: String,
        /// Dimension declaring the second occurrence.
        dimension: String,
    },

    /// A relationship references a dimension that does not exist.
    #[error("dimension `{dimension}` references unknown dimension `{name}` in a {kind} relationship")]
    UnknownDimension {
        /// Dimension declaring the relationship.
        dimension: String,
        /// The missing reference.
        name: String,
        /// Relationship kind, for the error message.
        kind: String,
    },

    /// A dimension lists a unit for which no unit metadata exists.
    #[error("dimension `{dimension}` references unit `{name}` but no unit metadata defines it")]
    UnknownUnit {
        /// Dimension listing the unit.
        dimension: String,
        /// The missing unit name.
        name: String,
    },

    /// A unit declares a conversion factor of zero.
    #[error("unit `{0}` declares a zero conversion factor")]
    ZeroConversionFactor(String),

    /// The first declared unit of a dimension must be its base unit.
    #[error(
        "unit `{unit}` is the base unit of `{dimension}` but converts with factor {factor} \
         and offset {offset}; base units must have factor 1 and offset 0"
    )]
    NonCanonicalBaseUnit {
        /// Owning dimension.
        dimension: String,
        /// Offending unit.
        unit: String,
        /// Declared factor.
        factor: f64,
        /// Declared offset.
        offset: f64,
    },

    /// A vector form outside 0..=4 was declared.
    #[error("dimension `{dimension}` declares invalid vector form {form}; valid forms are 0-4")]
    InvalidForm {
        /// Declaring dimension.
        dimension: String,
        /// Declared form index.
        form: u8,
    },

    /// The same vector form was declared twice on one dimension.
    #[error("dimension `{dimension}` declares vector form {form} more than once")]
    DuplicateForm {
        /// Declaring dimension.
        dimension: String,
        /// Duplicated form index.
        form: u8,
    },

    /// A dimension declares quantity forms but lists no units to build
    /// factories from.
    #[error("dimension `{dimension}` declares vector forms but no available units")]
    MissingUnits {
        /// Offending dimension.
        dimension: String,
    },

    /// An overload conversion targets a sibling that is not declared.
    #[error("overload `{overload}` on dimension `{dimension}` converts to unknown sibling `{target}`")]
    UnknownOverloadTarget {
        /// Owning dimension.
        dimension: String,
        /// Declaring overload.
        overload: String,
        /// Missing sibling overload.
        target: String,
    },

    /// Two declarations map the same (op, left, right) key to different
    /// results. Never resolved first-wins.
    #[error("ambiguous operator: {left} {op} {right} maps to both {first} and {second}")]
    AmbiguousOperator {
        /// Operator symbol.
        op: String,
        /// Left operand type.
        left: String,
        /// Right operand type.
        right: String,
        /// Result of the earlier declaration.
        first: String,
        /// Conflicting result of the later declaration.
        second: String,
    },

    /// An operation requires a vector form the dimension does not declare.
    #[error("dimension `{dimension}` does not declare vector form {form}")]
    MissingForm {
        /// Dimension missing the form.
        dimension: String,
        /// Required form index.
        form: u8,
    },

    /// Addition or subtraction of quantities with different exponent maps.
    #[error("incompatible dimensions: {left} vs {right}")]
    IncompatibleDimensions {
        /// Left operand description.
        left: String,
        /// Right operand description.
        right: String,
    },

    /// No derived operator exists for the requested operand pair.
    #[error("no derived operator `{op}` for {left} and {right}")]
    NoDerivedOperator {
        /// Operator symbol.
        op: String,
        /// Left operand description.
        left: String,
        /// Right operand description.
        right: String,
    },

    /// Magnitude (form 0) quantities are non-negative by definition.
    #[error("magnitude quantity `{type_name}` cannot hold negative value {value}")]
    NegativeMagnitude {
        /// Quantity type name.
        type_name: String,
        /// Rejected value.
        value: f64,
    },

    /// Wrong number of components for the requested form.
    #[error("`{type_name}` expects {expected} component(s), got {got}")]
    ComponentCount {
        /// Quantity type name.
        type_name: String,
        /// Expected component count.
        expected: usize,
        /// Supplied component count.
        got: usize,
    },

    /// The global registry was used before `bootstrap::install`.
    #[error("registry not initialized; call bootstrap::install (or si::install) first")]
    Uninitialized,

    /// Malformed JSON catalog input; `path` names the offending field.
    #[error("invalid catalog JSON at `{path}`: {message}")]
    Json {
        /// Path to the offending element.
        path: String,
        /// Underlying parser message.
        message: String,
    },

    /// Malformed TOML catalog input.
    #[error("invalid catalog TOML: {0}")]
    Toml(String),
}
