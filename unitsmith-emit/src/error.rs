//! Emitter error type.

/// Result type used throughout `unitsmith-emit`.
pub type Result<T> = core::result::Result<T, EmitError>;

/// Errors raised while rendering a registry into Rust source.
///
/// The registry itself is already validated; the only failures left are
/// in catalog-supplied conversion expressions, which are parsed here
/// because only the emitter embeds them in code.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    /// An overload conversion expression is not a valid Rust expression.
    #[error(
        "overload `{type_name}` declares an invalid conversion expression \
         to `{target}`: `{expr}` ({message})"
    )]
    BadConversionExpr {
        /// Overload type declaring the conversion.
        type_name: String,
        /// Sibling overload targeted by the conversion.
        target: String,
        /// The rejected expression text.
        expr: String,
        /// Parser message.
        message: String,
    },
}
