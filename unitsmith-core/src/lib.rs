//! Core engine for metadata-driven physical quantities.
//!
//! `unitsmith-core` turns a declarative metadata catalog into a sealed
//! registry of dimensions, units, and derived operators:
//!
//! - A *dimension* is a named exponent vector over the 7 SI base
//!   quantities, declaring which vector forms (magnitude, signed scalar,
//!   2/3/4-vector) exist for it.
//! - A *unit* converts to its dimension's base unit via `v * factor +
//!   offset`.
//! - Dimensions relate through integral, derivative, dot-product, and
//!   cross-product edges; the [`closure::ClosureEngine`] expands those
//!   edges into the complete derived operator set (commutative and
//!   inverse variants included).
//! - The [`bootstrap::Sequencer`] runs the whole pipeline in two phases
//!   and yields an immutable [`Registry`].
//!
//! Runtime values are [`Quantity`]: a type reference plus base-unit
//! components, with registry-checked arithmetic. The statically-typed
//! surface over the same registry is produced by the companion emitter
//! crate. Most users should depend on `unitsmith` (the facade crate)
//! unless they need direct access to these primitives.
//!
//! # Quick start
//!
//! ```rust
//! use unitsmith_core::si;
//!
//! let registry = si::install().unwrap();
//! let distance = registry.from_unit("Kilometer", 1.25).unwrap();
//! let duration = registry.from_unit("Second", 20.0).unwrap();
//! let speed = distance.try_div(&duration, registry).unwrap();
//! assert!((speed.value() - 62.5).abs() < 1e-9);
//! ```
//!
//! # Panics and errors
//!
//! Configuration problems (malformed catalogs, ambiguous operators,
//! non-canonical base units) surface as [`Error`] during load or
//! bootstrap; a partially-built registry is never observable. Checked
//! quantity arithmetic (`try_add`, `try_mul`, …) returns `Result`; the
//! `std::ops` operator sugar consults the installed global registry and
//! panics on a dimension violation.
//!
//! # SemVer and stability
//!
//! This crate is currently `0.x`. Expect breaking changes between minor
//! versions until `1.0`.

#![deny(missing_docs)]
#![forbid(unsafe_code)]

// ─────────────────────────────────────────────────────────────────────────────
// Core modules
// ─────────────────────────────────────────────────────────────────────────────

mod base;
mod quantity;
mod unit;

pub mod bootstrap;
pub mod catalog;
pub mod closure;
pub mod dimension;
pub mod error;
pub mod registry;
pub mod relationship;
pub mod si;

// ─────────────────────────────────────────────────────────────────────────────
// Public re-exports of core types
// ─────────────────────────────────────────────────────────────────────────────

pub use base::{BaseQuantity, Exponents};
pub use bootstrap::Sequencer;
pub use catalog::Catalog;
pub use closure::{ClosureEngine, DerivedOp, Op, OperatorSet, TypeRef};
pub use dimension::{DimId, Dimension, VectorForm};
pub use error::{Error, Result};
pub use quantity::Quantity;
pub use registry::{QuantityType, Registry};
pub use relationship::{Relationship, RelationshipKind};
pub use unit::{Unit, UnitId};
