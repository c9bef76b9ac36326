//! Metadata-driven physical quantities and unit conversions.
//!
//! `unitsmith` is the user-facing crate in this workspace. It re-exports
//! the full API from `unitsmith-core` (catalog loading, the bootstrap
//! sequencer, the operator closure engine, the runtime `Quantity` value)
//! plus the type emitter from `unitsmith-emit`.
//!
//! The core idea: dimensions, units, and their physics relationships are
//! declared as metadata (JSON, TOML, or in code); a two-phase bootstrap
//! turns the metadata into a sealed registry whose derived operator set
//! governs all quantity arithmetic. The emitter can additionally render
//! the registry into strongly-typed Rust definitions.
//!
//! # What this crate solves
//!
//! - Prevents mixing incompatible dimensions (you can't add metres to
//!   seconds) with errors raised at the operation site.
//! - Derives the complete multiplication/division/dot/cross operator set
//!   from a handful of declared relationships.
//! - Makes unit conversion explicit (`from_unit` / `in_unit`), including
//!   offset scales such as Celsius and Fahrenheit.
//!
//! # What this crate does not try to solve
//!
//! - Arbitrary symbolic unit algebra or automatic simplification; only
//!   declared relationships produce operators.
//! - Exact arithmetic: quantities are backed by `f64`.
//! - User-defined base quantities; the seven SI base quantities are
//!   fixed.
//!
//! # Quick start
//!
//! ```rust
//! use unitsmith::si;
//!
//! let registry = si::install().unwrap();
//! let distance = registry.from_unit("Kilometer", 90.0).unwrap();
//! let duration = registry.from_unit("Hour", 2.0).unwrap();
//! let speed = distance.try_div(&duration, registry).unwrap();
//! let kmh = registry.in_unit(&speed, "KilometerPerHour").unwrap();
//! assert!((kmh[0] - 45.0).abs() < 1e-9);
//! ```
//!
//! # Panics and errors
//!
//! Configuration problems abort during load or bootstrap with a
//! descriptive [`Error`]. Checked arithmetic (`try_add`, `try_mul`, …)
//! returns `Result`; the `std::ops` operator sugar panics on a dimension
//! violation against the installed global registry.
//!
//! # SemVer and stability
//!
//! This workspace is currently `0.x`. Expect breaking changes between
//! minor versions until `1.0`.
#![forbid(unsafe_code)]

pub use unitsmith_core::*;

pub use unitsmith_core::bootstrap;
pub use unitsmith_core::si;

/// The type emitter: renders a sealed registry into strongly-typed Rust
/// quantity definitions. Most users only need it when generating code.
pub use unitsmith_emit::{EmitError, Emitter};
