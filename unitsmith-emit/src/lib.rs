//! Type emitter for `unitsmith`.
//!
//! Renders a sealed `unitsmith-core` registry into Rust source: one
//! strongly-typed struct per declared (dimension, form) pair and per
//! semantic overload, carrying unit factories with inlined conversion
//! factors, a `ZERO` const, and exactly the operator impls the closure
//! engine derived. The output is a [`proc_macro2::TokenStream`] (or a
//! string via [`Emitter::render`]) intended to be written into a build
//! script output or a checked-in module.
//!
//! Most users should depend on `unitsmith` (the facade crate).
//!
//! # Quick start
//!
//! ```rust
//! use unitsmith_core::si;
//! use unitsmith_emit::Emitter;
//!
//! let registry = si::install().unwrap();
//! let code = Emitter::new(registry).render().unwrap();
//! assert!(code.contains("pub struct Distance"));
//! ```

#![deny(missing_docs)]
#![forbid(unsafe_code)]

mod emitter;
mod error;

pub use emitter::Emitter;
pub use error::{EmitError, Result};
