//! # tg-core
//!
//! Core types and error definitions for tensorgrid.
//!
//! This crate provides the building blocks shared across the workspace:
//! the floating-point alias, the error enum and the check macros.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Error types and the `ensure!` / `ensure_arg!` / `fail!` macros.
pub mod errors;

// ── Primitive type aliases ────────────────────────────────────────────────────

/// Floating-point type used throughout the library.
pub type Real = f64;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use errors::{Error, Result};
