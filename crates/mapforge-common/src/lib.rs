//! Common types and utilities for the mapforge mapping engine.
//!
//! This crate provides foundational types used across all mapforge crates:
//! - String interning (`Atom`, `Interner`)
//! - Diagnostic message table and `Diagnostic` records
//! - Symbol locations that diagnostics are attached to
//! - Engine limits and thresholds

// String interning for member, type and method names
pub mod interner;
pub use interner::{Atom, Interner};

// Locations of user declarations (methods, members, parameters)
pub mod location;
pub use location::{SourceSpan, SymbolLocation};

// Centralized limits and thresholds
pub mod limits;

pub mod diagnostics;
pub use diagnostics::{
    Diagnostic, DiagnosticCategory, DiagnosticCollector, DiagnosticMessage, DiagnosticSink,
    diagnostic_codes, format_message,
};

#[cfg(test)]
#[path = "../tests/interner_tests.rs"]
mod interner_tests;
#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod diagnostics_tests;
