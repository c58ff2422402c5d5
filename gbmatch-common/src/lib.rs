//! # gbmatch Common Library
//!
//! Network-free core of the specimen name reconciler:
//! - Taxonomic name normalization
//! - Curated exception registry
//! - Specimen, mismatch and statistics types
//! - Reconciliation decision procedure
//! - Configuration loading

pub mod config;
pub mod error;
pub mod exceptions;
pub mod models;
pub mod normalize;
pub mod reconcile;

pub use error::{Error, Result};
pub use exceptions::ExceptionRegistry;
pub use models::{
    AccessionLookup, Diagnostic, DiagnosticKind, FailureKind, MismatchRecord, ResolutionFailure,
    RunStatistics, SpecimenRecord,
};
pub use reconcile::{Outcome, Reconciler};
