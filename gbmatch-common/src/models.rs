//! Specimen, mismatch and run statistics types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Consensus name used when the taxon source has no entry for an id
pub const UNKNOWN_TAXON: &str = "Unknown";

/// True when an accession string has the shape of a GenBank accession
///
/// Only ASCII letters, digits and underscores are accepted; anything else,
/// including the empty string, counts as a missing accession.
pub fn is_valid_accession(accession: &str) -> bool {
    !accession.is_empty()
        && accession
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Why an accession could not be turned into a classification name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// Source unreachable or timed out
    Connectivity,
    /// Accession unknown to the source
    NotFound,
    /// Record resolved but carries no classification
    MissingClassification,
    /// Response could not be decoded
    Malformed,
    /// Anything else (unexpected HTTP status, ...)
    Other,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::Connectivity => "connectivity",
            FailureKind::NotFound => "not found",
            FailureKind::MissingClassification => "missing classification",
            FailureKind::Malformed => "malformed response",
            FailureKind::Other => "other",
        };
        f.write_str(label)
    }
}

/// A failed accession resolution, as seen by the reconciliation engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl ResolutionFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// State of the accession -> classification lookup for one specimen
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AccessionLookup {
    /// No lookup was made (accession missing or malformed)
    #[default]
    NotAttempted,
    /// Most specific classification name reported for the accession
    Resolved(String),
    /// Lookup made and failed
    Failed(ResolutionFailure),
}

/// One specimen, assembled incrementally from the three sources
///
/// `consensus_name` comes from the batch taxon fetch, `provisional_name` and
/// `accession_id` from the field fetch, `accession` from the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecimenRecord {
    pub id: u64,
    pub consensus_name: String,
    pub provisional_name: Option<String>,
    pub accession_id: Option<String>,
    pub accession: AccessionLookup,
}

impl SpecimenRecord {
    /// New record carrying only the batch-fetched consensus name
    pub fn new(id: u64, consensus_name: impl Into<String>) -> Self {
        Self {
            id,
            consensus_name: consensus_name.into(),
            provisional_name: None,
            accession_id: None,
            accession: AccessionLookup::NotAttempted,
        }
    }

    /// Record the field-source values; blanks count as unset
    pub fn with_fields(mut self, accession_id: &str, provisional_name: &str) -> Self {
        let accession_id = accession_id.trim();
        let provisional_name = provisional_name.trim();
        self.accession_id = (!accession_id.is_empty()).then(|| accession_id.to_string());
        self.provisional_name = (!provisional_name.is_empty()).then(|| provisional_name.to_string());
        self
    }

    pub fn with_accession(mut self, accession: AccessionLookup) -> Self {
        self.accession = accession;
        self
    }

    /// Accession id, only if it passes the format check
    pub fn valid_accession(&self) -> Option<&str> {
        self.accession_id
            .as_deref()
            .filter(|accession| is_valid_accession(accession))
    }

    /// Provisional name, if set and non-blank
    pub fn provisional(&self) -> Option<&str> {
        self.provisional_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// One output row: a specimen whose names disagree
///
/// Both names are display forms, never the normalized comparison strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MismatchRecord {
    pub id: u64,
    pub accession_display: String,
    pub comparison_display: String,
}

/// Kind of per-specimen diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    /// Specimen has no usable accession number
    MissingAccession,
    /// Observation fields could not be fetched
    FieldFetchFailed,
    /// Accession could not be resolved to a classification name
    ResolutionFailed,
}

impl DiagnosticKind {
    /// Whether the diagnostic is still shown in quiet mode
    ///
    /// A missing accession means required input data is absent, not a
    /// transient failure, so it is always surfaced.
    pub fn shown_when_quiet(self) -> bool {
        matches!(self, DiagnosticKind::MissingAccession)
    }
}

/// A per-specimen message explaining why no comparison was made
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub id: u64,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(id: u64, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.message)
    }
}

/// Counters for one run; nothing is carried across runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStatistics {
    pub total_external_calls: u64,
    pub total_specimens_processed: u64,
    pub mismatches: u64,
    pub suppressed: u64,
    pub skipped: u64,
}
