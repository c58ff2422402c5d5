//! Reconciliation engine
//!
//! Decides, for one fully fetched specimen, whether the observation name and
//! the GenBank name disagree. Decision order:
//! 1. No usable accession id -> skipped with a diagnostic
//! 2. Accession lookup failed -> skipped with a diagnostic
//! 3. Comparison target is the provisional name if set, else the consensus name
//! 4. Exception registered under the current consensus name -> suppressed
//! 5. Genus-only consensus name -> `cf` tail dropped from the GenBank name
//! 6. Both names normalized and compared

use crate::exceptions::ExceptionRegistry;
use crate::models::{AccessionLookup, Diagnostic, DiagnosticKind, MismatchRecord, SpecimenRecord};
use crate::normalize::{is_genus_only, normalize, strip_genus_level_cf, tidy};

/// Result of evaluating one specimen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Names agree after normalization
    Match,
    /// Names disagree; report this row
    Mismatch(MismatchRecord),
    /// Disagreement (if any) covered by the exception registry
    Suppressed,
    /// No comparison possible
    Skipped(Diagnostic),
}

impl Outcome {
    pub fn mismatch(&self) -> Option<&MismatchRecord> {
        match self {
            Outcome::Mismatch(record) => Some(record),
            _ => None,
        }
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Outcome::Skipped(diagnostic) => Some(diagnostic),
            _ => None,
        }
    }
}

/// Name comparison with an injected exception registry
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    exceptions: ExceptionRegistry,
}

impl Reconciler {
    pub fn new(exceptions: ExceptionRegistry) -> Self {
        Self { exceptions }
    }

    /// Mismatch row for this specimen, if any
    pub fn reconcile(&self, record: &SpecimenRecord) -> Option<MismatchRecord> {
        match self.evaluate(record) {
            Outcome::Mismatch(mismatch) => Some(mismatch),
            _ => None,
        }
    }

    /// Full decision for this specimen
    pub fn evaluate(&self, record: &SpecimenRecord) -> Outcome {
        let Some(accession_id) = record.valid_accession() else {
            let message = match record.accession_id.as_deref() {
                None => "no GenBank accession number recorded".to_string(),
                Some(raw) => format!("malformed GenBank accession number {:?}", raw),
            };
            return Outcome::Skipped(Diagnostic::new(
                record.id,
                DiagnosticKind::MissingAccession,
                message,
            ));
        };

        let accession_name = match &record.accession {
            AccessionLookup::Resolved(name) if !name.trim().is_empty() => name.as_str(),
            AccessionLookup::Resolved(_) => {
                return Outcome::Skipped(Diagnostic::new(
                    record.id,
                    DiagnosticKind::ResolutionFailed,
                    format!("{}: empty classification name", accession_id),
                ));
            }
            AccessionLookup::Failed(failure) => {
                return Outcome::Skipped(Diagnostic::new(
                    record.id,
                    DiagnosticKind::ResolutionFailed,
                    format!("{}: {} ({})", accession_id, failure.message, failure.kind),
                ));
            }
            AccessionLookup::NotAttempted => {
                return Outcome::Skipped(Diagnostic::new(
                    record.id,
                    DiagnosticKind::ResolutionFailed,
                    format!("{}: accession was not resolved", accession_id),
                ));
            }
        };

        let provisional = record.provisional();
        let target = provisional.unwrap_or(&record.consensus_name);

        // Exceptions are keyed on the consensus name even when the
        // provisional name is the comparison target.
        if self.exceptions.is_excepted(record.id, &record.consensus_name) {
            return Outcome::Suppressed;
        }

        // Triggered by the consensus name, not the comparison target.
        let accession_display = if is_genus_only(&record.consensus_name) {
            strip_genus_level_cf(accession_name)
        } else {
            tidy(accession_name)
        };

        if normalize(&accession_display) == normalize(target) {
            return Outcome::Match;
        }

        Outcome::Mismatch(MismatchRecord {
            id: record.id,
            accession_display,
            comparison_display: comparison_display(target, provisional.is_some()),
        })
    }
}

/// Display form of the comparison target
///
/// A provisional name carrying a voucher code (any digit) is shown the way
/// GenBank writes undetermined species: `Amanita sp. 'sp S19'`.
fn comparison_display(target: &str, is_provisional: bool) -> String {
    let target = tidy(target);
    if !is_provisional || !target.chars().any(|c| c.is_ascii_digit()) {
        return target;
    }
    match target.split_once(' ') {
        Some((genus, remainder)) => format!("{} sp. '{}'", genus, remainder),
        None => target,
    }
}
