//! Batch orchestrator
//!
//! Turns a list of observation ids into the minimal set of external calls:
//! one batch taxon call per chunk of up to 200 ids, then for each id in the
//! chunk a field fetch and, when an accession is present, one resolution.
//!
//! Only the batch taxon call can abort a run. Every per-specimen failure is
//! turned into a diagnostic and processing continues with the next id.

use crate::error::FetchError;
use crate::rate_limiter::RateLimiter;
use crate::sources::{AccessionSource, FieldSource, TaxonSource, BATCH_SIZE};
use gbmatch_common::models::UNKNOWN_TAXON;
use gbmatch_common::{
    AccessionLookup, Diagnostic, DiagnosticKind, FailureKind, MismatchRecord, Outcome,
    Reconciler, ResolutionFailure, RunStatistics, SpecimenRecord,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Everything a run produced, in input order
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub mismatches: Vec<MismatchRecord>,
    pub diagnostics: Vec<Diagnostic>,
    pub statistics: RunStatistics,
}

/// Drives the fetchers and the reconciliation engine for one run
pub struct Orchestrator {
    taxa: Arc<dyn TaxonSource>,
    fields: Arc<dyn FieldSource>,
    accessions: Arc<dyn AccessionSource>,
    reconciler: Reconciler,
    rate_limiter: Arc<RateLimiter>,
}

impl Orchestrator {
    /// `rate_limiter` must be the instance the sources acquire from; its
    /// counter supplies `total_external_calls`.
    pub fn new(
        taxa: Arc<dyn TaxonSource>,
        fields: Arc<dyn FieldSource>,
        accessions: Arc<dyn AccessionSource>,
        reconciler: Reconciler,
        rate_limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            taxa,
            fields,
            accessions,
            reconciler,
            rate_limiter,
        }
    }

    /// The gate every source call passes through
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Process all ids and collect the results
    pub async fn run(&self, ids: &[u64]) -> Result<RunReport, FetchError> {
        self.run_with(ids, |_, _| {}).await
    }

    /// Process all ids, calling `on_outcome` for each specimen as it completes
    pub async fn run_with<C>(&self, ids: &[u64], mut on_outcome: C) -> Result<RunReport, FetchError>
    where
        C: FnMut(u64, &Outcome),
    {
        self.rate_limiter.reset_calls();
        let mut report = RunReport::default();
        let chunk_count = ids.len().div_ceil(BATCH_SIZE);

        info!(specimens = ids.len(), chunks = chunk_count, "Starting reconciliation run");

        for (chunk_index, chunk) in ids.chunks(BATCH_SIZE).enumerate() {
            debug!(chunk = chunk_index + 1, size = chunk.len(), "Fetching consensus taxa");

            let taxa = self.taxa.fetch_taxa(chunk).await.map_err(|e| {
                warn!(chunk = chunk_index + 1, error = %e, "Batch taxon fetch failed, aborting run");
                e
            })?;

            for &id in chunk {
                let consensus = taxa
                    .get(&id)
                    .map(String::as_str)
                    .unwrap_or(UNKNOWN_TAXON);
                let outcome = self.process_specimen(id, consensus).await;

                report.statistics.total_specimens_processed += 1;
                match &outcome {
                    Outcome::Match => {
                        debug!(id = %id, "Names agree");
                    }
                    Outcome::Suppressed => {
                        debug!(id = %id, "Mismatch suppressed by exception");
                        report.statistics.suppressed += 1;
                    }
                    Outcome::Mismatch(mismatch) => {
                        info!(
                            id = %id,
                            genbank = %mismatch.accession_display,
                            inaturalist = %mismatch.comparison_display,
                            "Name mismatch"
                        );
                        report.statistics.mismatches += 1;
                        report.mismatches.push(mismatch.clone());
                    }
                    Outcome::Skipped(diagnostic) => {
                        debug!(id = %id, kind = ?diagnostic.kind, "Skipped: {}", diagnostic.message);
                        report.statistics.skipped += 1;
                        report.diagnostics.push(diagnostic.clone());
                    }
                }
                on_outcome(id, &outcome);
            }
        }

        report.statistics.total_external_calls = self.rate_limiter.calls();
        info!(
            specimens = report.statistics.total_specimens_processed,
            calls = report.statistics.total_external_calls,
            mismatches = report.statistics.mismatches,
            suppressed = report.statistics.suppressed,
            skipped = report.statistics.skipped,
            "Reconciliation run complete"
        );

        Ok(report)
    }

    /// Field fetch -> accession resolution -> reconciliation for one id
    async fn process_specimen(&self, id: u64, consensus: &str) -> Outcome {
        let fields = match self.fields.fetch_fields(id).await {
            Ok(fields) => fields,
            Err(e) => {
                return Outcome::Skipped(Diagnostic::new(
                    id,
                    DiagnosticKind::FieldFetchFailed,
                    format!("observation fields unavailable: {}", e),
                ));
            }
        };

        let record = SpecimenRecord::new(id, consensus)
            .with_fields(&fields.accession_id, &fields.provisional_name);

        let lookup = match record.valid_accession() {
            Some(accession) => Some(self.lookup_accession(accession).await),
            None => None,
        };
        let record = match lookup {
            Some(lookup) => record.with_accession(lookup),
            None => record,
        };

        self.reconciler.evaluate(&record)
    }

    async fn lookup_accession(&self, accession: &str) -> AccessionLookup {
        match self.accessions.resolve(accession).await {
            Ok(classification) => match classification.most_specific() {
                Some(name) => AccessionLookup::Resolved(name.to_string()),
                None => AccessionLookup::Failed(ResolutionFailure::new(
                    FailureKind::MissingClassification,
                    "sequence record has no classification",
                )),
            },
            Err(e) => AccessionLookup::Failed(e.into()),
        }
    }
}
