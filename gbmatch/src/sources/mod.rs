//! Record sources
//!
//! Three fetchers feed the reconciliation engine:
//! - `TaxonSource` - consensus names for up to [`BATCH_SIZE`] observations per call
//! - `FieldSource` - accession number and provisional name for one observation
//! - `AccessionSource` - classification name for one GenBank accession
//!
//! Implementations call `RateLimiter::acquire` once per external request.

pub mod genbank;
pub mod inaturalist;

pub use genbank::GenBankClient;
pub use inaturalist::INaturalistClient;

use crate::error::FetchError;
use async_trait::async_trait;
use gbmatch_common::config::HttpConfig;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

/// Page-size ceiling of the batch observation endpoint
pub const BATCH_SIZE: usize = 200;

/// Observation field holding the GenBank accession
pub const ACCESSION_FIELD: &str = "Genbank Accession Number";

/// Observation field holding the provisional species name
pub const PROVISIONAL_FIELD: &str = "Provisional Species Name";

/// HTTP client shared settings: user agent and per-request timeout
pub(crate) fn build_http_client(http: &HttpConfig) -> Result<Client, FetchError> {
    Client::builder()
        .user_agent(http.user_agent.as_str())
        .timeout(Duration::from_secs(http.timeout_secs))
        .build()
        .map_err(|e| FetchError::InvalidRequest(format!("HTTP client setup failed: {}", e)))
}

/// Values read from an observation's fields; empty when absent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecimenFields {
    pub accession_id: String,
    pub provisional_name: String,
}

/// Taxonomic classification of a sequence record, most specific name first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub names: Vec<String>,
}

impl Classification {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Head of the chain; a blank head counts as absent
    pub fn most_specific(&self) -> Option<&str> {
        self.names
            .first()
            .map(String::as_str)
            .filter(|name| !name.trim().is_empty())
    }
}

/// Batch taxon fetcher
///
/// Ids the source does not know are simply absent from the returned map.
/// Any error is fatal for the run.
#[async_trait]
pub trait TaxonSource: Send + Sync {
    async fn fetch_taxa(&self, ids: &[u64]) -> Result<HashMap<u64, String>, FetchError>;
}

/// Per-observation field fetcher; errors skip one specimen
#[async_trait]
pub trait FieldSource: Send + Sync {
    async fn fetch_fields(&self, id: u64) -> Result<SpecimenFields, FetchError>;
}

/// Accession resolver; errors skip one specimen
#[async_trait]
pub trait AccessionSource: Send + Sync {
    async fn resolve(&self, accession: &str) -> Result<Classification, FetchError>;
}
