//! GenBank accession resolver (NCBI E-utilities)
//!
//! Resolves a nucleotide accession to the organism name on its sequence
//! record using ESummary:
//! `GET /esummary.fcgi?db=nuccore&id={accession}&retmode=json`
//!
//! # API Reference
//! - Documentation: https://www.ncbi.nlm.nih.gov/books/NBK25499/
//! - NCBI asks for `tool` and `email` on every request; `api_key` is optional

use super::{build_http_client, AccessionSource, Classification};
use crate::error::FetchError;
use crate::rate_limiter::RateLimiter;
use async_trait::async_trait;
use gbmatch_common::config::{HttpConfig, NcbiConfig};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// NCBI ESummary client for nucleotide accessions
pub struct GenBankClient {
    http_client: Client,
    base_url: String,
    tool: String,
    email: Option<String>,
    api_key: Option<String>,
    rate_limiter: Arc<RateLimiter>,
}

impl GenBankClient {
    pub fn new(
        ncbi: &NcbiConfig,
        http: &HttpConfig,
        rate_limiter: Arc<RateLimiter>,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            http_client: build_http_client(http)?,
            base_url: ncbi.base_url.trim_end_matches('/').to_string(),
            tool: ncbi.tool.clone(),
            email: ncbi.email.clone(),
            api_key: ncbi.api_key.clone(),
            rate_limiter,
        })
    }

    fn query(&self, accession: &str) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("db", "nuccore".to_string()),
            ("id", accession.to_string()),
            ("retmode", "json".to_string()),
            ("tool", self.tool.clone()),
        ];
        if let Some(email) = &self.email {
            query.push(("email", email.clone()));
        }
        if let Some(api_key) = &self.api_key {
            query.push(("api_key", api_key.clone()));
        }
        query
    }
}

#[async_trait]
impl AccessionSource for GenBankClient {
    async fn resolve(&self, accession: &str) -> Result<Classification, FetchError> {
        self.rate_limiter.acquire().await;

        let url = format!("{}/esummary.fcgi", self.base_url);
        debug!(accession = %accession, "Querying NCBI ESummary");

        let response = self
            .http_client
            .get(&url)
            .query(&self.query(accession))
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(accession.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Api(status.as_u16(), body));
        }

        let body = response.text().await.map_err(FetchError::from_reqwest)?;
        let classification = parse_summary(accession, &body)?;

        debug!(
            accession = %accession,
            organism = ?classification.most_specific(),
            "NCBI ESummary complete"
        );

        Ok(classification)
    }
}

/// Pull the organism name out of an ESummary JSON document
///
/// ESummary reports unknown ids in several ways: a top-level `error` or
/// `esummaryresult` message, an empty `uids` list, or a per-uid `error`.
fn parse_summary(accession: &str, body: &str) -> Result<Classification, FetchError> {
    let doc: Value = serde_json::from_str(body)
        .map_err(|e| FetchError::Parse(format!("Failed to parse ESummary response: {}", e)))?;

    if let Some(message) = doc.get("error").and_then(Value::as_str) {
        return Err(FetchError::NotFound(format!("{}: {}", accession, message)));
    }
    if let Some(messages) = doc.get("esummaryresult").and_then(Value::as_array) {
        let message = messages
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(FetchError::NotFound(format!("{}: {}", accession, message)));
    }

    let result = doc
        .get("result")
        .ok_or_else(|| FetchError::Malformed("ESummary response has no result field".to_string()))?;

    let uid = result
        .get("uids")
        .and_then(Value::as_array)
        .and_then(|uids| uids.first())
        .and_then(Value::as_str)
        .ok_or_else(|| FetchError::NotFound(accession.to_string()))?;

    let summary = result
        .get(uid)
        .ok_or_else(|| FetchError::Malformed(format!("ESummary result lacks entry for uid {}", uid)))?;

    if let Some(message) = summary.get("error").and_then(Value::as_str) {
        return Err(FetchError::NotFound(format!("{}: {}", accession, message)));
    }

    let organism = summary
        .get("organism")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| FetchError::MissingClassification(accession.to_string()))?;

    Ok(Classification::new(vec![organism.to_string()]))
}
