//! iNaturalist API client
//!
//! Supplies the observation side of the comparison:
//! - `GET /observations?id=1,2,3&per_page=200` - consensus taxon names, batched
//! - `GET /observations/{id}` - observation field values for one observation
//!
//! # API Reference
//! - Documentation: https://api.inaturalist.org/v1/docs/
//! - Rate Limit: shared process-wide gate, 1 request/second by default

use super::{
    build_http_client, FieldSource, SpecimenFields, TaxonSource, ACCESSION_FIELD, BATCH_SIZE,
    PROVISIONAL_FIELD,
};
use crate::error::FetchError;
use crate::rate_limiter::RateLimiter;
use async_trait::async_trait;
use gbmatch_common::config::HttpConfig;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// iNaturalist API client
pub struct INaturalistClient {
    http_client: Client,
    base_url: String,
    rate_limiter: Arc<RateLimiter>,
}

impl INaturalistClient {
    pub fn new(
        base_url: impl Into<String>,
        http: &HttpConfig,
        rate_limiter: Arc<RateLimiter>,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            http_client: build_http_client(http)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            rate_limiter,
        })
    }

    /// Issue one rate-limited GET and decode the observation envelope
    async fn get_observations(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<ObservationsResponse, FetchError> {
        self.rate_limiter.acquire().await;

        let response = self
            .http_client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Api(status.as_u16(), body));
        }

        let body = response.text().await.map_err(FetchError::from_reqwest)?;
        decode(&body)
    }
}

#[async_trait]
impl TaxonSource for INaturalistClient {
    async fn fetch_taxa(&self, ids: &[u64]) -> Result<HashMap<u64, String>, FetchError> {
        if ids.len() > BATCH_SIZE {
            return Err(FetchError::InvalidRequest(format!(
                "{} ids exceed the batch size of {}",
                ids.len(),
                BATCH_SIZE
            )));
        }

        let joined = ids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let url = format!("{}/observations", self.base_url);

        debug!(count = ids.len(), "Fetching consensus taxa from iNaturalist");

        let response = self
            .get_observations(&url, &[("id", joined), ("per_page", BATCH_SIZE.to_string())])
            .await?;
        let results = response
            .results
            .ok_or_else(|| FetchError::Malformed("observation list has no results field".to_string()))?;

        Ok(results
            .into_iter()
            .filter_map(|obs| {
                let name = obs.taxon.and_then(|taxon| taxon.name)?;
                Some((obs.id, name))
            })
            .collect())
    }
}

#[async_trait]
impl FieldSource for INaturalistClient {
    async fn fetch_fields(&self, id: u64) -> Result<SpecimenFields, FetchError> {
        let url = format!("{}/observations/{}", self.base_url, id);

        debug!(id = %id, "Fetching observation fields from iNaturalist");

        let response = self.get_observations(&url, &[]).await?;
        let observation = response
            .results
            .ok_or_else(|| FetchError::Malformed("observation has no results field".to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::NotFound(format!("observation {}", id)))?;

        Ok(observation.fields())
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, FetchError> {
    serde_json::from_str(body)
        .map_err(|e| FetchError::Parse(format!("Failed to parse iNaturalist response: {}", e)))
}

// ============================================================================
// iNaturalist API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    results: Option<Vec<Observation>>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    id: u64,
    taxon: Option<Taxon>,
    #[serde(default)]
    ofvs: Vec<ObservationFieldValue>,
}

#[derive(Debug, Deserialize)]
struct Taxon {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ObservationFieldValue {
    name: Option<String>,
    value: Option<serde_json::Value>,
}

impl ObservationFieldValue {
    /// Field values are usually strings, occasionally bare numbers
    fn text(&self) -> String {
        match &self.value {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => String::new(),
        }
    }
}

impl Observation {
    fn fields(&self) -> SpecimenFields {
        let mut fields = SpecimenFields::default();
        for ofv in &self.ofvs {
            match ofv.name.as_deref() {
                Some(ACCESSION_FIELD) => fields.accession_id = ofv.text(),
                Some(PROVISIONAL_FIELD) => fields.provisional_name = ofv.text(),
                _ => {}
            }
        }
        fields
    }
}
