//! HTTP client tests against a local mock server

use gbmatch::sources::{
    AccessionSource, FieldSource, GenBankClient, INaturalistClient, TaxonSource,
};
use gbmatch::{FetchError, RateLimiter};
use gbmatch_common::config::{HttpConfig, NcbiConfig};
use gbmatch_common::FailureKind;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn limiter() -> Arc<RateLimiter> {
    Arc::new(RateLimiter::new(Duration::ZERO))
}

fn inat(server: &MockServer, limiter: Arc<RateLimiter>) -> INaturalistClient {
    INaturalistClient::new(server.uri(), &HttpConfig::default(), limiter).unwrap()
}

fn ncbi(base_url: String) -> NcbiConfig {
    NcbiConfig {
        base_url,
        email: Some("curator@example.org".to_string()),
        ..NcbiConfig::default()
    }
}

#[tokio::test]
async fn test_fetch_taxa_batch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/observations"))
        .and(query_param("id", "146703842,232615678,1"))
        .and(query_param("per_page", "200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_results": 2,
            "results": [
                {"id": 146703842, "taxon": {"name": "Russula"}},
                {"id": 232615678, "taxon": {"name": "Amanita"}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let limiter = limiter();
    let client = inat(&server, Arc::clone(&limiter));
    let taxa = client.fetch_taxa(&[146703842, 232615678, 1]).await.unwrap();

    assert_eq!(taxa.len(), 2);
    assert_eq!(taxa[&146703842], "Russula");
    assert_eq!(taxa[&232615678], "Amanita");
    assert!(!taxa.contains_key(&1));
    assert_eq!(limiter.calls(), 1);
}

#[tokio::test]
async fn test_fetch_taxa_without_results_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/observations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "nope"})))
        .mount(&server)
        .await;

    let client = inat(&server, limiter());
    let result = client.fetch_taxa(&[1]).await;
    assert!(matches!(result, Err(FetchError::Malformed(_))));
}

#[tokio::test]
async fn test_fetch_taxa_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/observations"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let client = inat(&server, limiter());
    match client.fetch_taxa(&[1]).await {
        Err(FetchError::Api(status, body)) => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_taxa_rejects_oversized_batch() {
    let server = MockServer::start().await;
    let client = inat(&server, limiter());
    let ids: Vec<u64> = (1..=201).collect();

    let result = client.fetch_taxa(&ids).await;
    assert!(matches!(result, Err(FetchError::InvalidRequest(_))));
}

#[tokio::test]
async fn test_fetch_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/observations/232615678"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "id": 232615678,
                "taxon": {"name": "Amanita"},
                "ofvs": [
                    {"name": "Genbank Accession Number", "value": "OR123456"},
                    {"name": "Provisional Species Name", "value": "Amanita sp S19"}
                ]
            }]
        })))
        .mount(&server)
        .await;

    let limiter = limiter();
    let client = inat(&server, Arc::clone(&limiter));
    let fields = client.fetch_fields(232615678).await.unwrap();

    assert_eq!(fields.accession_id, "OR123456");
    assert_eq!(fields.provisional_name, "Amanita sp S19");
    assert_eq!(limiter.calls(), 1);
}

#[tokio::test]
async fn test_fetch_fields_unknown_observation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/observations/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&server)
        .await;

    let client = inat(&server, limiter());
    let result = client.fetch_fields(5).await;
    assert!(matches!(result, Err(FetchError::NotFound(_))));
}

#[tokio::test]
async fn test_resolve_accession() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esummary.fcgi"))
        .and(query_param("db", "nuccore"))
        .and(query_param("id", "OR123456"))
        .and(query_param("retmode", "json"))
        .and(query_param("tool", "gbmatch"))
        .and(query_param("email", "curator@example.org"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "header": {"type": "esummary", "version": "0.3"},
            "result": {
                "uids": ["2521870386"],
                "2521870386": {
                    "uid": "2521870386",
                    "caption": "OR123456",
                    "organism": "Amanita sp. 'sp-S19'"
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let limiter = limiter();
    let client =
        GenBankClient::new(&ncbi(server.uri()), &HttpConfig::default(), Arc::clone(&limiter))
            .unwrap();
    let classification = client.resolve("OR123456").await.unwrap();

    assert_eq!(classification.most_specific(), Some("Amanita sp. 'sp-S19'"));
    assert_eq!(limiter.calls(), 1);
}

#[tokio::test]
async fn test_resolve_unknown_accession() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esummary.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "header": {"type": "esummary"},
            "esummaryresult": ["Invalid uid XX000000 at position=0"]
        })))
        .mount(&server)
        .await;

    let client =
        GenBankClient::new(&ncbi(server.uri()), &HttpConfig::default(), limiter()).unwrap();
    let err = client.resolve("XX000000").await.unwrap_err();

    assert_eq!(err.kind(), FailureKind::NotFound);
    assert!(err.to_string().contains("Invalid uid"));
}

#[tokio::test]
async fn test_resolve_timeout_is_connectivity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esummary.fcgi"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"result": {"uids": []}}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let http = HttpConfig {
        timeout_secs: 1,
        ..HttpConfig::default()
    };
    let client = GenBankClient::new(&ncbi(server.uri()), &http, limiter()).unwrap();
    let err = client.resolve("MN000001").await.unwrap_err();

    assert!(matches!(err, FetchError::Timeout(_)), "got {:?}", err);
    assert_eq!(err.kind(), FailureKind::Connectivity);
}

#[tokio::test]
async fn test_unreachable_source_is_connectivity() {
    // Nothing listens on port 9 (discard) on a test machine
    let client = GenBankClient::new(
        &ncbi("http://127.0.0.1:9".to_string()),
        &HttpConfig::default(),
        limiter(),
    )
    .unwrap();
    let err = client.resolve("MN000001").await.unwrap_err();

    assert_eq!(err.kind(), FailureKind::Connectivity);
}
