//! gbmatch library interface
//!
//! Flags iNaturalist observations whose species name disagrees with the
//! organism name on their GenBank accession. Exposes the fetchers, rate
//! limiter and orchestrator for the binary and for integration testing.

pub mod error;
pub mod input;
pub mod orchestrator;
pub mod output;
pub mod rate_limiter;
pub mod sources;

pub use crate::error::FetchError;
pub use crate::orchestrator::{Orchestrator, RunReport};
pub use crate::rate_limiter::RateLimiter;

use gbmatch_common::config::TomlConfig;
use gbmatch_common::{Error, ExceptionRegistry, Reconciler};
use sources::{GenBankClient, INaturalistClient};
use std::sync::Arc;

/// Wire both HTTP clients to one shared rate limiter
///
/// Client setup failures come from the configuration (bad user agent,
/// unusable TLS backend) and are reported as `Error::Config`.
pub fn build_orchestrator(
    config: &TomlConfig,
    exceptions: ExceptionRegistry,
) -> gbmatch_common::Result<Orchestrator> {
    let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit.min_interval()));

    let inaturalist = Arc::new(
        INaturalistClient::new(
            config.inaturalist.base_url.clone(),
            &config.http,
            Arc::clone(&rate_limiter),
        )
        .map_err(client_setup_error)?,
    );
    let genbank = Arc::new(
        GenBankClient::new(&config.ncbi, &config.http, Arc::clone(&rate_limiter))
            .map_err(client_setup_error)?,
    );

    Ok(Orchestrator::new(
        inaturalist.clone(),
        inaturalist,
        genbank,
        Reconciler::new(exceptions),
        rate_limiter,
    ))
}

fn client_setup_error(err: FetchError) -> Error {
    Error::Config(format!("HTTP client setup failed: {}", err))
}
