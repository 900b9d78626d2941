//! Server shared state
//!
//! Holds configuration, the address store, provider clients and the
//! supervised backfill job. Built once at startup and shared via `Arc`.

use crate::backfill::BackfillJob;
use crate::building::NearbyBuildingFinder;
use crate::config::Config;
use crate::error::Result;
use crate::provider::ncp::NcpMapsClient;
use crate::provider::search::LocalSearchClient;
use crate::provider::{ForwardGeocoder, PlaceSearch, ReverseGeocoder};
use crate::store::AddressStore;
use std::sync::Arc;
use std::time::Duration;

/// External providers used by the service
#[derive(Clone)]
pub struct Providers {
    pub geocoder: Arc<dyn ForwardGeocoder>,
    pub reverse: Arc<dyn ReverseGeocoder>,
    pub search: Arc<dyn PlaceSearch>,
}

impl Providers {
    /// Build the Naver clients from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let maps = Arc::new(NcpMapsClient::new(&config.providers)?);
        let search = Arc::new(LocalSearchClient::new(&config.providers)?);
        Ok(Self {
            geocoder: maps.clone(),
            reverse: maps,
            search,
        })
    }
}

/// Shared state for the HTTP server
pub struct AppState {
    /// Configuration
    pub config: Config,

    /// Address database
    pub store: AddressStore,

    /// External providers
    pub providers: Providers,

    /// Nearby-building pipeline
    pub finder: NearbyBuildingFinder,

    /// Coordinate backfill job
    pub backfill: BackfillJob,
}

impl AppState {
    /// Create new application state
    pub fn new(config: Config, store: AddressStore, providers: Providers) -> Self {
        let finder = NearbyBuildingFinder::new(providers.reverse.clone(), providers.search.clone());
        let backfill = BackfillJob::new(
            store.clone(),
            providers.geocoder.clone(),
            Duration::from_millis(config.backfill.delay_ms),
        );

        Self {
            config,
            store,
            providers,
            finder,
            backfill,
        }
    }
}
